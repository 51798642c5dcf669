/// Ordered, text-framed link between a participant and its room.
///
/// Implementations report failure by erroring on `send` or by returning
/// `None` from `recv`; the session turns either into a reconnect.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// (Re)opens the link. Called before the first use and after every loss.
    async fn connect(&mut self) -> anyhow::Result<()>;
    async fn send(&mut self, text: String) -> anyhow::Result<()>;
    async fn recv(&mut self) -> Option<String>;
}
