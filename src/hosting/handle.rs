use crate::gameroom::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Handle to communicate with a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    pub code: RoomCode,
    pub inbox: UnboundedSender<Signal>,
}

impl RoomHandle {
    /// Attaches a new connection and returns both ends of it.
    pub fn attach(&self, conn: ConnectionId) -> anyhow::Result<Link> {
        let (tx, rx) = unbounded_channel::<String>();
        self.inbox
            .send(Signal::Join(conn, tx))
            .map_err(|_| anyhow::anyhow!("room {} is closed", self.code))?;
        Ok(Link {
            conn,
            handle: self.clone(),
            outbox: rx,
        })
    }
}

/// One connection's view of a room: frames in, frames out.
///
/// Dropping the link tells the room the connection left.
#[derive(Debug)]
pub struct Link {
    conn: ConnectionId,
    handle: RoomHandle,
    outbox: UnboundedReceiver<String>,
}

impl Link {
    pub fn conn(&self) -> ConnectionId {
        self.conn
    }
    pub fn code(&self) -> &RoomCode {
        &self.handle.code
    }
    pub fn send(&self, text: String) -> anyhow::Result<()> {
        self.handle
            .inbox
            .send(Signal::Message(self.conn, text))
            .map_err(|_| anyhow::anyhow!("room {} is closed", self.handle.code))
    }
    pub async fn recv(&mut self) -> Option<String> {
        self.outbox.recv().await
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        let _ = self.handle.inbox.send(Signal::Leave(self.conn));
    }
}
