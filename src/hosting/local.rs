use super::*;
use crate::gameroom::*;
use crate::sync::*;
use std::sync::Arc;

/// In-process transport: attaches a [`Session`] to a room without a socket.
///
/// Every `connect` opens a fresh link, so a reconnect looks to the room
/// exactly like a client that dropped and came back.
pub struct LocalTransport {
    casino: Arc<Casino>,
    code: RoomCode,
    link: Option<Link>,
}

impl LocalTransport {
    pub fn new(casino: Arc<Casino>, code: RoomCode) -> Self {
        Self {
            casino,
            code,
            link: None,
        }
    }
    /// Drops the current link as if the network went away.
    pub fn disconnect(&mut self) {
        self.link = None;
    }
}

#[async_trait::async_trait]
impl Transport for LocalTransport {
    async fn connect(&mut self) -> anyhow::Result<()> {
        self.link = None;
        self.link = Some(self.casino.attach(&self.code).await?);
        Ok(())
    }
    async fn send(&mut self, text: String) -> anyhow::Result<()> {
        self.link
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("not connected"))?
            .send(text)
    }
    async fn recv(&mut self) -> Option<String> {
        match self.link.as_mut() {
            Some(link) => link.recv().await,
            None => None,
        }
    }
}
