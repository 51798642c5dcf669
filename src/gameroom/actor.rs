use super::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// What the outside world can tell a running room.
#[derive(Debug)]
pub enum Signal {
    /// A connection opened; frames for it go to the sender.
    Join(ConnectionId, UnboundedSender<String>),
    /// A text frame arrived on a connection.
    Message(ConnectionId, String),
    /// A connection closed.
    Leave(ConnectionId),
    /// The room was shut from outside; stop and drop every connection.
    Close,
}

impl Room {
    /// Spawns the room on its own task and returns its inbox.
    ///
    /// The returned handle resolves once the room closes itself, is sent
    /// [`Signal::Close`], or every sender to the inbox is dropped.
    pub fn spawn(self) -> (UnboundedSender<Signal>, tokio::task::JoinHandle<RoomCode>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (tx, tokio::spawn(self.run(rx)))
    }

    /// Processes signals one at a time, sweeping for stale connections on
    /// a fixed cadence.
    pub async fn run(mut self, mut signals: UnboundedReceiver<Signal>) -> RoomCode {
        log::debug!("[room {}] running", self.code());
        let period = self.config().sweep;
        let mut sweep = tokio::time::interval_at(Instant::now() + period, period);
        while !self.is_closed() {
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(Signal::Join(conn, sender)) => self.on_join(conn, sender, Instant::now()),
                    Some(Signal::Message(conn, text)) => self.on_message(conn, &text, Instant::now()).await,
                    Some(Signal::Leave(conn)) => self.on_leave(conn).await,
                    Some(Signal::Close) => self.shut(),
                    None => break,
                },
                _ = sweep.tick() => self.sweep(Instant::now()).await,
            }
        }
        log::debug!("[room {}] stopped", self.code());
        self.code().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::*;
    use crate::sync::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::timeout;

    async fn next(rx: &mut UnboundedReceiver<String>) -> ServerMessage {
        let text = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("frame in time")
            .expect("open outbox");
        ServerMessage::decode(&text).unwrap()
    }

    #[tokio::test]
    async fn room_task_serves_signals_and_stops_when_emptied() {
        let code = RoomCode::try_from("XYZ789").unwrap();
        let room = Room::new(code.clone(), Arc::new(MemoryStorage::default()), RoomConfig::default());
        let (inbox, done) = room.spawn();
        let (tx, mut rx) = unbounded_channel();
        inbox.send(Signal::Join(1, tx)).unwrap();
        let join = ClientMessage::join(&PlayerId::from("ann"), "Ann");
        inbox.send(Signal::Message(1, join.to_json())).unwrap();
        assert!(matches!(next(&mut rx).await, ServerMessage::RoomState { .. }));
        inbox.send(Signal::Message(1, ClientMessage::Ping.to_json())).unwrap();
        assert_eq!(next(&mut rx).await, ServerMessage::Pong);
        inbox.send(Signal::Leave(1)).unwrap();
        let stopped = timeout(Duration::from_secs(2), done)
            .await
            .expect("room stops")
            .unwrap();
        assert_eq!(stopped, code);
    }

    #[tokio::test]
    async fn close_signal_stops_a_busy_room() {
        let code = RoomCode::try_from("CLS234").unwrap();
        let room = Room::new(code.clone(), Arc::new(MemoryStorage::default()), RoomConfig::default());
        let (inbox, done) = room.spawn();
        let (tx, mut rx) = unbounded_channel();
        inbox.send(Signal::Join(1, tx)).unwrap();
        inbox.send(Signal::Close).unwrap();
        let stopped = timeout(Duration::from_secs(2), done)
            .await
            .expect("room stops")
            .unwrap();
        assert_eq!(stopped, code);
        assert_eq!(rx.recv().await, None);
        assert!(inbox.send(Signal::Leave(1)).is_err());
    }
}
