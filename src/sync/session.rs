use super::*;
use crate::board::*;
use crate::engine::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;
use tokio::time::Instant;

/// Connection state published to whoever drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting(u32),
    Closed,
}

/// Something the local participant wants to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ask the room to start the game (host only).
    Start,
    Act(Action),
}

impl From<Action> for Intent {
    fn from(action: Action) -> Self {
        Self::Act(action)
    }
}

/// Caller's side of a running [`Session`].
///
/// Dropping `intents` ends the session.
pub struct SessionHandle {
    pub intents: UnboundedSender<Intent>,
    pub notices: UnboundedReceiver<Notice>,
    pub status: watch::Receiver<ConnectionStatus>,
}

impl SessionHandle {
    /// Queues a game action. False once the session has ended.
    pub fn act(&self, action: Action) -> bool {
        self.intents.send(Intent::Act(action)).is_ok()
    }
    pub fn start_game(&self) -> bool {
        self.intents.send(Intent::Start).is_ok()
    }
}

enum Exit {
    Quit,
    Lost,
}

/// Async driver around a [`Replica`].
///
/// Joins on every (re)connect, multiplexes local intents, inbound frames,
/// heartbeat ticks, and snapshot deadlines, and turns transport failures
/// into status changes plus a backed-off reconnect. Actions lost in flight
/// are not retried; the next host snapshot repairs them.
pub struct Session<T> {
    transport: T,
    replica: Replica,
    name: String,
    config: SyncConfig,
    backoff: Backoff,
    intents: UnboundedReceiver<Intent>,
    notices: UnboundedSender<Notice>,
    status: watch::Sender<ConnectionStatus>,
}

impl<T: Transport + 'static> Session<T> {
    pub fn spawn(transport: T, me: PlayerId, name: &str, config: SyncConfig) -> SessionHandle {
        let (intent_tx, intent_rx) = unbounded_channel();
        let (notice_tx, notice_rx) = unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let session = Self {
            transport,
            replica: Replica::new(me, config),
            name: name.to_string(),
            config,
            backoff: Backoff::new(config),
            intents: intent_rx,
            notices: notice_tx,
            status: status_tx,
        };
        tokio::spawn(session.run());
        SessionHandle {
            intents: intent_tx,
            notices: notice_rx,
            status: status_rx,
        }
    }

    async fn run(mut self) {
        loop {
            match self.transport.connect().await {
                Ok(()) => match self.drive().await {
                    Exit::Quit => break,
                    Exit::Lost => log::info!("[session {}] connection lost", self.replica.me()),
                },
                Err(e) => log::warn!("[session {}] connect failed: {}", self.replica.me(), e),
            }
            let delay = self.backoff.next();
            self.status
                .send_replace(ConnectionStatus::Reconnecting(self.backoff.attempt()));
            log::debug!(
                "[session {}] reconnecting in {}ms",
                self.replica.me(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            if self.notices.is_closed() {
                break;
            }
        }
        self.status.send_replace(ConnectionStatus::Closed);
        log::debug!("[session {}] closed", self.replica.me());
    }

    async fn drive(&mut self) -> Exit {
        let join = ClientMessage::join(self.replica.me(), &self.name);
        if self.emit(join).await.is_err() {
            return Exit::Lost;
        }
        self.status.send_replace(ConnectionStatus::Connected);
        self.backoff.reset();
        let ref mut heartbeat = Heartbeat::new(self.config);
        let period = self.config.heartbeat;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        loop {
            let deadline = self.replica.snapshot_deadline();
            tokio::select! {
                intent = self.intents.recv() => {
                    let msg = match intent {
                        None => return Exit::Quit,
                        Some(Intent::Start) => Some(ClientMessage::StartGame),
                        Some(Intent::Act(action)) => self.replica.dispatch(action, Instant::now()),
                    };
                    if let Some(msg) = msg {
                        if self.emit(msg).await.is_err() {
                            return Exit::Lost;
                        }
                    }
                },
                text = self.transport.recv() => match text {
                    None => return Exit::Lost,
                    Some(text) => self.inbound(&text, heartbeat),
                },
                _ = ticker.tick() => match heartbeat.tick() {
                    Beat::Dead => {
                        log::warn!("[session {}] heartbeat missed {} times", self.replica.me(), heartbeat.misses());
                        return Exit::Lost;
                    }
                    Beat::Ping => {
                        if self.emit(ClientMessage::Ping).await.is_err() {
                            return Exit::Lost;
                        }
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(msg) = self.replica.poll_snapshot(Instant::now()) {
                        if self.emit(msg).await.is_err() {
                            return Exit::Lost;
                        }
                    }
                },
            }
        }
    }

    fn inbound(&mut self, text: &str, heartbeat: &mut Heartbeat) {
        match ServerMessage::decode(text) {
            Ok(ServerMessage::Pong) => heartbeat.pong(),
            Ok(msg) => {
                for notice in self.replica.receive(msg, Instant::now()) {
                    let _ = self.notices.send(notice);
                }
            }
            Err(e) => log::warn!("[session {}] {}", self.replica.me(), e),
        }
    }

    async fn emit(&mut self, msg: ClientMessage) -> anyhow::Result<()> {
        self.transport.send(msg.to_json()).await.map_err(|e| {
            log::warn!("[session {}] send failed: {}", self.replica.me(), e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::timeout;

    struct Pipe {
        outbox: UnboundedSender<String>,
        inbox: UnboundedReceiver<String>,
        connects: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Transport for Pipe {
        async fn connect(&mut self) -> anyhow::Result<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn send(&mut self, text: String) -> anyhow::Result<()> {
            self.outbox.send(text).map_err(|e| anyhow::anyhow!("{}", e))
        }
        async fn recv(&mut self) -> Option<String> {
            self.inbox.recv().await
        }
    }

    fn config() -> SyncConfig {
        SyncConfig {
            backoff_base: Duration::from_millis(5),
            backoff_cap: Duration::from_millis(20),
            ..SyncConfig::default()
        }
    }

    async fn next(rx: &mut UnboundedReceiver<String>) -> ClientMessage {
        let text = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("frame in time")
            .expect("open outbox");
        ClientMessage::decode(&text).unwrap()
    }

    fn info(id: &str) -> PlayerInfo {
        PlayerInfo {
            id: PlayerId::from(id),
            name: id.to_string(),
            is_host: id == "ann",
            is_ready: true,
            connected: true,
        }
    }

    #[tokio::test]
    async fn joins_then_broadcasts_local_actions() {
        let (out_tx, mut out_rx) = unbounded_channel();
        let (in_tx, in_rx) = unbounded_channel();
        let pipe = Pipe {
            outbox: out_tx,
            inbox: in_rx,
            connects: Arc::new(AtomicUsize::new(0)),
        };
        let mut handle = Session::spawn(pipe, PlayerId::from("ann"), "Ann", config());
        assert_eq!(
            next(&mut out_rx).await,
            ClientMessage::join(&PlayerId::from("ann"), "Ann")
        );
        let players = vec![info("ann"), info("bo")];
        let started = ServerMessage::GameStarted {
            players: players.clone(),
            seed: 3,
        };
        let room = ServerMessage::RoomState {
            players,
            game_started: false,
            host_id: Some(PlayerId::from("ann")),
        };
        in_tx.send(room.to_json()).unwrap();
        in_tx.send(started.to_json()).unwrap();
        loop {
            match timeout(Duration::from_secs(2), handle.notices.recv()).await {
                Ok(Some(Notice::Started)) => break,
                Ok(Some(_)) => continue,
                _ => panic!("game never started"),
            }
        }
        assert_eq!(*handle.status.borrow(), ConnectionStatus::Connected);
        assert!(handle.act(Action::RollForFirst { roll: 4 }));
        assert_eq!(
            next(&mut out_rx).await,
            ClientMessage::game_action(&PlayerId::from("ann"), Action::RollForFirst { roll: 4 })
        );
        assert!(matches!(
            next(&mut out_rx).await,
            ClientMessage::SyncState { ref state } if state.version() == 1
        ));
    }

    #[tokio::test]
    async fn lost_link_rejoins() {
        let (out_tx, mut out_rx) = unbounded_channel();
        let (in_tx, in_rx) = unbounded_channel::<String>();
        let connects = Arc::new(AtomicUsize::new(0));
        let pipe = Pipe {
            outbox: out_tx,
            inbox: in_rx,
            connects: connects.clone(),
        };
        let handle = Session::spawn(pipe, PlayerId::from("bo"), "Bo", config());
        let join = ClientMessage::join(&PlayerId::from("bo"), "Bo");
        assert_eq!(next(&mut out_rx).await, join);
        drop(in_tx);
        assert_eq!(next(&mut out_rx).await, join);
        assert!(connects.load(Ordering::SeqCst) >= 2);
        drop(handle);
    }
}
