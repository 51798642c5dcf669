use super::*;
use crate::board::*;
use crate::engine::*;
use crate::sync::*;
use crate::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// Timing knobs for a room coordinator.
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    /// Silence after which a connection is treated as gone.
    pub stale: Duration,
    /// How often the room looks for stale connections.
    pub sweep: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        let beat = Duration::from_millis(HEARTBEAT_INTERVAL_MS);
        Self {
            stale: beat * HEARTBEAT_MISSES,
            sweep: beat,
        }
    }
}

/// Coordinator for one room code.
///
/// Owns the roster, relays game traffic between connections, and keeps
/// the latest host snapshot in a durable slot. It never runs the reducer:
/// every participant validates actions on its own replica, and the room
/// only decides who may start the game and whose snapshots count.
///
/// Handlers run one at a time on the room's actor task, so nothing here
/// needs a lock. Per-connection ping times live in `pings`.
pub struct Room {
    code: RoomCode,
    roster: Roster,
    table: Table,
    started: bool,
    state: Option<GameState>,
    pings: HashMap<ConnectionId, Instant>,
    storage: Arc<dyn Storage>,
    config: RoomConfig,
    active: Instant,
    closed: bool,
}

impl Room {
    pub fn new(code: RoomCode, storage: Arc<dyn Storage>, config: RoomConfig) -> Self {
        Self {
            code,
            roster: Roster::default(),
            table: Table::default(),
            started: false,
            state: None,
            pings: HashMap::new(),
            storage,
            config,
            active: Instant::now(),
            closed: false,
        }
    }

    /// Opens a room, picking up whatever record a previous run left behind.
    pub async fn restore(
        code: RoomCode,
        storage: Arc<dyn Storage>,
        config: RoomConfig,
    ) -> anyhow::Result<Self> {
        let mut room = Self::new(code, storage, config);
        if let Some(text) = room.storage.get(&room.code, ROOM_KEY).await? {
            let record = serde_json::from_str::<RoomRecord>(&text)?;
            room.roster.restore(&record.players);
            room.started = record.game_started;
            room.state = record.game_state;
            log::info!(
                "[room {}] restored {} players, started: {}",
                room.code,
                room.roster.len(),
                room.started
            );
        }
        Ok(room)
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }
    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn is_started(&self) -> bool {
        self.started
    }
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
    /// True once the room has nothing left to coordinate.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
    pub fn record(&self) -> RoomRecord {
        RoomRecord {
            players: self.roster.infos(),
            game_started: self.started,
            game_state: self.state.clone(),
            host_id: self.roster.host().cloned(),
        }
    }
}

// ============================================================================
// CONNECTION LIFECYCLE
// ============================================================================
impl Room {
    /// A socket opened. It stays anonymous until it sends `join`.
    pub fn on_join(&mut self, conn: ConnectionId, sender: UnboundedSender<String>, now: Instant) {
        log::debug!("[room {}] C{} attached", self.code, conn);
        self.table.sit(conn, sender);
        self.pings.insert(conn, now);
        self.active = now;
    }

    /// A socket closed or went stale.
    pub async fn on_leave(&mut self, conn: ConnectionId) {
        self.table.stand(conn);
        self.pings.remove(&conn);
        let left = if self.started {
            self.roster.detach(conn)
        } else {
            self.roster.remove(conn)
        };
        let Some(player) = left else {
            log::debug!("[room {}] anonymous C{} detached", self.code, conn);
            return;
        };
        log::info!(
            "[room {}] {} left ({})",
            self.code,
            player,
            if self.started { "seat kept" } else { "seat freed" }
        );
        self.table.broadcast(&ServerMessage::PlayerLeft {
            player_id: player,
            players: self.roster.infos(),
            host_id: self.roster.host().cloned(),
            game_started: self.started,
            player_disconnected: self.started.then_some(true),
        });
        if !self.started && self.roster.is_empty() {
            self.discard().await;
        } else {
            self.persist().await;
        }
    }

    /// Drops connections that have not pinged within the stale window, and
    /// closes the room once nobody has been attached for as long. A started
    /// game stays in storage and can be reopened by code.
    pub async fn sweep(&mut self, now: Instant) {
        let stale = self
            .pings
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) > self.config.stale)
            .map(|(conn, _)| *conn)
            .collect::<Vec<_>>();
        for conn in stale {
            log::warn!("[room {}] C{} went quiet", self.code, conn);
            self.on_leave(conn).await;
        }
        if self.table.is_empty() && now.saturating_duration_since(self.active) > self.config.stale {
            log::info!("[room {}] idle, closing", self.code);
            self.closed = true;
        }
    }

    /// Stops the room on request. Whatever was last persisted stays in
    /// storage.
    pub fn shut(&mut self) {
        let open = self.table.connections().count();
        log::info!("[room {}] shut with {} connections", self.code, open);
        self.closed = true;
    }

    /// Handles one inbound frame from a connection.
    pub async fn on_message(&mut self, conn: ConnectionId, raw: &str, now: Instant) {
        self.pings.insert(conn, now);
        self.active = now;
        match ClientMessage::decode(raw) {
            Err(e) => {
                log::warn!("[room {}] C{} sent {}", self.code, conn, e);
                self.table.unicast(conn, &ServerMessage::error(e));
            }
            Ok(ClientMessage::Ping) => self.table.unicast(conn, &ServerMessage::Pong),
            Ok(ClientMessage::Join {
                player_id,
                player_name,
            }) => self.join(conn, player_id, player_name).await,
            Ok(msg) => match self.roster.by_connection(conn).map(|e| e.id.clone()) {
                None => self.refuse(conn, "join the room first"),
                Some(sender) => match msg {
                    ClientMessage::StartGame => self.start(conn, &sender).await,
                    ClientMessage::GameAction { action, player_id } => {
                        self.relay(conn, &sender, action, player_id)
                    }
                    ClientMessage::SyncState { state } => self.sync(conn, &sender, state).await,
                    ClientMessage::Join { .. } | ClientMessage::Ping => {}
                },
            },
        }
    }
}

// ============================================================================
// MESSAGE HANDLERS
// ============================================================================
impl Room {
    async fn join(&mut self, conn: ConnectionId, id: PlayerId, name: String) {
        if self.roster.get(&id).is_some() {
            if let Some(prior) = self.roster.reattach(&id, conn).filter(|c| *c != conn) {
                log::debug!("[room {}] {} replaced C{}", self.code, id, prior);
                self.table.stand(prior);
                self.pings.remove(&prior);
            }
            log::info!("[room {}] {} rejoined on C{}", self.code, id, conn);
            self.table.unicast(
                conn,
                &ServerMessage::Rejoined {
                    room: self.view(),
                    game_state: self.state.clone(),
                },
            );
        } else if self.started {
            return self.refuse(conn, "game already started");
        } else if self.roster.len() >= MAX_PLAYERS {
            return self.refuse(conn, "room is full");
        } else {
            log::info!("[room {}] {} joined on C{}", self.code, id, conn);
            self.roster.admit(id, name, conn);
            self.table.unicast(
                conn,
                &ServerMessage::RoomState {
                    players: self.roster.infos(),
                    game_started: self.started,
                    host_id: self.roster.host().cloned(),
                },
            );
        }
        self.table.broadcast_except(
            conn,
            &ServerMessage::PlayerJoined {
                players: self.roster.infos(),
                game_started: self.started,
                host_id: self.roster.host().cloned(),
            },
        );
        self.persist().await;
    }

    async fn start(&mut self, conn: ConnectionId, sender: &PlayerId) {
        if self.started {
            return self.refuse(conn, "game already started");
        }
        if self.roster.host() != Some(sender) {
            return self.refuse(conn, "only the host can start the game");
        }
        if self.roster.len() < MIN_PLAYERS {
            return self.refuse(conn, "need at least two players");
        }
        let seed = rand::random::<u64>();
        log::info!(
            "[room {}] game started by {} with {} players",
            self.code,
            sender,
            self.roster.len()
        );
        self.started = true;
        self.table.broadcast(&ServerMessage::GameStarted {
            players: self.roster.infos(),
            seed,
        });
        self.persist().await;
    }

    /// Relays an action to every connection, the sender included.
    fn relay(&self, conn: ConnectionId, sender: &PlayerId, action: Action, claimed: PlayerId) {
        if !self.started {
            return self.refuse(conn, "game not started");
        }
        if &claimed != sender {
            return self.refuse(conn, "cannot act for another player");
        }
        log::debug!("[room {}] {} -> {}", self.code, sender, action);
        self.table.broadcast(&ServerMessage::GameAction {
            action,
            player_id: claimed,
        });
    }

    /// Stores a host snapshot unless it is older than the one on file.
    async fn sync(&mut self, conn: ConnectionId, sender: &PlayerId, state: GameState) {
        if self.roster.host() != Some(sender) {
            return self.refuse(conn, "only the host can sync state");
        }
        if let Some(stored) = self.state.as_ref().filter(|s| s.version() > state.version()) {
            log::debug!(
                "[room {}] dropped stale snapshot v{} < v{}",
                self.code,
                state.version(),
                stored.version()
            );
            return;
        }
        log::trace!("[room {}] snapshot v{} from {}", self.code, state.version(), sender);
        self.table.broadcast_except(
            conn,
            &ServerMessage::StateSync {
                state: state.clone(),
                players: self.roster.infos(),
                host_id: sender.clone(),
            },
        );
        self.state = Some(state);
        self.persist().await;
    }

    fn refuse(&self, conn: ConnectionId, reason: &str) {
        log::debug!("[room {}] refused C{}: {}", self.code, conn, reason);
        self.table.unicast(conn, &ServerMessage::error(reason));
    }

    fn view(&self) -> RoomView {
        RoomView {
            code: self.code.to_string(),
            players: self.roster.infos(),
            game_started: self.started,
            host_id: self.roster.host().cloned(),
        }
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================
impl Room {
    async fn persist(&self) {
        let text = match serde_json::to_string(&self.record()) {
            Ok(text) => text,
            Err(e) => return log::error!("[room {}] encode record: {}", self.code, e),
        };
        if let Err(e) = self.storage.put(&self.code, ROOM_KEY, text).await {
            log::error!("[room {}] persist: {}", self.code, e);
        }
    }
    async fn discard(&mut self) {
        log::info!("[room {}] empty before start, closing", self.code);
        if let Err(e) = self.storage.delete(&self.code, ROOM_KEY).await {
            log::error!("[room {}] delete: {}", self.code, e);
        }
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    struct Peer {
        conn: ConnectionId,
        rx: UnboundedReceiver<String>,
    }

    impl Peer {
        fn drain(&mut self) -> Vec<ServerMessage> {
            let mut out = Vec::new();
            while let Ok(text) = self.rx.try_recv() {
                out.push(ServerMessage::decode(&text).unwrap());
            }
            out
        }
        fn last(&mut self) -> ServerMessage {
            self.drain().pop().expect("a message")
        }
    }

    fn room() -> (Room, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let code = RoomCode::try_from("ABC234").unwrap();
        (Room::new(code, storage.clone(), RoomConfig::default()), storage)
    }

    async fn enter(room: &mut Room, conn: ConnectionId, id: &str) -> Peer {
        let (tx, rx) = unbounded_channel();
        let now = Instant::now();
        room.on_join(conn, tx, now);
        room.on_message(conn, &ClientMessage::join(&PlayerId::from(id), id).to_json(), now)
            .await;
        Peer { conn, rx }
    }

    async fn send(room: &mut Room, peer: &Peer, msg: ClientMessage) {
        room.on_message(peer.conn, &msg.to_json(), Instant::now()).await;
    }

    async fn started() -> (Room, Arc<MemoryStorage>, Peer, Peer, u64) {
        let (mut room, storage) = room();
        let mut ann = enter(&mut room, 1, "ann").await;
        let mut bo = enter(&mut room, 2, "bo").await;
        send(&mut room, &ann, ClientMessage::StartGame).await;
        let seed = match ann.last() {
            ServerMessage::GameStarted { seed, .. } => seed,
            other => panic!("expected game_started, got {:?}", other),
        };
        assert!(matches!(bo.last(), ServerMessage::GameStarted { seed: s, .. } if s == seed));
        (room, storage, ann, bo, seed)
    }

    fn opening(seed: u64) -> GameState {
        let entrants = [Entrant::new("ann", "ann"), Entrant::new("bo", "bo")];
        GameState::new(&entrants, seed, &Standard).unwrap()
    }

    #[tokio::test]
    async fn first_joiner_hosts_and_others_hear_about_joins() {
        let (mut room, _) = room();
        let mut ann = enter(&mut room, 1, "ann").await;
        assert!(matches!(
            ann.last(),
            ServerMessage::RoomState { ref host_id, ref players, .. }
                if host_id.as_ref().map(|h| h.as_str()) == Some("ann") && players.len() == 1
        ));
        let mut bo = enter(&mut room, 2, "bo").await;
        assert!(matches!(bo.last(), ServerMessage::RoomState { ref players, .. } if players.len() == 2));
        assert!(matches!(ann.last(), ServerMessage::PlayerJoined { ref players, .. } if players.len() == 2));
    }

    #[tokio::test]
    async fn only_the_host_starts_and_needs_company() {
        let (mut room, _) = room();
        let mut ann = enter(&mut room, 1, "ann").await;
        send(&mut room, &ann, ClientMessage::StartGame).await;
        assert!(matches!(ann.last(), ServerMessage::Error { .. }));
        let mut bo = enter(&mut room, 2, "bo").await;
        bo.drain();
        send(&mut room, &bo, ClientMessage::StartGame).await;
        assert!(matches!(bo.last(), ServerMessage::Error { .. }));
        assert!(!room.is_started());
        send(&mut room, &ann, ClientMessage::StartGame).await;
        assert!(room.is_started());
    }

    #[tokio::test]
    async fn full_or_started_rooms_refuse_newcomers() {
        let (mut room, _) = room();
        for (conn, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            enter(&mut room, conn as ConnectionId, id).await;
        }
        let mut late = enter(&mut room, 9, "f").await;
        assert!(matches!(late.last(), ServerMessage::Error { ref message } if message.contains("full")));
        assert_eq!(room.roster().len(), MAX_PLAYERS);

        let (mut room, _, _, _, _) = started().await;
        let mut cy = enter(&mut room, 3, "cy").await;
        assert!(matches!(cy.last(), ServerMessage::Error { ref message } if message.contains("started")));
    }

    #[tokio::test]
    async fn malformed_frames_answer_the_sender_only() {
        let (mut room, _) = room();
        let mut ann = enter(&mut room, 1, "ann").await;
        let mut bo = enter(&mut room, 2, "bo").await;
        ann.drain();
        bo.drain();
        room.on_message(bo.conn, "{not json", Instant::now()).await;
        assert!(matches!(bo.last(), ServerMessage::Error { .. }));
        assert!(ann.drain().is_empty());
    }

    #[tokio::test]
    async fn actions_are_relayed_to_everyone() {
        let (mut room, _, mut ann, mut bo, _) = started().await;
        let action = Action::RollForFirst { roll: 5 };
        send(
            &mut room,
            &bo,
            ClientMessage::game_action(&PlayerId::from("bo"), action.clone()),
        )
        .await;
        let relayed = ServerMessage::GameAction {
            action: action.clone(),
            player_id: PlayerId::from("bo"),
        };
        assert_eq!(ann.last(), relayed);
        assert_eq!(bo.last(), relayed);
        send(
            &mut room,
            &bo,
            ClientMessage::game_action(&PlayerId::from("ann"), action),
        )
        .await;
        assert!(matches!(bo.last(), ServerMessage::Error { .. }));
        assert!(ann.drain().is_empty());
    }

    #[tokio::test]
    async fn snapshots_are_host_only_and_never_regress() {
        let (mut room, storage, mut ann, mut bo, seed) = started().await;
        let mut newer = opening(seed);
        newer.set_version(4);
        let mut older = opening(seed);
        older.set_version(3);

        send(&mut room, &bo, ClientMessage::SyncState { state: newer.clone() }).await;
        assert!(matches!(bo.last(), ServerMessage::Error { .. }));
        assert!(room.state().is_none());

        send(&mut room, &ann, ClientMessage::SyncState { state: newer.clone() }).await;
        assert!(matches!(
            bo.last(),
            ServerMessage::StateSync { ref state, ref host_id, .. }
                if state.version() == 4 && host_id.as_str() == "ann"
        ));
        assert!(ann.drain().is_empty());

        send(&mut room, &ann, ClientMessage::SyncState { state: older }).await;
        assert!(bo.drain().is_empty());
        assert_eq!(room.state().map(|s| s.version()), Some(4));

        let code = room.code().clone();
        let stored = storage.get(&code, ROOM_KEY).await.unwrap().unwrap();
        let record = serde_json::from_str::<RoomRecord>(&stored).unwrap();
        assert!(record.game_started);
        assert_eq!(record.game_state, Some(newer));
    }

    #[tokio::test]
    async fn midgame_disconnect_keeps_the_seat_and_moves_the_host() {
        let (mut room, storage, ann, mut bo, seed) = started().await;
        let mut state = opening(seed);
        state.set_version(2);
        send(&mut room, &ann, ClientMessage::SyncState { state: state.clone() }).await;
        bo.drain();

        room.on_leave(ann.conn).await;
        match bo.last() {
            ServerMessage::PlayerLeft {
                player_id,
                players,
                host_id,
                game_started,
                player_disconnected,
            } => {
                assert_eq!(player_id.as_str(), "ann");
                assert_eq!(players.len(), 2);
                assert!(!players[0].connected);
                assert_eq!(host_id.as_ref().map(|h| h.as_str()), Some("bo"));
                assert!(game_started);
                assert_eq!(player_disconnected, Some(true));
            }
            other => panic!("expected player_left, got {:?}", other),
        }
        assert_eq!(room.state(), Some(&state));
        let ann_id = PlayerId::from("ann");
        assert!(room.state().unwrap().player(&ann_id).is_some());
        let stored = storage.get(room.code(), ROOM_KEY).await.unwrap().unwrap();
        let record = serde_json::from_str::<RoomRecord>(&stored).unwrap();
        assert_eq!(record.host_id.as_ref().map(|h| h.as_str()), Some("bo"));
        assert!(!room.is_closed());
    }

    #[tokio::test]
    async fn rejoin_gets_the_stored_snapshot() {
        let (mut room, _, ann, mut bo, seed) = started().await;
        let mut state = opening(seed);
        state.set_version(6);
        send(&mut room, &ann, ClientMessage::SyncState { state: state.clone() }).await;
        room.on_leave(bo.conn).await;
        bo.drain();
        let mut back = enter(&mut room, 8, "bo").await;
        match back.last() {
            ServerMessage::Rejoined { room: view, game_state } => {
                assert_eq!(view.code, "ABC234");
                assert!(view.game_started);
                assert!(view.players.iter().all(|p| p.connected));
                assert_eq!(game_state, Some(state));
            }
            other => panic!("expected rejoined, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pregame_leave_frees_the_seat_and_empty_room_closes() {
        let (mut room, storage) = room();
        let ann = enter(&mut room, 1, "ann").await;
        let mut bo = enter(&mut room, 2, "bo").await;
        bo.drain();
        room.on_leave(ann.conn).await;
        assert!(matches!(
            bo.last(),
            ServerMessage::PlayerLeft { player_disconnected: None, ref host_id, ref players, .. }
                if players.len() == 1 && host_id.as_ref().map(|h| h.as_str()) == Some("bo")
        ));
        room.on_leave(bo.conn).await;
        assert!(room.is_closed());
        assert_eq!(storage.get(room.code(), ROOM_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn quiet_connections_are_swept() {
        let (mut room, _) = room();
        let mut ann = enter(&mut room, 1, "ann").await;
        let _bo = enter(&mut room, 2, "bo").await;
        ann.drain();
        let later = Instant::now() + Duration::from_secs(40);
        room.on_message(ann.conn, &ClientMessage::Ping.to_json(), later).await;
        assert_eq!(ann.last(), ServerMessage::Pong);
        room.sweep(later + Duration::from_secs(10)).await;
        assert_eq!(room.roster().len(), 1);
        assert!(room.roster().get(&PlayerId::from("ann")).is_some());
        assert!(matches!(
            ann.last(),
            ServerMessage::PlayerLeft { ref player_id, .. } if player_id.as_str() == "bo"
        ));
    }

    #[tokio::test]
    async fn abandoned_game_closes_but_stays_on_file() {
        let (mut room, storage, ann, bo, _) = started().await;
        room.on_leave(ann.conn).await;
        room.on_leave(bo.conn).await;
        assert!(!room.is_closed());
        room.sweep(Instant::now() + Duration::from_secs(60)).await;
        assert!(room.is_closed());
        assert!(storage.get(room.code(), ROOM_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn restore_brings_back_a_started_game() {
        let (room, storage, _, _, _) = started().await;
        let code = room.code().clone();
        drop(room);
        let restored = Room::restore(code, storage, RoomConfig::default()).await.unwrap();
        assert!(restored.is_started());
        assert_eq!(restored.roster().len(), 2);
        assert!(restored.roster().infos().iter().all(|p| !p.connected));
        assert_eq!(restored.state(), None);
    }
}
