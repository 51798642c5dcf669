use super::*;
use crate::board::*;
use crate::engine::*;
use crate::Version;
use tokio::time::Instant;

/// Something a replica wants its owner (a UI, a bot, a test) to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Roster(Vec<PlayerInfo>),
    Started,
    /// A peer's action changed the local state.
    Applied(PlayerId),
    /// An authoritative snapshot replaced the local state.
    Resynced,
    Promoted,
    Left { player: PlayerId, disconnected: bool },
    Failed(String),
}

/// One participant's optimistic copy of the game.
///
/// Local actions are reduced immediately and broadcast; peers' actions are
/// reduced on arrival. Divergence is bounded by host snapshots, accepted
/// last-writer-wins on `stateVersion`. This is eventual consistency, not
/// consensus: availability wins over agreement, and the host breaks ties.
///
/// Pure state machine: time comes in as an argument and messages go out as
/// return values, so the same replica runs under a session or in a test.
pub struct Replica {
    me: PlayerId,
    reducer: Reducer<'static>,
    state: Option<GameState>,
    expected: Version,
    host: Option<PlayerId>,
    roster: Vec<PlayerInfo>,
    debouncer: Debouncer,
}

impl Replica {
    pub fn new(me: PlayerId, config: SyncConfig) -> Self {
        Self {
            me,
            reducer: Reducer::default(),
            state: None,
            expected: 0,
            host: None,
            roster: Vec::new(),
            debouncer: Debouncer::new(config.debounce),
        }
    }
    pub fn me(&self) -> &PlayerId {
        &self.me
    }
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }
    pub fn expected_version(&self) -> Version {
        self.expected
    }
    pub fn host(&self) -> Option<&PlayerId> {
        self.host.as_ref()
    }
    pub fn roster(&self) -> &[PlayerInfo] {
        &self.roster
    }
    pub fn is_host(&self) -> bool {
        self.host.as_ref() == Some(&self.me)
    }
    /// When the next snapshot falls due, if one is pending.
    pub fn snapshot_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Applies a local action optimistically.
    ///
    /// Returns the message to broadcast, or nothing when the reducer
    /// rejected the action.
    pub fn dispatch(&mut self, action: Action, now: Instant) -> Option<ClientMessage> {
        let me = self.me.clone();
        match self.advance(&me, &action, now) {
            true => Some(ClientMessage::game_action(&me, action)),
            false => None,
        }
    }

    /// Folds one inbound message into the replica.
    pub fn receive(&mut self, msg: ServerMessage, now: Instant) -> Vec<Notice> {
        match msg {
            ServerMessage::GameAction { player_id, .. } if player_id == self.me => Vec::new(),
            ServerMessage::GameAction { action, player_id } => {
                match self.advance(&player_id, &action, now) {
                    true => vec![Notice::Applied(player_id)],
                    false => Vec::new(),
                }
            }
            ServerMessage::StateSync {
                state,
                players,
                host_id,
            } => {
                self.roster = players;
                match self.accepts(&state, &host_id) {
                    true => vec![Notice::Resynced],
                    false => Vec::new(),
                }
            }
            ServerMessage::RoomState {
                players, host_id, ..
            }
            | ServerMessage::PlayerJoined {
                players, host_id, ..
            } => self.seat(players, host_id, now),
            ServerMessage::PlayerLeft {
                player_id,
                players,
                host_id,
                player_disconnected,
                ..
            } => {
                let mut notices = self.seat(players, host_id, now);
                notices.push(Notice::Left {
                    player: player_id,
                    disconnected: player_disconnected.unwrap_or(false),
                });
                notices
            }
            ServerMessage::Rejoined { room, game_state } => {
                let mut notices = self.seat(room.players, room.host_id, now);
                if let Some(state) = game_state {
                    if self.state.as_ref().is_none_or(|s| state.version() >= s.version()) {
                        log::debug!("[replica {}] rejoined at v{}", self.me, state.version());
                        self.expected = state.version();
                        self.state = Some(state);
                        notices.push(Notice::Resynced);
                    }
                }
                notices
            }
            ServerMessage::GameStarted { players, seed } => {
                let entrants = players
                    .iter()
                    .map(|p| Entrant {
                        id: p.id.clone(),
                        name: p.name.clone(),
                    })
                    .collect::<Vec<_>>();
                match GameState::new(&entrants, seed, self.reducer.catalog()) {
                    Ok(state) => {
                        log::info!("[replica {}] game started with seed {}", self.me, seed);
                        self.expected = state.version();
                        self.state = Some(state);
                        let mut notices = self.seat(players, self.host.clone(), now);
                        notices.push(Notice::Started);
                        notices
                    }
                    Err(e) => vec![Notice::Failed(e.to_string())],
                }
            }
            ServerMessage::Error { message } => {
                log::warn!("[replica {}] server error: {}", self.me, message);
                vec![Notice::Failed(message)]
            }
            ServerMessage::Pong => Vec::new(),
        }
    }

    /// The host's periodic authoritative snapshot, once the debounce window
    /// has been quiet.
    pub fn poll_snapshot(&mut self, now: Instant) -> Option<ClientMessage> {
        if !self.is_host() {
            self.debouncer.flush();
            return None;
        }
        match self.debouncer.poll(now) {
            true => self.state.clone().map(|state| ClientMessage::SyncState { state }),
            false => None,
        }
    }

    /// Runs the reducer and, on change, moves the version forward.
    fn advance(&mut self, actor: &PlayerId, action: &Action, now: Instant) -> bool {
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        let Transition { mut state, changed } = self.reducer.reduce(state, actor, action);
        if changed {
            let version = state.version() + 1;
            state.set_version(version);
            self.expected = version;
            self.state = Some(state);
            if self.is_host() {
                self.debouncer.touch(now);
            }
        }
        changed
    }

    /// Last-writer-wins on the version, from the current host only.
    fn accepts(&mut self, incoming: &GameState, sender: &PlayerId) -> bool {
        if self.host.as_ref() != Some(sender) {
            log::warn!("[replica {}] snapshot from non-host {} dropped", self.me, sender);
            return false;
        }
        if incoming.version() < self.expected {
            log::debug!(
                "[replica {}] stale snapshot v{} < v{} dropped",
                self.me,
                incoming.version(),
                self.expected
            );
            return false;
        }
        if self.state.as_ref() == Some(incoming) {
            return false;
        }
        if incoming.version() == self.expected && self.state.is_some() {
            log::debug!(
                "[replica {}] host snapshot overrides divergent v{}",
                self.me,
                self.expected
            );
        }
        self.expected = incoming.version();
        self.state = Some(incoming.clone());
        true
    }

    /// Adopts a new roster and host, scheduling a snapshot on promotion.
    fn seat(&mut self, players: Vec<PlayerInfo>, host: Option<PlayerId>, now: Instant) -> Vec<Notice> {
        let promoted = !self.is_host() && host.as_ref() == Some(&self.me);
        self.host = host;
        self.roster = players.clone();
        let mut notices = vec![Notice::Roster(players)];
        if promoted {
            log::info!("[replica {}] promoted to host", self.me);
            if self.state.is_some() {
                self.debouncer.arm(now);
            }
            notices.push(Notice::Promoted);
        }
        notices
    }
}
