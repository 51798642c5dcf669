use crate::board::*;
use crate::sync::*;

/// Identifies one live socket (or in-process link) attached to a room.
pub type ConnectionId = u64;

/// A participant as the coordinator tracks them.
///
/// `connection` is `None` while the participant is away mid-game; the seat
/// survives so they can rejoin under the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub connection: Option<ConnectionId>,
    pub is_host: bool,
    pub is_ready: bool,
}

impl RosterEntry {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

impl From<&RosterEntry> for PlayerInfo {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            is_host: entry.is_host,
            is_ready: entry.is_ready,
            connected: entry.is_connected(),
        }
    }
}

impl From<&PlayerInfo> for RosterEntry {
    /// Restored entries start disconnected; the socket is long gone.
    fn from(info: &PlayerInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            connection: None,
            is_host: info.is_host,
            is_ready: info.is_ready,
        }
    }
}

/// Ordered participants of a room, in join order.
///
/// Exactly one entry carries `is_host` whenever the roster is non-empty.
#[derive(Debug, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn get(&self, id: &PlayerId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
    pub fn by_connection(&self, conn: ConnectionId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.connection == Some(conn))
    }
    pub fn host(&self) -> Option<&PlayerId> {
        self.entries.iter().find(|e| e.is_host).map(|e| &e.id)
    }
    pub fn infos(&self) -> Vec<PlayerInfo> {
        self.entries.iter().map(PlayerInfo::from).collect()
    }

    /// Seats a new participant; the first one in hosts.
    pub fn admit(&mut self, id: PlayerId, name: String, conn: ConnectionId) {
        let is_host = self.entries.is_empty();
        self.entries.push(RosterEntry {
            id,
            name,
            connection: Some(conn),
            is_host,
            is_ready: true,
        });
        self.elect();
    }
    /// Points an existing seat at a new connection, returning the old one.
    pub fn reattach(&mut self, id: &PlayerId, conn: ConnectionId) -> Option<ConnectionId> {
        let prior = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .and_then(|e| e.connection.replace(conn));
        self.elect();
        prior
    }
    /// Clears the connection but keeps the seat.
    pub fn detach(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let id = self
            .entries
            .iter_mut()
            .find(|e| e.connection == Some(conn))
            .map(|e| {
                e.connection = None;
                e.id.clone()
            });
        self.elect();
        id
    }
    /// Drops the seat entirely.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let index = self.entries.iter().position(|e| e.connection == Some(conn))?;
        let entry = self.entries.remove(index);
        self.elect();
        Some(entry.id)
    }
    pub fn restore(&mut self, players: &[PlayerInfo]) {
        self.entries = players.iter().map(RosterEntry::from).collect();
        self.elect();
    }

    /// Keeps the host connected when anyone is.
    ///
    /// A connected host stays put. Otherwise the role moves to the first
    /// connected entry in join order; with nobody connected the old host
    /// keeps it.
    fn elect(&mut self) {
        let current = self.entries.iter().position(|e| e.is_host);
        let keep = current.filter(|i| self.entries[*i].is_connected());
        let next = keep
            .or_else(|| self.entries.iter().position(|e| e.is_connected()))
            .or(current)
            .or(if self.entries.is_empty() { None } else { Some(0) });
        self.entries
            .iter_mut()
            .enumerate()
            .for_each(|(i, e)| e.is_host = Some(i) == next);
    }
}
