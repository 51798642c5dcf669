use super::*;
use crate::sync::*;
use std::collections::BTreeMap;
use tokio::sync::mpsc::UnboundedSender;

/// Live connections attached to a room and their outbound queues.
///
/// Separates socket presence from roster membership: a connection sits at
/// the table as soon as it opens, before it has said who it is.
#[derive(Debug, Default)]
pub struct Table {
    senders: BTreeMap<ConnectionId, UnboundedSender<String>>,
}

impl Table {
    pub fn sit(&mut self, conn: ConnectionId, sender: UnboundedSender<String>) {
        self.senders.insert(conn, sender);
    }
    pub fn stand(&mut self, conn: ConnectionId) -> bool {
        self.senders.remove(&conn).is_some()
    }
    pub fn is_seated(&self, conn: ConnectionId) -> bool {
        self.senders.contains_key(&conn)
    }
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.senders.keys().copied()
    }
    /// Sends a message to one connection.
    pub fn unicast(&self, conn: ConnectionId, msg: &ServerMessage) {
        log::trace!("[table] unicast to C{}: {:?}", conn, msg);
        match self.senders.get(&conn).map(|inbox| inbox.send(msg.to_json())) {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("[table] unicast to C{} failed: {:?}", conn, e),
            None => log::warn!("[table] unicast to C{}: no such connection", conn),
        }
    }
    /// Sends a message to every connection.
    pub fn broadcast(&self, msg: &ServerMessage) {
        self.broadcast_except(None::<ConnectionId>, msg);
    }
    /// Sends a message to every connection but `skip`.
    pub fn broadcast_except(&self, skip: impl Into<Option<ConnectionId>>, msg: &ServerMessage) {
        let skip = skip.into();
        let json = msg.to_json();
        log::trace!("[table] broadcast: {}", json);
        self.senders
            .iter()
            .filter(|(conn, _)| Some(**conn) != skip)
            .for_each(|(conn, inbox)| {
                if let Err(e) = inbox.send(json.clone()) {
                    log::warn!("[table] broadcast to C{} failed: {:?}", conn, e)
                }
            });
    }
}
