use super::*;
use crate::gameroom::*;
use crate::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;

/// Attempts at drawing an unused room code before giving up.
const CODE_ATTEMPTS: usize = 16;

/// Manages active rooms and their lifecycles.
///
/// A room leaves the registry when its actor stops. A started game that
/// was closed for idleness comes back from storage the next time someone
/// attaches to its code.
pub struct Casino {
    rooms: Arc<RwLock<HashMap<RoomCode, RoomHandle>>>,
    count: AtomicU64,
    storage: Arc<dyn Storage>,
    config: RoomConfig,
}

impl Default for Casino {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStorage::default()), RoomConfig::default())
    }
}

impl Casino {
    pub fn new(storage: Arc<dyn Storage>, config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            count: AtomicU64::new(1),
            storage,
            config,
        }
    }

    /// Opens a room under a fresh code and spawns its actor.
    pub async fn open(&self) -> anyhow::Result<RoomCode> {
        let ref mut rooms = self.rooms.write().await;
        for _ in 0..CODE_ATTEMPTS {
            let code = RoomCode::random();
            if rooms.contains_key(&code) || self.storage.get(&code, ROOM_KEY).await?.is_some() {
                continue;
            }
            let room = Room::new(code.clone(), self.storage.clone(), self.config);
            rooms.insert(code.clone(), self.launch(room));
            log::info!("[casino] opened room {}", code);
            return Ok(code);
        }
        Err(anyhow::anyhow!("no free room code after {} attempts", CODE_ATTEMPTS))
    }

    /// Removes a room from the registry and stops its actor, which drops
    /// every attached connection. A started game stays in storage.
    pub async fn close(&self, code: &RoomCode) -> anyhow::Result<()> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| anyhow::anyhow!("room not found"))?;
        let _ = handle.inbox.send(Signal::Close);
        log::info!("[casino] closed room {}", code);
        Ok(())
    }

    pub async fn is_open(&self, code: &RoomCode) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    /// The live room for a code, reopening it from storage if needed.
    pub async fn handle(&self, code: &RoomCode) -> anyhow::Result<RoomHandle> {
        if let Some(handle) = self.live(code).await {
            return Ok(handle);
        }
        let ref mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(code).filter(|h| !h.inbox.is_closed()) {
            return Ok(handle.clone());
        }
        if self.storage.get(code, ROOM_KEY).await?.is_none() {
            return Err(anyhow::anyhow!("room not found"));
        }
        let room = Room::restore(code.clone(), self.storage.clone(), self.config).await?;
        let handle = self.launch(room);
        rooms.insert(code.clone(), handle.clone());
        log::info!("[casino] reopened room {}", code);
        Ok(handle)
    }

    /// Attaches a new connection to a room.
    pub async fn attach(&self, code: &RoomCode) -> anyhow::Result<Link> {
        let conn = self.count.fetch_add(1, Ordering::Relaxed);
        self.handle(code).await?.attach(conn)
    }

    /// Spawns WebSocket bridge between client and room channels.
    pub async fn bridge(
        &self,
        code: &RoomCode,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        use futures::StreamExt;
        let mut link = self
            .attach(code)
            .await
            .inspect(|l| log::info!("[casino] C{} connected to room {}", l.conn(), code))?;
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = link.recv() => match msg {
                        Some(json) => if session.text(json).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => if link.send(text.to_string()).is_err() { break 'sesh },
                        Some(Ok(actix_ws::Message::Ping(bytes))) => if session.pong(&bytes).await.is_err() { break 'sesh },
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            log::info!("[casino] C{} disconnected from room {}", link.conn(), link.code());
            let _ = session.close(None).await;
        });
        Ok(())
    }
}

impl Casino {
    async fn live(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms
            .read()
            .await
            .get(code)
            .filter(|h| !h.inbox.is_closed())
            .cloned()
    }

    /// Spawns the room actor and a reaper that unregisters it on exit.
    fn launch(&self, room: Room) -> RoomHandle {
        let code = room.code().clone();
        let (inbox, done) = room.spawn();
        let rooms = self.rooms.clone();
        let mine = inbox.downgrade();
        tokio::spawn(async move {
            match done.await {
                Ok(code) => {
                    let ref mut rooms = rooms.write().await;
                    let ours = mine.upgrade();
                    if rooms
                        .get(&code)
                        .zip(ours.as_ref())
                        .is_some_and(|(h, ours)| h.inbox.same_channel(ours))
                    {
                        rooms.remove(&code);
                        log::info!("[casino] room {} finished", code);
                    }
                }
                Err(e) => log::error!("[casino] room task failed: {}", e),
            }
        });
        RoomHandle { code, inbox }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::*;
    use crate::engine::*;
    use crate::sync::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn until<F>(handle: &mut SessionHandle, mut want: F)
    where
        F: FnMut(&Notice) -> bool,
    {
        loop {
            match timeout(Duration::from_secs(2), handle.notices.recv()).await {
                Ok(Some(ref notice)) if want(notice) => return,
                Ok(Some(_)) => continue,
                other => panic!("notice never arrived: {:?}", other),
            }
        }
    }

    fn join(casino: &Arc<Casino>, code: &RoomCode, id: &str) -> SessionHandle {
        let transport = LocalTransport::new(casino.clone(), code.clone());
        Session::spawn(transport, PlayerId::from(id), id, SyncConfig::default())
    }

    #[tokio::test]
    async fn unknown_codes_are_refused() {
        let casino = Casino::default();
        let code = RoomCode::try_from("QQQQQQ").unwrap();
        assert!(casino.attach(&code).await.is_err());
        assert!(casino.close(&code).await.is_err());
    }

    #[tokio::test]
    async fn opened_rooms_get_distinct_codes() {
        let casino = Casino::default();
        let a = casino.open().await.unwrap();
        let b = casino.open().await.unwrap();
        assert_ne!(a, b);
        assert!(casino.is_open(&a).await);
        casino.close(&a).await.unwrap();
        assert!(!casino.is_open(&a).await);
    }

    #[tokio::test]
    async fn closing_a_room_drops_its_connections() {
        let casino = Casino::default();
        let code = casino.open().await.unwrap();
        let mut link = casino.attach(&code).await.unwrap();
        casino.close(&code).await.unwrap();
        let ended = timeout(Duration::from_secs(2), link.recv())
            .await
            .expect("room stops");
        assert_eq!(ended, None);
        assert!(casino.attach(&code).await.is_err());
    }

    #[tokio::test]
    async fn two_sessions_play_through_a_room() {
        let storage = Arc::new(MemoryStorage::default());
        let casino = Arc::new(Casino::new(storage.clone(), RoomConfig::default()));
        let code = casino.open().await.unwrap();
        let mut ann = join(&casino, &code, "ann");
        until(&mut ann, |n| matches!(n, Notice::Roster(p) if p.len() == 1)).await;
        let mut bo = join(&casino, &code, "bo");
        until(&mut bo, |n| matches!(n, Notice::Roster(p) if p.len() == 2)).await;
        until(&mut ann, |n| matches!(n, Notice::Roster(p) if p.len() == 2)).await;

        assert!(ann.start_game());
        until(&mut ann, |n| *n == Notice::Started).await;
        until(&mut bo, |n| *n == Notice::Started).await;

        assert!(ann.act(Action::RollForFirst { roll: 6 }));
        until(&mut bo, |n| *n == Notice::Applied(PlayerId::from("ann"))).await;
        assert!(bo.act(Action::RollForFirst { roll: 2 }));
        until(&mut ann, |n| *n == Notice::Applied(PlayerId::from("bo"))).await;

        let snapshot = timeout(Duration::from_secs(2), async {
            loop {
                let stored = storage.get(&code, ROOM_KEY).await.unwrap();
                let record = stored.and_then(|s| serde_json::from_str::<RoomRecord>(&s).ok());
                if let Some(state) = record.and_then(|r| r.game_state).filter(|s| s.version() == 2) {
                    return state;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("host snapshot stored");
        assert_eq!(snapshot.phase(), Phase::Answering);
        assert_eq!(snapshot.first_player_id(), Some(&PlayerId::from("ann")));
    }
}
