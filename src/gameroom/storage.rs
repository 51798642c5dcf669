use super::*;
use crate::board::*;
use crate::engine::*;
use crate::sync::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Everything a room needs to come back after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub players: Vec<PlayerInfo>,
    pub game_started: bool,
    pub game_state: Option<GameState>,
    pub host_id: Option<PlayerId>,
}

/// Durable key-value slots, namespaced per room.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, room: &RoomCode, key: &str) -> anyhow::Result<Option<String>>;
    async fn put(&self, room: &RoomCode, key: &str, value: String) -> anyhow::Result<()>;
    async fn delete(&self, room: &RoomCode, key: &str) -> anyhow::Result<()>;
}

/// Process-local storage; rooms vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<(RoomCode, String), String>>,
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, room: &RoomCode, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .slots
            .read()
            .await
            .get(&(room.clone(), key.to_string()))
            .cloned())
    }
    async fn put(&self, room: &RoomCode, key: &str, value: String) -> anyhow::Result<()> {
        self.slots
            .write()
            .await
            .insert((room.clone(), key.to_string()), value);
        Ok(())
    }
    async fn delete(&self, room: &RoomCode, key: &str) -> anyhow::Result<()> {
        self.slots
            .write()
            .await
            .remove(&(room.clone(), key.to_string()));
        Ok(())
    }
}

/// One JSON file per room and key under a data directory:
/// `<root>/<CODE>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
    fn path(&self, room: &RoomCode, key: &str) -> PathBuf {
        self.root.join(room.as_str()).join(format!("{}.json", key))
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn get(&self, room: &RoomCode, key: &str) -> anyhow::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(room, key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    async fn put(&self, room: &RoomCode, key: &str, value: String) -> anyhow::Result<()> {
        let path = self.path(room, key);
        let dir = self.root.join(room.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, value).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok(())
    }
    async fn delete(&self, room: &RoomCode, key: &str) -> anyhow::Result<()> {
        match tokio::fs::remove_file(self.path(room, key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let _ = tokio::fs::remove_dir(self.root.join(room.as_str())).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ROOM_KEY;

    fn record() -> RoomRecord {
        RoomRecord {
            players: vec![PlayerInfo {
                id: PlayerId::from("ann"),
                name: "Ann".to_string(),
                is_host: true,
                is_ready: true,
                connected: true,
            }],
            game_started: false,
            game_state: None,
            host_id: Some(PlayerId::from("ann")),
        }
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["gameStarted"], false);
        assert_eq!(json["hostId"], "ann");
        assert!(json["gameState"].is_null());
    }

    #[tokio::test]
    async fn memory_slots_are_per_room() {
        let storage = MemoryStorage::default();
        let a = RoomCode::try_from("AAAAAA").unwrap();
        let b = RoomCode::try_from("BBBBBB").unwrap();
        storage.put(&a, ROOM_KEY, "1".to_string()).await.unwrap();
        assert_eq!(storage.get(&a, ROOM_KEY).await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get(&b, ROOM_KEY).await.unwrap(), None);
        storage.delete(&a, ROOM_KEY).await.unwrap();
        assert_eq!(storage.get(&a, ROOM_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn files_survive_a_new_handle() {
        let root = std::env::temp_dir().join(format!("turfwar-{}", rand::random::<u64>()));
        let code = RoomCode::try_from("CDE345").unwrap();
        let json = serde_json::to_string(&record()).unwrap();
        FileStorage::new(&root)
            .put(&code, ROOM_KEY, json.clone())
            .await
            .unwrap();
        let reopened = FileStorage::new(&root);
        let back = reopened.get(&code, ROOM_KEY).await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<RoomRecord>(&back).unwrap(), record());
        reopened.delete(&code, ROOM_KEY).await.unwrap();
        assert_eq!(reopened.get(&code, ROOM_KEY).await.unwrap(), None);
        let _ = std::fs::remove_dir_all(&root);
    }
}
