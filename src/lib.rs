//! Deterministic territorial-control game engine with authoritative multiplayer sync.
//!
//! ## Modules
//!
//! - [`board`]: Zones, players, and the capped resource economy
//! - [`engine`]: Zone control, redeployment rights, powers, phases, and the reducer
//! - [`sync`]: Optimistic replicas, snapshot reconciliation, heartbeat, sessions
//! - [`gameroom`]: Per-room coordinator actor: roster, relay, durable slot
//! - [`hosting`]: Room registry and WebSocket bridge
pub mod board;
pub mod engine;
pub mod sync;

#[cfg(feature = "server")]
pub mod gameroom;
#[cfg(feature = "server")]
pub mod hosting;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Count of a single resource type held by a player.
pub type Amount = u8;
/// Battalions held in reserve or evicted from the board.
pub type Battalions = u8;
/// Level on an ideology track.
pub type Level = u8;
/// Monotonic replica version of a game state.
pub type Version = u64;

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Fewest participants that can start a game.
pub const MIN_PLAYERS: usize = 2;
/// Most participants a room will seat.
pub const MAX_PLAYERS: usize = 5;
/// Participant count from which starting resources are drafted.
pub const DRAFT_PLAYERS: usize = 3;
/// Starting battalion reserve indexed by player count.
pub const STARTING_BATTALIONS: [Battalions; MAX_PLAYERS + 1] = [0, 0, 16, 13, 11, 9];

// ============================================================================
// ECONOMY
// ============================================================================
/// Cap on the sum of all four resource types held by one player.
pub const MAX_RESOURCES: Amount = 12;
/// Bonus granted for the resource type picked during the draft.
pub const DRAFT_BONUS: Amount = 2;
/// Highest level an ideology track can reach.
pub const TRACK_MAX: Level = 6;
/// Track level that switches on the passive trickle.
pub const PASSIVE_LEVEL: Level = 2;
/// Track levels that unlock the minor and major active powers.
pub const MINOR_POWER_LEVEL: Level = 3;
pub const MAJOR_POWER_LEVEL: Level = 5;

// ============================================================================
// PER-TURN CAPS
// ============================================================================
/// Uses of any single active power per turn.
pub const POWER_USE_LIMIT: u8 = 2;
/// Shop purchases per turn.
pub const PURCHASE_LIMIT: u8 = 1;
/// Redeployment moves per turn, before elite bonuses.
pub const REDEPLOY_LIMIT: u8 = 2;
/// Face-up shop cards.
pub const SHOP_ROW: usize = 3;
/// Faces on the die rolled for first player.
pub const DIE_FACES: u8 = 6;

// ============================================================================
// ROOMS AND SYNC
// ============================================================================
/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;
/// Unambiguous room code alphabet (no 0/O, 1/I).
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Interval between client pings (milliseconds).
pub const HEARTBEAT_INTERVAL_MS: u64 = 15_000;
/// Consecutive unanswered pings before a reconnect.
pub const HEARTBEAT_MISSES: u32 = 3;
/// Quiet period before the host flushes a snapshot (milliseconds).
pub const SNAPSHOT_DEBOUNCE_MS: u64 = 150;
/// First reconnect delay and ceiling (milliseconds).
pub const BACKOFF_BASE_MS: u64 = 500;
pub const BACKOFF_CAP_MS: u64 = 10_000;
/// Durable key holding a room record.
pub const ROOM_KEY: &str = "room";

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
