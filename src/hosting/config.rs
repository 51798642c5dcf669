use std::path::PathBuf;

/// Command-line and environment configuration for the hosting server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "hosting", about = "Room coordinator and WebSocket relay")]
pub struct HostingConfig {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind: String,
    /// Directory for room records; rooms live in memory when unset.
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    #[test]
    fn flags_override_defaults() {
        let config = HostingConfig::try_parse_from([
            "hosting",
            "--bind",
            "0.0.0.0:9000",
            "--data-dir",
            "/tmp/rooms",
            "--workers",
            "2",
        ])
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/rooms")));
        assert_eq!(config.workers, 2);
    }
}
