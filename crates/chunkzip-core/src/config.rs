use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::planner::DEFAULT_CHUNK_SIZE;
use crate::walker::WalkLimits;

/// Default worker base URL used by the download client.
pub const DEFAULT_WORKER_URL: &str = "http://localhost:8787";

/// Environment variable that overrides the configured worker URL.
pub const WORKER_URL_ENV: &str = "WORKER_URL";

/// Worker-side settings (`[worker]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Address the HTTP surface binds to.
    pub listen_addr: String,
    /// Package root URL; `{slug}` is replaced with the package slug.
    pub source_url: String,
    /// Files per chunk at discovery time.
    pub chunk_size: usize,
    /// Deepest directory level the walker descends to.
    pub max_depth: usize,
    /// Maximum listing entries visited in one walk.
    pub max_entries: usize,
    /// Parallel file fetches within one chunk call.
    pub fetch_concurrency: usize,
    /// SQLite file for the chunk store (None = XDG state dir).
    pub store_path: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8787".to_string(),
            source_url: "https://cdn.jsdelivr.net/wp/plugins/{slug}/trunk".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_depth: 32,
            max_entries: 10_000,
            fetch_concurrency: 4,
            store_path: None,
            connect_timeout_secs: 15,
            timeout_secs: 120,
        }
    }
}

impl WorkerConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_depth: self.max_depth,
            max_entries: self.max_entries,
        }
    }
}

/// Download-client settings (`[client]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub worker_url: String,
    /// Pause between chunk calls, in milliseconds.
    pub chunk_delay_ms: u64,
    /// Directory the finished archive is written to.
    pub download_dir: PathBuf,
    /// Per-request timeout for worker calls; finalize can be slow.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            worker_url: DEFAULT_WORKER_URL.to_string(),
            chunk_delay_ms: 100,
            download_dir: PathBuf::from("downloads"),
            timeout_secs: 600,
        }
    }
}

impl ClientConfig {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/chunkzip/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkzipConfig {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkzip")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ChunkzipConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ChunkzipConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ChunkzipConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Picks the worker URL: explicit flag, then `WORKER_URL`, then config.
pub fn resolve_worker_url(flag: Option<&str>, env: Option<&str>, cfg: &ClientConfig) -> String {
    flag.or(env)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(cfg.worker_url.as_str())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ChunkzipConfig::default();
        assert_eq!(cfg.worker.chunk_size, 10);
        assert_eq!(cfg.worker.max_depth, 32);
        assert_eq!(cfg.client.worker_url, "http://localhost:8787");
        assert_eq!(cfg.client.chunk_delay_ms, 100);
        assert_eq!(cfg.client.download_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ChunkzipConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ChunkzipConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.worker.source_url, cfg.worker.source_url);
        assert_eq!(parsed.worker.fetch_concurrency, cfg.worker.fetch_concurrency);
        assert_eq!(parsed.client.timeout_secs, cfg.client.timeout_secs);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let toml = r#"
            [worker]
            chunk_size = 25
            store_path = "/var/lib/chunkzip/chunks.db"

            [client]
            chunk_delay_ms = 0
        "#;
        let cfg: ChunkzipConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.worker.chunk_size, 25);
        assert_eq!(
            cfg.worker.store_path.as_deref(),
            Some(std::path::Path::new("/var/lib/chunkzip/chunks.db"))
        );
        assert_eq!(cfg.worker.max_entries, 10_000);
        assert_eq!(cfg.client.chunk_delay(), Duration::ZERO);
        assert_eq!(cfg.client.worker_url, DEFAULT_WORKER_URL);
    }

    #[test]
    fn empty_file_is_default() {
        let cfg: ChunkzipConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.worker.listen_addr, "127.0.0.1:8787");
    }

    #[test]
    fn worker_url_precedence() {
        let cfg = ClientConfig {
            worker_url: "http://cfg:1".into(),
            ..Default::default()
        };
        assert_eq!(
            resolve_worker_url(Some("http://flag:2/"), Some("http://env:3"), &cfg),
            "http://flag:2"
        );
        assert_eq!(
            resolve_worker_url(None, Some("http://env:3"), &cfg),
            "http://env:3"
        );
        assert_eq!(resolve_worker_url(None, Some("  "), &cfg), "http://cfg:1");
        assert_eq!(resolve_worker_url(None, None, &cfg), "http://cfg:1");
    }

    #[test]
    fn walk_limits_follow_config() {
        let cfg = WorkerConfig {
            max_depth: 3,
            max_entries: 50,
            ..Default::default()
        };
        let limits = cfg.walk_limits();
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.max_entries, 50);
    }
}
