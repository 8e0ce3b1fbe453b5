use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{Scalar, Symbol, SymbolCode, TimePointSec};

/* ------------------------- Reward schedule constants -------------------------
   - 5-minute buckets measured from 2020-01-01T00:00:00Z
   - the first 3 seconds of each bucket are "lucky"
   - normal branch: 20% discount for markets ranked 1..=20
   - 80% of the discounted fee value is paid out
----------------------------------------------------------------------------- */
pub const DEFAULT_EPOCH_ANCHOR: u64 = 1_577_836_800;
pub const DEFAULT_BUCKET_SECS: u64 = 300;
pub const DEFAULT_LUCKY_WINDOW_SECS: u64 = 3;
pub const DEFAULT_MAX_RANK: u64 = 20;
pub const DEFAULT_REFERENCE_PAIR_ID: u64 = 39;

/// 0.2 at 1e-8 scale
const DEFAULT_NORMAL_DISCOUNT: Scalar = Scalar::from_raw(20_000_000);
/// 0.8 at 1e-8 scale
const DEFAULT_PROTOCOL_SHARE: Scalar = Scalar::from_raw(80_000_000);

// "EOS" and "DFS" packed little-endian.
const EOS_SYMBOL: Symbol = Symbol::new_unchecked(SymbolCode::new_unchecked(0x53_4F_45), 4);
const DFS_SYMBOL: Symbol = Symbol::new_unchecked(SymbolCode::new_unchecked(0x53_46_44), 4);

/// Everything the reward engine needs besides the tables and the clock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewardConfig {
    /// One leg of a trade must be in this symbol to earn anything.
    pub base_symbol: Symbol,
    /// Symbol the reward is paid in.
    pub reward_symbol: Symbol,
    /// base/reward market whose `price0_last` converts fees into rewards.
    pub reference_pair_id: u64,
    pub epoch_anchor: TimePointSec,
    pub bucket_secs: u64,
    pub lucky_window_secs: u64,
    pub normal_discount: Scalar,
    pub protocol_share: Scalar,
    pub max_rank: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_symbol: EOS_SYMBOL,
            reward_symbol: DFS_SYMBOL,
            reference_pair_id: DEFAULT_REFERENCE_PAIR_ID,
            epoch_anchor: TimePointSec::from_secs(DEFAULT_EPOCH_ANCHOR),
            bucket_secs: DEFAULT_BUCKET_SECS,
            lucky_window_secs: DEFAULT_LUCKY_WINDOW_SECS,
            normal_discount: DEFAULT_NORMAL_DISCOUNT,
            protocol_share: DEFAULT_PROTOCOL_SHARE,
            max_rank: DEFAULT_MAX_RANK,
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_secs == 0 {
            return Err(ConfigError::ValidationError(
                "bucket_secs must be positive".into(),
            ));
        }
        if self.lucky_window_secs >= self.bucket_secs {
            return Err(ConfigError::ValidationError(format!(
                "lucky_window_secs ({}) must be shorter than bucket_secs ({})",
                self.lucky_window_secs, self.bucket_secs
            )));
        }
        if self.normal_discount > Scalar::ONE || self.protocol_share > Scalar::ONE {
            return Err(ConfigError::ValidationError(
                "normal_discount and protocol_share must be within [0, 1]".into(),
            ));
        }
        if self.max_rank == 0 {
            return Err(ConfigError::ValidationError(
                "max_rank must be at least 1".into(),
            ));
        }
        if self.base_symbol == self.reward_symbol {
            return Err(ConfigError::ValidationError(format!(
                "base and reward symbol are both {}",
                self.base_symbol
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TablesConfig {
    /// JSON table snapshot loaded by the CLI when `--tables` is not given.
    /// A relative path is taken relative to the config file.
    pub snapshot_path: Option<PathBuf>,
}

impl TablesConfig {
    fn resolve_relative_to(&mut self, config_file: &Path) {
        let Some(dir) = config_file.parent() else {
            return;
        };
        if let Some(path) = self.snapshot_path.as_mut() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub rewards: RewardConfig,
    pub tables: TablesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.rewards.validate()?;
        config.tables.resolve_relative_to(path);
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Defaults, then the TOML file (if any), then `DFS__SECTION__KEY` environment
    /// variables, e.g. `DFS__REWARDS__REFERENCE_PAIR_ID=12`.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = ::config::Config::try_from(&Config::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path.to_path_buf())
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix("DFS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.rewards.validate()?;
        if let Some(path) = path {
            config.tables.resolve_relative_to(path);
        }
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// `<config dir>/dfs-rewards/config.toml`
pub fn get_default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dfs-rewards")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Tests that read `DFS__*` variables must not overlap with tests that set them.
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_default_reward_config() {
        let config = RewardConfig::default();
        assert_eq!(config.base_symbol.to_string(), "4,EOS");
        assert_eq!(config.reward_symbol.to_string(), "4,DFS");
        assert_eq!(config.epoch_anchor.to_string(), "2020-01-01T00:00:00Z");
        assert_eq!(config.normal_discount.to_string(), "0.2");
        assert_eq!(config.protocol_share.to_string(), "0.8");
        assert_eq!(config.max_rank, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_schedules() {
        let mut config = RewardConfig {
            bucket_secs: 0,
            ..RewardConfig::default()
        };
        assert!(config.validate().is_err());

        config.bucket_secs = 300;
        config.lucky_window_secs = 300;
        assert!(config.validate().is_err());

        config.lucky_window_secs = 3;
        config.normal_discount = "1.5".parse().unwrap();
        assert!(config.validate().is_err());

        config.normal_discount = Scalar::ONE;
        config.reward_symbol = config.base_symbol;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() -> Result<(), ConfigError> {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = Config::default();
        config.to_file(&config_path)?;

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(config, loaded_config);

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<(), ConfigError> {
        let _env = ENV_LOCK.lock();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[rewards]\nreference_pair_id = 12\nnormal_discount = \"0.25\"\n",
        )
        .unwrap();

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.rewards.reference_pair_id, 12);
        assert_eq!(config.rewards.normal_discount.raw(), 25_000_000);
        assert_eq!(config.rewards.bucket_secs, DEFAULT_BUCKET_SECS);
        assert_eq!(config.logging.level, "info");

        let layered = Config::load_layered(Some(&config_path))?;
        assert_eq!(layered.rewards.reference_pair_id, 12);
        assert_eq!(layered.rewards.base_symbol.to_string(), "4,EOS");

        Ok(())
    }

    #[test]
    fn test_env_overrides_file_and_defaults() -> Result<(), ConfigError> {
        let _env = ENV_LOCK.lock();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[rewards]\nreference_pair_id = 12\nnormal_discount = \"0.3\"\n",
        )
        .unwrap();

        std::env::set_var("DFS__REWARDS__REFERENCE_PAIR_ID", "77");
        std::env::set_var("DFS__REWARDS__NORMAL_DISCOUNT", "0.25");
        let over_file = Config::load_layered(Some(&config_path));
        let over_defaults = Config::load_layered(None);
        std::env::remove_var("DFS__REWARDS__REFERENCE_PAIR_ID");
        std::env::remove_var("DFS__REWARDS__NORMAL_DISCOUNT");

        for config in [over_file?, over_defaults?] {
            assert_eq!(config.rewards.reference_pair_id, 77);
            assert_eq!(config.rewards.normal_discount.raw(), 25_000_000);
            assert_eq!(config.rewards.bucket_secs, DEFAULT_BUCKET_SECS);
            assert_eq!(config.rewards.base_symbol.to_string(), "4,EOS");
        }

        let file_only = Config::load_layered(Some(&config_path))?;
        assert_eq!(file_only.rewards.reference_pair_id, 12);
        assert_eq!(file_only.rewards.normal_discount.raw(), 30_000_000);

        Ok(())
    }

    #[test]
    fn test_relative_snapshot_path_follows_config_file() -> Result<(), ConfigError> {
        let _env = ENV_LOCK.lock();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[tables]\nsnapshot_path = \"tables.json\"\n").unwrap();

        let expected = temp_dir.path().join("tables.json");
        let config = Config::from_file(&config_path)?;
        assert_eq!(config.tables.snapshot_path.as_deref(), Some(expected.as_path()));
        let layered = Config::load_layered(Some(&config_path))?;
        assert_eq!(layered.tables.snapshot_path.as_deref(), Some(expected.as_path()));

        let absolute = temp_dir.path().join("elsewhere").join("tables.json");
        std::fs::write(
            &config_path,
            format!("[tables]\nsnapshot_path = {:?}\n", absolute.to_string_lossy()),
        )
        .unwrap();
        let config = Config::from_file(&config_path)?;
        assert_eq!(config.tables.snapshot_path.as_deref(), Some(absolute.as_path()));

        Ok(())
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[rewards]\nbucket_secs = 0\n").unwrap();
        assert!(matches!(
            Config::from_file(&config_path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_demo_config_matches_defaults() -> Result<(), ConfigError> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/config.toml");
        let config = Config::from_file(&path)?;
        assert_eq!(config.rewards, RewardConfig::default());
        let snapshot = config.tables.snapshot_path.unwrap();
        assert_eq!(snapshot, path.with_file_name("tables.json"));
        assert!(snapshot.exists());
        Ok(())
    }

    #[test]
    fn test_default_config_path() {
        assert!(get_default_config_path().ends_with("dfs-rewards/config.toml"));
    }
}
