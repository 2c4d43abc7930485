use serde::{Deserialize, Serialize};
use spinhall_session::settings::SessionSettings;
use std::fs;

pub const CONFIG_ENV: &str = "SPINHALL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub starting_balance: u64,
    pub default_bet: u64,
    pub spin_delay_ms: u64,
    pub auto_roll_delay_ms: u64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_balance: ValueSource,
    pub default_bet: ValueSource,
    pub spin_delay_ms: ValueSource,
    pub auto_roll_delay_ms: ValueSource,
    pub seed: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_balance: ValueSource::Default,
            default_bet: ValueSource::Default,
            spin_delay_ms: ValueSource::Default,
            auto_roll_delay_ms: ValueSource::Default,
            seed: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        let s = SessionSettings::default();
        Self {
            starting_balance: s.starting_balance,
            default_bet: s.default_bet,
            spin_delay_ms: s.spin_delay_ms,
            auto_roll_delay_ms: s.auto_roll_delay_ms,
            seed: s.seed,
        }
    }
}

impl Config {
    pub fn to_settings(&self) -> SessionSettings {
        SessionSettings {
            starting_balance: self.starting_balance,
            default_bet: self.default_bet,
            spin_delay_ms: self.spin_delay_ms,
            auto_roll_delay_ms: self.auto_roll_delay_ms,
            seed: self.seed,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the TOML file named by `SPINHALL_CONFIG`, then `SPINHALL_*`
/// variables. Empty variables are ignored.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_balance {
            cfg.starting_balance = v;
            sources.starting_balance = ValueSource::File;
        }
        if let Some(v) = f.default_bet {
            cfg.default_bet = v;
            sources.default_bet = ValueSource::File;
        }
        if let Some(v) = f.spin_delay_ms {
            cfg.spin_delay_ms = v;
            sources.spin_delay_ms = ValueSource::File;
        }
        if let Some(v) = f.auto_roll_delay_ms {
            cfg.auto_roll_delay_ms = v;
            sources.auto_roll_delay_ms = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
    }

    if let Some(v) = env_u64("SPINHALL_STARTING_BALANCE")? {
        cfg.starting_balance = v;
        sources.starting_balance = ValueSource::Env;
    }
    if let Some(v) = env_u64("SPINHALL_DEFAULT_BET")? {
        cfg.default_bet = v;
        sources.default_bet = ValueSource::Env;
    }
    if let Some(v) = env_u64("SPINHALL_SPIN_DELAY_MS")? {
        cfg.spin_delay_ms = v;
        sources.spin_delay_ms = ValueSource::Env;
    }
    if let Some(v) = env_u64("SPINHALL_AUTO_ROLL_DELAY_MS")? {
        cfg.auto_roll_delay_ms = v;
        sources.auto_roll_delay_ms = ValueSource::Env;
    }
    if let Some(v) = env_u64("SPINHALL_SEED")? {
        cfg.seed = Some(v);
        sources.seed = ValueSource::Env;
    }

    cfg.to_settings()
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    starting_balance: Option<u64>,
    #[serde(default)]
    default_bet: Option<u64>,
    #[serde(default)]
    spin_delay_ms: Option<u64>,
    #[serde(default)]
    auto_roll_delay_ms: Option<u64>,
    #[serde(default)]
    seed: Option<u64>,
}

fn env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", key, v))),
        _ => Ok(None),
    }
}
