use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Symbol of the base currency every exchange is paired against
pub const NATIVE_SYMBOL: &str = "TRX";

/// Network constants loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// Network name
    pub network_name: String,
    /// Chain ID used to pick the token registry
    pub chain_id: u64,
    /// Full node HTTP API endpoint
    pub full_node_url: String,
    /// Exchange factory contract address
    pub factory_address: String,
    /// Native currency symbol
    pub native_symbol: String,
    /// Native currency decimals
    pub native_decimals: u8,
    /// Energy fee limit for contract calls, in sun
    pub fee_limit: u64,
}

impl NetworkConstants {
    /// Load network constants from `$TRON_DEX_CONFIG_DIR/network.toml`
    pub fn load(network: &str) -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        let config_dir = env::var("TRON_DEX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let settings = ConfigLoader::builder()
            .add_source(File::with_name(&format!("{}/network", config_dir)))
            .build()?;

        settings.get::<NetworkConstants>(network)
    }

    /// Nile testnet defaults, used when no config file is present. The
    /// factory address has to be supplied by the user config.
    pub fn nile() -> Self {
        Self {
            network_name: "nile".to_string(),
            chain_id: 3448148188,
            full_node_url: "https://nile.trongrid.io".to_string(),
            factory_address: String::new(),
            native_symbol: NATIVE_SYMBOL.to_string(),
            native_decimals: 6,
            fee_limit: 100_000_000,
        }
    }
}

/// Tunables of the add-liquidity flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquiditySettings {
    /// Slippage tolerance in basis points
    pub allowed_slippage_bips: u32,
    /// Seconds until a submitted deposit expires
    pub deadline_from_now_secs: u64,
    /// How often the full node is polled for new blocks
    pub block_poll_interval_ms: u64,
    /// Base units kept back when the user deposits their whole balance
    pub fee_reserve: u64,
}

impl Default for LiquiditySettings {
    fn default() -> Self {
        Self {
            allowed_slippage_bips: 200,
            deadline_from_now_secs: 60 * 15,
            block_poll_interval_ms: 3_000,
            fee_reserve: 100_000,
        }
    }
}

impl LiquiditySettings {
    pub fn block_poll_interval(&self) -> Duration {
        Duration::from_millis(self.block_poll_interval_ms)
    }

    /// Apply `TRON_DEX_*` environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        ConfigLoader::builder()
            .set_default("allowed_slippage_bips", defaults.allowed_slippage_bips)?
            .set_default("deadline_from_now_secs", defaults.deadline_from_now_secs)?
            .set_default("block_poll_interval_ms", defaults.block_poll_interval_ms)?
            .set_default("fee_reserve", defaults.fee_reserve)?
            .add_source(Environment::with_prefix("TRON_DEX").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

/// Token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
    /// Exchange contract paired with this token, when known ahead of time
    pub exchange_address: Option<String>,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active network configuration
    pub network: NetworkConstants,
    /// Flow settings
    #[serde(default)]
    pub liquidity: LiquiditySettings,
    /// Known tokens keyed by base58 address; anything else triggers the
    /// unknown token warning
    #[serde(default)]
    pub tokens: HashMap<String, TokenInfo>,
    /// Tokens whose contracts misbehave with the exchange (fee on transfer,
    /// missing return values)
    #[serde(default)]
    pub broken_tokens: Vec<String>,
}

impl Config {
    /// Create a new configuration with the specified network
    pub fn with_network(network: NetworkConstants) -> Self {
        Self {
            network,
            liquidity: LiquiditySettings::default(),
            tokens: HashMap::new(),
            broken_tokens: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub fn load(path: &PathBuf) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("tron-dex");
        path.push("config.toml");
        path
    }

    /// Load the user config if present, otherwise fall back to the named
    /// network from `config/network.toml`
    pub fn load_or_network(path: Option<&PathBuf>, network: &str) -> Result<Self, Error> {
        let path = path.cloned().unwrap_or_else(Self::default_path);
        if path.exists() {
            return Self::load(&path);
        }
        let constants = match NetworkConstants::load(network) {
            Ok(constants) => constants,
            Err(_) if network == "nile" => NetworkConstants::nile(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            liquidity: LiquiditySettings::from_env()?,
            ..Self::with_network(constants)
        })
    }

    /// Add token information
    pub fn add_token(&mut self, address: String, token_info: TokenInfo) {
        self.tokens.insert(address, token_info);
    }

    /// Look up a registry entry, ignoring address case
    pub fn token(&self, address: &str) -> Option<&TokenInfo> {
        self.tokens.get(address).or_else(|| {
            self.tokens
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(address))
                .map(|(_, info)| info)
        })
    }
}
