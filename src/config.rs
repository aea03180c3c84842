use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub leaders: LeadersConfig,
    #[serde(default)]
    pub copy_mode: CopyModeConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    /// Static market id -> category mapping used for category exposure caps
    #[serde(default)]
    pub market_categories: HashMap<String, String>,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Target cycle period in seconds (default: 3)
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: f64,
    /// Ceiling for failure backoff in seconds (default: 60)
    #[serde(default = "default_max_backoff_seconds")]
    pub max_backoff_seconds: f64,
    /// Consecutive failed cycles before the breaker pauses (default: 8)
    #[serde(default = "default_circuit_breaker_failures")]
    pub circuit_breaker_failures: u32,
    /// Breaker cooldown in seconds (default: 60)
    #[serde(default = "default_circuit_breaker_pause_seconds")]
    pub circuit_breaker_pause_seconds: u64,
    /// Maximum entries kept in the seen-events ledger (default: 5000)
    #[serde(default = "default_max_seen_events")]
    pub max_seen_events: usize,
    /// Use the synthetic trade source and simulated fills
    #[serde(default)]
    pub demo_mode: bool,
    /// Reject every trade until real market checks are wired
    #[serde(default)]
    pub strict_market_checks: bool,
}

fn default_poll_interval_seconds() -> f64 {
    3.0
}

fn default_max_backoff_seconds() -> f64 {
    60.0
}

fn default_circuit_breaker_failures() -> u32 {
    8
}

fn default_circuit_breaker_pause_seconds() -> u64 {
    60
}

fn default_max_seen_events() -> usize {
    5000
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            max_backoff_seconds: default_max_backoff_seconds(),
            circuit_breaker_failures: default_circuit_breaker_failures(),
            circuit_breaker_pause_seconds: default_circuit_breaker_pause_seconds(),
            max_seen_events: default_max_seen_events(),
            demo_mode: false,
            strict_market_checks: false,
        }
    }
}

impl RuntimeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds.max(0.0))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.max_backoff_seconds.max(0.0))
    }

    pub fn circuit_breaker_pause(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_pause_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadersConfig {
    /// Leader wallets to follow
    #[serde(default)]
    pub wallets: Vec<String>,
}

/// How follower order size is derived from the leader trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Constant `fixed_amount` per trade
    Fixed,
    /// `leader_size * follower_unit / leader_unit`
    #[default]
    Proportional,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopyModeConfig {
    #[serde(default)]
    pub mode: SizingMode,
    #[serde(default = "default_fixed_amount")]
    pub fixed_amount: Decimal,
    #[serde(default = "default_unit")]
    pub leader_unit: Decimal,
    #[serde(default = "default_unit")]
    pub follower_unit: Decimal,
}

fn default_fixed_amount() -> Decimal {
    dec!(5)
}

fn default_unit() -> Decimal {
    Decimal::ONE
}

impl Default for CopyModeConfig {
    fn default() -> Self {
        Self {
            mode: SizingMode::default(),
            fixed_amount: default_fixed_amount(),
            leader_unit: default_unit(),
            follower_unit: default_unit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Price slippage allowed around the leader price (e.g., 0.02)
    #[serde(default = "default_max_slippage")]
    pub max_slippage: Decimal,
    /// Minimum book liquidity for market checkers that inspect depth
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Decimal,
    /// Maximum bid/ask spread for market checkers that inspect the book
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,
    /// Follower exits mirror the leader (MIRROR) or are managed separately
    #[serde(default = "default_mirror_exits")]
    pub mirror_exits: bool,
    #[serde(default)]
    pub exposure_limits: ExposureLimits,
}

fn default_max_slippage() -> Decimal {
    dec!(0.02)
}

fn default_min_liquidity() -> Decimal {
    dec!(100)
}

fn default_max_spread() -> Decimal {
    dec!(0.05)
}

fn default_mirror_exits() -> bool {
    true
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_slippage: default_max_slippage(),
            min_liquidity: default_min_liquidity(),
            max_spread: default_max_spread(),
            mirror_exits: default_mirror_exits(),
            exposure_limits: ExposureLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExposureLimits {
    /// Cumulative copy size allowed per market
    #[serde(default = "default_per_market")]
    pub per_market: Decimal,
    /// Cumulative copy size allowed per category
    #[serde(default = "default_per_category")]
    pub per_category: Decimal,
}

fn default_per_market() -> Decimal {
    dec!(50)
}

fn default_per_category() -> Decimal {
    dec!(150)
}

impl Default for ExposureLimits {
    fn default() -> Self {
        Self {
            per_market: default_per_market(),
            per_category: default_per_category(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Landing page opened by the session collaborator
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://polymarket.com".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding state.json, results.jsonl and report.csv
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl OutputConfig {
    pub fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join("results.jsonl")
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join("report.csv")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted console logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the rolling activity log
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load settings file (settings.toml / settings.yaml / settings.json)
            .add_source(File::from(config_dir.join("settings")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("COPYTRADE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (COPYTRADE__RUNTIME__DEMO_MODE, etc.)
            .add_source(
                Environment::with_prefix("COPYTRADE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("leaders.wallets")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Validate runtime params
        let runtime = &self.runtime;
        if !runtime.poll_interval_seconds.is_finite() || runtime.poll_interval_seconds <= 0.0 {
            errors.push("runtime.poll_interval_seconds must be positive".to_string());
        }

        if !runtime.max_backoff_seconds.is_finite() || runtime.max_backoff_seconds < 0.0 {
            errors.push("runtime.max_backoff_seconds must be non-negative".to_string());
        }

        if runtime.circuit_breaker_failures == 0 {
            errors.push("runtime.circuit_breaker_failures must be at least 1".to_string());
        }

        if runtime.max_seen_events == 0 {
            errors.push("runtime.max_seen_events must be at least 1".to_string());
        }

        if self.leaders.wallets.is_empty() {
            errors.push("leaders.wallets must not be empty".to_string());
        }

        // Validate sizing params
        let copy = &self.copy_mode;
        if copy.mode == SizingMode::Fixed && copy.fixed_amount <= Decimal::ZERO {
            errors.push("copy_mode.fixed_amount must be positive in fixed mode".to_string());
        }

        if copy.leader_unit < Decimal::ZERO || copy.follower_unit < Decimal::ZERO {
            errors.push("copy_mode.leader_unit and follower_unit must be non-negative".to_string());
        }

        // Validate risk params
        let risk = &self.risk;
        if risk.max_slippage < Decimal::ZERO || risk.max_slippage >= Decimal::ONE {
            errors.push("risk.max_slippage must be in [0, 1)".to_string());
        }

        if risk.max_spread < Decimal::ZERO || risk.max_spread > Decimal::ONE {
            errors.push("risk.max_spread must be in [0, 1]".to_string());
        }

        if risk.min_liquidity < Decimal::ZERO {
            errors.push("risk.min_liquidity must be non-negative".to_string());
        }

        if risk.exposure_limits.per_market <= Decimal::ZERO {
            errors.push("risk.exposure_limits.per_market must be positive".to_string());
        }

        if risk.exposure_limits.per_category <= Decimal::ZERO {
            errors.push("risk.exposure_limits.per_category must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
