//! Deployment configuration.
//!
//! Every deployment of the funnel is the same product with different
//! parameters: the ceiling, the starting amount, the variant label reported
//! with submissions, and which side-effect hooks are switched on. All of them
//! live in a TOML file whose fields are individually optional.
//!
//! ```toml
//! max_amount = 300000
//! variant = "b"
//! submission_endpoint = "https://collector.example/leads"
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::finance::{Term, DEFAULT_RATE};
use crate::validation::MIN_AMOUNT;

/// Storage key of the completion flag.
pub const COMPLETION_KEY: &str = "installment-completed";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("annual rate must be in (0, 1], got {0}")]
    InvalidRate(f64),

    #[error("minimum amount must be at least 1, got {0}")]
    InvalidMinAmount(i64),

    #[error("minimum amount {min} exceeds maximum amount {max}")]
    InvertedRange { min: i64, max: i64 },

    #[error("default amount {amount} is outside [{min}, {max}]")]
    DefaultAmountOutOfRange { amount: i64, min: i64, max: i64 },
}

/// Parameters of one funnel deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    /// Nominal annual rate used by both the payment and the fee.
    pub rate: f64,

    pub min_amount: i64,

    /// Product ceiling, also advertised in the calculator headline.
    pub max_amount: i64,

    /// Starting amount. Falls back to `max_amount` when absent.
    pub default_amount: Option<i64>,

    pub default_term: Term,

    /// Label reported with every submission to tell deployments apart.
    pub variant: String,

    pub storage_key: String,

    /// Emit analytics events through the configured sink.
    pub analytics: bool,

    /// Remote collector for submissions. No submission is made when unset.
    pub submission_endpoint: Option<String>,

    pub submission_timeout_secs: u64,

    pub currency_symbol: String,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            min_amount: MIN_AMOUNT,
            max_amount: 100_000,
            default_amount: None,
            default_term: Term::Twelve,
            variant: "default".to_string(),
            storage_key: COMPLETION_KEY.to_string(),
            analytics: true,
            submission_endpoint: None,
            submission_timeout_secs: 10,
            currency_symbol: "₽".to_string(),
        }
    }
}

impl FunnelConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: FunnelConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rate > 0.0 && self.rate <= 1.0) {
            return Err(ConfigError::InvalidRate(self.rate));
        }
        if self.min_amount < 1 {
            return Err(ConfigError::InvalidMinAmount(self.min_amount));
        }
        if self.min_amount > self.max_amount {
            return Err(ConfigError::InvertedRange {
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        let amount = self.starting_amount();
        if !(self.min_amount..=self.max_amount).contains(&amount) {
            return Err(ConfigError::DefaultAmountOutOfRange {
                amount,
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        Ok(())
    }

    pub fn starting_amount(&self) -> i64 {
        self.default_amount.unwrap_or(self.max_amount)
    }
}
