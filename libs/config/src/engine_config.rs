//! Engine Configuration Module
//!
//! Loads logging settings, the default fee tier and optional deployment
//! constraints from TOML files with environment-specific overrides.

use amm::{AccountRef, CurveKind, Fees, PoolState, SwapConstraints};
use anyhow::{anyhow, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable prefix, e.g. `TOKENSWAP__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "TOKENSWAP";

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/tokenswap.toml";

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingSettings,

    /// Fee tier applied to pools created without an explicit schedule
    pub default_fees: FeeSettings,

    /// Deployment rules checked at pool initialization
    pub constraints: Option<ConstraintSettings>,
}

/// Logging settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Fee tier as written in configuration files
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FeeSettings {
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    pub owner_withdraw_fee_numerator: u64,
    pub owner_withdraw_fee_denominator: u64,
    pub host_fee_numerator: u64,
    pub host_fee_denominator: u64,
}

impl Default for FeeSettings {
    /// 0.25% trade, 0.05% owner trade, 1/6 owner withdraw, 20% host
    fn default() -> Self {
        Self {
            trade_fee_numerator: 25,
            trade_fee_denominator: 10_000,
            owner_trade_fee_numerator: 5,
            owner_trade_fee_denominator: 10_000,
            owner_withdraw_fee_numerator: 1,
            owner_withdraw_fee_denominator: 6,
            host_fee_numerator: 20,
            host_fee_denominator: 100,
        }
    }
}

impl FeeSettings {
    /// Validated pool fee schedule
    pub fn to_fees(&self) -> Result<Fees> {
        let fees = Fees {
            trade_fee_numerator: self.trade_fee_numerator,
            trade_fee_denominator: self.trade_fee_denominator,
            owner_trade_fee_numerator: self.owner_trade_fee_numerator,
            owner_trade_fee_denominator: self.owner_trade_fee_denominator,
            owner_withdraw_fee_numerator: self.owner_withdraw_fee_numerator,
            owner_withdraw_fee_denominator: self.owner_withdraw_fee_denominator,
            host_fee_numerator: self.host_fee_numerator,
            host_fee_denominator: self.host_fee_denominator,
        };
        fees.validate().context("Invalid fee settings")?;
        Ok(fees)
    }
}

/// Deployment constraints as written in configuration files
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConstraintSettings {
    /// Hex account that must collect fees; `${VAR}` references are expanded
    pub owner_key: Option<String>,

    #[serde(default = "default_curve_types")]
    pub valid_curve_types: Vec<CurveKind>,

    #[serde(default)]
    pub minimum_fees: FeeSettings,
}

fn default_curve_types() -> Vec<CurveKind> {
    vec![CurveKind::ConstantProduct]
}

impl ConstraintSettings {
    pub fn to_constraints(&self) -> Result<SwapConstraints> {
        let owner_key = match &self.owner_key {
            Some(raw) => {
                let expanded = shellexpand::env(raw).context("Failed to expand owner key")?;
                let account = AccountRef::from_hex(&expanded)
                    .map_err(|e| anyhow!("Invalid owner key {}: {}", raw, e))?;
                Some(account)
            }
            None => None,
        };
        if self.valid_curve_types.is_empty() {
            warn!("Constraints allow no curve types; every initialization will be rejected");
        }
        Ok(SwapConstraints {
            owner_key,
            valid_curve_types: self.valid_curve_types.clone(),
            minimum_fees: self.minimum_fees.to_fees()?,
        })
    }
}

impl EngineConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Environment-specific overrides live next to the base file
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        debug!("Loaded engine configuration from {:?}", base);
        Ok(config)
    }

    /// Parse an embedded TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fee tier and constraints convert cleanly, and that the
    /// default tier satisfies the constraints' minimums
    pub fn validate(&self) -> Result<()> {
        let fees = self.default_fees.to_fees()?;
        if let Some(constraints) = self.swap_constraints()? {
            constraints
                .validate_fees(&fees)
                .context("Default fees violate the configured constraints")?;
        }
        Ok(())
    }

    /// Render as a TOML document, e.g. to seed a new config file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn fees(&self) -> Result<Fees> {
        self.default_fees.to_fees()
    }

    pub fn swap_constraints(&self) -> Result<Option<SwapConstraints>> {
        self.constraints
            .as_ref()
            .map(ConstraintSettings::to_constraints)
            .transpose()
    }

    /// Unfunded pool carrying the default fee tier
    pub fn new_pool(&self, curve: CurveKind, fee_collector: AccountRef) -> Result<PoolState> {
        Ok(PoolState::new(self.fees()?, curve, fee_collector))
    }
}

/// Load configuration from the default location
pub fn load_config(environment: Option<&str>) -> Result<EngineConfig> {
    EngineConfig::load(None, environment)
}

/// Resolve the config path from `TOKENSWAP_CONFIG`, falling back to the default
pub fn config_path() -> Result<PathBuf> {
    match std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
        Ok(raw) => {
            let expanded = shellexpand::full(&raw).context("Failed to expand config path")?;
            Ok(PathBuf::from(expanded.as_ref()))
        }
        Err(_) => Ok(PathBuf::from(DEFAULT_CONFIG_PATH)),
    }
}
