//! # Token Swap Configuration
//!
//! This crate loads engine configuration and bootstraps logging for hosts
//! that embed the pool engine.
//!
//! ## Features
//!
//! - **Fee Tiers**: default fee schedule carried onto newly created pools
//! - **Constraints**: optional deployment rules (fee owner, curve types, minimum fees)
//! - **Logging**: `tracing-subscriber` setup with `RUST_LOG` taking precedence
//!
//! ## Usage
//!
//! ```rust
//! use tokenswap_config::EngineConfig;
//! use amm::{AccountRef, CurveKind};
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//! [logging]
//! level = "amm=debug,info"
//! "#,
//! )?;
//! let pool = config.new_pool(CurveKind::ConstantProduct, AccountRef([1; 32]))?;
//! assert_eq!(pool.fees.trade_fee_numerator, 25);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod engine_config;
pub mod logging;

// Re-export commonly used types
pub use engine_config::{
    config_path, load_config, ConstraintSettings, EngineConfig, FeeSettings, LoggingSettings,
};
pub use logging::{env_filter, init_tracing};
