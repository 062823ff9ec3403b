//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ReproxConfig (validated, immutable)
//!     → sections handed by value to each subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so the controller runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, CertConfig, CommandConfig, DiscoveryConfig, IssuancePolicy, LogFormat,
    ObservabilityConfig, ProxyConfig, ReproxConfig, ScheduleConfig,
};
