//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//!     → handed to each component at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the harness is rebuilt to change it
//! - All fields have defaults so an empty file (or no file) is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::HarnessConfig;
pub use schema::NegativeIntervalPolicy;
pub use schema::ObservabilityConfig;
pub use schema::OverlayConfig;
pub use schema::SelfTestConfig;
pub use schema::TargetConfig;
pub use schema::TimingConfig;
