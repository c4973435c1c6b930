//! Chainconf Tools Library
//!
//! Assembles the network, account and block-explorer configuration consumed
//! by a smart-contract toolchain, and loads the task extensions it runs.

pub mod accounts;
pub mod assembler;
pub mod config;
pub mod explorer;
pub mod extensions;
pub mod logger;
pub mod network;
pub mod record;
pub mod rpc;
pub mod tasks;

pub use accounts::AccountPolicy;
pub use assembler::{assemble, assemble_strict};
pub use config::{ConfigError, ConfigInputs, ConfigOverrides};
pub use extensions::{load_extensions, DirectorySource, ExtensionSource, StaticSource};
pub use network::Network;
pub use record::{ConfigurationRecord, ValidationIssue};
pub use tasks::TaskRegistry;
