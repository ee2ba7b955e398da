/// I2P DNS Gateway
///
/// HTTP front end for a registry of `.i2p` domain names. Names are
/// validated here and stored on a ledger, either a remote one reached over
/// HTTP or an in-process one.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod rate_limit;
pub mod record;
pub mod server;
pub mod validation;

pub use context::AppContext;
