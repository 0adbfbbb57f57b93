//! Participants: addresses and the keys behind them.

pub mod address;
pub mod keyring;

pub use address::{Address, DEFAULT_ADDRESS_PREFIX};
pub use keyring::{Identity, PublicIdentity};
