pub mod core;
pub mod backend;
pub mod host;

pub use crate::core::{AssetEntry, AssetError, AssetService, Record, TxContext};
pub use crate::core::{asset, service};
pub use crate::backend::{LedgerStore, MemoryStore, JsonStore};
pub use crate::host::{Function, InvokeError};
