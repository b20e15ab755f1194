pub mod asset;
pub mod context;
pub mod error;
pub mod service;

pub use asset::{AssetEntry, Record};
pub use context::TxContext;
pub use error::{AssetError, AssetResult};
pub use service::AssetService;
