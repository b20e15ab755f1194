mod interface;
mod json_store;
mod memory_store;
#[cfg(test)]
mod faulty_store;

pub use interface::{LedgerStore, StateCursor, KeyValue, Result, StoreError};
pub use json_store::JsonStore;
pub use memory_store::{MemoryStore, MemoryCursor};
#[cfg(test)]
pub(crate) use faulty_store::FaultyStore;
