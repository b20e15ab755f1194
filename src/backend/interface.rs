use thiserror::Error;

/// One `(key, value)` pair yielded by a range cursor.
pub type KeyValue = (String, Vec<u8>);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed state file: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("range cursor failed: {0}")]
    Cursor(String),
    #[error("backend rejected {op} on key {key:?}: {reason}")]
    Rejected {
        op: &'static str,
        key: String,
        reason: String
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Ordered cursor over a key range. Stepping is done through `Iterator`;
/// `close` hands the cursor back to the store and must be called exactly once.
pub trait StateCursor: Iterator<Item = Result<KeyValue>> {
    fn close(&mut self) -> Result<()>;
}

/// World state as seen from inside one transaction.
///
/// `get` returns `None` for absent keys. An empty value is a legal return
/// and callers decide whether it counts as present.
pub trait LedgerStore {
    type Cursor<'a>: StateCursor where Self: 'a;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Ascending scan over `[start, end)`. An empty `start` or `end`
    /// leaves that side of the range open.
    fn range(&self, start: &str, end: &str) -> Result<Self::Cursor<'_>>;
}
