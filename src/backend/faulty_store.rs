use crate::backend::interface::{KeyValue, LedgerStore, Result, StateCursor, StoreError};
use crate::backend::{MemoryCursor, MemoryStore};

/// `MemoryStore` wrapper that rejects chosen calls.
#[derive(Clone, Debug, Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_get: bool,
    pub fail_delete: bool,
    /// Puts that succeed before every further put is rejected.
    pub puts_before_failure: Option<usize>,
    /// Entries a cursor yields before it reports an error.
    pub scan_before_failure: Option<usize>
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> FaultyStore {
        FaultyStore { inner, ..FaultyStore::default() }
    }

    fn rejected(op: &'static str, key: &str) -> StoreError {
        StoreError::Rejected { op, key: key.to_owned(), reason: "injected failure".to_string() }
    }
}

impl LedgerStore for FaultyStore {
    type Cursor<'a> = FaultyCursor<'a>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_get {
            return Err(FaultyStore::rejected("get", key));
        }
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        match self.puts_before_failure.as_mut() {
            Some(0) => return Err(FaultyStore::rejected("put", key)),
            Some(remaining) => *remaining -= 1,
            None => ()
        }
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.fail_delete {
            return Err(FaultyStore::rejected("delete", key));
        }
        self.inner.delete(key)
    }

    fn range(&self, start: &str, end: &str) -> Result<FaultyCursor<'_>> {
        Ok(FaultyCursor { inner: self.inner.range(start, end)?, remaining: self.scan_before_failure })
    }
}

pub(crate) struct FaultyCursor<'a> {
    inner: MemoryCursor<'a>,
    remaining: Option<usize>
}

impl<'a> Iterator for FaultyCursor<'a> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.remaining.as_mut() {
            Some(0) => return Some(Err(StoreError::Cursor("disk went away".to_string()))),
            Some(remaining) => *remaining -= 1,
            None => ()
        }
        self.inner.next()
    }
}

impl<'a> StateCursor for FaultyCursor<'a> {
    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
