use std::cell::Cell;
use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

use log::debug;

use crate::backend::interface::{KeyValue, LedgerStore, Result, StateCursor, StoreError};

/// Ordered in-memory world state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: BTreeMap<String, Vec<u8>>,
    open_cursors: Cell<usize>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Number of cursors handed out by `range` and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.state.iter().map(|(key, value)| (key.as_str(), value.as_slice()))
    }

    fn bounds<'k>(start: &'k str, end: &'k str) -> Option<(Bound<&'k str>, Bound<&'k str>)> {
        let lower = if start.is_empty() { Bound::Unbounded } else { Bound::Included(start) };
        let upper = if end.is_empty() { Bound::Unbounded } else { Bound::Excluded(end) };

        // BTreeMap::range panics on inverted bounds
        if !start.is_empty() && !end.is_empty() && start > end {
            return None;
        }
        Some((lower, upper))
    }
}

impl FromIterator<(String, Vec<u8>)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        MemoryStore { state: iter.into_iter().collect(), open_cursors: Cell::new(0) }
    }
}

impl LedgerStore for MemoryStore {
    type Cursor<'a> = MemoryCursor<'a>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        debug!("put {} ({} bytes)", key, value.len());
        self.state.insert(key.to_owned(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        debug!("delete {}", key);
        self.state.remove(key);
        Ok(())
    }

    fn range(&self, start: &str, end: &str) -> Result<MemoryCursor<'_>> {
        let entries = MemoryStore::bounds(start, end)
            .map(|bounds| self.state.range::<str, _>(bounds));
        self.open_cursors.set(self.open_cursors.get() + 1);
        debug!("opened cursor over [{:?}, {:?})", start, end);
        Ok(MemoryCursor { entries, open_cursors: &self.open_cursors, closed: false })
    }
}

pub struct MemoryCursor<'a> {
    entries: Option<btree_map::Range<'a, String, Vec<u8>>>,
    open_cursors: &'a Cell<usize>,
    closed: bool
}

impl<'a> Iterator for MemoryCursor<'a> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return Some(Err(StoreError::Cursor("stepped a closed cursor".to_string())));
        }
        self.entries.as_mut()?
            .next()
            .map(|(key, value)| Ok((key.clone(), value.clone())))
    }
}

impl<'a> StateCursor for MemoryCursor<'a> {
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(StoreError::Cursor("cursor closed twice".to_string()));
        }
        self.closed = true;
        self.open_cursors.set(self.open_cursors.get() - 1);
        debug!("closed cursor");
        Ok(())
    }
}
