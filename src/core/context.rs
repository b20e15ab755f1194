use crate::backend::LedgerStore;

/// Transactional context for a single invocation. The host creates it
/// around a world state handle and commits or discards the writes once the
/// call returns.
pub struct TxContext<'a, S: LedgerStore> {
    tx_id: String,
    stub: &'a mut S
}

impl<'a, S: LedgerStore> TxContext<'a, S> {
    pub fn new(tx_id: impl Into<String>, stub: &'a mut S) -> TxContext<'a, S> {
        TxContext { tx_id: tx_id.into(), stub }
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn stub(&self) -> &S {
        &*self.stub
    }

    pub fn stub_mut(&mut self) -> &mut S {
        &mut *self.stub
    }
}
