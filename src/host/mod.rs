//! Host side of an invocation: resolves a function by name, runs it inside
//! a transactional context and decides whether its writes are kept.

pub mod dispatch;

use log::{debug, warn};

use crate::backend::{self, LedgerStore};
use crate::core::{AssetService, TxContext};

pub use dispatch::{Function, InvokeError};

/// Outcome of a successful invocation.
#[derive(Debug)]
pub struct Invocation {
    pub payload: Vec<u8>,
    /// Whether the world state was replaced by the invocation's writes.
    pub committed: bool
}

/// Runs `function` against `state` without persisting anything.
pub fn invoke<S: LedgerStore + Clone>(
    service: &AssetService,
    state: &mut S,
    tx_id: &str,
    function: Function,
    args: &[String]
) -> Result<Invocation, InvokeError> {
    invoke_and_persist(service, state, tx_id, function, args, |_| Ok(()))
}

/// Runs `function` against `state`.
///
/// Mutating functions work on a staged copy. Once the call succeeds the copy
/// is handed to `persist`, and it replaces `state` only if that succeeds too.
/// Any failure leaves `state` untouched. Read-only functions run against
/// `state` directly and never reach `persist`.
pub fn invoke_and_persist<S, P>(
    service: &AssetService,
    state: &mut S,
    tx_id: &str,
    function: Function,
    args: &[String],
    persist: P
) -> Result<Invocation, InvokeError>
where
    S: LedgerStore + Clone,
    P: FnOnce(&S) -> backend::Result<()>
{
    if function.is_read_only() {
        let mut ctx = TxContext::new(tx_id, state);
        let payload = dispatch::call(service, &mut ctx, function, args)?;
        return Ok(Invocation { payload, committed: false });
    }

    let mut staged = state.clone();
    let mut ctx = TxContext::new(tx_id, &mut staged);
    let payload = match dispatch::call(service, &mut ctx, function, args) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("[{}] discarded {}: {}", tx_id, function, err);
            return Err(err);
        }
    };

    if let Err(source) = persist(&staged) {
        warn!("[{}] discarded {}, persisting failed: {}", tx_id, function, source);
        return Err(InvokeError::Commit { function, source });
    }
    *state = staged;
    debug!("[{}] committed {}", tx_id, function);
    Ok(Invocation { payload, committed: true })
}
