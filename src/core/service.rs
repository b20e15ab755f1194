use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::backend::{self, LedgerStore, StateCursor};
use crate::core::asset::{self, AppraisedAsset, AssetEntry, Record, OWNER_FIELD, SEED_ASSETS};
use crate::core::context::TxContext;
use crate::core::error::{AssetError, AssetResult};

/// Asset records kept in the world state, one JSON value per ID.
///
/// The service is stateless; every call works only through the context it
/// is handed and issues its store calls in a fixed order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetService;

impl AssetService {
    pub fn new() -> AssetService {
        AssetService
    }

    /// Writes the ten seed records, overwriting anything stored under their IDs.
    pub fn init_ledger<S: LedgerStore>(&self, ctx: &mut TxContext<S>) -> AssetResult<()> {
        for seed in SEED_ASSETS.iter() {
            let asset = seed.tagged();
            let value = AssetService::encode(asset.id, &asset)?;
            ctx.stub_mut().put(asset.id, value)?;
            info!("[{}] Asset {} initialized", ctx.tx_id(), asset.id);
        }
        Ok(())
    }

    /// Stores `payload` verbatim under its `ID` and returns it.
    ///
    /// There is no existence check: an existing record with the same ID is
    /// silently replaced.
    pub fn create_asset<S: LedgerStore>(&self, ctx: &mut TxContext<S>, payload: &[u8]) -> AssetResult<Vec<u8>> {
        let id = asset::extract_id(payload)?;
        ctx.stub_mut().put(&id, payload.to_vec())?;
        info!("[{}] created asset {}", ctx.tx_id(), id);
        Ok(payload.to_vec())
    }

    /// Returns the stored bytes as they are.
    pub fn read_asset<S: LedgerStore>(&self, ctx: &TxContext<S>, id: &str) -> AssetResult<Vec<u8>> {
        match ctx.stub().get(id)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(AssetError::NotFound(id.to_owned()))
        }
    }

    /// Replaces the whole record with `{ID, color, size, owner, appraisedValue}`.
    /// Fields of the previous record do not survive.
    pub fn update_asset<S: LedgerStore>(
        &self,
        ctx: &mut TxContext<S>,
        id: &str,
        color: &str,
        size: &str,
        owner: &str,
        appraised_value: &str
    ) -> AssetResult<()> {
        if !self.asset_exists(ctx, id)? {
            return Err(AssetError::NotFound(id.to_owned()));
        }

        let updated = AppraisedAsset {
            id: id.to_owned(),
            color: color.to_owned(),
            size: size.to_owned(),
            owner: owner.to_owned(),
            appraised_value: appraised_value.to_owned()
        };
        let value = AssetService::encode(id, &updated)?;
        ctx.stub_mut().put(id, value)?;
        info!("[{}] updated asset {}", ctx.tx_id(), id);
        Ok(())
    }

    pub fn delete_asset<S: LedgerStore>(&self, ctx: &mut TxContext<S>, id: &str) -> AssetResult<()> {
        if !self.asset_exists(ctx, id)? {
            return Err(AssetError::NotFound(id.to_owned()));
        }
        ctx.stub_mut().delete(id)?;
        info!("[{}] deleted asset {}", ctx.tx_id(), id);
        Ok(())
    }

    /// True when a non-empty value is stored under `id`.
    pub fn asset_exists<S: LedgerStore>(&self, ctx: &TxContext<S>, id: &str) -> AssetResult<bool> {
        Ok(ctx.stub().get(id)?.map_or(false, |value| !value.is_empty()))
    }

    /// Sets `owner` on the stored record and keeps every other field.
    pub fn transfer_asset<S: LedgerStore>(&self, ctx: &mut TxContext<S>, id: &str, new_owner: &str) -> AssetResult<()> {
        let stored = self.read_asset(ctx, id)?;
        let mut record = asset::decode_record(id, &stored)?;

        let previous = record.insert(OWNER_FIELD.to_owned(), Value::String(new_owner.to_owned()));
        let value = AssetService::encode(id, &record)?;
        ctx.stub_mut().put(id, value)?;

        info!("[{}] transferred asset {} from {} to {}", ctx.tx_id(), id,
            previous.as_ref().and_then(Value::as_str).unwrap_or("<none>"), new_owner);
        Ok(())
    }

    /// Every stored `{Key, Record}` pair in ascending key order. Values that
    /// are not JSON are reported as raw text instead of failing the scan.
    pub fn get_all_assets<S: LedgerStore>(&self, ctx: &TxContext<S>) -> AssetResult<Vec<AssetEntry>> {
        let mut cursor = CursorGuard::new(ctx.stub().range("", "")?);
        let mut entries = Vec::new();

        for item in cursor.entries() {
            let (key, value) = item?;
            let record = match serde_json::from_slice::<Value>(&value) {
                Ok(decoded) => Record::Decoded(decoded),
                Err(err) => {
                    warn!("[{}] value under {} is not JSON, returning it as text: {}", ctx.tx_id(), key, err);
                    Record::Raw(String::from_utf8_lossy(&value).into_owned())
                }
            };
            entries.push(AssetEntry { key, record });
        }

        cursor.release()?;
        debug!("[{}] enumerated {} assets", ctx.tx_id(), entries.len());
        Ok(entries)
    }

    fn encode<T: Serialize>(id: &str, record: &T) -> AssetResult<Vec<u8>> {
        serde_json::to_vec(record)
            .map_err(|source| AssetError::Encode { id: id.to_owned(), source })
    }
}

/// Owns a range cursor and closes it exactly once, either through
/// `release` or when dropped on an early return.
struct CursorGuard<C: StateCursor> {
    cursor: C,
    released: bool
}

impl<C: StateCursor> CursorGuard<C> {
    fn new(cursor: C) -> CursorGuard<C> {
        CursorGuard { cursor, released: false }
    }

    fn entries(&mut self) -> &mut C {
        &mut self.cursor
    }

    fn release(mut self) -> backend::Result<()> {
        self.released = true;
        self.cursor.close()
    }
}

impl<C: StateCursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(err) = self.cursor.close() {
                warn!("failed to close abandoned cursor: {}", err);
            }
        }
    }
}
