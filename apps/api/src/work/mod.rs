//! Reading and writing a user's work records in the per-module tables.

pub mod handlers;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::config::TableIds;
use crate::lark::{LarkError, Record, RecordStore};
use crate::schema::{from_external_fields, to_external_fields, FlatFields, ModuleType, WorkRecord};

/// Column every work table is keyed on.
pub const USER_KEY: &str = "user_id";

/// Encoded row for `record`, stamped with its owner and the write time (epoch ms).
pub fn work_row(record: &WorkRecord, user_id: &str, now_ms: i64) -> FlatFields {
    let mut fields = to_external_fields(record);
    fields.insert(USER_KEY.to_string(), Value::String(user_id.to_string()));
    fields.insert("updated_at".to_string(), Value::from(now_ms));
    fields
}

/// Creates or replaces the user's row in the module's table.
pub async fn save(
    store: &dyn RecordStore,
    table_id: &str,
    user_id: &str,
    record: &WorkRecord,
) -> Result<Record, LarkError> {
    let fields = work_row(record, user_id, Utc::now().timestamp_millis());
    store.upsert(table_id, USER_KEY, user_id, fields).await
}

/// The user's decoded record for one module, if a row exists.
pub async fn load(
    store: &dyn RecordStore,
    table_id: &str,
    module: &ModuleType,
    user_id: &str,
) -> Result<Option<WorkRecord>, LarkError> {
    let row = store.find_one(table_id, USER_KEY, user_id).await?;
    Ok(row.map(|r| from_external_fields(module, &r.fields)))
}

/// Every known module for the user, read one table at a time.
///
/// A table that fails to load is logged and reported as `None`, like a missing row.
pub async fn load_all(
    store: &dyn RecordStore,
    tables: &TableIds,
    user_id: &str,
) -> Vec<(ModuleType, Option<WorkRecord>)> {
    let mut out = Vec::with_capacity(ModuleType::KNOWN.len());
    for module in ModuleType::KNOWN {
        let Some(table_id) = tables.for_module(&module) else {
            continue;
        };
        let record = match load(store, table_id, &module, user_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(module = %module, table_id, "Skipping table during load: {e}");
                None
            }
        };
        out.push((module, record));
    }
    out
}
