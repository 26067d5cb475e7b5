use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{LarkError, Record, RecordStore};
use crate::schema::codec::cell_text;
use crate::schema::FlatFields;

/// In-process table store for handler and store-level tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    next_id: Mutex<u64>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn insert(&self, table_id: &str, fields: Value) -> Record {
        let fields = fields.as_object().cloned().unwrap_or_default();
        let record = Record {
            record_id: self.allocate_id(),
            fields,
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table_id.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    pub fn rows(&self, table_id: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of create and update calls made through the trait.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = *next;
        format!("rec{id:04}")
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn search(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, LarkError> {
        Ok(self
            .rows(table_id)
            .into_iter()
            .filter(|r| cell_text(r.fields.get(field)) == value)
            .collect())
    }

    async fn create(&self, table_id: &str, fields: FlatFields) -> Result<Record, LarkError> {
        *self.writes.lock().unwrap() += 1;
        Ok(self.insert(table_id, Value::Object(fields)))
    }

    async fn update(
        &self,
        table_id: &str,
        record_id: &str,
        fields: FlatFields,
    ) -> Result<Record, LarkError> {
        *self.writes.lock().unwrap() += 1;
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .get_mut(table_id)
            .and_then(|rows| rows.iter_mut().find(|r| r.record_id == record_id))
            .ok_or_else(|| LarkError::Api {
                code: 1254043,
                msg: "RecordIdNotFound".to_string(),
            })?;
        record.fields.extend(fields);
        Ok(record.clone())
    }
}
