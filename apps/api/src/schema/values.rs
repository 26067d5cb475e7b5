use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codec::{FieldReader, FieldWriter};
use super::ModuleCodec;

/// Values work: life episodes, chosen values, their grouping and priority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Values {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: SchoolMemories,
    pub q6: RespectedPerson,
    pub q7: Vec<String>,
    pub q8: SelectedValues,
    pub q9: BTreeMap<String, CategoryEntry>,
    pub q10: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolMemories {
    pub kindergarten: String,
    pub elementary: String,
    pub junior: String,
    pub high: String,
    pub university: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespectedPerson {
    pub person: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectedValues {
    pub selected: Vec<String>,
    pub other: String,
}

/// A category holds either a list of values or a free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryEntry {
    List(Vec<String>),
    Text(String),
}

impl CategoryEntry {
    pub fn joined(&self) -> String {
        match self {
            CategoryEntry::List(items) => items.join(", "),
            CategoryEntry::Text(text) => text.clone(),
        }
    }
}

impl SelectedValues {
    /// Also accepts the older bare-array form (`["a","b"]`).
    fn from_cell(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => Self {
                selected: items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                other: String::new(),
            },
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Self::default(),
        }
    }
}

impl ModuleCodec for Values {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.text("q1_satisfied", &self.q1)
            .text("q2_angry", &self.q2)
            .text("q3_quit_job", &self.q3)
            .json("q4_memories_json", &self.q4, "{}")
            .json("q6_respect", &self.q6, "{}")
            .json("q7_feedback_json", &self.q7, "[]")
            .json("q8_selected_values", &self.q8, "{}")
            .json("q9_categories", &self.q9, "{}")
            .json("q10_priority", &self.q10, "[]")
            .text("summary", &self.summary);
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        Self {
            q1: fields.text("q1_satisfied"),
            q2: fields.text("q2_angry"),
            q3: fields.text("q3_quit_job"),
            q4: fields.json("q4_memories_json"),
            q6: fields.json("q6_respect"),
            q7: fields.json("q7_feedback_json"),
            q8: SelectedValues::from_cell(fields.json_value("q8_selected_values")),
            q9: fields.json("q9_categories"),
            q10: fields.json("q10_priority"),
            summary: fields.text("summary"),
        }
    }
}
