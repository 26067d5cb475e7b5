use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::codec::{FieldReader, FieldWriter};
use super::ModuleCodec;

pub const PASSION_CHECK_COUNT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Passion {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: String,
    pub q5: String,
    pub q6: String,
    pub q7: PassionChecks,
    pub q8: String,
    pub q9: String,
    pub q10: String,
    pub q11: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckAnswer {
    Yes,
    No,
}

/// The ten yes/no passion checks. Unanswered (or unrecognised) entries are `None`,
/// and the list is always exactly ten long.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PassionChecks(Vec<Option<CheckAnswer>>);

impl Default for PassionChecks {
    fn default() -> Self {
        Self(vec![None; PASSION_CHECK_COUNT])
    }
}

impl PassionChecks {
    pub fn from_value(value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let mut checks: Vec<Option<CheckAnswer>> = items
            .into_iter()
            .take(PASSION_CHECK_COUNT)
            .map(|item| serde_json::from_value(item).ok())
            .collect();
        checks.resize(PASSION_CHECK_COUNT, None);
        Self(checks)
    }

    pub fn answers(&self) -> &[Option<CheckAnswer>] {
        &self.0
    }

    pub fn yes_count(&self) -> usize {
        self.0
            .iter()
            .filter(|a| matches!(a, Some(CheckAnswer::Yes)))
            .count()
    }
}

impl<'de> Deserialize<'de> for PassionChecks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

impl ModuleCodec for Passion {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.text("q1_youtube", &self.q1)
            .text("q2_talk", &self.q2)
            .text("q3_free", &self.q3)
            .text("q4_curious", &self.q4)
            .text("q5_told", &self.q5)
            .text("q6_searched", &self.q6)
            .json("q7_check_answers", &self.q7, "[]")
            .text("q8_experiences", &self.q8)
            .text("q9_who_help", &self.q9)
            .text("q10_work_form", &self.q10)
            .text("q11_one_word", &self.q11);
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        Self {
            q1: fields.text("q1_youtube"),
            q2: fields.text("q2_talk"),
            q3: fields.text("q3_free"),
            q4: fields.text("q4_curious"),
            q5: fields.text("q5_told"),
            q6: fields.text("q6_searched"),
            q7: fields.json("q7_check_answers"),
            q8: fields.text("q8_experiences"),
            q9: fields.text("q9_who_help"),
            q10: fields.text("q10_work_form"),
            q11: fields.text("q11_one_word"),
        }
    }
}
