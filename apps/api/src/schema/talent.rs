use serde::{Deserialize, Serialize};

use super::codec::{FieldReader, FieldWriter};
use super::ModuleCodec;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Talent {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: String,
    pub q5: String,
    pub q6: Vec<String>,
    /// Selected talent names.
    pub q7: Vec<String>,
    pub q8: String,
    pub q9: String,
}

impl ModuleCodec for Talent {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.text("q1_thanked", &self.q1)
            .text("q2_surprised", &self.q2)
            .text("q3_cant_help", &self.q3)
            .text("q4_absorbed", &self.q4)
            .text("q5_not_aware", &self.q5)
            .json("q6_feedback_json", &self.q6, "[]")
            .json("q7_selected_talents", &self.q7, "[]")
            .text("q8_priority", &self.q8)
            .text("q9_summary", &self.q9);
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        Self {
            q1: fields.text("q1_thanked"),
            q2: fields.text("q2_surprised"),
            q3: fields.text("q3_cant_help"),
            q4: fields.text("q4_absorbed"),
            q5: fields.text("q5_not_aware"),
            q6: fields.json("q6_feedback_json"),
            q7: fields.json("q7_selected_talents"),
            q8: fields.text("q8_priority"),
            q9: fields.text("q9_summary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{from_external_fields, to_external_fields, ModuleType, WorkRecord};
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let record = WorkRecord::Talent(Talent {
            q1: "helped a friend move".into(),
            q2: "organising".into(),
            q3: "tidying".into(),
            q4: "puzzles".into(),
            q5: "listening".into(),
            q6: vec!["patient".into(), "calm".into()],
            q7: vec!["planning".into()],
            q8: "planning first".into(),
            q9: "I plan".into(),
        });
        let fields = to_external_fields(&record);
        assert_eq!(fields["q7_selected_talents"], json!("[\"planning\"]"));
        assert_eq!(from_external_fields(&ModuleType::Talent, &fields), record);
    }

    #[test]
    fn test_double_encoded_priority_unwraps() {
        let fields = json!({ "q8_priority": "\"hello\"" });
        let record = from_external_fields(&ModuleType::Talent, fields.as_object().unwrap());
        let WorkRecord::Talent(t) = record else {
            panic!("expected talent");
        };
        assert_eq!(t.q8, "hello");
    }

    #[test]
    fn test_lists_fall_back_to_empty() {
        let fields = json!({
            "q6_feedback_json": "[object Object]",
            "q7_selected_talents": "not json"
        });
        let WorkRecord::Talent(t) =
            from_external_fields(&ModuleType::Talent, fields.as_object().unwrap())
        else {
            panic!("expected talent");
        };
        assert!(t.q6.is_empty());
        assert!(t.q7.is_empty());
    }
}
