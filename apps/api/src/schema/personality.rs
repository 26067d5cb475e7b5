use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::codec::{FieldReader, FieldWriter};
use super::ModuleCodec;

/// Personality diagnosis: 20 answers scored into four animal types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Personality {
    /// Question number → selected score, both as strings (`{"1": "5"}`).
    pub answers: BTreeMap<String, String>,
    pub scores: PersonalityScores,
    pub result_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityScores {
    pub usagi: f64,
    pub kame: f64,
    pub kirigirisu: f64,
    pub ari: f64,
}

impl ModuleCodec for Personality {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.text("type", &self.result_type)
            .number("usagi_score", self.scores.usagi)
            .number("kame_score", self.scores.kame)
            .number("kirigirisu_score", self.scores.kirigirisu)
            .number("ari_score", self.scores.ari)
            .json("answers_json", &self.answers, "{}");
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        Self {
            answers: fields.json("answers_json"),
            scores: PersonalityScores {
                usagi: fields.number("usagi_score"),
                kame: fields.number("kame_score"),
                kirigirisu: fields.number("kirigirisu_score"),
                ari: fields.number("ari_score"),
            },
            result_type: fields.text("type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{from_external_fields, to_external_fields, ModuleType, WorkRecord};
    use serde_json::json;

    fn sample() -> Personality {
        Personality {
            answers: BTreeMap::from([
                ("1".to_string(), "5".to_string()),
                ("2".to_string(), "3".to_string()),
            ]),
            scores: PersonalityScores {
                usagi: 12.0,
                kame: 8.0,
                kirigirisu: 15.0,
                ari: 5.0,
            },
            result_type: "kirigirisu".to_string(),
        }
    }

    #[test]
    fn test_columns() {
        let fields = to_external_fields(&WorkRecord::Personality(sample()));
        assert_eq!(fields["type"], json!("kirigirisu"));
        assert_eq!(fields["usagi_score"], json!(12));
        assert_eq!(fields["ari_score"], json!(5));
        assert_eq!(fields["answers_json"], json!("{\"1\":\"5\",\"2\":\"3\"}"));
    }

    #[test]
    fn test_round_trip() {
        let record = WorkRecord::Personality(sample());
        let fields = to_external_fields(&record);
        assert_eq!(from_external_fields(&ModuleType::Personality, &fields), record);
    }

    #[test]
    fn test_empty_record_writes_defaults() {
        let fields = to_external_fields(&WorkRecord::Personality(Personality::default()));
        assert_eq!(fields["type"], json!(""));
        assert_eq!(fields["kame_score"], json!(0));
        assert_eq!(fields["answers_json"], json!("{}"));
    }

    #[test]
    fn test_malformed_answers_fall_back() {
        let fields = json!({
            "type": "usagi",
            "usagi_score": 10,
            "answers_json": "[object Object]"
        });
        let fields = fields.as_object().unwrap();
        let WorkRecord::Personality(p) = from_external_fields(&ModuleType::Personality, fields)
        else {
            panic!("expected personality");
        };
        assert!(p.answers.is_empty());
        assert_eq!(p.scores.usagi, 10.0);
        assert_eq!(p.scores.kame, 0.0);
        assert_eq!(p.result_type, "usagi");
    }
}
