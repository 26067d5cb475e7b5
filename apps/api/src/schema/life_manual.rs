use serde::{Deserialize, Serialize};

use super::codec::{FieldReader, FieldWriter};
use super::ModuleCodec;

/// The thirteen "life manual" answers and the final composed manual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LifeManual {
    pub item1: String,
    pub item2: String,
    pub item3: String,
    pub item4: String,
    pub item5: String,
    pub item6: String,
    pub item7: String,
    pub item8: String,
    pub item9: String,
    pub item10: String,
    pub item11: String,
    pub item12: String,
    pub item13: String,
    pub final_manual: String,
}

impl LifeManual {
    fn items(&self) -> [&String; 13] {
        [
            &self.item1,
            &self.item2,
            &self.item3,
            &self.item4,
            &self.item5,
            &self.item6,
            &self.item7,
            &self.item8,
            &self.item9,
            &self.item10,
            &self.item11,
            &self.item12,
            &self.item13,
        ]
    }
}

const ITEM_COLUMNS: [&str; 13] = [
    "item1_character",
    "item2_strength",
    "item3_challenge",
    "item4_trigger",
    "item5_values_top5",
    "item6_passion_theme",
    "item7_work_style",
    "item8_lifestyle",
    "item9_sns_theme",
    "item10_target",
    "item11_pain",
    "item12_value",
    "item13_service",
];

impl ModuleCodec for LifeManual {
    fn write_fields(&self, out: &mut FieldWriter) {
        for (column, value) in ITEM_COLUMNS.iter().zip(self.items()) {
            out.text(column, value);
        }
        out.text("final_manual", &self.final_manual);
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        let [
            item1,
            item2,
            item3,
            item4,
            item5,
            item6,
            item7,
            item8,
            item9,
            item10,
            item11,
            item12,
            item13,
        ] = ITEM_COLUMNS.map(|column| fields.text(column));
        Self {
            item1,
            item2,
            item3,
            item4,
            item5,
            item6,
            item7,
            item8,
            item9,
            item10,
            item11,
            item12,
            item13,
            final_manual: fields.text("final_manual"),
        }
    }
}
