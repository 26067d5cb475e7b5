use serde::{Deserialize, Serialize};

use super::codec::{fixed_len, FieldReader, FieldWriter};
use super::ModuleCodec;

pub const EPISODE_COUNT: usize = 3;

/// Mission work: three low points, three high points, and the statements drawn from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mission {
    #[serde(deserialize_with = "fixed_len")]
    pub valley: [ValleyEpisode; EPISODE_COUNT],
    pub valley_summary: String,
    #[serde(deserialize_with = "fixed_len")]
    pub mountain: [MountainEpisode; EPISODE_COUNT],
    pub mountain_summary: String,
    pub core_words: String,
    pub verbalize: String,
    pub life_purpose: String,
    pub life_mission: String,
    pub life_compass: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValleyEpisode {
    pub when: String,
    pub what: String,
    pub emotion: String,
    pub why: String,
    pub recovery: String,
    pub learn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainEpisode {
    pub when: String,
    pub what: String,
    pub emotion: String,
    pub why: String,
}

const VALLEY_COLUMNS: [&str; EPISODE_COUNT] = ["valley1_json", "valley2_json", "valley3_json"];
const MOUNTAIN_COLUMNS: [&str; EPISODE_COUNT] =
    ["mountain1_json", "mountain2_json", "mountain3_json"];

impl ModuleCodec for Mission {
    fn write_fields(&self, out: &mut FieldWriter) {
        for (column, episode) in VALLEY_COLUMNS.iter().zip(&self.valley) {
            out.json(column, episode, "{}");
        }
        out.text("valley_summary", &self.valley_summary);
        for (column, episode) in MOUNTAIN_COLUMNS.iter().zip(&self.mountain) {
            out.json(column, episode, "{}");
        }
        out.text("mountain_summary", &self.mountain_summary)
            .text("core_words", &self.core_words)
            .text("verbalize", &self.verbalize)
            .text("life_purpose", &self.life_purpose)
            .text("life_mission", &self.life_mission)
            .text("life_compass", &self.life_compass);
    }

    fn read_fields(fields: &FieldReader<'_>) -> Self {
        Self {
            valley: VALLEY_COLUMNS.map(|column| fields.json(column)),
            valley_summary: fields.text("valley_summary"),
            mountain: MOUNTAIN_COLUMNS.map(|column| fields.json(column)),
            mountain_summary: fields.text("mountain_summary"),
            core_words: fields.text("core_words"),
            verbalize: fields.text("verbalize"),
            life_purpose: fields.text("life_purpose"),
            life_mission: fields.text("life_mission"),
            life_compass: fields.text("life_compass"),
        }
    }
}
