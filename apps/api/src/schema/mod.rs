//! Schema mapper: work records ⇄ flat Lark Base rows.
//!
//! Each module type owns a typed record and a fixed column list. Encoding and decoding
//! are total; see [`codec`] for the tolerance rules applied to stored cells.
//!
//! Column names follow schema version [`SCHEMA_VERSION`], the only supported version.
//! Rows written with the earlier client-side passion column names
//! (`q7_uninstructed`, `q12_state`, ...) are not read.

pub mod codec;
pub mod life_manual;
pub mod mission;
pub mod passion;
pub mod personality;
pub mod talent;
pub mod values;

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

pub use codec::FlatFields;
use codec::{FieldReader, FieldWriter};
pub use life_manual::LifeManual;
pub use mission::Mission;
pub use passion::Passion;
pub use personality::Personality;
pub use talent::Talent;
pub use values::Values;

pub const SCHEMA_VERSION: u32 = 2;

/// Column holding the whole record for module types without a fixed schema.
pub const CATCH_ALL_COLUMN: &str = "data_json";

/// Conversion between a typed module record and its row columns.
pub trait ModuleCodec: Sized {
    fn write_fields(&self, out: &mut FieldWriter);
    fn read_fields(fields: &FieldReader<'_>) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleType {
    Personality,
    Values,
    Talent,
    Passion,
    Mission,
    LifeManual,
    Other(String),
}

impl ModuleType {
    /// The six modules with a fixed schema, in sync order.
    pub const KNOWN: [ModuleType; 6] = [
        ModuleType::Personality,
        ModuleType::Values,
        ModuleType::Talent,
        ModuleType::Passion,
        ModuleType::Mission,
        ModuleType::LifeManual,
    ];

    /// Parses a module slug. `lifeManual` (the table key) is accepted as well.
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "personality" => ModuleType::Personality,
            "values" => ModuleType::Values,
            "talent" => ModuleType::Talent,
            "passion" => ModuleType::Passion,
            "mission" => ModuleType::Mission,
            "life-manual" | "lifeManual" => ModuleType::LifeManual,
            other => ModuleType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ModuleType::Personality => "personality",
            ModuleType::Values => "values",
            ModuleType::Talent => "talent",
            ModuleType::Passion => "passion",
            ModuleType::Mission => "mission",
            ModuleType::LifeManual => "life-manual",
            ModuleType::Other(slug) => slug,
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModuleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A user's saved answers for one module.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkRecord {
    Personality(Personality),
    Values(Values),
    Talent(Talent),
    Passion(Passion),
    Mission(Mission),
    LifeManual(LifeManual),
    Other { module: String, data: Value },
}

impl WorkRecord {
    pub fn module(&self) -> ModuleType {
        match self {
            WorkRecord::Personality(_) => ModuleType::Personality,
            WorkRecord::Values(_) => ModuleType::Values,
            WorkRecord::Talent(_) => ModuleType::Talent,
            WorkRecord::Passion(_) => ModuleType::Passion,
            WorkRecord::Mission(_) => ModuleType::Mission,
            WorkRecord::LifeManual(_) => ModuleType::LifeManual,
            WorkRecord::Other { module, .. } => ModuleType::Other(module.clone()),
        }
    }

    /// Parses a client-supplied record. Absent fields take their defaults; a field
    /// of the wrong JSON type is an error.
    pub fn from_json(module: &ModuleType, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match module {
            ModuleType::Personality => WorkRecord::Personality(serde_json::from_value(data)?),
            ModuleType::Values => WorkRecord::Values(serde_json::from_value(data)?),
            ModuleType::Talent => WorkRecord::Talent(serde_json::from_value(data)?),
            ModuleType::Passion => WorkRecord::Passion(serde_json::from_value(data)?),
            ModuleType::Mission => WorkRecord::Mission(serde_json::from_value(data)?),
            ModuleType::LifeManual => WorkRecord::LifeManual(serde_json::from_value(data)?),
            ModuleType::Other(slug) => WorkRecord::Other {
                module: slug.clone(),
                data,
            },
        })
    }

    pub fn to_json(&self) -> Value {
        let encoded = match self {
            WorkRecord::Personality(r) => serde_json::to_value(r),
            WorkRecord::Values(r) => serde_json::to_value(r),
            WorkRecord::Talent(r) => serde_json::to_value(r),
            WorkRecord::Passion(r) => serde_json::to_value(r),
            WorkRecord::Mission(r) => serde_json::to_value(r),
            WorkRecord::LifeManual(r) => serde_json::to_value(r),
            WorkRecord::Other { data, .. } => return data.clone(),
        };
        encoded.unwrap_or(Value::Null)
    }
}

/// Encodes a record as the flat columns of its module table.
pub fn to_external_fields(record: &WorkRecord) -> FlatFields {
    let mut out = FieldWriter::new();
    match record {
        WorkRecord::Personality(r) => r.write_fields(&mut out),
        WorkRecord::Values(r) => r.write_fields(&mut out),
        WorkRecord::Talent(r) => r.write_fields(&mut out),
        WorkRecord::Passion(r) => r.write_fields(&mut out),
        WorkRecord::Mission(r) => r.write_fields(&mut out),
        WorkRecord::LifeManual(r) => r.write_fields(&mut out),
        WorkRecord::Other { data, .. } => {
            out.text(CATCH_ALL_COLUMN, &data.to_string());
        }
    }
    out.finish()
}

/// Decodes a stored row. Never fails; unreadable cells take their defaults.
pub fn from_external_fields(module: &ModuleType, fields: &FlatFields) -> WorkRecord {
    let reader = FieldReader::new(fields);
    match module {
        ModuleType::Personality => WorkRecord::Personality(Personality::read_fields(&reader)),
        ModuleType::Values => WorkRecord::Values(Values::read_fields(&reader)),
        ModuleType::Talent => WorkRecord::Talent(Talent::read_fields(&reader)),
        ModuleType::Passion => WorkRecord::Passion(Passion::read_fields(&reader)),
        ModuleType::Mission => WorkRecord::Mission(Mission::read_fields(&reader)),
        ModuleType::LifeManual => WorkRecord::LifeManual(LifeManual::read_fields(&reader)),
        ModuleType::Other(slug) => WorkRecord::Other {
            module: slug.clone(),
            data: reader
                .json_value(CATCH_ALL_COLUMN)
                .unwrap_or_else(|| Value::Object(fields.clone())),
        },
    }
}
