//! Whole-workbook AI analysis: turns the user's records into a prompt for the LLM.

pub mod handlers;
pub mod prompts;

use serde_json::Value;

use crate::schema::passion::PASSION_CHECK_COUNT;
use crate::schema::{ModuleType, WorkRecord};

const NOT_ANSWERED: &str = "not answered";

/// The `userData` payload: module records keyed by slug, plus an optional `userName`.
#[derive(Debug, Default)]
pub struct UserData {
    pub user_name: Option<String>,
    pub records: Vec<WorkRecord>,
}

impl UserData {
    /// Reads every known module present in `value`. `null` sections are skipped.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        let mut data = UserData {
            user_name: value
                .get("userName")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            records: Vec::new(),
        };
        for module in ModuleType::KNOWN {
            let section = value.get(module.as_str()).or_else(|| match module {
                ModuleType::LifeManual => value.get("lifeManual"),
                _ => None,
            });
            match section {
                None | Some(Value::Null) => {}
                Some(section) => data
                    .records
                    .push(WorkRecord::from_json(&module, section.clone())?),
            }
        }
        Ok(data)
    }
}

fn or_missing(text: &str) -> &str {
    if text.trim().is_empty() {
        NOT_ANSWERED
    } else {
        text
    }
}

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Markdown summary of the records, one section per module.
pub fn format_user_data(records: &[WorkRecord]) -> String {
    let mut text = String::new();
    for record in records {
        match record {
            WorkRecord::Personality(p) => {
                let s = &p.scores;
                text.push_str("## Personality\n");
                let result_type = if p.result_type.is_empty() {
                    "not diagnosed"
                } else {
                    p.result_type.as_str()
                };
                text.push_str(&format!("Type: {result_type}\n"));
                text.push_str(&format!(
                    "Rabbit (short bursts): {}, Tortoise (steady over time): {}, \
                     Grasshopper (seeks enjoyment): {}, Ant (avoids risk): {}\n\n",
                    s.usagi, s.kame, s.kirigirisu, s.ari
                ));
            }
            WorkRecord::Values(v) => {
                text.push_str("## Values\n");
                text.push_str(&format!("A fulfilling experience: {}\n", or_missing(&v.q1)));
                text.push_str(&format!("An irritating experience: {}\n", or_missing(&v.q2)));
                text.push_str(&format!("If I quit my job: {}\n", or_missing(&v.q3)));
                text.push_str(&format!(
                    "Chosen values: {}\n",
                    list_or(&v.q8.selected, "none selected")
                ));
                if !v.q9.is_empty() {
                    text.push_str("Grouped by category:\n");
                    for (category, entry) in &v.q9 {
                        text.push_str(&format!("  {category}: {}\n", entry.joined()));
                    }
                }
                if !v.q10.is_empty() {
                    let ranked: Vec<String> = v
                        .q10
                        .iter()
                        .enumerate()
                        .map(|(i, g)| format!("{}.{g}", i + 1))
                        .collect();
                    text.push_str(&format!("Priority: {}\n", ranked.join(" ")));
                }
                text.push_str(&format!("Values manual: {}\n\n", or_missing(&v.summary)));
            }
            WorkRecord::Talent(t) => {
                text.push_str("## Talents\n");
                text.push_str(&format!("Thanked for: {}\n", or_missing(&t.q1)));
                text.push_str(&format!("Surprised others with: {}\n", or_missing(&t.q2)));
                text.push_str(&format!("Chosen talents: {}\n", list_or(&t.q7, "none selected")));
                text.push_str(&format!("Talent manual: {}\n\n", or_missing(&t.q9)));
            }
            WorkRecord::Passion(p) => {
                text.push_str("## Passion\n");
                text.push_str(&format!("Content I can't stop watching: {}\n", or_missing(&p.q1)));
                text.push_str(&format!("Topics I lose track of time in: {}\n", or_missing(&p.q2)));
                text.push_str(&format!(
                    "Passion check: {}/{PASSION_CHECK_COUNT} YES\n",
                    p.q7.yes_count()
                ));
                text.push_str(&format!("Passion in one word: {}\n\n", or_missing(&p.q11)));
            }
            WorkRecord::Mission(m) => {
                text.push_str("## Mission and compass\n");
                text.push_str(&format!("Words that feel like me: {}\n", or_missing(&m.core_words)));
                text.push_str(&format!("Life purpose: {}\n", or_missing(&m.life_purpose)));
                text.push_str(&format!("Life mission: {}\n", or_missing(&m.life_mission)));
                text.push_str(&format!("Decision compass: {}\n\n", or_missing(&m.life_compass)));
            }
            WorkRecord::LifeManual(l) => {
                text.push_str(&format!(
                    "## Life manual\n{}\n\n",
                    or_missing(&l.final_manual)
                ));
            }
            WorkRecord::Other { .. } => {}
        }
    }
    text
}
