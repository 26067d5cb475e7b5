use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::lark::{LarkError, Record, RecordStore};
use crate::schema::codec::cell_text;
use crate::schema::FlatFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Coach,
}

impl Role {
    /// Anything other than `coach` is a member.
    pub fn parse(text: &str) -> Self {
        if text.trim() == "coach" {
            Role::Coach
        } else {
            Role::Member
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Coach => "coach",
        }
    }
}

/// A row of the users table.
#[derive(Debug, Clone)]
pub struct User {
    pub record_id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Empty when no coach is assigned.
    pub coach_id: String,
    pub password_hash: String,
    pub avatar: String,
    pub ai_prompt: String,
    pub created_at: Option<Value>,
}

impl User {
    pub fn from_record(record: &Record) -> Self {
        let text = |key: &str| cell_text(record.fields.get(key)).trim().to_string();
        Self {
            record_id: record.record_id.clone(),
            user_id: text("user_id"),
            name: text("name"),
            email: text("email"),
            role: Role::parse(&text("role")),
            coach_id: text("coach_id"),
            password_hash: text("password_hash"),
            avatar: text("avatar"),
            ai_prompt: text("ai_prompt"),
            created_at: record.fields.get("created_at").cloned(),
        }
    }

    pub fn is_coach(&self) -> bool {
        self.role == Role::Coach
    }

    /// Row for a newly registered member.
    pub fn new_member_fields(
        user_id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> FlatFields {
        let row = json!({
            "user_id": user_id,
            "name": name,
            "email": email,
            "role": Role::Member.as_str(),
            "password_hash": password_hash,
            "created_at": Utc::now().timestamp_millis(),
        });
        match row {
            Value::Object(fields) => fields,
            _ => FlatFields::new(),
        }
    }
}

/// First user whose `field` equals `value`.
pub async fn find_user(
    store: &dyn RecordStore,
    users_table: &str,
    field: &str,
    value: &str,
) -> Result<Option<User>, LarkError> {
    let record = store.find_one(users_table, field, value).await?;
    Ok(record.as_ref().map(User::from_record))
}

/// Public view of a user, as returned by login and verify endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Empty until the user sets one.
    pub avatar: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
        }
    }
}
