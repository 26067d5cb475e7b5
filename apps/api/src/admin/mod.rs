//! Coach-side rules: role checks, member ownership, assignment and stored prompts.

pub mod handlers;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::parse_email_list;
use crate::errors::AppError;
use crate::lark::{LarkError, RecordStore};
use crate::models::user::{find_user, User};
use crate::schema::codec::cell_text;

/// Loads `coach_id` and checks it holds the coach role.
pub async fn require_coach(
    store: &dyn RecordStore,
    users_table: &str,
    coach_id: &str,
) -> Result<User, AppError> {
    let coach = find_user(store, users_table, "user_id", coach_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coach not found".into()))?;
    if !coach.is_coach() {
        return Err(AppError::Forbidden("Coach role required".into()));
    }
    Ok(coach)
}

/// Loads a member and checks it is assigned to `coach`.
pub async fn require_own_member(
    store: &dyn RecordStore,
    users_table: &str,
    coach: &User,
    member_id: &str,
) -> Result<User, AppError> {
    let member = find_user(store, users_table, "user_id", member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".into()))?;
    if member.coach_id != coach.user_id {
        return Err(AppError::Forbidden(
            "This member is not assigned to you".into(),
        ));
    }
    Ok(member)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Write `coach_id` on the member.
    Assign,
    /// Already this coach's member; nothing to write.
    AlreadyAssigned,
}

/// A member may move from unassigned to a coach, never from one coach to another.
pub fn plan_assignment(member: &User, coach_id: &str) -> Result<Assignment, AppError> {
    match member.coach_id.as_str() {
        "" => Ok(Assignment::Assign),
        current if current == coach_id => Ok(Assignment::AlreadyAssigned),
        _ => Err(AppError::Conflict(
            "This member is already assigned to another coach".into(),
        )),
    }
}

/// Applies [`plan_assignment`] for the member with `member_email`.
pub async fn assign_member(
    store: &dyn RecordStore,
    users_table: &str,
    coach: &User,
    member_email: &str,
) -> Result<(User, Assignment), AppError> {
    let member_email = member_email.trim().to_lowercase();
    let member = find_user(store, users_table, "email", &member_email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "No member with this email. The member must register first.".into(),
            )
        })?;

    let plan = plan_assignment(&member, &coach.user_id)?;
    if plan == Assignment::Assign {
        let mut fields = crate::schema::FlatFields::new();
        fields.insert("coach_id".into(), coach.user_id.clone().into());
        store.update(users_table, &member.record_id, fields).await?;
    }
    Ok((member, plan))
}

/// Coach prompt as stored in the users table `ai_prompt` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSetting {
    pub prompt: Option<String>,
    pub updated_at: Option<String>,
}

impl PromptSetting {
    /// Accepts the JSON form, and plain text as the prompt itself.
    pub fn parse(cell: &str) -> Self {
        if cell.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<PromptSetting>(cell) {
            Ok(setting) => setting,
            Err(_) => Self {
                prompt: Some(cell.to_string()),
                updated_at: None,
            },
        }
    }

    pub fn new(prompt: String) -> Self {
        Self {
            prompt: Some(prompt),
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// The prompt when one is set and non-blank.
    pub fn text(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// First coach in the users table with a non-empty prompt.
pub async fn first_coach_prompt(
    store: &dyn RecordStore,
    users_table: &str,
) -> Result<Option<String>, LarkError> {
    let coaches = store.search(users_table, "role", "coach").await?;
    Ok(coaches
        .iter()
        .map(|record| PromptSetting::parse(&User::from_record(record).ai_prompt))
        .find_map(|setting| setting.text().map(str::to_string)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSource {
    LarkBase,
    Default,
}

/// Admin email list from the settings table (`key = admin_emails`), else `fallback`.
pub async fn admin_emails(
    store: &dyn RecordStore,
    settings_table: Option<&str>,
    fallback: &[String],
) -> (Vec<String>, AdminSource) {
    if let Some(table) = settings_table {
        match store.find_one(table, "key", "admin_emails").await {
            Ok(Some(row)) => {
                let emails = parse_email_list(&cell_text(row.fields.get("value")));
                if !emails.is_empty() {
                    return (emails, AdminSource::LarkBase);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read admin emails from settings table: {e}"),
        }
    }
    (fallback.to_vec(), AdminSource::Default)
}
