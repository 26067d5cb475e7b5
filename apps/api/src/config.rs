use anyhow::{Context, Result};

use crate::schema::ModuleType;

const DEFAULT_LARK_BASE_URL: &str = "https://open.larksuite.com";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub lark: LarkConfig,
    pub tables: TableIds,
    pub anthropic_api_key: Option<String>,
    pub oauth_redirect_uri: String,
    /// Fallback admin list used when the settings table has no `admin_emails` row.
    pub admin_emails: Vec<String>,
    pub static_dir: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct LarkConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
    /// The Base app holding every table below.
    pub app_token: String,
}

#[derive(Debug, Clone)]
pub struct TableIds {
    pub users: String,
    pub settings: Option<String>,
    pub personality: String,
    pub values: String,
    pub talent: String,
    pub passion: String,
    pub mission: String,
    pub life_manual: String,
}

impl TableIds {
    /// Table for a module's work records. Modules without a table of their own return `None`.
    pub fn for_module(&self, module: &ModuleType) -> Option<&str> {
        let id = match module {
            ModuleType::Personality => &self.personality,
            ModuleType::Values => &self.values,
            ModuleType::Talent => &self.talent,
            ModuleType::Passion => &self.passion,
            ModuleType::Mission => &self.mission,
            ModuleType::LifeManual => &self.life_manual,
            ModuleType::Other(_) => return None,
        };
        Some(id.as_str())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        Ok(Config {
            lark: LarkConfig {
                base_url: optional_env("LARK_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LARK_BASE_URL.to_string()),
                app_id: require_env("LARK_APP_ID")?,
                app_secret: require_env("LARK_APP_SECRET")?,
                app_token: require_env("LARK_APP_TOKEN")?,
            },
            tables: TableIds {
                users: require_env("LARK_USERS_TABLE_ID")?,
                settings: optional_env("LARK_SETTINGS_TABLE_ID"),
                personality: require_env("LARK_PERSONALITY_TABLE_ID")?,
                values: require_env("LARK_VALUES_TABLE_ID")?,
                talent: require_env("LARK_TALENT_TABLE_ID")?,
                passion: require_env("LARK_PASSION_TABLE_ID")?,
                mission: require_env("LARK_MISSION_TABLE_ID")?,
                life_manual: require_env("LARK_LIFEMANUAL_TABLE_ID")?,
            },
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            oauth_redirect_uri: optional_env("OAUTH_REDIRECT_URI")
                .unwrap_or_else(|| format!("http://localhost:{port}/api/auth/callback")),
            admin_emails: optional_env("ADMIN_EMAILS")
                .map(|list| parse_email_list(&list))
                .unwrap_or_default(),
            static_dir: optional_env("STATIC_DIR"),
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Comma separated, trimmed, lowercased, blanks dropped.
pub fn parse_email_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_list() {
        assert_eq!(
            parse_email_list(" A@x.com, ,b@Y.org ,"),
            vec!["a@x.com".to_string(), "b@y.org".to_string()]
        );
        assert!(parse_email_list("").is_empty());
    }

    #[test]
    fn test_table_for_module() {
        let tables = crate::testing::test_config().tables;
        assert_eq!(tables.for_module(&ModuleType::LifeManual), Some("tbl_life_manual"));
        assert_eq!(tables.for_module(&ModuleType::Other("become".into())), None);
    }
}
