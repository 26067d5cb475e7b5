//! Lark OAuth login: authorize URL, code exchange and user info.

use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::models::Envelope;
use super::{LarkClient, LarkError};

#[derive(Debug, Deserialize)]
pub struct UserAccessToken {
    pub access_token: String,
}

/// Profile returned by `authen/v1/user_info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LarkUser {
    pub name: String,
    pub email: String,
    pub enterprise_email: String,
    pub avatar_url: String,
    pub open_id: String,
    pub union_id: String,
    pub user_id: String,
}

impl LarkUser {
    /// `user_id` when the app may read it, otherwise the `open_id`.
    pub fn id(&self) -> &str {
        if self.user_id.is_empty() {
            &self.open_id
        } else {
            &self.user_id
        }
    }

    pub fn contact_email(&self) -> &str {
        if self.email.is_empty() {
            &self.enterprise_email
        } else {
            &self.email
        }
    }
}

impl LarkClient {
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<Url, LarkError> {
        let mut url = Url::parse(&self.url("authen/v1/authorize"))
            .map_err(|e| LarkError::Decode(format!("invalid base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("app_id", &self.app_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchanges an authorization code and returns the signed-in user's profile.
    pub async fn login_with_code(&self, code: &str) -> Result<LarkUser, LarkError> {
        let (app_token, _) = self
            .internal_access_token("auth/v3/app_access_token/internal")
            .await?;

        let envelope: Envelope<UserAccessToken> = self
            .http
            .post(self.url("authen/v1/oidc/access_token"))
            .bearer_auth(app_token)
            .json(&json!({ "grant_type": "authorization_code", "code": code }))
            .send()
            .await?
            .json()
            .await?;
        let user_token = envelope.into_data()?;

        let envelope: Envelope<LarkUser> = self
            .http
            .get(self.url("authen/v1/user_info"))
            .bearer_auth(user_token.access_token)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }
}
