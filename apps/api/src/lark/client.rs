use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::models::{
    equality_filter, AccessTokenResponse, Envelope, FieldsBody, Record, RecordData, SearchPage,
};
use super::{LarkError, RecordStore};
use crate::config::LarkConfig;
use crate::schema::FlatFields;

/// Tokens are treated as expired this many seconds before Lark says they are.
const EXPIRY_MARGIN_SECS: i64 = 60;
const PAGE_SIZE: u32 = 500;

/// The cached tenant access token.
///
/// The lock only guards reads and writes of the slot; it is released before any
/// refresh, so two requests that both see an expired token may both fetch a new one.
/// The last one stored wins.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl TokenCache {
    pub fn get(&self) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|cached| Instant::now() < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    pub fn store(&self, token: String, lifetime: Duration) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedToken {
            token,
            expires_at: Instant::now() + lifetime,
        });
    }
}

/// HTTP client for the Lark Open API, scoped to one Base app.
#[derive(Clone)]
pub struct LarkClient {
    pub(super) http: Client,
    pub(super) base_url: String,
    pub(super) app_id: String,
    app_secret: String,
    app_token: String,
    tenant_token: Arc<TokenCache>,
}

impl LarkClient {
    pub fn new(config: &LarkConfig) -> Result<Self, LarkError> {
        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            app_token: config.app_token.clone(),
            tenant_token: Arc::new(TokenCache::default()),
        })
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}/open-apis/{}", self.base_url, path)
    }

    fn records_url(&self, table_id: &str) -> String {
        self.url(&format!(
            "bitable/v1/apps/{}/tables/{}/records",
            self.app_token, table_id
        ))
    }

    /// Returns the cached tenant token, fetching a new one when it has expired.
    pub async fn tenant_access_token(&self) -> Result<String, LarkError> {
        if let Some(token) = self.tenant_token.get() {
            return Ok(token);
        }
        let (token, lifetime) = self
            .internal_access_token("auth/v3/tenant_access_token/internal")
            .await?;
        debug!("Refreshed tenant access token, valid for {}s", lifetime.as_secs());
        self.tenant_token.store(token.clone(), lifetime);
        Ok(token)
    }

    /// Exchanges the app credentials at one of the `*_access_token/internal` endpoints.
    pub(super) async fn internal_access_token(
        &self,
        path: &str,
    ) -> Result<(String, Duration), LarkError> {
        let resp: AccessTokenResponse = self
            .http
            .post(self.url(path))
            .json(&json!({ "app_id": self.app_id, "app_secret": self.app_secret }))
            .send()
            .await?
            .json()
            .await?;
        if resp.code != 0 {
            return Err(LarkError::Api {
                code: resp.code,
                msg: resp.msg,
            });
        }
        let token = resp
            .tenant_access_token
            .ok_or_else(|| LarkError::Decode("access token missing".to_string()))?;
        let secs = (resp.expire - EXPIRY_MARGIN_SECS).max(0) as u64;
        Ok((token, Duration::from_secs(secs)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, LarkError> {
        let token = self.tenant_access_token().await?;
        let envelope: Envelope<T> = request.bearer_auth(token).send().await?.json().await?;
        envelope.into_data()
    }
}

#[async_trait]
impl RecordStore for LarkClient {
    async fn search(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, LarkError> {
        let url = format!("{}/search", self.records_url(table_id));
        let body = equality_filter(field, value);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }
            let page: SearchPage = self
                .send(self.http.post(&url).query(&query).json(&body))
                .await?;
            records.extend(page.items.unwrap_or_default());

            match page.page_token {
                Some(next) if page.has_more && !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(table_id, field, count = records.len(), "Searched records");
        Ok(records)
    }

    async fn create(&self, table_id: &str, fields: FlatFields) -> Result<Record, LarkError> {
        let request = self
            .http
            .post(self.records_url(table_id))
            .json(&FieldsBody { fields: &fields });
        let data: RecordData = self.send(request).await?;
        Ok(data.record)
    }

    async fn update(
        &self,
        table_id: &str,
        record_id: &str,
        fields: FlatFields,
    ) -> Result<Record, LarkError> {
        let url = format!("{}/{}", self.records_url(table_id), record_id);
        let request = self.http.put(url).json(&FieldsBody { fields: &fields });
        let data: RecordData = self.send(request).await?;
        Ok(data.record)
    }
}
