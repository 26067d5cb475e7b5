use serde::{Deserialize, Serialize};

use super::LarkError;
use crate::schema::FlatFields;

/// Standard Lark response envelope: `{ code, msg, data }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, LarkError> {
        if self.code != 0 {
            return Err(LarkError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data
            .ok_or_else(|| LarkError::Decode("response has no data".to_string()))
    }
}

/// Token endpoints return their payload next to `code`, not under `data`.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(alias = "app_access_token")]
    pub tenant_access_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expire: i64,
}

/// One row of a Base table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_id: String,
    #[serde(default)]
    pub fields: FlatFields,
}

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Option<Vec<Record>>,
    #[serde(default)]
    pub has_more: bool,
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordData {
    pub record: Record,
}

#[derive(Debug, Serialize)]
pub struct FieldsBody<'a> {
    pub fields: &'a FlatFields,
}

/// Builds the single-condition equality filter used for every lookup.
pub fn equality_filter(field: &str, value: &str) -> serde_json::Value {
    serde_json::json!({
        "filter": {
            "conjunction": "and",
            "conditions": [{
                "field_name": field,
                "operator": "is",
                "value": [value]
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_error_code() {
        let env: Envelope<SearchPage> =
            serde_json::from_value(json!({ "code": 1254045, "msg": "FieldNameNotFound" })).unwrap();
        match env.into_data() {
            Err(LarkError::Api { code, msg }) => {
                assert_eq!(code, 1254045);
                assert_eq!(msg, "FieldNameNotFound");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_search_page_with_null_items() {
        let env: Envelope<SearchPage> = serde_json::from_value(json!({
            "code": 0,
            "msg": "success",
            "data": { "items": null, "has_more": false, "total": 0 }
        }))
        .unwrap();
        let page = env.into_data().unwrap();
        assert!(page.items.is_none());
        assert!(!page.has_more);
    }

    #[test]
    fn test_app_token_alias() {
        let resp: AccessTokenResponse = serde_json::from_value(json!({
            "code": 0,
            "msg": "ok",
            "app_access_token": "a-123",
            "expire": 7200
        }))
        .unwrap();
        assert_eq!(resp.tenant_access_token.as_deref(), Some("a-123"));
        assert_eq!(resp.expire, 7200);
    }

    #[test]
    fn test_equality_filter_shape() {
        let f = equality_filter("user_id", "u1");
        assert_eq!(f["filter"]["conjunction"], json!("and"));
        assert_eq!(f["filter"]["conditions"][0]["operator"], json!("is"));
        assert_eq!(f["filter"]["conditions"][0]["value"], json!(["u1"]));
    }
}
