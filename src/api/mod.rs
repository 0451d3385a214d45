use crate::models::{AccountInfo, MediaItem};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// Session credential rejected (401). The library page treats this as
    /// session expiry; the save path does not.
    Unauthorized,
    /// Record-scoped edit token rejected, or the viewer may not edit this
    /// record (403).
    Forbidden,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn forbidden(body: String) -> Self {
        Self {
            kind: ApiErrorKind::Forbidden,
            message: if body.trim().is_empty() {
                "Forbidden".to_string()
            } else {
                body
            },
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:6689".to_string();

        // We support BOTH `window.ENV.API_URL` (documented in README) and
        // `window.ENV.api_url` (legacy/implementation detail) for compatibility.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    // 1) Prefer README style: API_URL
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    // 2) Fallback: api_url
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub account: AccountInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload of the single authenticated write endpoint.
///
/// `edit-token` is the pre-minted, record-scoped credential embedded in the
/// media list response. It goes out exactly as it came in.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SaveAltTextRequest {
    #[serde(rename = "media-id")]
    pub media_id: String,

    #[serde(rename = "alt-text")]
    pub alt_text: String,

    #[serde(rename = "edit-token")]
    pub edit_token: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct SaveAck {
    #[serde(default)]
    pub success: bool,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.post(url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if res.status().as_u16() == 403 {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::forbidden(body))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.request_api(
            "/login/web-login",
            Some(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub(crate) fn parse_media_list_response(data: serde_json::Value) -> Vec<MediaItem> {
        let list = data
            .get("media-list")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut out: Vec<MediaItem> = Vec::with_capacity(list.len());
        for item in list {
            // Entries with no usable id are dropped rather than failing the
            // whole list.
            if let Ok(m) = serde_json::from_value::<MediaItem>(item) {
                if !m.id.trim().is_empty() {
                    out.push(m);
                }
            }
        }

        out
    }

    pub async fn get_media_list(&self) -> ApiResult<Vec<MediaItem>> {
        let data: serde_json::Value = self
            .request_api("/media/list", Some(&serde_json::json!({})))
            .await?;
        Ok(Self::parse_media_list_response(data))
    }

    /// Persist one record's caption. Idempotent per (media-id, alt-text).
    pub async fn save_alt_text(&self, req_body: SaveAltTextRequest) -> ApiResult<()> {
        let ack: SaveAck = self
            .request_api("/media/save-alt-text", Some(&req_body))
            .await?;

        if ack.success {
            Ok(())
        } else {
            // 2xx without the success flag still means the caption was not
            // stored; callers must not confirm the value.
            Err(ApiError {
                kind: ApiErrorKind::Http,
                message: "Save was not acknowledged".to_string(),
            })
        }
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "account": {"id": 1, "username": "u", "mail": "u@example.com"}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        // account is opaque; just ensure it's an object
        assert!(parsed.account.extra.is_object());
    }

    #[test]
    fn test_save_request_uses_kebab_keys_and_passes_token_verbatim() {
        let req = SaveAltTextRequest {
            media_id: "m-9".to_string(),
            alt_text: "a dog ".to_string(),
            edit_token: "opaque.token-42==".to_string(),
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["media-id"], "m-9");
        // The value goes out exactly as typed (untrimmed).
        assert_eq!(v["alt-text"], "a dog ");
        assert_eq!(v["edit-token"], "opaque.token-42==");
    }

    #[test]
    fn test_save_ack_missing_success_flag_is_failure() {
        let ack: SaveAck = serde_json::from_str("{}").expect("ack should parse");
        assert!(!ack.success);

        let ack: SaveAck =
            serde_json::from_str(r#"{"success": true}"#).expect("ack should parse");
        assert!(ack.success);
    }

    #[test]
    fn test_parse_media_list_response_drops_entries_without_id() {
        let data = serde_json::json!({
            "media-list": [
                {
                    "id": "m-1",
                    "title": "Sunset",
                    "file-name": "sunset.jpg",
                    "thumbnail-url": "/t/1.jpg",
                    "uploaded-at": "2024-11-02T10:00:00Z",
                    "alt-text": "sunset",
                    "edit-token": "tok-1"
                },
                {
                    "id": "   ",
                    "title": "Broken",
                    "file-name": "x.jpg",
                    "thumbnail-url": "/t/x.jpg",
                    "uploaded-at": "2024-11-02T10:00:00Z"
                }
            ]
        });
        let items = ApiClient::parse_media_list_response(data);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "m-1");
    }

    #[test]
    fn test_parse_media_list_response_tolerates_missing_list() {
        let items = ApiClient::parse_media_list_response(serde_json::json!({}));
        assert!(items.is_empty());
    }

    #[test]
    fn test_api_client_auth_header_roundtrip() {
        let mut client = ApiClient::new("http://localhost:6689".to_string());
        assert!(!client.is_authenticated());
        assert!(client.get_auth_token().is_none());

        client.set_token("my-jwt-token".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.get_auth_token().as_deref(), Some("my-jwt-token"));
    }
}
