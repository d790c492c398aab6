//! Account API client.

use async_trait::async_trait;
use peptalk_common::{AccountPayload, AccountSnapshot};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

/// Account operations the view and actions depend on.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Fetch and validate the combined account payload.
    async fn fetch_account(&self) -> Result<AccountSnapshot, ClientError>;

    /// Ask support to delete the signed-in account.
    async fn request_deletion(&self, reason: Option<&str>) -> Result<(), ClientError>;
}

#[derive(Serialize)]
struct DeleteRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// [`AccountApi`] over HTTP.
#[derive(Clone)]
pub struct HttpAccountApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpAccountApi {
    /// Create a client for the deployment at `base_url`, optionally signed in.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(&normalized)?,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Read a JSON body, turning non-2xx and `ok: false` into errors.
    async fn read_ok(response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        let failed = !status.is_success()
            || body
                .as_ref()
                .and_then(|b| b.get("ok"))
                .and_then(Value::as_bool)
                == Some(false);

        if failed {
            return Err(body
                .as_ref()
                .and_then(error_message)
                .map_or(ClientError::Status(status.as_u16()), ClientError::Rejected));
        }

        body.ok_or_else(|| ClientError::Decode("response body is not JSON".to_string()))
    }
}

/// Server error message: either `error: "code"` or `error: { message }`.
fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .map(ToString::to_string)
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn fetch_account(&self) -> Result<AccountSnapshot, ClientError> {
        let url = self.endpoint("api/account")?;
        let response = self.authorized(self.client.get(url)).send().await?;

        let body = Self::read_ok(response).await?;
        let payload: AccountPayload =
            serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(payload.into_snapshot()?)
    }

    async fn request_deletion(&self, reason: Option<&str>) -> Result<(), ClientError> {
        let url = self.endpoint("api/account/delete-request")?;
        let response = self
            .authorized(self.client.post(url))
            .json(&DeleteRequestBody { reason })
            .send()
            .await?;

        Self::read_ok(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpAccountApi::new("https://pep-talk.example/app", None).unwrap();
        assert_eq!(
            api.endpoint("api/account").unwrap().as_str(),
            "https://pep-talk.example/app/api/account"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpAccountApi::new("not a url", None),
            Err(ClientError::Url(_))
        ));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(&json!({ "ok": false, "error": "unauthorized" })),
            Some("unauthorized".to_string())
        );
        assert_eq!(
            error_message(&json!({ "ok": false, "error": { "code": "UNAUTHORIZED", "message": "Unauthorized" } })),
            Some("Unauthorized".to_string())
        );
        assert_eq!(error_message(&json!({ "ok": false })), None);
    }

    #[test]
    fn test_delete_body_omits_missing_reason() {
        let body = serde_json::to_value(DeleteRequestBody { reason: None }).unwrap();
        assert_eq!(body, json!({}));
    }
}
