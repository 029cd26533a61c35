//! HTTP client for the Graph API.
//!
//! [`GraphClient`] wraps a single [`reqwest::Client`] and exposes one
//! generic authenticated request path plus typed wrappers for the
//! endpoints the workflow core consumes.  Credentials are passed per
//! call as bearer tokens; the client itself holds no secrets.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::types::{
    CalendarEvent, CreatedEvent, DriveItem, MailMessage, WorkbookRange, Worksheet,
};

/// Default Graph API root.
const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Authenticated Graph API client.
///
/// Cheap to clone — the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GraphClient {
    /// API root all endpoint paths are relative to.
    base_url: String,
    /// HTTP client for making requests.
    http: reqwest::Client,
}

impl GraphClient {
    /// Create a client against the default Graph API root.
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("samara/0.1")
            .build()
            .unwrap_or_default();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    /// Create a client against a custom API root (test servers, national
    /// cloud deployments).
    pub fn with_base_url(base_url: &str) -> Self {
        let mut client = Self::new();
        client.base_url = base_url.trim_end_matches('/').to_string();
        client
    }

    // -----------------------------------------------------------------------
    // Generic request path
    // -----------------------------------------------------------------------

    /// Build a full API URL from a relative endpoint path.
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send an authenticated JSON request and parse the JSON response.
    ///
    /// Non-success responses become [`GraphError::Api`] with the message
    /// taken from the structured `error.message` body field when present.
    /// Endpoints that reply with an empty body (e.g. `sendMail` returning
    /// 202) yield [`Value::Null`].
    pub async fn request(
        &self,
        endpoint: &str,
        token: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.api_url(endpoint);
        debug!(method = %method, url = %url, "graph request");

        let mut builder = self
            .http
            .request(method, &url)
            .bearer_auth(token)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body_text));
        }

        parse_json_body(endpoint, &body_text)
    }

    /// Upload plain-text content to a drive item, replacing its bytes.
    ///
    /// This is the one endpoint that takes a raw body instead of JSON.
    pub async fn upload_text(&self, token: &str, item_id: &str, content: &str) -> Result<()> {
        let endpoint = format!("/me/drive/items/{item_id}/content");
        let url = self.api_url(&endpoint);
        debug!(url = %url, bytes = content.len(), "uploading text content");

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(content.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body_text));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Drive
    // -----------------------------------------------------------------------

    /// List children of the drive root, optionally with an OData filter.
    pub async fn list_children(&self, token: &str, filter: Option<&str>) -> Result<Vec<DriveItem>> {
        let endpoint = match filter {
            Some(filter) => format!("/me/drive/root/children?$filter={filter}"),
            None => "/me/drive/root/children?$top=50".to_string(),
        };
        let value = self.request(&endpoint, token, Method::GET, None).await?;
        collection(&endpoint, value)
    }

    /// List spreadsheet files (name suffix `.xlsx`) at the drive root.
    pub async fn list_spreadsheets(&self, token: &str) -> Result<Vec<DriveItem>> {
        self.list_children(token, Some("endswith(name,'.xlsx')"))
            .await
    }

    /// Fetch metadata for a single drive item.
    pub async fn get_item(&self, token: &str, item_id: &str) -> Result<DriveItem> {
        let endpoint = format!("/me/drive/items/{item_id}");
        let value = self.request(&endpoint, token, Method::GET, None).await?;
        serde_json::from_value(value).map_err(GraphError::from)
    }

    /// Create an empty file node at the drive root.  Name collisions are
    /// resolved by renaming, matching the workflow's "always produce a
    /// file" behavior.
    pub async fn create_file(
        &self,
        token: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<DriveItem> {
        let file = match mime_type {
            Some(mime) => json!({ "mimeType": mime }),
            None => json!({}),
        };
        let body = json!({
            "name": name,
            "file": file,
            "@microsoft.graph.conflictBehavior": "rename",
        });
        let value = self
            .request("/me/drive/root/children", token, Method::POST, Some(&body))
            .await?;
        serde_json::from_value(value).map_err(GraphError::from)
    }

    // -----------------------------------------------------------------------
    // Workbook
    // -----------------------------------------------------------------------

    /// List the worksheets of a workbook file.
    pub async fn list_worksheets(&self, token: &str, item_id: &str) -> Result<Vec<Worksheet>> {
        let endpoint = format!("/me/drive/items/{item_id}/workbook/worksheets");
        let value = self.request(&endpoint, token, Method::GET, None).await?;
        collection(&endpoint, value)
    }

    /// Read a bounded cell range from a worksheet.
    pub async fn read_range(
        &self,
        token: &str,
        item_id: &str,
        worksheet_id: &str,
        address: &str,
    ) -> Result<WorkbookRange> {
        let endpoint = format!(
            "/me/drive/items/{item_id}/workbook/worksheets/{worksheet_id}/range(address='{address}')"
        );
        let value = self.request(&endpoint, token, Method::GET, None).await?;
        serde_json::from_value(value).map_err(GraphError::from)
    }

    // -----------------------------------------------------------------------
    // Mail & calendar
    // -----------------------------------------------------------------------

    /// Send a mail message as the signed-in user.
    pub async fn send_mail(&self, token: &str, message: &MailMessage) -> Result<()> {
        let body = json!({ "message": message });
        self.request("/me/sendMail", token, Method::POST, Some(&body))
            .await?;
        Ok(())
    }

    /// Create a calendar event as the signed-in user.
    pub async fn create_event(&self, token: &str, event: &CalendarEvent) -> Result<CreatedEvent> {
        let body = serde_json::to_value(event)?;
        let value = self
            .request("/me/events", token, Method::POST, Some(&body))
            .await?;
        serde_json::from_value(value).map_err(GraphError::from)
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Response shaping helpers
// ---------------------------------------------------------------------------

/// Shape a non-success response into [`GraphError::Api`].
fn api_error(status: u16, body_text: &str) -> GraphError {
    let message = serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("http status {status}"));
    GraphError::Api { status, message }
}

/// Parse a response body as JSON, treating an empty body as `null`.
fn parse_json_body(endpoint: &str, body_text: &str) -> Result<Value> {
    if body_text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body_text).map_err(|e| GraphError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the `value` array of a collection response and deserialize
/// each element.
fn collection<T: serde::de::DeserializeOwned>(endpoint: &str, value: Value) -> Result<Vec<T>> {
    let items = value
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| GraphError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: "missing `value` collection".to_string(),
        })?;
    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(GraphError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_base_and_endpoint() {
        let client = GraphClient::with_base_url("https://example.test/v1.0/");
        assert_eq!(
            client.api_url("/me/sendMail"),
            "https://example.test/v1.0/me/sendMail"
        );
    }

    #[test]
    fn api_error_prefers_structured_message() {
        let err = api_error(403, r#"{"error": {"code": "accessDenied", "message": "Forbidden by policy"}}"#);
        match err {
            GraphError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden by policy");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_status_line() {
        let err = api_error(502, "<html>bad gateway</html>");
        match err {
            GraphError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "http status 502");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_parses_as_null() {
        let value = parse_json_body("/me/sendMail", "").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn collection_rejects_missing_value_array() {
        let result: Result<Vec<DriveItem>> = collection("/x", json!({"count": 3}));
        assert!(matches!(
            result,
            Err(GraphError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn collection_extracts_items() {
        let value = json!({"value": [
            {"id": "a", "name": "One.xlsx"},
            {"id": "b", "name": "Two.xlsx"}
        ]});
        let items: Vec<DriveItem> = collection("/x", value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "Two.xlsx");
    }
}
