//! HTTP client wrapper
//!
//! [`Transport`] is the seam every backend call goes through. [`HttpTransport`]
//! is the reqwest implementation: it prefixes the resolved API base, attaches the
//! bearer token, sends JSON or multipart bodies and turns non-2xx statuses into
//! [`ApiError::Http`]. Envelope codes are not interpreted here.

use crate::core::error::ApiError;
use crate::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A file attached to a multipart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name sent in the part header
    pub file_name: String,
    /// MIME type
    pub mime: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Build an upload from memory
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension
    ///
    /// # Errors
    /// Returns an error if the file cannot be read
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = guess_mime(&file_name);
        Ok(Self::new(file_name, mime, bytes))
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// One named part of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// JSON document sent as `application/json`
    Json(Value),
    /// File
    File(Upload),
}

/// `multipart/form-data` body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    parts: Vec<(String, Part)>,
}

impl MultipartBody {
    /// Empty body
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a JSON part
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if `value` cannot be serialized
    pub fn json<T: Serialize>(mut self, name: &str, value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.parts.push((name.to_string(), Part::Json(value)));
        Ok(self)
    }

    /// Add a file part when `upload` is present
    #[must_use]
    pub fn file(mut self, name: &str, upload: Option<Upload>) -> Self {
        if let Some(upload) = upload {
            self.parts.push((name.to_string(), Part::File(upload)));
        }
        self
    }

    /// Parts in insertion order
    #[must_use]
    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }

    /// Part named `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in self.parts {
            let part = match part {
                Part::Json(value) => reqwest::multipart::Part::text(value.to_string())
                    .mime_str("application/json"),
                Part::File(upload) => reqwest::multipart::Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&upload.mime),
            }
            .map_err(|e| ApiError::Decode(e.to_string()))?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body and no `Content-Type`
    #[default]
    Empty,
    /// JSON document
    Json(Value),
    /// Multipart form
    Multipart(MultipartBody),
}

/// A backend call, relative to the API base
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Method
    pub method: Method,
    /// Path starting with `/`
    pub path: String,
    /// Query pairs, unencoded
    pub query: Vec<(String, String)>,
    /// Body
    pub body: RequestBody,
    /// Bearer token
    pub token: Option<String>,
}

impl ApiRequest {
    /// Request without body or token
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            token: None,
        }
    }

    /// GET `path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST `path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// PUT `path`
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// DELETE `path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if `body` cannot be serialized
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart body
    #[must_use]
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Add a query pair
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Attach a bearer token; `None` leaves the request anonymous
    #[must_use]
    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Something that can execute an [`ApiRequest`] and return the parsed body
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`; 2xx bodies come back parsed, everything else is an error
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed [`Transport`]
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base: String,
}

impl HttpTransport {
    /// Client rooted at `base` (e.g. `http://localhost:8080/api/v1`)
    ///
    /// Cookies are kept across calls, like a browser sending credentials.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] if the underlying client cannot be built
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(crate::shared::user_agent())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// API base every path is appended to
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path`
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base)
        } else {
            format!("{}/{path}", self.base)
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.url(&request.path);
        debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method.into(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Network(format!("invalid token header: {e}")))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            RequestBody::Multipart(body) => builder.multipart(body.into_form()?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let body = parse_body(&text);

        if !status.is_success() {
            let err = http_error(status.as_u16(), &body);
            warn!("{} {url} failed: {err}", request.method);
            return Err(err);
        }
        Ok(body)
    }
}

/// Parse a response body: JSON when possible, otherwise the raw text; empty is `Null`
#[must_use]
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// `body.message ?? body.error ?? "HTTP {status}"`
#[must_use]
pub fn error_message(status: u16, body: &Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).filter(|v| !v.is_null()))
        .map_or_else(
            || format!("HTTP {status}"),
            |v| v.as_str().map_or_else(|| v.to_string(), str::to_string),
        )
}

/// Build the error for a non-2xx response
#[must_use]
pub fn http_error(status: u16, body: &Value) -> ApiError {
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_string);
    ApiError::Http {
        status,
        code,
        message: error_message(status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_prefers_message_then_error_then_status() {
        assert_eq!(error_message(400, &json!({"message": "bad", "error": "x"})), "bad");
        assert_eq!(error_message(400, &json!({"message": null, "error": "Bad Request"})), "Bad Request");
        assert_eq!(error_message(502, &json!({})), "HTTP 502");
        assert_eq!(error_message(500, &Value::String("oops".into())), "HTTP 500");
    }

    #[test]
    fn empty_message_string_is_kept() {
        assert_eq!(error_message(400, &json!({"message": "", "error": "x"})), "");
    }

    #[test]
    fn body_falls_back_to_text() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("deleted"), Value::String("deleted".into()));
    }

    #[test]
    fn url_joins_base_and_path() {
        let transport = HttpTransport::new("http://localhost:8080/api/v1/").unwrap();
        assert_eq!(transport.url("/group/1/plan"), "http://localhost:8080/api/v1/group/1/plan");
        assert_eq!(transport.url("auth/login"), "http://localhost:8080/api/v1/auth/login");
    }

    #[test]
    fn multipart_skips_missing_file() {
        let body = MultipartBody::new()
            .json("activity", &json!({"title": "t"}))
            .unwrap()
            .file("image", None);
        assert_eq!(body.parts().len(), 1);
        assert!(matches!(body.get("activity"), Some(Part::Json(_))));
    }

    #[test]
    fn mime_guess_covers_common_images() {
        assert_eq!(guess_mime("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime("a.png"), "image/png");
        assert_eq!(guess_mime("notes"), "application/octet-stream");
    }
}
