// HTTP client for the auth endpoints
//
// Decision: Use reqwest with JSON bodies; the base URL is configurable
// Decision: Classify every outcome (success, rejected, network, unexpected)
// here so flows never look at status codes

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::{AuthError, AuthOperation};
use crate::models::{Credential, RegistrationRequest, UserProfile};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";

/// Successful login body. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginResponse {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

impl From<&Map<String, Value>> for LoginResponse {
    fn from(body: &Map<String, Value>) -> Self {
        Self {
            user: user_field(body),
            token: token_field(body),
        }
    }
}

/// Successful registration body (`success: true` already checked)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterResponse {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl From<&Map<String, Value>> for RegisterResponse {
    fn from(body: &Map<String, Value>) -> Self {
        Self {
            token: token_field(body),
            user: user_field(body),
        }
    }
}

/// What the register endpoint receives: trimmed fields, raw password,
/// no confirmation field.
#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    organization: &'a str,
    phone: &'a str,
}

impl<'a> From<&'a RegistrationRequest> for RegisterBody<'a> {
    fn from(req: &'a RegistrationRequest) -> Self {
        Self {
            name: req.name.trim(),
            email: req.email.trim(),
            password: &req.password,
            organization: req.organization.trim(),
            phone: req.phone.trim(),
        }
    }
}

/// Status plus whatever JSON the server returned (None if not JSON)
struct RawResponse {
    status: StatusCode,
    body: Option<Value>,
}

/// Client for `POST /api/auth/login` and `POST /api/auth/register`
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.api_url, config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in. Any 2xx is success; the body's `user` and `token` are optional.
    pub async fn login(&self, credential: &Credential) -> Result<LoginResponse, AuthError> {
        let op = AuthOperation::Login;
        let raw = self.post_json(op, LOGIN_PATH, credential).await?;

        if !raw.status.is_success() {
            let message = body_message(raw.body.as_ref(), &["error", "message"])
                .unwrap_or_else(|| op.fallback_message().to_string());
            tracing::warn!(status = raw.status.as_u16(), "login rejected");
            return Err(AuthError::Rejected {
                status: raw.status.as_u16(),
                message,
            });
        }

        let response = LoginResponse::from(&success_body(op, raw)?);
        tracing::info!(
            has_user = response.user.is_some(),
            has_token = response.token.is_some(),
            "login succeeded"
        );
        Ok(response)
    }

    /// Register. Success needs a 2xx status AND `success: true` in the body.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegisterResponse, AuthError> {
        let op = AuthOperation::Register;
        let raw = self
            .post_json(op, REGISTER_PATH, &RegisterBody::from(request))
            .await?;

        if raw.status.is_success() && !raw.body.as_ref().is_some_and(Value::is_object) {
            return Err(unexpected(op, raw.status, "body is not a JSON object"));
        }

        let accepted = raw
            .body
            .as_ref()
            .and_then(|b| b.get("success"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !raw.status.is_success() || !accepted {
            let message = body_message(raw.body.as_ref(), &["message"])
                .unwrap_or_else(|| op.fallback_message().to_string());
            tracing::warn!(
                status = raw.status.as_u16(),
                accepted,
                "registration rejected"
            );
            return Err(AuthError::Rejected {
                status: raw.status.as_u16(),
                message,
            });
        }

        let response = RegisterResponse::from(&success_body(op, raw)?);
        tracing::info!(has_token = response.token.is_some(), "registration succeeded");
        Ok(response)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        op: AuthOperation,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, operation = %op, "sending auth request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                tracing::error!(error = %source, operation = %op, "auth request failed");
                AuthError::Network {
                    operation: op,
                    source,
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| AuthError::Network {
            operation: op,
            source,
        })?;
        let body = serde_json::from_str::<Value>(&text).ok();
        if body.is_none() && !text.is_empty() {
            tracing::debug!(status = status.as_u16(), "response body is not JSON");
        }

        Ok(RawResponse { status, body })
    }
}

/// First non-empty string among `keys` in the body
fn body_message(body: Option<&Value>, keys: &[&str]) -> Option<String> {
    let body = body?;
    keys.iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// A 2xx body must be a JSON object; its contents are read leniently
fn success_body(op: AuthOperation, raw: RawResponse) -> Result<Map<String, Value>, AuthError> {
    match raw.body {
        Some(Value::Object(body)) => Ok(body),
        Some(_) => Err(unexpected(op, raw.status, "body is not a JSON object")),
        None => Err(unexpected(op, raw.status, "body is not JSON")),
    }
}

/// `user` when it is an object; anything else is ignored
fn user_field(body: &Map<String, Value>) -> Option<UserProfile> {
    match body.get("user")? {
        Value::Object(user) => Some(UserProfile::from(user.clone())),
        Value::Null => None,
        other => {
            tracing::warn!(kind = json_kind(other), "ignoring user that is not an object");
            None
        }
    }
}

/// `token` as text. Numbers and booleans are stringified, the way browser
/// storage would keep them.
fn token_field(body: &Map<String, Value>) -> Option<String> {
    match body.get("token")? {
        Value::String(token) if !token.is_empty() => Some(token.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::String(_) | Value::Null => None,
        other => {
            tracing::warn!(kind = json_kind(other), "ignoring token that is not a scalar");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unexpected(op: AuthOperation, status: StatusCode, detail: &str) -> AuthError {
    tracing::warn!(status = status.as_u16(), operation = %op, detail, "unexpected auth response");
    AuthError::UnexpectedResponse {
        operation: op,
        status: status.as_u16(),
        detail: detail.to_string(),
    }
}
