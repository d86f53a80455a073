// Domain types shared by the client, the session store and the guard
//
// Decision: UserProfile is the server's JSON object as-is; a mistyped field
// never fails a login, it just displays as missing

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DISPLAY_DATE: &str = "%b %-d, %Y";
const INVALID_DATE: &str = "Invalid Date";

/// Email/password pair submitted to log in. Exists only for one submit.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form values.
///
/// `confirm_password` and `agreed_to_terms` are local-only; they are checked
/// by validation and never sent to the server.
#[derive(Clone, Default)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub organization: String,
    pub phone: String,
    pub agreed_to_terms: bool,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("organization", &self.organization)
            .field("phone", &self.phone)
            .field("agreed_to_terms", &self.agreed_to_terms)
            .finish_non_exhaustive()
    }
}

/// Server-issued profile, kept as the JSON object the server sent.
///
/// Nothing about its shape is enforced. The accessors read the handful of
/// fields the client displays and tolerate missing or oddly typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    /// Set a field, builder style
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// `name` when it is a non-empty string
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// `email` when it is a non-empty string
    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    /// Name for greetings, falling back to "User"
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("User")
    }

    /// `isVerified: true`, or the string `"true"` some backends send
    pub fn is_verified(&self) -> bool {
        match self.0.get("isVerified") {
            Some(Value::Bool(verified)) => *verified,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Account creation date as `Jan 5, 2025`, `N/A` when absent
    pub fn member_since(&self) -> String {
        match self.0.get("createdAt") {
            None | Some(Value::Null) => format_date(None),
            Some(Value::String(s)) => format_date(Some(s)),
            // epoch milliseconds
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.date_naive().format(DISPLAY_DATE).to_string())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            Some(_) => INVALID_DATE.to_string(),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Format a server timestamp for display.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates; the date is taken
/// in UTC. Missing input gives `N/A`, unparseable input `Invalid Date`.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc().date())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match date {
        Ok(date) => date.format(DISPLAY_DATE).to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// The locally held identity: token and profile, each independently present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// Authenticated only when both halves are present
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}
