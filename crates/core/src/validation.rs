// Form validation for login and registration
//
// Rules run in a fixed order and the first violation wins; there is no
// multi-error aggregation. Validation runs before any request is dispatched.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{Credential, RegistrationRequest};

// =============================================================================
// Policy constants
// =============================================================================

/// Minimum password length accepted by the login form.
pub const MIN_LOGIN_PASSWORD_CHARS: usize = 6;

/// Minimum password length accepted at registration.
pub const MIN_REGISTER_PASSWORD_CHARS: usize = 8;

/// Symbols that satisfy the "special character" class of the password policy.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Email providers accepted at registration unless configured otherwise.
pub const DEFAULT_ALLOWED_EMAIL_DOMAINS: [&str; 3] = ["gmail.com", "outlook.com", "yahoo.com"];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

// =============================================================================
// Errors
// =============================================================================

/// First rule a form violated. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Name is required")]
    NameRequired,

    #[error("Please use a valid email provider ({providers})")]
    DisallowedEmailDomain { providers: String },

    #[error("Password must be at least 8 characters and include uppercase, lowercase, number, and special character")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("You must agree to the terms and conditions")]
    TermsNotAccepted,
}

// =============================================================================
// Email domain policy
// =============================================================================

/// Allow-list of email domains accepted at registration.
///
/// `None` means every domain is accepted. Matching is exact, so
/// `Gmail.com` is not `gmail.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDomainPolicy {
    allowed: Option<Vec<String>>,
}

impl Default for EmailDomainPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EMAIL_DOMAINS)
    }
}

impl EmailDomainPolicy {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(domains.into_iter().map(Into::into).collect()),
        }
    }

    /// Accept any domain.
    pub fn any() -> Self {
        Self { allowed: None }
    }

    /// Parse a comma-separated list. `*` accepts any domain; an empty list
    /// falls back to the defaults.
    pub fn from_list(list: &str) -> Self {
        let trimmed = list.trim();
        if trimmed == "*" {
            return Self::any();
        }
        let domains: Vec<String> = trimmed
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if domains.is_empty() {
            Self::default()
        } else {
            Self::new(domains)
        }
    }

    pub fn allows(&self, domain: &str) -> bool {
        match &self.allowed {
            Some(list) => list.iter().any(|d| d == domain),
            None => true,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.allowed.is_some()
    }

    /// Provider names for the error message: `gmail, outlook, yahoo`
    pub fn provider_names(&self) -> String {
        match &self.allowed {
            Some(list) => list
                .iter()
                .map(|d| d.split('.').next().unwrap_or(d.as_str()))
                .collect::<Vec<_>>()
                .join(", "),
            None => "any".to_string(),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Basic `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Segment after the first `@`, if it is non-empty.
pub fn email_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1).filter(|d| !d.is_empty())
}

/// Password length in UTF-16 code units, the unit web forms measure in.
/// Characters outside the Basic Multilingual Plane count twice.
pub fn password_length(password: &str) -> usize {
    password.encode_utf16().count()
}

/// Registration password policy: length, no line breaks, and one character
/// from each of lowercase, uppercase, digit and [`PASSWORD_SYMBOLS`].
pub fn is_strong_password(password: &str) -> bool {
    if password_length(password) < MIN_REGISTER_PASSWORD_CHARS {
        return false;
    }
    if password
        .chars()
        .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
    {
        return false;
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    has_lower && has_upper && has_digit && has_symbol
}

/// Validate the login form
pub fn validate_login(credential: &Credential) -> Result<(), ValidationError> {
    if credential.email.trim().is_empty() || credential.password.trim().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    if !is_valid_email(&credential.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password_length(&credential.password) < MIN_LOGIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_LOGIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

/// Validate the registration form against the given domain policy
pub fn validate_registration(
    request: &RegistrationRequest,
    domains: &EmailDomainPolicy,
) -> Result<(), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !is_valid_email(&request.email) {
        return Err(ValidationError::InvalidEmail);
    }
    match email_domain(&request.email) {
        Some(domain) if domains.allows(domain) => {}
        _ => {
            tracing::debug!(policy = %domains.provider_names(), "email domain not allowed");
            return Err(ValidationError::DisallowedEmailDomain {
                providers: domains.provider_names(),
            });
        }
    }
    if !is_strong_password(&request.password) {
        return Err(ValidationError::WeakPassword);
    }
    if request.password != request.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if !request.agreed_to_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}
