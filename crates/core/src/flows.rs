// Page flows: what each screen does with the store, the validators and the client
//
// Decision: Flows return a redirect target plus a typed Notice; rendering is
// the caller's job
// Decision: Failures come back as AuthError and never touch the session

use serde::Serialize;

use crate::client::AuthClient;
use crate::error::{AuthError, StorageError};
use crate::guard::{resolve, GuardPolicy, Navigation, View};
use crate::models::{Credential, RegistrationRequest, UserProfile};
use crate::session::SessionStore;
use crate::validation::{validate_login, validate_registration, EmailDomainPolicy};

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful! Redirecting...";
pub const REGISTER_SUCCESS_MESSAGE: &str = "Registration successful! Redirecting to login...";
pub const GENERATE_ID_PLACEHOLDER: &str = "ID Card Generator page will be here.";

/// Inline message shown under a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(t) | Notice::Info(t) | Notice::Error(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl From<&AuthError> for Notice {
    fn from(err: &AuthError) -> Self {
        Notice::Error(err.user_message())
    }
}

/// Result of a successful submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowOutcome {
    pub redirect: View,
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Login form state, including the remember-me checkbox
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub credential: Credential,
    pub remember_me: bool,
}

impl LoginForm {
    /// Empty form, pre-filled with the remembered email if there is one
    pub fn prefill(store: &SessionStore) -> Result<Self, StorageError> {
        let mut form = Self::default();
        if let Some(email) = store.remembered_email()? {
            form.credential.email = email;
            form.remember_me = true;
        }
        Ok(form)
    }
}

/// Submit the login form.
///
/// The remember-me preference is saved before the request goes out. On
/// success `user` and `token` are stored independently, whichever came back.
pub async fn submit_login(
    client: &AuthClient,
    store: &SessionStore,
    form: &LoginForm,
) -> Result<FlowOutcome, AuthError> {
    validate_login(&form.credential)?;

    if form.remember_me {
        store.remember_email(&form.credential.email)?;
    } else {
        store.forget_email()?;
    }

    let response = client.login(&form.credential).await?;

    if let Some(user) = &response.user {
        store.set_user(user)?;
    }
    if let Some(token) = &response.token {
        store.set_token(token)?;
    }

    Ok(FlowOutcome {
        redirect: View::Home,
        notice: Notice::Success(LOGIN_SUCCESS_MESSAGE.to_string()),
        user: response.user,
    })
}

/// Submit the registration form.
///
/// Success sends the caller to Login, not into the protected area. A token
/// in the response is stored (with the profile, when present).
pub async fn submit_register(
    client: &AuthClient,
    store: &SessionStore,
    request: &RegistrationRequest,
    domains: &EmailDomainPolicy,
) -> Result<FlowOutcome, AuthError> {
    validate_registration(request, domains)?;

    let response = client.register(request).await?;

    if let Some(token) = &response.token {
        store.set_token(token)?;
        if let Some(user) = &response.user {
            store.set_user(user)?;
        }
    }

    Ok(FlowOutcome {
        redirect: View::Login,
        notice: Notice::Success(REGISTER_SUCCESS_MESSAGE.to_string()),
        user: response.user,
    })
}

/// Forgot-password link. Reset is not implemented server side.
pub fn forgot_password(email: &str) -> Notice {
    if email.is_empty() {
        Notice::Error("Please enter your email address first".to_string())
    } else {
        Notice::Info(format!(
            "Password reset link will be sent to {} (Feature in development)",
            email
        ))
    }
}

/// Third-party sign-in offered on the login page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SocialProvider {
    Google,
    GitHub,
}

impl std::fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SocialProvider::Google => "Google",
            SocialProvider::GitHub => "GitHub",
        })
    }
}

impl std::str::FromStr for SocialProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(SocialProvider::Google),
            "github" => Ok(SocialProvider::GitHub),
            other => Err(format!("unknown provider '{}' (expected google or github)", other)),
        }
    }
}

/// Social sign-in is not wired to any provider yet; the page only says so.
/// Shown in the form's error slot, like a failed login.
pub fn social_login(provider: SocialProvider) -> Notice {
    tracing::debug!(%provider, "social login requested");
    Notice::Error(format!(
        "Connecting with {}... (Feature in development)",
        provider
    ))
}

/// Log out: drop token and profile, go to Login
pub fn logout(store: &SessionStore) -> Result<View, StorageError> {
    store.clear()?;
    tracing::info!("logged out");
    Ok(View::Login)
}

/// A protected page: either its content or where to go instead
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Guarded<T> {
    Allowed(T),
    Redirect(View),
}

/// What the dashboard header shows about the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub display_name: String,
    pub email: Option<String>,
    pub member_since: String,
    pub verified: bool,
}

impl From<&UserProfile> for DashboardSummary {
    fn from(user: &UserProfile) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            email: user.email().map(str::to_string),
            member_since: user.member_since(),
            verified: user.is_verified(),
        }
    }
}

pub fn dashboard(
    store: &SessionStore,
    policy: GuardPolicy,
) -> Result<Guarded<DashboardSummary>, StorageError> {
    let session = store.get()?;
    Ok(match resolve(View::Dashboard, &session, policy) {
        Navigation::Render(_) => {
            let user = session.user.unwrap_or_default();
            Guarded::Allowed(DashboardSummary::from(&user))
        }
        Navigation::Redirect(target) => Guarded::Redirect(target),
    })
}

/// ID-card generation is a placeholder page behind the guard
pub fn generate_id(
    store: &SessionStore,
    policy: GuardPolicy,
) -> Result<Guarded<&'static str>, StorageError> {
    let session = store.get()?;
    Ok(match resolve(View::GenerateId, &session, policy) {
        Navigation::Render(_) => Guarded::Allowed(GENERATE_ID_PLACEHOLDER),
        Navigation::Redirect(target) => Guarded::Redirect(target),
    })
}

/// Static marketing content for the landing page
#[derive(Debug, Clone, Serialize)]
pub struct HomeContent {
    pub title: &'static str,
    pub tagline: &'static str,
    pub features: Vec<(&'static str, &'static str)>,
}

pub fn home() -> HomeContent {
    HomeContent {
        title: "Why Choose Our ProID Studio?",
        tagline: "We provide the most comprehensive ID card solutions for businesses, schools, and organizations",
        features: vec![
            (
                "Quick & Easy",
                "Create professional ID cards in minutes with our intuitive interface",
            ),
            (
                "Secure & Reliable",
                "Advanced security features to protect your organization's identity",
            ),
            (
                "Fully Customizable",
                "Design ID cards that match your organization's brand and style",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forgot_password_notice() {
        assert_eq!(
            forgot_password(""),
            Notice::Error("Please enter your email address first".to_string())
        );
        let notice = forgot_password("ada@gmail.com");
        assert!(!notice.is_error());
        assert_eq!(
            notice.text(),
            "Password reset link will be sent to ada@gmail.com (Feature in development)"
        );
    }

    #[test]
    fn test_social_login_is_a_placeholder() {
        let provider: SocialProvider = "GitHub".parse().unwrap();
        assert_eq!(
            social_login(provider),
            Notice::Error("Connecting with GitHub... (Feature in development)".to_string())
        );
        assert_eq!(
            social_login(SocialProvider::Google).text(),
            "Connecting with Google... (Feature in development)"
        );
        assert!("facebook".parse::<SocialProvider>().is_err());
    }

    #[test]
    fn test_auth_error_becomes_error_notice() {
        let err = AuthError::Rejected {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(
            Notice::from(&err),
            Notice::Error("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_prefill_uses_remembered_email() {
        let store = SessionStore::in_memory();
        let form = LoginForm::prefill(&store).unwrap();
        assert!(form.credential.email.is_empty());
        assert!(!form.remember_me);

        store.remember_email("ada@gmail.com").unwrap();
        let form = LoginForm::prefill(&store).unwrap();
        assert_eq!(form.credential.email, "ada@gmail.com");
        assert!(form.remember_me);
    }

    #[test]
    fn test_logout_clears_session() {
        let store = SessionStore::in_memory();
        store.set("tok", &UserProfile::default()).unwrap();
        assert_eq!(logout(&store).unwrap(), View::Login);
        assert!(!store.get().unwrap().is_authenticated());
    }

    #[test]
    fn test_dashboard_is_guarded() {
        let store = SessionStore::in_memory();
        assert_eq!(
            dashboard(&store, GuardPolicy::default()).unwrap(),
            Guarded::Redirect(View::Login)
        );

        let user = UserProfile::default()
            .with("name", "Ada")
            .with("email", "ada@gmail.com")
            .with("createdAt", "2025-03-09T08:00:00Z");
        store.set("tok", &user).unwrap();
        assert_eq!(
            dashboard(&store, GuardPolicy::default()).unwrap(),
            Guarded::Allowed(DashboardSummary {
                display_name: "Ada".to_string(),
                email: Some("ada@gmail.com".to_string()),
                member_since: "Mar 9, 2025".to_string(),
                verified: false,
            })
        );
        assert_eq!(
            dashboard(&store, GuardPolicy::verified()).unwrap(),
            Guarded::Redirect(View::VerifyEmail)
        );
    }

    #[test]
    fn test_generate_id_placeholder() {
        let store = SessionStore::in_memory();
        assert_eq!(
            generate_id(&store, GuardPolicy::default()).unwrap(),
            Guarded::Redirect(View::Login)
        );
        store.set("tok", &UserProfile::default()).unwrap();
        assert_eq!(
            generate_id(&store, GuardPolicy::default()).unwrap(),
            Guarded::Allowed(GENERATE_ID_PLACEHOLDER)
        );
    }

    #[test]
    fn test_home_content_is_static() {
        let content = home();
        assert_eq!(content.features.len(), 3);
        assert!(content.title.contains("ProID"));
    }
}
