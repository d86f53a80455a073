// Route guard
// Decision: One pure classification function with a policy flag instead of
// separate guards for "signed in" and "signed in and verified"
// Decision: Stateless; every navigation re-reads the session from scratch

use serde::Serialize;

use crate::models::Session;

/// Views a caller can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    GenerateId,
    VerifyEmail,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Home => "/",
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::GenerateId => "/generate",
            View::VerifyEmail => "/verify-email",
        }
    }

    /// Views that require an authenticated session
    pub fn is_protected(&self) -> bool {
        matches!(self, View::Dashboard | View::GenerateId)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        [
            View::Home,
            View::Login,
            View::Register,
            View::Dashboard,
            View::GenerateId,
            View::VerifyEmail,
        ]
        .into_iter()
        .find(|v| v.path() == path)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// What the session allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Unauthenticated,
    NeedsVerification,
    Authorized,
}

impl Access {
    /// Where a protected view sends a caller who is not authorized
    pub fn redirect_target(&self) -> Option<View> {
        match self {
            Access::Unauthenticated => Some(View::Login),
            Access::NeedsVerification => Some(View::VerifyEmail),
            Access::Authorized => None,
        }
    }
}

/// Whether the guard demands a verified email
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    pub require_verified: bool,
}

impl GuardPolicy {
    pub fn verified() -> Self {
        Self {
            require_verified: true,
        }
    }
}

/// Result of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "view", rename_all = "snake_case")]
pub enum Navigation {
    Render(View),
    Redirect(View),
}

/// Classify a session. Both token and user must be present to be signed in.
pub fn classify(session: &Session, policy: GuardPolicy) -> Access {
    let Some(user) = session.user.as_ref().filter(|_| session.token.is_some()) else {
        return Access::Unauthenticated;
    };
    if policy.require_verified && !user.is_verified() {
        return Access::NeedsVerification;
    }
    Access::Authorized
}

/// Decide whether to render `view` or redirect elsewhere.
///
/// Protected views follow [`classify`]. Login and Register are guest-only:
/// Login bounces to Home when a profile is stored, Register bounces to
/// Dashboard when a token is stored.
pub fn resolve(view: View, session: &Session, policy: GuardPolicy) -> Navigation {
    if view.is_protected() {
        let access = classify(session, policy);
        return match access.redirect_target() {
            Some(target) => {
                tracing::debug!(requested = %view, redirect = %target, ?access, "navigation redirected");
                Navigation::Redirect(target)
            }
            None => Navigation::Render(view),
        };
    }
    match view {
        View::Login if session.user.is_some() => Navigation::Redirect(View::Home),
        View::Register if session.token.is_some() => Navigation::Redirect(View::Dashboard),
        _ => Navigation::Render(view),
    }
}
