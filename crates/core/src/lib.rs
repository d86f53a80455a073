// ID Generator client core
//
// Everything the client does short of drawing a screen:
// - validation: login/registration form rules
// - session: persistent token/profile storage behind an injectable store
// - client: HTTP calls to the auth endpoints with outcome classification
// - guard: per-navigation access decisions
// - flows: the page logic tying the above together
//
// Key design decisions:
// - Storage is a trait so tests run on memory and the CLI runs on a file
// - The guard is a pure function; verification is a policy flag
// - Error Display strings are the messages shown to users

pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod guard;
pub mod models;
pub mod session;
pub mod telemetry;
pub mod validation;

pub use client::{AuthClient, LoginResponse, RegisterResponse};
pub use config::ClientConfig;
pub use error::{AuthError, AuthOperation, StorageError};
pub use flows::{FlowOutcome, Guarded, LoginForm, Notice, SocialProvider};
pub use guard::{classify, resolve, Access, GuardPolicy, Navigation, View};
pub use models::{Credential, RegistrationRequest, Session, UserProfile};
pub use session::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore};
pub use validation::{EmailDomainPolicy, ValidationError};
