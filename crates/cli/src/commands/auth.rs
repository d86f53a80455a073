// Sign-in, registration and sign-out commands

use anyhow::{Context as _, Result};
use idgen_core::flows::{self, FlowOutcome, LoginForm};
use idgen_core::{
    resolve, AuthClient, AuthError, EmailDomainPolicy, Navigation, Notice, RegistrationRequest,
    SocialProvider, View,
};

use super::{fail_with_notice, AlreadyReported, Context};
use crate::output::{print_field, print_notice};

fn auth_client(ctx: &Context) -> Result<AuthClient> {
    AuthClient::from_config(&ctx.config).context("Failed to build HTTP client")
}

/// Guest-only pages bounce signed-in users elsewhere
fn guest_redirect(ctx: &Context, view: View) -> Result<Option<View>> {
    let session = ctx.store.get()?;
    Ok(match resolve(view, &session, ctx.config.guard) {
        Navigation::Redirect(target) => Some(target),
        Navigation::Render(_) => None,
    })
}

/// Show the outcome of a submit, or the failure as the form's inline error
fn report(ctx: &Context, result: Result<FlowOutcome, AuthError>) -> Result<()> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(error = ?err, "submit failed");
            return Err(fail_with_notice(ctx, &Notice::from(&err)));
        }
    };
    report_outcome(ctx, &outcome)
}

fn report_outcome(ctx: &Context, outcome: &FlowOutcome) -> Result<()> {
    if !ctx.output.is_text() {
        return ctx.output.print_value(outcome);
    }
    if ctx.quiet {
        return Ok(());
    }
    print_notice(&outcome.notice);
    if let Some(user) = &outcome.user {
        print_field("Name", user.display_name());
        if let Some(email) = user.email() {
            print_field("Email", email);
        }
    }
    print_field("Next", outcome.redirect.path());
    Ok(())
}

pub async fn login(
    ctx: &Context,
    email: Option<String>,
    password: String,
    remember_me: bool,
) -> Result<()> {
    if let Some(target) = guest_redirect(ctx, View::Login)? {
        if !ctx.quiet {
            print_notice(&Notice::Info(
                "Already signed in. Run `idgen logout` to switch accounts.".to_string(),
            ));
            print_field("Next", target.path());
        }
        return Ok(());
    }

    let mut form = LoginForm::prefill(&ctx.store)?;
    let used_remembered = email.is_none() && form.remember_me;
    if let Some(email) = email {
        form.credential.email = email;
    }
    form.credential.password = password;
    form.remember_me = remember_me || used_remembered;

    let client = auth_client(ctx)?;
    report(ctx, flows::submit_login(&client, &ctx.store, &form).await)
}

pub async fn register(
    ctx: &Context,
    request: RegistrationRequest,
    domains: &EmailDomainPolicy,
) -> Result<()> {
    if let Some(target) = guest_redirect(ctx, View::Register)? {
        if !ctx.quiet {
            print_notice(&Notice::Info("A session already exists.".to_string()));
            print_field("Next", target.path());
        }
        return Ok(());
    }

    let client = auth_client(ctx)?;
    report(
        ctx,
        flows::submit_register(&client, &ctx.store, &request, domains).await,
    )
}

pub fn logout(ctx: &Context) -> Result<()> {
    let next = flows::logout(&ctx.store)?;
    if !ctx.output.is_text() {
        return ctx
            .output
            .print_value(&serde_json::json!({ "logged_out": true, "redirect": next }));
    }
    if !ctx.quiet {
        print_notice(&Notice::Success("Signed out".to_string()));
        print_field("Next", next.path());
    }
    Ok(())
}

pub fn forgot_password(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => ctx.store.remembered_email()?.unwrap_or_default(),
    };
    let notice = flows::forgot_password(&email);

    if !ctx.output.is_text() {
        ctx.output.print_value(&notice)?;
    } else {
        print_notice(&notice);
    }

    if notice.is_error() {
        return Err(AlreadyReported.into());
    }
    Ok(())
}

pub fn social_login(ctx: &Context, provider: SocialProvider) -> Result<()> {
    Err(fail_with_notice(ctx, &flows::social_login(provider)))
}
