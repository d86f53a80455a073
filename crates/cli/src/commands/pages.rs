// Page commands: session status, guarded pages and the landing page

use anyhow::Result;
use idgen_core::flows::{self, Guarded};
use idgen_core::{classify, resolve, Navigation, Notice, View};
use serde_json::json;

use super::{AlreadyReported, Context};
use crate::output::{print_field, print_notice};

fn print_redirect(ctx: &Context, requested: View, target: View) -> Result<()> {
    if !ctx.output.is_text() {
        return ctx
            .output
            .print_value(&json!({ "requested": requested, "redirect": target }));
    }
    let hint = match target {
        View::Login => "Sign in first with `idgen login`.",
        View::VerifyEmail => "Verify your email address to continue.",
        _ => "",
    };
    print_notice(&Notice::Error(format!(
        "{} is not available. {}",
        requested.path(),
        hint
    )));
    print_field("Redirect", target.path());
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let session = ctx.store.get()?;
    let access = classify(&session, ctx.config.guard);

    if !ctx.output.is_text() {
        return ctx.output.print_value(&json!({
            "access": access,
            "has_token": session.token.is_some(),
            "user": session.user,
        }));
    }

    if ctx.quiet {
        println!("{}", serde_json::to_string(&access)?.trim_matches('"'));
        return Ok(());
    }

    print_field("Access", &format!("{:?}", access));
    print_field("Token", if session.token.is_some() { "stored" } else { "-" });
    match &session.user {
        Some(user) => {
            print_field("Name", user.display_name());
            print_field("Email", user.email().unwrap_or("-"));
            print_field("Verified", if user.is_verified() { "yes" } else { "no" });
        }
        None => print_field("User", "-"),
    }
    if let Some(email) = ctx.store.remembered_email()? {
        print_field("Remembered", &email);
    }
    Ok(())
}

pub fn open(ctx: &Context, path: &str) -> Result<()> {
    let Some(view) = View::from_path(path) else {
        anyhow::bail!("Unknown page: {}", path);
    };
    let session = ctx.store.get()?;
    let navigation = resolve(view, &session, ctx.config.guard);

    if !ctx.output.is_text() {
        return ctx.output.print_value(&navigation);
    }
    match navigation {
        Navigation::Render(view) => print_field("Render", view.path()),
        Navigation::Redirect(target) => print_field("Redirect", target.path()),
    }
    Ok(())
}

pub fn dashboard(ctx: &Context) -> Result<()> {
    match flows::dashboard(&ctx.store, ctx.config.guard)? {
        Guarded::Allowed(summary) => {
            if !ctx.output.is_text() {
                return ctx.output.print_value(&summary);
            }
            println!("Welcome back, {}!", summary.display_name);
            if !ctx.quiet {
                print_field("Email", summary.email.as_deref().unwrap_or("-"));
                print_field("Member since", &summary.member_since);
                print_field("Verified", if summary.verified { "yes" } else { "no" });
            }
            Ok(())
        }
        Guarded::Redirect(target) => {
            print_redirect(ctx, View::Dashboard, target)?;
            Err(AlreadyReported.into())
        }
    }
}

pub fn generate(ctx: &Context) -> Result<()> {
    match flows::generate_id(&ctx.store, ctx.config.guard)? {
        Guarded::Allowed(text) => {
            if !ctx.output.is_text() {
                return ctx.output.print_value(&json!({ "message": text }));
            }
            println!("Generate ID Card");
            println!("{}", text);
            Ok(())
        }
        Guarded::Redirect(target) => {
            print_redirect(ctx, View::GenerateId, target)?;
            Err(AlreadyReported.into())
        }
    }
}

pub fn home(ctx: &Context) -> Result<()> {
    let content = flows::home();
    if !ctx.output.is_text() {
        return ctx.output.print_value(&content);
    }
    println!("{}", content.title);
    if !ctx.quiet {
        println!("{}", content.tagline);
        println!();
        for (title, description) in &content.features {
            print_field(title, description);
        }
    }
    Ok(())
}
