//! Session commands.

use tracing::info;

use eshop_core::{Credentials, SignupRequest};

use super::{CommandError, Context};

/// Create an account and store the session it returns.
pub async fn signup(ctx: &Context, request: &SignupRequest) -> Result<(), CommandError> {
    ctx.session.signup(&ctx.gateway, request).await?;
    println!("Signed up as {}", request.email);
    Ok(())
}

/// Sign in and store the session.
pub async fn login(ctx: &Context, credentials: &Credentials) -> Result<(), CommandError> {
    let session = ctx.session.login(&ctx.gateway, credentials).await?;
    if session.roles.is_empty() {
        println!("Signed in as {}", credentials.username);
    } else {
        println!(
            "Signed in as {} ({})",
            credentials.username,
            session.roles.join(", ")
        );
    }
    Ok(())
}

pub fn logout(ctx: &Context) {
    ctx.session.logout();
    println!("Signed out");
}

/// Report whether the stored session passes the route guard.
pub fn whoami(ctx: &Context) -> Result<(), CommandError> {
    ctx.authenticated()?;
    info!("Stored session found");
    println!("Signed in");
    Ok(())
}
