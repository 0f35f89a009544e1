use super::AppContext;
use kalenteri::components::api::{LoginCredentials, RegisterCredentials};
use kalenteri::error::{validation_error, CalResult};
use std::io::{self, BufRead, Write};

/// Use the given value or read one line from standard input
fn password_or_prompt(value: Option<String>, prompt: &str) -> CalResult<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    eprint!("{}: ", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        return Err(validation_error(&format!("{} is required", prompt)));
    }
    Ok(line)
}

pub async fn login(ctx: &AppContext, email: String, password: Option<String>) -> CalResult<()> {
    let password = password_or_prompt(password, "Password")?;
    let response = ctx
        .auth()
        .login(&LoginCredentials { email, password })
        .await?;
    println!("Signed in as {} <{}>", response.user.name, response.user.email);
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    name: String,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
) -> CalResult<()> {
    let password = password_or_prompt(password, "Password")?;
    let confirm_password = password_or_prompt(confirm_password, "Confirm password")?;
    let response = ctx
        .auth()
        .register(&RegisterCredentials {
            name,
            email,
            password,
            confirm_password,
        })
        .await?;
    println!("Welcome, {}! You are now signed in.", response.user.name);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> CalResult<()> {
    ctx.auth().logout()?;
    println!("Signed out");
    Ok(())
}

/// Print the signed-in user, refreshed from the server
pub async fn whoami(ctx: &AppContext) -> CalResult<()> {
    ctx.require_session()?;
    let user = ctx.auth().current_user().await?;
    println!("{} <{}>", user.name, user.email);
    println!("id:     {}", user.id);
    println!("avatar: {}", user.avatar);
    Ok(())
}
