use super::App;
use crate::output;
use anyhow::Result;
use clap::Args;
use dialoguer::{Input, Password};
use notekeeper::auth::{self, SignIn, SignUp};

#[derive(Args)]
pub struct SignInArgs {
    /// Account email
    #[arg(long)]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "NOTEKEEPER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct SignUpArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Account email
    #[arg(long)]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "NOTEKEEPER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

fn prompt_text(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

fn prompt_password(value: Option<String>, confirm: bool) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn signup(app: &App, args: SignUpArgs) -> Result<()> {
    let account = SignUp {
        user_name: prompt_text(args.name, "Name")?,
        user_email: prompt_text(args.email, "Email")?,
        password: prompt_password(args.password, true)?,
    };

    auth::sign_up(&app.client, &account).await?;
    output::success("Account created! You can sign in now.");
    Ok(())
}

pub async fn signin(app: &mut App, args: SignInArgs) -> Result<()> {
    let credentials = SignIn::new(
        prompt_text(args.email, "Email")?,
        prompt_password(args.password, false)?,
    );

    auth::sign_in(&app.client, &mut app.session, &credentials).await?;
    output::success(&format!("Signed in as {}", credentials.user_email));
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    app.session.logout()?;
    output::success("Signed out.");
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    output::header("Keep Notes");
    println!("API:      {}", app.config.api_url);
    println!("Timeout:  {}s", app.config.timeout_secs);
    println!("Session:  {}", app.session_path.display());
    if app.session.is_authenticated() {
        println!("Signed in: yes");
    } else {
        println!("Signed in: no");
        output::hint("Run `notekeeper signin` to sign in.");
    }
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let me = auth::current_user(&app.client, &app.session).await?;
    println!("{} <{}>", me.user_name, me.user_email);
    println!("id: {}", me.user_id);
    Ok(())
}

pub async fn refresh(app: &mut App) -> Result<()> {
    auth::refresh(&app.client, &mut app.session).await?;
    output::success("Session refreshed.");
    Ok(())
}

pub async fn health(app: &App) -> Result<()> {
    let health = app.client.health().await?;
    println!("status: {}", health.status);
    if let Some(db) = health.db {
        println!("db:     {db}");
    }
    if let Some(detail) = health.detail {
        println!("detail: {detail}");
    }
    Ok(())
}
