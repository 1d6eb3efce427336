use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use omnidesk_http::types::{PasswordReset, RegisterRequest};
use std::io::BufRead;
use tracing::info;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Create an account and log in with it
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// End the session and forget the stored tokens
    Logout,

    /// Show the logged in user
    Whoami,

    /// Email password reset instructions
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },

    /// Choose a new password using the token from the reset email
    ResetPassword {
        #[arg(long)]
        token: String,

        #[command(flatten)]
        password: PasswordArgs,
    },
}

#[derive(Args)]
pub struct PasswordArgs {
    /// Password; prefer OMNIDESK_PASSWORD or --password-stdin over typing it here
    #[arg(short, long, env = "OMNIDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    password_stdin: bool,
}

impl PasswordArgs {
    fn resolve(self) -> Result<String> {
        if self.password_stdin {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            return non_empty(line.trim_end_matches(['\r', '\n']).to_string());
        }
        match self.password {
            Some(password) => non_empty(password),
            None => bail!(
                "A password is required: pass --password, set OMNIDESK_PASSWORD or use --password-stdin"
            ),
        }
    }
}

fn non_empty(password: String) -> Result<String> {
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

impl AuthCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Login { username, password } => {
                let response = ctx.client.login(username, password.resolve()?).await?;
                info!("Session saved");
                ctx.output.emit(&response.user, |user| {
                    format!("Logged in as {}", user.username)
                })
            }
            Self::Register {
                username,
                email,
                password,
            } => {
                let request = RegisterRequest {
                    username,
                    email,
                    password: password.resolve()?,
                };
                let response = ctx.client.register(request).await?;
                ctx.output.emit(&response.user, |user| {
                    format!("Registered and logged in as {}", user.username)
                })
            }
            Self::Logout => {
                ctx.client.logout().await?;
                ctx.output.message("Logged out")
            }
            Self::Whoami => {
                let user = ctx.client.current_user().await?;
                ctx.output.emit(&user, render::user_detail)
            }
            Self::ForgotPassword { email } => {
                let response = ctx.client.request_password_reset(email).await?;
                ctx.output.message(&response.message)
            }
            Self::ResetPassword { token, password } => {
                let reset = PasswordReset {
                    token,
                    password: password.resolve()?,
                };
                let response = ctx.client.reset_password(reset).await?;
                ctx.output.message(&response.message)
            }
        }
    }
}
