use anyhow::{Result, bail};
use clap::Subcommand;
use omnidesk_http::types::ProfileUpdate;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,

    /// Change your username, email or about text
    Update {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        about: Option<String>,
    },
}

impl ProfileCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Show => {
                let user = ctx.client.profile().await?;
                ctx.output.emit(&user, render::user_detail)
            }
            Self::Update {
                username,
                email,
                about,
            } => {
                let update = ProfileUpdate {
                    username,
                    email,
                    about_me: about,
                };
                if update.is_empty() {
                    bail!("Nothing to update: pass --username, --email or --about");
                }
                let updated = ctx.client.update_profile(&update).await?;
                ctx.output.emit(&updated, |updated| {
                    format!("{}\n\n{}", updated.message, render::user_detail(&updated.user))
                })
            }
        }
    }
}
