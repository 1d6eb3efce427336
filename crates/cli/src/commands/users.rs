use anyhow::Result;
use clap::Subcommand;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users
    List,

    /// Show a user's public profile
    Show { username: String },
}

impl UserCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List => {
                let users = ctx.client.list_users().await?;
                ctx.output.emit(&users, |users| render::user_table(users))
            }
            Self::Show { username } => {
                let user = ctx.client.user_by_username(&username).await?;
                ctx.output.emit(&user, render::user_detail)
            }
        }
    }
}
