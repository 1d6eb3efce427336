//! CLI commands

mod auth;
mod categories;
mod comments;
mod portal;
mod profile;
mod tickets;
mod users;

use anyhow::Result;
use clap::Subcommand;
use omnidesk_http::OmnideskClient;

use crate::render::Output;

pub use auth::AuthCommands;
pub use categories::CategoryCommands;
pub use comments::CommentCommands;
pub use portal::PortalCommands;
pub use profile::ProfileCommands;
pub use tickets::TicketCommands;
pub use users::UserCommands;

/// Everything a command needs to talk to the API and print results
pub struct Context {
    pub client: OmnideskClient,
    pub output: Output,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, log out and manage passwords
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// List, open and update tickets
    Tickets {
        #[command(subcommand)]
        command: TicketCommands,
    },

    /// Discuss a ticket
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Ticket categories and their SLA targets
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Look up other users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// View or edit your own profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Submit and track requests without an account
    Portal {
        #[command(subcommand)]
        command: PortalCommands,
    },
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Auth { command } => command.execute(ctx).await,
            Self::Tickets { command } => command.execute(ctx).await,
            Self::Comments { command } => command.execute(ctx).await,
            Self::Categories { command } => command.execute(ctx).await,
            Self::Users { command } => command.execute(ctx).await,
            Self::Profile { command } => command.execute(ctx).await,
            Self::Portal { command } => command.execute(ctx).await,
        }
    }
}
