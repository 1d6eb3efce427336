use anyhow::{Result, bail};
use clap::Subcommand;
use omnidesk_http::types::CommentUpdate;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Show the comment thread of a ticket
    List { ticket_id: i64 },

    /// Comment on a ticket
    Add {
        ticket_id: i64,

        #[arg(short, long)]
        content: String,

        /// Only visible to admins and the assignee
        #[arg(long)]
        internal: bool,
    },

    /// Change the text of a comment
    Edit {
        comment_id: i64,

        #[arg(short, long)]
        content: String,

        /// Change visibility: `--internal true` or `--internal false`
        #[arg(long)]
        internal: Option<bool>,
    },

    /// Delete a comment (it can be restored by an admin)
    Delete { comment_id: i64 },

    /// Restore a deleted comment
    Restore { comment_id: i64 },
}

impl CommentCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List { ticket_id } => {
                let comments = ctx.client.list_comments(ticket_id).await?;
                ctx.output.emit(&comments, |comments| render::comment_list(comments))
            }
            Self::Add {
                ticket_id,
                content,
                internal,
            } => {
                let content = require_content(content)?;
                let added = ctx.client.add_comment(ticket_id, content, internal).await?;
                ctx.output.emit(&added, |added| {
                    format!("{} (#{})", added.message, added.comment.id)
                })
            }
            Self::Edit {
                comment_id,
                content,
                internal,
            } => {
                let update = CommentUpdate {
                    content: require_content(content)?,
                    is_internal: internal,
                };
                let edited = ctx.client.update_comment(comment_id, &update).await?;
                ctx.output.emit(&edited, |edited| edited.message.clone())
            }
            Self::Delete { comment_id } => {
                let response = ctx.client.delete_comment(comment_id).await?;
                ctx.output.message(&response.message)
            }
            Self::Restore { comment_id } => {
                let response = ctx.client.restore_comment(comment_id).await?;
                ctx.output.message(&response.message)
            }
        }
    }
}

fn require_content(content: String) -> Result<String> {
    if content.trim().is_empty() {
        bail!("Comment must not be empty");
    }
    Ok(content)
}
