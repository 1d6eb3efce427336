use anyhow::Result;
use clap::Subcommand;
use omnidesk_core::ReferenceNumber;
use omnidesk_http::Attachment;
use omnidesk_http::types::PortalTicket;
use std::path::PathBuf;
use tracing::debug;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum PortalCommands {
    /// Submit a support request without an account
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        surname: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        #[arg(short, long)]
        description: String,

        /// Image, PDF or Word file to attach (repeatable, 10MB each)
        #[arg(short, long = "attach", value_name = "PATH")]
        attachments: Vec<PathBuf>,
    },

    /// Check the status of a submitted request, e.g. `CT000042`
    Status { reference: ReferenceNumber },
}

impl PortalCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let portal = ctx.client.portal();
        match self {
            Self::Submit {
                name,
                surname,
                phone,
                email,
                description,
                attachments,
            } => {
                let mut files = Vec::with_capacity(attachments.len());
                for path in &attachments {
                    let attachment = Attachment::from_path(path).await?;
                    debug!(file = attachment.file_name(), bytes = attachment.len(), "Attaching file");
                    files.push(attachment);
                }

                let ticket = PortalTicket {
                    name,
                    surname,
                    phone,
                    email,
                    description,
                };
                let submitted = portal.submit_ticket(ticket, files).await?;
                ctx.output.emit(&submitted, render::submitted)
            }
            Self::Status { reference } => {
                let status = portal.ticket_status(reference).await?;
                ctx.output.emit(&status, render::portal_status)
            }
        }
    }
}
