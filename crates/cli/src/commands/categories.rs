use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use omnidesk_http::types::{
    CategoryUpdate, DEFAULT_CATEGORY_COLOR, DEFAULT_SLA_RESOLUTION_HOURS,
    DEFAULT_SLA_RESPONSE_HOURS, NewCategory,
};

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List active categories with ticket counts
    List,

    /// Show statistics and recent tickets of a category
    Show { id: i64 },

    /// Create a category (admin only)
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Hex colour used in the web interface
        #[arg(long, default_value = DEFAULT_CATEGORY_COLOR)]
        color: String,

        /// Hours until the first response is due
        #[arg(long, default_value_t = DEFAULT_SLA_RESPONSE_HOURS)]
        sla_response_hours: u32,

        /// Hours until the ticket should be resolved
        #[arg(long, default_value_t = DEFAULT_SLA_RESOLUTION_HOURS)]
        sla_resolution_hours: u32,

        /// Create the category disabled
        #[arg(long)]
        inactive: bool,
    },

    /// Change a category (admin only)
    Update {
        id: i64,

        #[command(flatten)]
        fields: CategoryFields,
    },

    /// Deactivate a category that has no active tickets (admin only)
    Delete { id: i64 },
}

#[derive(Args)]
pub struct CategoryFields {
    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long)]
    description: Option<String>,

    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    sla_response_hours: Option<u32>,

    #[arg(long)]
    sla_resolution_hours: Option<u32>,

    /// `--active true` re-enables, `--active false` disables
    #[arg(long)]
    active: Option<bool>,
}

impl From<CategoryFields> for CategoryUpdate {
    fn from(fields: CategoryFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            color: fields.color,
            sla_response_hours: fields.sla_response_hours,
            sla_resolution_hours: fields.sla_resolution_hours,
            is_active: fields.active,
        }
    }
}

impl CategoryCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List => {
                let categories = ctx.client.list_categories().await?;
                ctx.output
                    .emit(&categories, |categories| render::category_table(categories))
            }
            Self::Show { id } => {
                let category = ctx.client.get_category(id).await?;
                ctx.output.emit(&category, render::category_detail)
            }
            Self::Create {
                name,
                description,
                color,
                sla_response_hours,
                sla_resolution_hours,
                inactive,
            } => {
                let category = NewCategory {
                    description,
                    color,
                    sla_response_hours,
                    sla_resolution_hours,
                    is_active: !inactive,
                    ..NewCategory::new(name)
                };
                let created = ctx.client.create_category(&category).await?;
                ctx.output.emit(&created, |created| {
                    format!("{} (#{})", created.message, created.category.id)
                })
            }
            Self::Update { id, fields } => {
                let update = CategoryUpdate::from(fields);
                if update.is_empty() {
                    bail!("Nothing to update: pass at least one field to change");
                }
                let updated = ctx.client.update_category(id, &update).await?;
                ctx.output.emit(&updated, |updated| {
                    format!(
                        "{}\n\n{}",
                        updated.message,
                        render::category_detail(&updated.category)
                    )
                })
            }
            Self::Delete { id } => {
                let response = ctx.client.delete_category(id).await?;
                ctx.output.message(&response.message)
            }
        }
    }
}
