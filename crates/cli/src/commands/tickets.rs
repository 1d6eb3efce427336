use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use omnidesk_core::{Priority, TicketFilter, TicketStatus};
use omnidesk_http::types::{Comment, NewTicket, Ticket, TicketUpdate, User};
use serde::Serialize;
use tracing::{debug, warn};

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum TicketCommands {
    /// List tickets, optionally filtered
    List {
        /// Match title, description or author (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Only tickets with this status, e.g. `open` or `in-progress`
        #[arg(long)]
        status: Option<TicketStatus>,

        /// Only tickets with this priority
        #[arg(long)]
        priority: Option<Priority>,

        /// Only tickets assigned to this user (username or id)
        #[arg(long)]
        assignee: Option<String>,

        /// Hide resolved and closed tickets
        #[arg(long)]
        active: bool,
    },

    /// Show a ticket with its comments
    Show {
        id: i64,

        /// Skip loading the comment thread
        #[arg(long)]
        no_comments: bool,
    },

    /// Open a new ticket
    New {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        priority: Option<Priority>,

        /// Assign to this user (username or id)
        #[arg(short, long)]
        assign: Option<String>,
    },

    /// Change a ticket's fields; only the given ones are sent
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<TicketStatus>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Assign to this user (username or id)
        #[arg(long, conflicts_with = "unassign")]
        assign: Option<String>,

        /// Remove the current assignee
        #[arg(long)]
        unassign: bool,
    },

    /// Email a reply to the client who submitted the ticket
    Reply {
        id: i64,

        #[arg(short, long)]
        message: String,
    },
}

#[derive(Serialize)]
struct TicketWithComments<'a> {
    #[serde(flatten)]
    ticket: &'a Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<&'a [Comment]>,
}

impl TicketCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List {
                search,
                status,
                priority,
                assignee,
                active,
            } => {
                let filter = TicketFilter::new()
                    .search(search.unwrap_or_default())
                    .status(status)
                    .priority(priority);

                let (tickets, assignee_id) = match assignee {
                    Some(name) => {
                        let (tickets, users) =
                            futures::try_join!(ctx.client.list_tickets(), ctx.client.list_users())?;
                        let id = find_user(&users, &name)?.id;
                        (tickets, Some(id))
                    }
                    None => (ctx.client.list_tickets().await?, None),
                };

                let shown = select(&tickets, &filter, active, assignee_id);
                debug!(total = tickets.len(), shown = shown.len(), "Filtered tickets");

                ctx.output.emit(&shown, |shown| render::ticket_table(shown))
            }
            Self::Show { id, no_comments } => {
                if no_comments {
                    let ticket = ctx.client.get_ticket(id).await?;
                    return ctx.output.emit(&ticket, render::ticket_detail);
                }

                let (ticket, comments) =
                    futures::join!(ctx.client.get_ticket(id), ctx.client.list_comments(id));
                let ticket = ticket?;
                let comments = comments
                    .inspect_err(|e| warn!("Could not load comments: {e}"))
                    .ok();

                let view = TicketWithComments {
                    ticket: &ticket,
                    comments: comments.as_deref(),
                };
                ctx.output.emit(&view, |view| {
                    let mut text = render::ticket_detail(view.ticket);
                    if let Some(comments) = view.comments {
                        text.push_str("\n\nComments\n--------\n");
                        text.push_str(&render::comment_list(comments));
                    }
                    text
                })
            }
            Self::New {
                title,
                description,
                priority,
                assign,
            } => {
                let mut ticket = NewTicket::new(title, description);
                if let Some(priority) = priority {
                    ticket = ticket.priority(priority);
                }
                if let Some(name) = assign {
                    let users = ctx.client.list_users().await?;
                    ticket = ticket.assign_to(find_user(&users, &name)?.id);
                }

                let created = ctx.client.create_ticket(&ticket).await?;
                ctx.output.emit(&created, |created| {
                    format!("{} (#{})", created.message, created.ticket.id)
                })
            }
            Self::Update {
                id,
                title,
                description,
                status,
                priority,
                assign,
                unassign,
            } => {
                let mut update = TicketUpdate {
                    title,
                    description,
                    status,
                    priority,
                    assigned_to_id: None,
                };
                if unassign {
                    update = update.unassign();
                } else if let Some(name) = assign {
                    let users = ctx.client.list_users().await?;
                    update = update.assign_to(find_user(&users, &name)?.id);
                }
                if update.is_empty() {
                    bail!("Nothing to update: pass at least one field to change");
                }

                let updated = ctx.client.update_ticket(id, &update).await?;
                ctx.output.emit(&updated, |updated| {
                    format!("{}\n\n{}", updated.message, render::ticket_detail(&updated.ticket))
                })
            }
            Self::Reply { id, message } => {
                if message.trim().is_empty() {
                    bail!("Reply message must not be empty");
                }
                let response = ctx.client.reply_to_ticket(id, message).await?;
                ctx.output.message(&response.message)
            }
        }
    }
}

/// Tickets to list: the filter, then the active and assignee constraints
fn select<'a>(
    tickets: &'a [Ticket],
    filter: &TicketFilter,
    active: bool,
    assignee: Option<i64>,
) -> Vec<&'a Ticket> {
    filter
        .apply(tickets)
        .into_iter()
        .filter(|ticket| !active || ticket.status.is_active())
        .filter(|ticket| {
            assignee.is_none_or(|id| ticket.assigned_to.as_ref().is_some_and(|user| user.id == id))
        })
        .collect()
}

/// Match a user by id or case-insensitive username
fn find_user<'a>(users: &'a [User], name: &str) -> Result<&'a User> {
    let name = name.trim();
    let by_id = name.parse::<i64>().ok();
    users
        .iter()
        .find(|user| Some(user.id) == by_id || user.username.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Unknown user: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Output;
    use omnidesk_http::{ClientError, MemoryTokenStore, OmnideskClient, Tokens};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn context(server: &MockServer) -> Context {
        let client = OmnideskClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .token_store(Arc::new(MemoryTokenStore::with_tokens(Tokens::new(
                "access", "refresh",
            ))))
            .build()
            .unwrap();
        Context {
            client,
            output: Output::Json,
        }
    }

    fn ticket_json(id: i64, assignee: Option<(i64, &str)>) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Ticket {id}"),
            "description": "Details",
            "status": "Open",
            "priority": "Medium",
            "assigned_to": assignee.map(|(id, username)| json!({"id": id, "username": username}))
        })
    }

    fn ticket(id: i64, status: &str, assignee: Option<(i64, &str)>) -> Ticket {
        let mut value = ticket_json(id, assignee);
        value["status"] = json!(status);
        serde_json::from_value(value).unwrap()
    }

    fn ids(tickets: &[&Ticket]) -> Vec<i64> {
        tickets.iter().map(|ticket| ticket.id).collect()
    }

    #[test]
    fn test_select_by_assignee() {
        let tickets = vec![
            ticket(1, "Open", Some((2, "bob"))),
            ticket(2, "Open", None),
            ticket(3, "Pending", Some((3, "carol"))),
        ];
        let filter = TicketFilter::new();

        assert_eq!(ids(&select(&tickets, &filter, false, None)), [1, 2, 3]);
        assert_eq!(ids(&select(&tickets, &filter, false, Some(2))), [1]);
        assert!(select(&tickets, &filter, false, Some(9)).is_empty());
    }

    #[test]
    fn test_select_active_hides_resolved_and_closed() {
        let tickets = vec![
            ticket(1, "Open", None),
            ticket(2, "In Progress", Some((2, "bob"))),
            ticket(3, "Pending", None),
            ticket(4, "Resolved", Some((2, "bob"))),
            ticket(5, "Closed", None),
        ];
        let filter = TicketFilter::new();

        assert_eq!(ids(&select(&tickets, &filter, true, None)), [1, 2, 3]);
        assert_eq!(ids(&select(&tickets, &filter, true, Some(2))), [2]);

        let filter = TicketFilter::new().status(Some(TicketStatus::Closed));
        assert!(select(&tickets, &filter, true, None).is_empty());
        assert_eq!(ids(&select(&tickets, &filter, false, None)), [5]);
    }

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            about_me: None,
            last_seen: None,
            is_admin: None,
        }
    }

    #[test]
    fn test_find_user_by_name_or_id() {
        let users = vec![user(1, "alice"), user(2, "Bob")];

        assert_eq!(find_user(&users, "bob").unwrap().id, 2);
        assert_eq!(find_user(&users, " 1 ").unwrap().username, "alice");
        assert!(find_user(&users, "carol").is_err());
        assert!(find_user(&users, "3").is_err());
    }

    #[tokio::test]
    async fn test_list_by_assignee_fetches_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tickets": [ticket_json(1, Some((2, "bob"))), ticket_json(2, None)]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"id": 2, "username": "bob", "email": "bob@example.com"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let command = TicketCommands::List {
            search: None,
            status: None,
            priority: None,
            assignee: Some("bob".into()),
            active: false,
        };
        command.execute(&context(&server).await).await.unwrap();
    }

    #[tokio::test]
    async fn test_show_survives_forbidden_comments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ticket_json(7, None)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/7/comments"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "Access denied"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let command = TicketCommands::Show {
            id: 7,
            no_comments: false,
        };
        command.execute(&context(&server).await).await.unwrap();
    }

    #[tokio::test]
    async fn test_show_fails_when_ticket_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/8"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Ticket not found"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/8/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"comments": [], "total": 0})))
            .mount(&server)
            .await;

        let command = TicketCommands::Show {
            id: 8,
            no_comments: false,
        };
        let err = command.execute(&context(&server).await).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::NotFound(msg)) if msg == "Ticket not found"
        ));
    }

    #[tokio::test]
    async fn test_update_unassign_sends_zero() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/tickets/5"))
            .and(body_json(json!({"assigned_to_id": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Ticket updated successfully",
                "ticket": ticket_json(5, None)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let command = TicketCommands::Update {
            id: 5,
            title: None,
            description: None,
            status: None,
            priority: None,
            assign: None,
            unassign: true,
        };
        command.execute(&context(&server).await).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_update_is_refused_locally() {
        let server = MockServer::start().await;

        let command = TicketCommands::Update {
            id: 5,
            title: None,
            description: None,
            status: None,
            priority: None,
            assign: None,
            unassign: false,
        };
        let err = command.execute(&context(&server).await).await.unwrap_err();

        assert!(err.to_string().contains("Nothing to update"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
