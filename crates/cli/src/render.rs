//! Human readable output for command results

use anyhow::Result;
use chrono::NaiveDateTime;
use omnidesk_http::ClientError;
use omnidesk_http::types::{
    Category, Comment, SubmitTicketResponse, Ticket, TicketStatusResponse, User,
};
use serde::Serialize;
use std::fmt::Write;

const TITLE_WIDTH: usize = 48;

/// How command results are printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Print `value` as pretty JSON, or through `text` otherwise
    pub fn emit<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        let rendered = match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Text => text(value),
        };
        println!("{rendered}");
        Ok(())
    }

    /// Print a confirmation, wrapped as `{"message": ...}` in JSON mode
    pub fn message(self, message: &str) -> Result<()> {
        self.emit(&serde_json::json!({ "message": message }), |_| message.to_string())
    }
}

pub fn ticket_table(tickets: &[&Ticket]) -> String {
    if tickets.is_empty() {
        return "No tickets found".to_string();
    }

    let mut out = format!(
        "{:<6} {:<12} {:<8} {:<14} {}\n",
        "ID", "STATUS", "PRIORITY", "ASSIGNEE", "TITLE"
    );
    for ticket in tickets {
        let assignee = ticket
            .assigned_to
            .as_ref()
            .map_or("-", |user| user.username.as_str());
        let _ = writeln!(
            out,
            "{:<6} {:<12} {:<8} {:<14} {}",
            ticket.id,
            ticket.status,
            ticket.priority,
            assignee,
            truncate(&ticket.title, TITLE_WIDTH)
        );
    }
    let _ = write!(out, "{} ticket(s)", tickets.len());
    out
}

pub fn ticket_detail(ticket: &Ticket) -> String {
    let mut out = format!("#{} {}\n", ticket.id, ticket.title);
    let _ = writeln!(out, "Status:    {}", ticket.status);
    let _ = writeln!(out, "Priority:  {}", ticket.priority);
    let author = ticket
        .created_by
        .as_ref()
        .map_or("Client", |user| user.username.as_str());
    let _ = writeln!(out, "Author:    {author}");
    let assignee = ticket
        .assigned_to
        .as_ref()
        .map_or("Unassigned", |user| user.username.as_str());
    let _ = writeln!(out, "Assignee:  {assignee}");
    let _ = writeln!(out, "Created:   {}", timestamp(ticket.created_at.as_ref()));
    let _ = writeln!(out, "Updated:   {}", timestamp(ticket.updated_at.as_ref()));

    if let Some(client) = &ticket.client_info {
        let _ = writeln!(
            out,
            "Client:    {} {} <{}> {}",
            client.name, client.surname, client.email, client.phone
        );
        for image in &client.images {
            let _ = writeln!(out, "Image:     {image}");
        }
    }

    let _ = write!(out, "\n{}", ticket.description);
    out
}

pub fn comment_list(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "No comments yet".to_string();
    }

    let mut out = String::new();
    for comment in comments {
        let when = comment
            .time_ago
            .clone()
            .unwrap_or_else(|| timestamp(Some(&comment.created_at)));
        let internal = if comment.is_internal { " [internal]" } else { "" };
        let edited = if comment.updated_at.is_some() { " (edited)" } else { "" };
        let _ = writeln!(
            out,
            "[{}] {} {when}{internal}{edited}",
            comment.id, comment.author.username
        );
        for line in comment.content.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out.trim_end().to_string()
}

pub fn category_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found".to_string();
    }

    let mut out = format!(
        "{:<5} {:<24} {:<8} {:>5} {:>5} {:>11} {:>8}\n",
        "ID", "NAME", "COLOR", "OPEN", "TOTAL", "RESPONSE(h)", "RESOLVE(h)"
    );
    for category in categories {
        let counts = category.ticket_counts.unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<5} {:<24} {:<8} {:>5} {:>5} {:>11} {:>8}",
            category.id,
            truncate(&category.name, 24),
            category.color,
            counts.open,
            counts.total,
            category.sla_response_hours,
            category.sla_resolution_hours
        );
    }
    out.trim_end().to_string()
}

pub fn category_detail(category: &Category) -> String {
    let mut out = format!("{} (#{})\n", category.name, category.id);
    if let Some(description) = &category.description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "Color:       {}", category.color);
    let _ = writeln!(
        out,
        "SLA:         respond within {}h, resolve within {}h",
        category.sla_response_hours, category.sla_resolution_hours
    );
    let _ = writeln!(
        out,
        "Active:      {}",
        if category.is_active { "yes" } else { "no" }
    );

    if let Some(stats) = &category.detailed_stats {
        let _ = writeln!(out, "Tickets:     {}", stats.total_tickets);
        for (status, count) in &stats.status_counts {
            let _ = writeln!(out, "  {status:<12} {count}");
        }
        for (priority, count) in &stats.priority_counts {
            let _ = writeln!(out, "  {priority:<12} {count}");
        }
    }

    if let Some(recent) = category.recent_tickets.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "Recent tickets:");
        for ticket in recent {
            let _ = writeln!(
                out,
                "  #{:<5} {:<12} {:<8} {} ({})",
                ticket.id,
                ticket.status,
                ticket.priority,
                truncate(&ticket.title, TITLE_WIDTH),
                ticket.created_by
            );
        }
    }
    out.trim_end().to_string()
}

pub fn user_detail(user: &User) -> String {
    let mut out = format!("{} (#{})\n", user.username, user.id);
    let _ = writeln!(out, "Email:      {}", user.email);
    if user.is_admin() {
        let _ = writeln!(out, "Role:       admin");
    }
    let _ = writeln!(out, "Last seen:  {}", timestamp(user.last_seen.as_ref()));
    if let Some(about) = user.about_me.as_deref().filter(|about| !about.is_empty()) {
        let _ = write!(out, "\n{about}");
    }
    out.trim_end().to_string()
}

pub fn user_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found".to_string();
    }

    let mut out = format!("{:<5} {:<20} {}\n", "ID", "USERNAME", "EMAIL");
    for user in users {
        let _ = writeln!(out, "{:<5} {:<20} {}", user.id, user.username, user.email);
    }
    out.trim_end().to_string()
}

pub fn submitted(response: &SubmitTicketResponse) -> String {
    format!(
        "{}\nReference number: {}\nKeep it to check the status of your request.",
        response.message, response.reference_number
    )
}

pub fn portal_status(status: &TicketStatusResponse) -> String {
    format!(
        "{}\nStatus:     {}\nSubmitted:  {}\n\n{}",
        status.reference_number,
        status.status,
        timestamp(Some(&status.submitted_at)),
        status.description
    )
}

/// What to print when a command fails
pub fn error_message(error: &anyhow::Error) -> String {
    match error.chain().find_map(|cause| cause.downcast_ref::<ClientError>()) {
        Some(ClientError::SessionExpired) => {
            "Session expired. Please log in again with `omnidesk auth login`.".to_string()
        }
        Some(client_error) => format!("Error: {}", client_error.user_message()),
        None => format!("Error: {error:#}"),
    }
}

fn timestamp(time: Option<&NaiveDateTime>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |time| time.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Shorten `text` to at most `width` characters
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidesk_http::types::UserRef;
    use serde_json::json;

    fn ticket(id: i64, title: &str) -> Ticket {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "description": "Details",
            "status": "In Progress",
            "priority": "High",
            "created_at": "2024-03-01T09:30:00",
            "created_by": {"id": 1, "username": "alice"}
        }))
        .unwrap()
    }

    #[test]
    fn test_ticket_table() {
        let mut assigned = ticket(2, "VPN down");
        assigned.assigned_to = Some(UserRef {
            id: 3,
            username: "carol".into(),
        });
        let first = ticket(1, "Printer jammed");
        let table = ticket_table(&[&first, &assigned]);

        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("In Progress"));
        assert!(lines[1].contains("Printer jammed"));
        assert!(lines[2].contains("carol"));
        assert_eq!(lines[3], "2 ticket(s)");

        assert_eq!(ticket_table(&[]), "No tickets found");
    }

    #[test]
    fn test_ticket_detail_for_portal_ticket() {
        let mut portal = ticket(7, "Client Ticket from Jane Doe");
        portal.created_by = None;

        let detail = ticket_detail(&portal);
        assert!(detail.starts_with("#7 Client Ticket from Jane Doe"));
        assert!(detail.contains("Author:    Client"));
        assert!(detail.contains("Assignee:  Unassigned"));
        assert!(detail.contains("Created:   2024-03-01 09:30"));
        assert!(detail.ends_with("Details"));
    }

    #[test]
    fn test_comment_list_marks_internal_notes() {
        let comments: Vec<Comment> = serde_json::from_value(json!([
            {
                "id": 1,
                "content": "Looking into it",
                "created_at": "2024-03-01T10:00:00",
                "is_internal": true,
                "time_ago": "2 hours ago",
                "author": {"id": 3, "username": "carol"}
            }
        ]))
        .unwrap();

        let text = comment_list(&comments);
        assert_eq!(
            text,
            "[1] carol 2 hours ago [internal]\n    Looking into it"
        );
        assert_eq!(comment_list(&[]), "No comments yet");
    }

    #[test]
    fn test_error_message() {
        let expired = anyhow::Error::new(ClientError::SessionExpired);
        assert_eq!(
            error_message(&expired),
            "Session expired. Please log in again with `omnidesk auth login`."
        );

        let forbidden = anyhow::Error::new(ClientError::Forbidden("Admin access required".into()))
            .context("Failed to create category");
        assert_eq!(error_message(&forbidden), "Error: Admin access required");

        let plain = anyhow::anyhow!("Nothing to update");
        assert_eq!(error_message(&plain), "Error: Nothing to update");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
