//! Transport types exchanged with the OmniDesk REST API

use chrono::NaiveDateTime;
use omnidesk_core::{FilterableTicket, Priority, ReferenceNumber, TicketStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default colour for new categories
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Default first-response SLA for new categories
pub const DEFAULT_SLA_RESPONSE_HOURS: u32 = 24;

/// Default resolution SLA for new categories
pub const DEFAULT_SLA_RESOLUTION_HOURS: u32 = 72;

// Users

/// Account as returned by `/auth/me`, `/users` and `/users/profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

/// Compact user reference embedded in tickets and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// Partial profile update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.about_me.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub message: String,
    pub user: User,
}

// Authentication

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Issued by both login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub token: String,
    pub password: String,
}

// Tickets

/// Contact details attached to tickets that came in through the portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    #[serde(alias = "body")]
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

impl FilterableTicket for Ticket {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn status(&self) -> &TicketStatus {
        &self.status
    }

    fn priority(&self) -> &Priority {
        &self.priority
    }

    fn author(&self) -> Option<&str> {
        self.created_by.as_ref().map(|user| user.username.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsResponse {
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEnvelope {
    pub message: String,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<i64>,
}

impl NewTicket {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: None,
            assigned_to_id: None,
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn assign_to(mut self, user_id: i64) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }
}

/// Partial ticket update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// `Some(0)` clears the assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<i64>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn assign_to(mut self, user_id: i64) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }

    #[must_use]
    pub const fn unassign(mut self) -> Self {
        self.assigned_to_id = Some(0);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

// Comments

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_internal: bool,
    /// Human readable age computed by the backend, e.g. "5 minutes ago"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ago: Option<String>,
    pub author: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEnvelope {
    pub message: String,
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub is_internal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdate {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_internal: Option<bool>,
}

// Categories

/// Per-status ticket counts attached to category listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCounts {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub status_counts: BTreeMap<String, u64>,
    pub priority_counts: BTreeMap<String, u64>,
    pub total_tickets: u64,
}

/// Ticket summary included in a category's detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTicket {
    pub id: i64,
    pub title: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub created_at: NaiveDateTime,
    /// Author username, or `Client` for portal submissions
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub sla_response_hours: u32,
    pub sla_resolution_hours: u32,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_counts: Option<TicketCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_stats: Option<CategoryStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_tickets: Option<Vec<RecentTicket>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEnvelope {
    pub message: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub sla_response_hours: u32,
    pub sla_resolution_hours: u32,
    pub is_active: bool,
}

impl NewCategory {
    /// A new active category with the default colour and SLA targets
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            sla_response_hours: DEFAULT_SLA_RESPONSE_HOURS,
            sla_resolution_hours: DEFAULT_SLA_RESOLUTION_HOURS,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_response_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_resolution_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.sla_response_hours.is_none()
            && self.sla_resolution_hours.is_none()
            && self.is_active.is_none()
    }
}

// Portal

/// Contact form filled in by an anonymous client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalTicket {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTicketResponse {
    pub message: String,
    pub ticket_id: i64,
    pub reference_number: ReferenceNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStatusResponse {
    pub reference_number: ReferenceNumber,
    pub status: TicketStatus,
    pub submitted_at: NaiveDateTime,
    /// First 100 characters of the original description
    pub description: String,
}

// Generic

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error payload returned by the backend on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
