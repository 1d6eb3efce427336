//! Client-side ticket list filtering

use crate::ticket::{Priority, TicketStatus};

/// Fields a ticket exposes to [`TicketFilter`]
pub trait FilterableTicket {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn status(&self) -> &TicketStatus;
    fn priority(&self) -> &Priority;
    /// Username of the ticket author, `None` for portal submissions
    fn author(&self) -> Option<&str>;
}

/// Search and facet filter applied to an already-fetched ticket list
///
/// An unset facet matches everything. The search term matches
/// case-insensitively against title, description and author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    search: Option<String>,
    status: Option<TicketStatus>,
    priority: Option<Priority>,
}

impl TicketFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to tickets whose text contains `term`; blank terms are ignored
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then(|| term.to_lowercase());
        self
    }

    #[must_use]
    pub fn status(mut self, status: Option<TicketStatus>) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// Whether no constraint is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.search.is_none() && self.status.is_none() && self.priority.is_none()
    }

    #[must_use]
    pub fn matches<T: FilterableTicket + ?Sized>(&self, ticket: &T) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            ticket.title().to_lowercase().contains(term)
                || ticket.description().to_lowercase().contains(term)
                || ticket
                    .author()
                    .is_some_and(|author| author.to_lowercase().contains(term))
        });
        let matches_status = self
            .status
            .as_ref()
            .is_none_or(|status| status == ticket.status());
        let matches_priority = self
            .priority
            .as_ref()
            .is_none_or(|priority| priority == ticket.priority());

        matches_search && matches_status && matches_priority
    }

    /// Keep the matching tickets, preserving order
    pub fn apply<'a, T, I>(&self, tickets: I) -> Vec<&'a T>
    where
        T: FilterableTicket + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        tickets
            .into_iter()
            .filter(|ticket| self.matches(*ticket))
            .collect()
    }
}
