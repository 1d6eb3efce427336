//! Ticket API client methods

use super::{ClientError, OmnideskClient};
use crate::types::{
    MessageResponse, NewTicket, ReplyRequest, Ticket, TicketEnvelope, TicketUpdate,
    TicketsResponse,
};
use reqwest::Method;

impl OmnideskClient {
    /// List all tickets visible to the current user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if not logged in
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let req = self.request(Method::GET, "/tickets");
        let response: TicketsResponse = self.execute(req).await?;
        Ok(response.tickets)
    }

    /// Fetch a single ticket
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the ticket does not exist
    pub async fn get_ticket(&self, id: i64) -> Result<Ticket, ClientError> {
        let req = self.request(Method::GET, &format!("/tickets/{id}"));
        self.execute(req).await
    }

    /// Open a new ticket as the current user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if title or description is missing
    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketEnvelope, ClientError> {
        let req = self.request(Method::POST, "/tickets").json(ticket);
        self.execute(req).await
    }

    /// Change status, priority, assignee or text of a ticket
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the ticket does not exist
    pub async fn update_ticket(
        &self,
        id: i64,
        update: &TicketUpdate,
    ) -> Result<TicketEnvelope, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/tickets/{id}"))
            .json(update);
        self.execute(req).await
    }

    /// Email a response to the client who submitted the ticket
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the ticket has no client email
    pub async fn reply_to_ticket(
        &self,
        id: i64,
        message: impl Into<String>,
    ) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(Method::POST, &format!("/tickets/{id}/reply"))
            .json(&ReplyRequest {
                message: message.into(),
            });
        self.execute(req).await
    }
}
