//! Comment thread API client methods

use super::{ClientError, OmnideskClient};
use crate::types::{
    Comment, CommentEnvelope, CommentUpdate, CommentsResponse, MessageResponse, NewComment,
};
use reqwest::Method;

impl OmnideskClient {
    /// Comments on a ticket, oldest first
    ///
    /// Internal notes are only included for admins and the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] if the user cannot see the ticket
    pub async fn list_comments(&self, ticket_id: i64) -> Result<Vec<Comment>, ClientError> {
        let req = self.request(Method::GET, &format!("/tickets/{ticket_id}/comments"));
        let response: CommentsResponse = self.execute(req).await?;
        Ok(response.comments)
    }

    /// Post a comment; `is_internal` is silently dropped by the backend for
    /// users who may not write internal notes
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the content is empty or too long
    pub async fn add_comment(
        &self,
        ticket_id: i64,
        content: impl Into<String>,
        is_internal: bool,
    ) -> Result<CommentEnvelope, ClientError> {
        let req = self
            .request(Method::POST, &format!("/tickets/{ticket_id}/comments"))
            .json(&NewComment {
                content: content.into(),
                is_internal,
            });
        self.execute(req).await
    }

    /// Edit a comment's text and optionally its visibility
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] unless the user wrote the comment
    /// or is an admin
    pub async fn update_comment(
        &self,
        comment_id: i64,
        update: &CommentUpdate,
    ) -> Result<CommentEnvelope, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/comments/{comment_id}"))
            .json(update);
        self.execute(req).await
    }

    /// Soft delete a comment
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] unless the user wrote the comment
    /// or is an admin
    pub async fn delete_comment(&self, comment_id: i64) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::DELETE, &format!("/comments/{comment_id}"));
        self.execute(req).await
    }

    /// Bring back a soft deleted comment (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] for non-admins
    pub async fn restore_comment(&self, comment_id: i64) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, &format!("/comments/{comment_id}/restore"));
        self.execute(req).await
    }
}
