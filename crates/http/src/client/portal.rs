//! Public client portal: anonymous ticket submission and status lookup

use super::{ClientError, decode, default_client, normalize_base_url};
use crate::types::{PortalTicket, SubmitTicketResponse, TicketStatusResponse};
use omnidesk_core::ReferenceNumber;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use std::path::Path;

/// Largest file accepted for upload
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Client for the portal endpoints, which never carry credentials
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    /// Create a new portal client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self::from_parts(default_client()?, base_url))
    }

    pub(crate) const fn from_parts(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Submit a ticket as an anonymous client
    ///
    /// Fields and files go out as `multipart/form-data`; files are named
    /// `file_0`, `file_1`, ... in order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if a required field is empty
    pub async fn submit_ticket(
        &self,
        ticket: PortalTicket,
        attachments: Vec<Attachment>,
    ) -> Result<SubmitTicketResponse, ClientError> {
        let mut form = Form::new()
            .text("name", ticket.name)
            .text("surname", ticket.surname)
            .text("phone", ticket.phone)
            .text("email", ticket.email)
            .text("description", ticket.description);

        let count = attachments.len();
        for (index, attachment) in attachments.into_iter().enumerate() {
            let part = Part::bytes(attachment.bytes)
                .file_name(attachment.file_name)
                .mime_str(attachment.content_type)?;
            form = form.part(format!("file_{index}"), part);
        }

        debug!(attachments = count, "Submitting portal ticket");
        let response = self
            .request(Method::POST, "/client/submit-ticket")
            .multipart(form)
            .send()
            .await?;
        let submitted: SubmitTicketResponse = decode(response).await?;
        info!(reference = %submitted.reference_number, "Portal ticket submitted");
        Ok(submitted)
    }

    /// Look up the status of a submitted ticket by its reference number
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no ticket has this reference
    pub async fn ticket_status(
        &self,
        reference: ReferenceNumber,
    ) -> Result<TicketStatusResponse, ClientError> {
        let response = self
            .request(Method::GET, &format!("/client/ticket-status/{reference}"))
            .send()
            .await?;
        decode(response).await
    }
}

/// A file accepted for upload with a portal ticket
#[derive(Debug, Clone)]
pub struct Attachment {
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Wrap in-memory file contents
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Attachment`] if the file type is not an image,
    /// PDF or Word document, or the file exceeds 10 MB
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).ok_or_else(|| unsupported(&file_name))?;
        check_size(&file_name, bytes.len() as u64)?;
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read a file from disk
    ///
    /// The type and size are checked before the contents are read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Attachment`] for unsupported or oversized files,
    /// or if the file cannot be read
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Attachment(format!("{} is not a file", path.display())))?;

        if content_type_for(&file_name).is_none() {
            return Err(unsupported(&file_name));
        }
        let read_error =
            |e: std::io::Error| ClientError::Attachment(format!("Cannot read {}: {e}", path.display()));
        let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
        check_size(&file_name, metadata.len())?;

        let bytes = tokio::fs::read(path).await.map_err(read_error)?;
        Self::new(file_name, bytes)
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for the extensions the backend keeps
fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

fn check_size(file_name: &str, len: u64) -> Result<(), ClientError> {
    if len > MAX_ATTACHMENT_BYTES {
        return Err(ClientError::Attachment(format!(
            "File {file_name} is too large. Maximum size is 10MB."
        )));
    }
    Ok(())
}

fn unsupported(file_name: &str) -> ClientError {
    ClientError::Attachment(format!(
        "File {file_name} is not supported. Please use images, PDF, or Word documents."
    ))
}
