//! OmniDesk HTTP client
//!
//! Transport types mirroring the OmniDesk REST API plus an async client that
//! attaches bearer tokens and transparently refreshes an expired access token
//! once per request.

#[cfg(feature = "client")]
#[macro_use]
extern crate tracing;

pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::{
    OmnideskClient, OmnideskClientBuilder,
    error::ClientError,
    portal::{Attachment, PortalClient},
    session::{FileTokenStore, MemoryTokenStore, TokenStore, Tokens},
};
