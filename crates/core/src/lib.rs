//! OmniDesk core types and utilities

pub mod error;
pub mod filter;
pub mod reference;
pub mod ticket;

pub use error::{CoreError, CoreResult};
pub use filter::{FilterableTicket, TicketFilter};
pub use reference::ReferenceNumber;
pub use ticket::{Priority, TicketStatus};
