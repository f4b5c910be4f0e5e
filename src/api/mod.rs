//! Request gateway: HTTP surface plus the query/answer correlation
//! protocol over the shared append-only logs.

pub mod correlate;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
