//! HTTP API module for the journal service.
//!
//! This module provides the REST endpoints that turn a payroll workbook on
//! the server into a journal-voucher workbook.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::JournalApiRequest;
pub use response::{ApiError, HealthResponse, JournalApiResponse};
pub use state::AppState;
