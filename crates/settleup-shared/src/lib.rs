//! # Settle Up Shared
//!
//! Wire types exchanged with the Settle Up API.
//! Every endpoint answers with the same [`ApiResponse`] envelope.

pub mod dto;
pub mod response;

pub use response::{ApiFieldError, ApiResponse};
