//! # Settle Up Core
//!
//! Session lifecycle and error normalization for the Settle Up client.
//! This crate defines the domain, the ports infrastructure must implement,
//! and the services built on top of them. It performs no I/O of its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use domain::{AuthFailure, AuthResult, AuthState, Field, Route, Session, User};
pub use error::{StorageError, TransportError};
pub use services::{AuthService, SessionContext};
