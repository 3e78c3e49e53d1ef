//! Authentication module for the session credential.
//!
//! This module provides:
//! - `Credentials`: username/password pair and its Basic authorization header
//! - `Session`: the persisted credential, the only source of "logged in"

pub mod credentials;
pub mod session;

pub use credentials::{AuthMode, Credentials};
pub use session::Session;
