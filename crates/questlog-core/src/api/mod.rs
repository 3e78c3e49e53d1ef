//! Request gateway for the questlog REST API.
//!
//! Every network call goes through `ApiClient`, which attaches the stored
//! session credential as an `Authorization` header and reacts uniformly to
//! authorization failures: the credential is cleared, a
//! `SessionEvent::Expired` is published, and the call fails with
//! `ApiError::SessionExpired` so callers stop there.
//!
//! The network itself sits behind the `Transport` trait; `ReqwestTransport`
//! is the production implementation.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, ExpiryPolicy};
pub use error::{ApiError, ApiResult};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
