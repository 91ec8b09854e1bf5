//! Session-aware HTTP client for the blog API and the account calls built on it.

mod account;
mod client;

pub use account::{LoginResponse, RegisterRequest, UserProfile};
pub use client::{should_attach_credential, ApiClient, ApiResponse, CREDENTIAL_EXEMPT_MARKERS};
