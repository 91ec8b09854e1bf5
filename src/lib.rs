//! blogdesk: client-side session and navigation layer for the blog API.
//!
//! - `http`: bearer-token HTTP client that tears the session down on 401.
//! - `nav`: route table, access guard and router.
//! - `session`: session record, durable stores and the invalidation channel.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod nav;
pub mod session;

pub use app::App;
pub use config::ClientConfig;
pub use error::{AppError, AppResult};

// Test-only printing helper: expands to eprintln! during tests and is absent otherwise.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
