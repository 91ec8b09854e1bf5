//! Client-side session state shared by the API client and the router.
//! Keep the public surface thin and split implementation across sub-modules.

mod context;
mod record;
mod store;

pub use context::{SessionContext, SessionEvent};
pub use record::{SessionRecord, ADMIN_ROLE};
pub use store::{FileStore, MemoryStore, SessionStore};
