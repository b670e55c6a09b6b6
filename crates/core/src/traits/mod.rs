//! Store traits for the chat query router
//!
//! Every backend the router touches sits behind one of these traits so the
//! router, search adapter, session store and logger take their clients as
//! constructor arguments and tests can substitute fakes.
//!
//! ```text
//! Records:
//!   - ServiceStore: text-search-capable reads over the services collection
//!
//! Sessions:
//!   - SessionContextStore: get / merge-upsert keyed by session id
//!
//! Audit:
//!   - InteractionLog: append-only chat log sink
//! ```

mod interaction_log;
mod session_store;
mod store;

pub use interaction_log::InteractionLog;
pub use session_store::SessionContextStore;
pub use store::{RecordQuery, ServiceStore, TextSearchExpression};
