//! HTTP adapter over the build store and release manager.
//!
//! Every handler runs its filesystem work on tokio's blocking pool; the
//! router itself holds no state besides the shared [`AppState`].

mod error;
mod handlers;
mod router;
mod state;


pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::create_router;
pub use state::AppState;
