//! Filesystem build store.
//!
//! Owns the on-disk layout `<root>/<game>/<environment>/<version>/` and the
//! per-environment `latest` pointer:
//!
//! 1. **Prepare**: create the next build directory, cloned from the
//!    highest existing build so producers only overlay changed files
//! 2. **Finalize**: validate `build_info.json` + `index.html`, repoint
//!    `latest`, stamp the directory, prune old builds
//! 3. **Query**: list deployments, resolve the current one

pub mod build_info;
pub mod error;
pub mod layout;
pub mod retention;
pub mod store;

pub use build_info::read_build_info;
pub use error::StoreError;
pub use layout::Layout;
pub use retention::{PrunedBuild, prune};
pub use store::BuildStore;
