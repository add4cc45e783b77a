//! Release ledger, publish pipeline and rollback.
//!
//! A platform release directory (`<root>/<game>/prod/<platform>/`) holds
//! the renamed entry page and file manifest of every retained release, the
//! ledger `releases.json`, and an `index.html` pointer at the live release.
//!
//! # Publish
//!
//! 1. **Validate**: key well-formed, not yet released, build deployable
//! 2. **Stage**: copy into `<platform>_temp`, drop `build_info.json`,
//!    rename `index.html`, write the file manifest
//! 3. **Commit**: merge into the platform directory, record in the
//!    ledger, prune old releases, repoint `index.html`
//!
//! # Rollback
//!
//! Pointer-only: the ledger's `current` and `index.html` move to an older
//! release, no files are copied.

pub mod error;
pub mod ledger;
pub mod manager;
mod publish;
mod rollback;

pub use error::ReleaseError;
pub use ledger::Ledger;
pub use manager::ReleaseManager;
pub use rollback::previous_key;
