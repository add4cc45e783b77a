//! On-disk names shared by the build store and the release pipeline.

/// Build metadata written by the build producer.
pub const BUILD_INFO_FILE: &str = "build_info.json";

/// Entry page every deployable build must contain.
pub const INDEX_FILE: &str = "index.html";

/// Per-environment pointer at the most recently finalized build.
pub const LATEST_LINK: &str = "latest";

/// Directory under a game that holds platform release directories.
///
/// Reserved: no environment may use this name.
pub const PROD_DIR: &str = "prod";

/// Release ledger file inside a platform release directory.
pub const RELEASES_FILE: &str = "releases.json";

/// Suffix appended to the platform name for the publish staging directory.
pub const STAGING_SUFFIX: &str = "_temp";

/// Default number of published releases kept per platform.
pub const DEFAULT_RELEASES_TO_KEEP: usize = 5;

/// Default number of deployed builds kept per environment.
pub const DEFAULT_DEPLOYMENTS_TO_KEEP: usize = 5;

/// Environments searched, in order, when publish is called without a key.
pub const DEFAULT_PUBLISH_ENVIRONMENTS: [&str; 2] = ["master", "main"];
