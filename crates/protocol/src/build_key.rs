//! `{environment}-{version}` identifiers shared by deployments and releases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returns `true` if `c` may appear in an environment, game or platform name.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Returns `true` if `s` is a non-empty run of `[a-zA-Z0-9_-]`.
pub fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_name_char)
}

/// Returns `true` iff `s` matches `^[a-zA-Z0-9_-]+-\d+$`.
///
/// The digit suffix must also fit in a `u64` and carry no leading zeros,
/// so every accepted key prints back unchanged.
pub fn is_build_key(s: &str) -> bool {
    split(s).is_some()
}

/// Splits at the last `-`: everything before is the environment,
/// everything after must be a decimal number without leading zeros.
fn split(s: &str) -> Option<(&str, u64)> {
    let (env, digits) = s.rsplit_once('-')?;
    if !is_valid_name(env) {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // `master-011` would otherwise name the same build as `master-11`.
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let version = digits.parse().ok()?;
    Some((env, version))
}

/// Error returned when a string is not a valid build key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid build key: {0:?}")]
pub struct InvalidBuildKey(pub String);

/// A validated `{environment}-{version}` key.
///
/// Environments whose own name ends in `-<digits>` (e.g. `staging-2`) are
/// accepted, but keys built from them always parse with the longest
/// environment prefix: `staging-2-7` is environment `staging-2`, version 7.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildKey {
    environment: String,
    version: u64,
}

impl BuildKey {
    /// Creates a key from its parts.
    pub fn new(environment: &str, version: u64) -> Result<Self, InvalidBuildKey> {
        if !is_valid_name(environment) {
            return Err(InvalidBuildKey(format!("{environment}-{version}")));
        }
        Ok(Self {
            environment: environment.to_string(),
            version,
        })
    }

    /// Parses and validates a key string.
    pub fn parse(s: &str) -> Result<Self, InvalidBuildKey> {
        let (environment, version) = split(s).ok_or_else(|| InvalidBuildKey(s.to_string()))?;
        Ok(Self {
            environment: environment.to_string(),
            version,
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Name of the renamed entry page for this release.
    pub fn index_file(&self) -> String {
        format!("index_{self}.html")
    }

    /// Name of the file manifest for this release.
    pub fn files_manifest(&self) -> String {
        format!("files_{self}.json")
    }
}

impl fmt::Display for BuildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.environment, self.version)
    }
}

impl FromStr for BuildKey {
    type Err = InvalidBuildKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BuildKey {
    type Error = InvalidBuildKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildKey> for String {
    fn from(key: BuildKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_keys() {
        assert!(is_build_key("master-11"));
        assert!(is_build_key("feature_x-1"));
        assert!(is_build_key("release-candidate-3"));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(!is_build_key("invalid-key"));
        assert!(!is_build_key("master-"));
        assert!(!is_build_key("-12"));
        assert!(!is_build_key("master12"));
        assert!(!is_build_key("mas ter-1"));
        assert!(!is_build_key("../etc-1"));
        assert!(!is_build_key(""));
        assert!(!is_build_key("master-99999999999999999999999"));
    }

    #[test]
    fn version_must_be_canonical() {
        assert!(is_build_key("master-0"));
        assert!(is_build_key("master-10"));
        assert!(!is_build_key("master-011"));
        assert!(!is_build_key("master-00"));
        assert!(BuildKey::parse("master-011").is_err());
        assert_eq!(BuildKey::parse("master-11").unwrap().to_string(), "master-11");
    }

    #[test]
    fn parse_splits_on_last_dash() {
        let key = BuildKey::parse("staging-2-7").unwrap();
        assert_eq!(key.environment(), "staging-2");
        assert_eq!(key.version(), 7);
    }

    #[test]
    fn create_then_parse_roundtrips() {
        for (env, version) in [("master", 11), ("main", 1), ("qa_eu", 120), ("a-b", 0)] {
            let key = BuildKey::new(env, version).unwrap();
            let parsed: BuildKey = key.to_string().parse().unwrap();
            assert_eq!(parsed.environment(), env);
            assert_eq!(parsed.version(), version);
            assert_eq!(parsed.to_string(), key.to_string());
        }
    }

    #[test]
    fn new_rejects_bad_environment() {
        assert!(BuildKey::new("", 1).is_err());
        assert!(BuildKey::new("a/b", 1).is_err());
    }

    #[test]
    fn derived_file_names() {
        let key = BuildKey::parse("master-11").unwrap();
        assert_eq!(key.index_file(), "index_master-11.html");
        assert_eq!(key.files_manifest(), "files_master-11.json");
    }

    #[test]
    fn serde_uses_plain_string() {
        let key = BuildKey::parse("main-4").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"main-4\"");
        let back: BuildKey = serde_json::from_str("\"main-4\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<BuildKey>("\"main-\"").is_err());
    }
}
