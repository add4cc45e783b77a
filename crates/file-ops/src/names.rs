use shipyard_protocol::is_valid_name;

use crate::FileOpsError;

/// Validates a game, environment or platform name used as a path segment.
///
/// Only `[a-zA-Z0-9_-]+` is accepted, which rules out separators,
/// `.`/`..` and absolute paths.
pub fn validate_name(what: &'static str, name: &str) -> Result<(), FileOpsError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(FileOpsError::InvalidName {
            what,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_name("game", "space-race").is_ok());
        assert!(validate_name("platform", "web_gl").is_ok());
        assert!(validate_name("environment", "staging-2").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for bad in ["", ".", "..", "a/b", "a\\b", "/abs", "x y"] {
            let err = validate_name("game", bad).unwrap_err();
            assert!(err.to_string().contains("invalid game name"), "{bad}");
        }
    }
}
