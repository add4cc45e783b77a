//! Pointer-only rollback to an earlier release.

use std::path::Path;

use shipyard_file_ops::swap_pointer;
use shipyard_protocol::constants::INDEX_FILE;
use shipyard_protocol::{BuildKey, ReleaseOutcome, Releases};
use tracing::info;

use crate::error::ReleaseError;
use crate::ledger::Ledger;

/// Returns the release published just before the current one.
///
/// Releases are ordered by `releasedAt`, newest first; the result is the
/// entry right after `current`.
pub fn previous_key(releases: &Releases) -> Result<BuildKey, ReleaseError> {
    let current = releases
        .current
        .as_ref()
        .ok_or(ReleaseError::NoPreviousBuild)?;
    let sorted = releases.sorted_newest_first();
    let position = sorted
        .iter()
        .position(|r| &r.key == current)
        .ok_or(ReleaseError::NoPreviousBuild)?;
    sorted
        .get(position + 1)
        .map(|r| r.key.clone())
        .ok_or(ReleaseError::NoPreviousBuild)
}

/// Makes `key` (or the previous release) current for a platform.
///
/// Must be called with the platform's ledger lock held.
pub(crate) fn rollback(
    platform_dir: &Path,
    key: Option<BuildKey>,
) -> Result<ReleaseOutcome, ReleaseError> {
    let mut ledger = Ledger::load(platform_dir)?;
    let key = match key {
        Some(key) => key,
        None => previous_key(ledger.releases())?,
    };

    let from = ledger.releases().current.clone();
    let release = ledger.record_rollback(&key)?;
    swap_pointer(&platform_dir.join(INDEX_FILE), Path::new(&release.index))?;

    info!(
        platform_dir = %platform_dir.display(),
        from = ?from.as_ref().map(ToString::to_string),
        to = %key,
        "rolled back release"
    );

    Ok(ReleaseOutcome {
        path: platform_dir.display().to_string(),
        release,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shipyard_protocol::{BuildInfo, ReleaseInfo};

    fn ledger(keys: &[(&str, i64)], current: &str) -> Releases {
        let builds = keys
            .iter()
            .map(|(key, secs)| {
                let key = BuildKey::parse(key).unwrap();
                let info = BuildInfo {
                    version: key.version(),
                    built_at: 0,
                    built_at_readable: String::new(),
                    git_commit_hash: String::new(),
                    git_branch: String::new(),
                };
                ReleaseInfo::new(key, &info, Utc.timestamp_opt(*secs, 0).unwrap())
            })
            .collect();
        Releases {
            current: Some(BuildKey::parse(current).unwrap()),
            builds,
        }
    }

    #[test]
    fn previous_follows_release_time_not_ledger_order() {
        // Ledger order deliberately differs from release time order.
        let releases = ledger(&[("m-1", 10), ("m-3", 30), ("m-2", 20)], "m-3");
        assert_eq!(previous_key(&releases).unwrap().to_string(), "m-2");
    }

    #[test]
    fn previous_of_oldest_is_none() {
        let releases = ledger(&[("m-2", 20), ("m-1", 10)], "m-1");
        assert!(matches!(
            previous_key(&releases),
            Err(ReleaseError::NoPreviousBuild)
        ));
    }

    #[test]
    fn previous_without_current_is_none() {
        assert!(matches!(
            previous_key(&Releases::default()),
            Err(ReleaseError::NoPreviousBuild)
        ));
    }
}
