use std::path::Path;

use shipyard_file_ops::FileOpsError;
use shipyard_protocol::BuildInfo;
use shipyard_protocol::constants::BUILD_INFO_FILE;

use crate::error::StoreError;

/// Reads and validates `build_info.json` from a build directory.
pub fn read_build_info(build_dir: &Path) -> Result<BuildInfo, StoreError> {
    let path = build_dir.join(BUILD_INFO_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::MissingFile {
                file: BUILD_INFO_FILE,
                dir: build_dir.display().to_string(),
            });
        }
        Err(e) => return Err(FileOpsError::at("read", &path, e).into()),
    };

    serde_json::from_str(&content).map_err(|source| StoreError::InvalidBuildInfo {
        path: path.display().to_string(),
        source,
    })
}
