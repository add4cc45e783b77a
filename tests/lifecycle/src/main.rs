fn main() {
    println!("Run `cargo test -p lifecycle` to execute the end-to-end lifecycle tests.");
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use shipyard_build_store::BuildStore;
    use shipyard_protocol::{BuildInfo, ErrorKind, Releases};
    use shipyard_releases::{Ledger, ReleaseError, ReleaseManager};

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Overlays a producer's output onto a prepared build directory.
    fn produce(dir: &Path, version: u64, branch: &str, files: &[(&str, &str)]) {
        fs::write(dir.join("index.html"), format!("<main>{branch} {version}</main>")).unwrap();
        let info = serde_json::json!({
            "version": version,
            "builtAt": 1_709_370_720_000_i64 + version as i64,
            "builtAtReadable": format!("build {version}"),
            "gitCommitHash": format!("commit{version}"),
            "gitBranch": branch,
        });
        fs::write(dir.join("build_info.json"), info.to_string()).unwrap();
        for (name, content) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    /// Prepares, produces and finalizes the next build of `env`.
    fn ship(store: &BuildStore, env: &str, files: &[(&str, &str)]) -> u64 {
        let prepared = store.prepare_build("space", env, None).unwrap();
        let version = prepared.new_build_version;
        produce(Path::new(&prepared.new_build_dir), version, env, files);
        store.finalize_deployment("space", env, version).unwrap();
        version
    }

    fn live_page(root: &Path) -> String {
        fs::read_to_string(root.join("space/prod/web/index.html")).unwrap()
    }

    #[test]
    fn ledger_fixture_parses_and_keeps_shape() {
        let raw = load_fixture("releases.json");
        let releases: Releases = serde_json::from_str(&raw).unwrap();

        assert!(releases.validate().is_ok());
        assert_eq!(releases.current.as_ref().unwrap().to_string(), "master-12");
        assert_eq!(releases.builds[1].git_commit, "41b0d3a");

        let original: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let reencoded = serde_json::to_value(&releases).unwrap();
        assert_eq!(original, reencoded);
    }

    #[test]
    fn build_info_fixture_parses() {
        let info: BuildInfo = serde_json::from_str(&load_fixture("build_info.json")).unwrap();
        assert_eq!(info.version, 12);
        assert_eq!(info.git_branch, "master");
    }

    #[test]
    fn prepare_deploy_publish_rollback() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(BuildStore::new(tmp.path()));
        let releases = ReleaseManager::new(Arc::clone(&store));

        let v1 = ship(&store, "master", &[("js/engine.js", "v1"), ("art/ship.png", "png")]);
        assert_eq!(v1, 1);

        // The second build starts as a clone of the first.
        let prepared = store.prepare_build("space", "master", None).unwrap();
        assert_eq!(prepared.builds, [1]);
        let dir = PathBuf::from(&prepared.new_build_dir);
        assert!(dir.join("art/ship.png").is_file());
        produce(&dir, 2, "master", &[("js/engine.js", "v2")]);
        store.finalize_deployment("space", "master", 2).unwrap();

        let current = store.current_deployment("space", "master").unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.build_info.git_commit_hash, "commit2");

        let first = releases.publish("space", "web", Some("master-1")).unwrap();
        assert_eq!(first.release.git_commit, "commit1");
        assert_eq!(live_page(tmp.path()), "<main>master 1</main>");

        let second = releases.publish("space", "web", None).unwrap();
        assert_eq!(second.release.key.to_string(), "master-2");
        assert_eq!(live_page(tmp.path()), "<main>master 2</main>");
        let platform = tmp.path().join("space/prod/web");
        assert_eq!(fs::read_to_string(platform.join("js/engine.js")).unwrap(), "v2");
        assert!(platform.join("art/ship.png").is_file());

        let back = releases.rollback("space", "web", None).unwrap();
        assert_eq!(back.release.key.to_string(), "master-1");
        assert_eq!(live_page(tmp.path()), "<main>master 1</main>");

        let err = releases.rollback("space", "web", None).unwrap_err();
        assert!(matches!(err, ReleaseError::NoPreviousBuild));

        let forward = releases.rollback("space", "web", Some("master-2")).unwrap();
        assert_eq!(forward.release.key.version(), 2);

        let ledger = Ledger::load(&platform).unwrap();
        assert_eq!(ledger.releases().builds.len(), 2);
        assert_eq!(ledger.releases().current.as_ref().unwrap().to_string(), "master-2");
    }

    #[test]
    fn retention_trims_builds_and_releases() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(BuildStore::new(tmp.path()).with_retention(2));
        let releases = ReleaseManager::new(Arc::clone(&store)).with_releases_to_keep(2);

        for n in 1..=4 {
            let version = ship(&store, "master", &[(format!("chunk{n}.js").as_str(), "x")]);
            releases
                .publish("space", "web", Some(&format!("master-{version}")))
                .unwrap();
        }

        let versions: Vec<u64> = store
            .list_deployments("space", "master")
            .unwrap()
            .iter()
            .map(|d| d.version)
            .collect();
        assert_eq!(versions, [4, 3]);

        let ledger = releases.list_releases("space", "web").unwrap();
        let keys: Vec<String> = ledger.builds.iter().map(|b| b.key.to_string()).collect();
        assert_eq!(keys, ["master-4", "master-3"]);

        // Builds are clones of their predecessor, so the oldest kept
        // release still references every earlier chunk.
        let platform = tmp.path().join("space/prod/web");
        assert!(platform.join("chunk1.js").is_file());
        assert!(!platform.join("index_master-1.html").exists());
        assert!(!platform.join("files_master-2.json").exists());
    }

    #[test]
    fn publishing_from_a_pruned_build_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(BuildStore::new(tmp.path()).with_retention(1));
        let releases = ReleaseManager::new(Arc::clone(&store));

        ship(&store, "master", &[]);
        ship(&store, "master", &[]);

        let err = releases.publish("space", "web", Some("master-1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(releases.publish("space", "web", Some("master-2")).is_ok());
    }

    #[test]
    fn existing_ledger_is_adopted() {
        let tmp = tempfile::tempdir().unwrap();
        let platform = tmp.path().join("space/prod/web");
        fs::create_dir_all(&platform).unwrap();
        fs::write(platform.join("releases.json"), load_fixture("releases.json")).unwrap();
        for key in ["master-11", "master-12"] {
            fs::write(platform.join(format!("index_{key}.html")), key).unwrap();
            fs::write(platform.join(format!("files_{key}.json")), "[]").unwrap();
        }

        let store = Arc::new(BuildStore::new(tmp.path()));
        let releases = ReleaseManager::new(Arc::clone(&store));

        assert_eq!(
            releases.current_release("space", "web").unwrap().key.to_string(),
            "master-12"
        );
        let back = releases.rollback("space", "web", None).unwrap();
        assert_eq!(back.release.key.to_string(), "master-11");
        assert_eq!(live_page(tmp.path()), "master-11");

        // Next build continues past anything already released.
        let dir = tmp.path().join("space/master/13");
        fs::create_dir_all(&dir).unwrap();
        produce(&dir, 13, "master", &[]);
        store.finalize_deployment("space", "master", 13).unwrap();
        let outcome = releases.publish("space", "web", None).unwrap();
        assert_eq!(outcome.release.key.to_string(), "master-13");

        let listed = releases.list_releases("space", "web").unwrap();
        let keys: Vec<String> = listed.builds.iter().map(|b| b.key.to_string()).collect();
        assert_eq!(keys, ["master-13", "master-12", "master-11"]);
    }

    #[test]
    fn environments_are_independent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(BuildStore::new(tmp.path()));
        let releases = ReleaseManager::new(Arc::clone(&store));

        ship(&store, "main", &[]);
        ship(&store, "feature_x", &[]);
        ship(&store, "feature_x", &[]);

        assert_eq!(
            store.list_environments("space").unwrap(),
            ["feature_x", "main"]
        );

        // No master build, so the default falls through to main.
        let outcome = releases.publish("space", "ios", None).unwrap();
        assert_eq!(outcome.release.key.to_string(), "main-1");

        let outcome = releases.publish("space", "ios", Some("feature_x-2")).unwrap();
        assert_eq!(outcome.release.git_branch, "feature_x");
        assert!(store.list_environments("space").unwrap().len() == 2);
    }
}
