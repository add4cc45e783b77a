//! In-process mutual exclusion keyed by directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Hands out one mutex per directory path.
///
/// Callers hold the returned mutex across a whole read-modify-write
/// sequence on that directory:
///
/// ```
/// # use shipyard_file_ops::DirLocks;
/// let locks = DirLocks::default();
/// let handle = locks.handle("/srv/games/space/prod/web");
/// let _guard = handle.lock().unwrap_or_else(|e| e.into_inner());
/// ```
#[derive(Debug, Default)]
pub struct DirLocks {
    inner: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DirLocks {
    /// Returns the mutex guarding `dir`, creating it on first use.
    pub fn handle(&self, dir: impl AsRef<Path>) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(dir.as_ref().to_path_buf()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_dir_shares_mutex() {
        let locks = DirLocks::default();
        let a = locks.handle("/x/prod/web");
        let b = locks.handle("/x/prod/web");
        let c = locks.handle("/x/prod/ios");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn serializes_critical_sections() {
        let locks = Arc::new(DirLocks::default());
        let counter = Arc::new(Mutex::new(Vec::new()));

        let threads: Vec<_> = (0..4)
            .map(|i| {
                let locks = Arc::clone(&locks);
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    let handle = locks.handle("/x");
                    let _guard = handle.lock().unwrap();
                    counter.lock().unwrap().push(i);
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    counter.lock().unwrap().push(i);
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let seen = counter.lock().unwrap();
        assert_eq!(seen.len(), 8);
        for pair in seen.chunks(2) {
            assert_eq!(pair[0], pair[1], "critical sections interleaved: {seen:?}");
        }
    }
}
