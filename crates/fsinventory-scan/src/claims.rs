//! Path claims for exclusive record ownership.

use std::path::{Path, PathBuf};

use dashmap::DashSet;

/// Tracks which paths a worker has taken ownership of during a run.
///
/// A worker claims a record's path before digesting it. Only the first claim
/// for a path succeeds, so each path produces at most one record even if a
/// descriptor source repeats itself.
#[derive(Debug, Default)]
pub struct PathClaims {
    claimed: DashSet<PathBuf>,
}

impl PathClaims {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self {
            claimed: DashSet::new(),
        }
    }

    /// Claim a path. Returns `true` if no one claimed it before.
    pub fn claim(&self, path: &Path) -> bool {
        self.claimed.insert(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_first_claim_wins() {
        let claims = PathClaims::new();
        let path = Path::new("/data/a.txt");

        assert!(claims.claim(path));
        assert!(!claims.claim(path));
        assert!(claims.claim(Path::new("/data/b.txt")));
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let claims = Arc::new(PathClaims::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let claims = Arc::clone(&claims);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    for i in 0..100 {
                        if claims.claim(Path::new(&format!("/f/{i}"))) {
                            winners.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::Relaxed), 100);
        assert!(!claims.claim(Path::new("/f/42")));
    }
}
