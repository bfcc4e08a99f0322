//! Per-run detection cache.
//!
//! One explicitly-scoped cache object is created per orchestration run
//! and passed through the pipeline; it is never a process-wide
//! singleton, so tests can run with independent cache instances in
//! parallel. The cache is append-only for the lifetime of a run: the
//! only guard needed when probes run in parallel is insert-if-absent.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use semver::Version;

use crate::core::compiler::CompilerId;
use crate::core::platform::{Arch, OsFamily};

/// Cache key: probe results are reusable across the run for the same
/// platform/compiler-id pair.
pub type CacheKey = (OsFamily, Arch, CompilerId);

/// The raw result of locating one compiler id, before any
/// language-standard validation is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    /// Located installations: (driver path, parsed version)
    pub installs: Vec<(PathBuf, Version)>,
    /// Locate failures, one reason per attempted location
    pub failures: Vec<String>,
}

impl ProbeResult {
    /// A probe that found nothing, with a single reason.
    pub fn not_found(reason: impl Into<String>) -> Self {
        ProbeResult {
            installs: Vec::new(),
            failures: vec![reason.into()],
        }
    }
}

/// Append-only detection cache for one orchestration run.
#[derive(Debug, Default)]
pub struct DetectionCache {
    inner: Mutex<HashMap<CacheKey, ProbeResult>>,
}

impl DetectionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached probe result.
    pub fn get(&self, key: &CacheKey) -> Option<ProbeResult> {
        self.inner.lock().expect("detection cache poisoned").get(key).cloned()
    }

    /// Insert a probe result unless one is already present; returns the
    /// stored value either way (first write wins).
    pub fn insert_if_absent(&self, key: CacheKey, result: ProbeResult) -> ProbeResult {
        let mut map = self.inner.lock().expect("detection cache poisoned");
        map.entry(key).or_insert(result).clone()
    }

    /// Number of cached probe results.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("detection cache poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheKey {
        (OsFamily::Linux, Arch::X64, CompilerId::Gcc)
    }

    #[test]
    fn test_first_write_wins() {
        let cache = DetectionCache::new();
        let first = ProbeResult {
            installs: vec![(PathBuf::from("/usr/bin/gcc"), Version::new(13, 2, 0))],
            failures: vec![],
        };
        let second = ProbeResult::not_found("gcc not found");

        let stored = cache.insert_if_absent(key(), first.clone());
        assert_eq!(stored, first);

        // A racing probe must not clobber the stored result.
        let stored = cache.insert_if_absent(key(), second);
        assert_eq!(stored, first);
        assert_eq!(cache.get(&key()), Some(first));
    }

    #[test]
    fn test_independent_instances() {
        let a = DetectionCache::new();
        let b = DetectionCache::new();
        a.insert_if_absent(key(), ProbeResult::not_found("x"));
        assert!(b.get(&key()).is_none());
        assert!(b.is_empty());
    }
}
