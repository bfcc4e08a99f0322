//! Package-manager resolution.
//!
//! Each backend is probed for availability (tool installed, project
//! manifest present) and put through a security verification gate.
//! Resolution walks the preference order and picks the first backend
//! that is both available and verified; an available backend that fails
//! the gate is demoted with a warning, never selected. When nothing
//! viable remains, resolution fails rather than silently building
//! without dependency management.

pub mod conan;
pub mod cpm;
pub mod vcpkg;
pub mod verify;

use std::path::Path;

use crate::core::package_manager::{PackageManagerCandidate, PackageManagerKind};
use crate::errors::{OrchestrateError, PackageManagerError};
use crate::util::config::OrchestratorConfig;

/// One backend's probe result, before ordering is applied.
#[derive(Debug, Clone)]
pub struct BackendProbe {
    /// Which backend was probed
    pub kind: PackageManagerKind,
    /// Tool installed and project manifest present
    pub available: bool,
    /// Security verification gate passed
    pub verified: bool,
    /// Why the probe is not viable, empty when it is
    pub detail: String,
}

impl BackendProbe {
    fn viable(kind: PackageManagerKind) -> Self {
        BackendProbe {
            kind,
            available: true,
            verified: true,
            detail: String::new(),
        }
    }

    fn unavailable(kind: PackageManagerKind, detail: impl Into<String>) -> Self {
        BackendProbe {
            kind,
            available: false,
            verified: false,
            detail: detail.into(),
        }
    }

    fn unverified(kind: PackageManagerKind, detail: impl Into<String>) -> Self {
        BackendProbe {
            kind,
            available: true,
            verified: false,
            detail: detail.into(),
        }
    }
}

/// The resolved backend plus everything that was tried and rejected.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub selected: PackageManagerCandidate,
    pub rejected: Vec<(PackageManagerKind, String)>,
}

/// Probes backends and applies the preference order.
pub struct PackageManagerResolver<'a> {
    config: &'a OrchestratorConfig,
}

impl<'a> PackageManagerResolver<'a> {
    pub fn new(config: &'a OrchestratorConfig) -> Self {
        PackageManagerResolver { config }
    }

    /// Resolve the package manager for a project.
    ///
    /// `preferences` (from the CLI) beats configured preferences, which
    /// beat the fixed default order.
    pub fn resolve(
        &self,
        project_dir: &Path,
        preferences: &[PackageManagerKind],
    ) -> Result<ResolutionOutcome, OrchestrateError> {
        let order = self.order(preferences);
        let probes: Vec<BackendProbe> = order
            .iter()
            .map(|kind| self.probe(*kind, project_dir))
            .collect();

        select_from(&order, &probes).map_err(OrchestrateError::from)
    }

    fn probe(&self, kind: PackageManagerKind, project_dir: &Path) -> BackendProbe {
        match kind {
            PackageManagerKind::Conan => conan::probe(project_dir),
            PackageManagerKind::Vcpkg => vcpkg::probe(self.config, project_dir),
            PackageManagerKind::Cpm => cpm::probe(project_dir),
        }
    }

    fn order(&self, preferences: &[PackageManagerKind]) -> Vec<PackageManagerKind> {
        if !preferences.is_empty() {
            return preferences.to_vec();
        }

        let configured: Vec<PackageManagerKind> = self
            .config
            .package_manager
            .preference
            .iter()
            .filter_map(|name| {
                let parsed = PackageManagerKind::parse(name);
                if parsed.is_none() {
                    tracing::warn!("ignoring unknown package manager preference `{}`", name);
                }
                parsed
            })
            .collect();

        if configured.is_empty() {
            PackageManagerKind::default_order().to_vec()
        } else {
            configured
        }
    }
}

/// Pick the first viable probe in preference order.
///
/// Deterministic: same probes and order always yield the same backend.
pub fn select_from(
    order: &[PackageManagerKind],
    probes: &[BackendProbe],
) -> Result<ResolutionOutcome, PackageManagerError> {
    let mut rejected: Vec<(PackageManagerKind, String)> = Vec::new();
    let mut selected: Option<PackageManagerCandidate> = None;

    for kind in order {
        let Some(probe) = probes.iter().find(|p| p.kind == *kind) else {
            continue;
        };

        if !probe.available {
            rejected.push((probe.kind, probe.detail.clone()));
            continue;
        }
        if !probe.verified {
            tracing::warn!(
                "{} is available but failed verification, skipping: {}",
                probe.kind,
                probe.detail
            );
            rejected.push((probe.kind, probe.detail.clone()));
            continue;
        }

        if selected.is_none() {
            tracing::info!("resolved package manager: {}", probe.kind);
            selected = Some(PackageManagerCandidate::verified(probe.kind));
        }
    }

    match selected {
        Some(selected) => Ok(ResolutionOutcome { selected, rejected }),
        None => Err(PackageManagerError::NoneViable { attempted: rejected }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probes(entries: &[(PackageManagerKind, bool, bool)]) -> Vec<BackendProbe> {
        entries
            .iter()
            .map(|(kind, available, verified)| BackendProbe {
                kind: *kind,
                available: *available,
                verified: *verified,
                detail: if *available && *verified {
                    String::new()
                } else {
                    format!("{kind} probe failed")
                },
            })
            .collect()
    }

    #[test]
    fn test_priority_order_is_deterministic() {
        let order = PackageManagerKind::default_order();
        let all = probes(&[
            (PackageManagerKind::Conan, true, true),
            (PackageManagerKind::Vcpkg, true, true),
            (PackageManagerKind::Cpm, true, true),
        ]);

        for _ in 0..3 {
            let outcome = select_from(&order, &all).unwrap();
            assert_eq!(outcome.selected.kind, PackageManagerKind::Conan);
            assert!(outcome.rejected.is_empty());
        }
    }

    #[test]
    fn test_unavailable_backend_falls_through() {
        let order = PackageManagerKind::default_order();
        let all = probes(&[
            (PackageManagerKind::Conan, false, false),
            (PackageManagerKind::Vcpkg, true, true),
            (PackageManagerKind::Cpm, true, true),
        ]);

        let outcome = select_from(&order, &all).unwrap();
        assert_eq!(outcome.selected.kind, PackageManagerKind::Vcpkg);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, PackageManagerKind::Conan);
    }

    #[test]
    fn test_failed_verification_demotes_to_next_backend() {
        // vcpkg is present but fails its gate; resolution moves on to
        // CPM instead of using the unverified backend.
        let order = PackageManagerKind::default_order();
        let all = probes(&[
            (PackageManagerKind::Conan, false, false),
            (PackageManagerKind::Vcpkg, true, false),
            (PackageManagerKind::Cpm, true, true),
        ]);

        let outcome = select_from(&order, &all).unwrap();
        assert_eq!(outcome.selected.kind, PackageManagerKind::Cpm);
        assert!(outcome
            .rejected
            .iter()
            .any(|(kind, _)| *kind == PackageManagerKind::Vcpkg));
    }

    #[test]
    fn test_nothing_viable_is_fatal_with_reasons() {
        let order = PackageManagerKind::default_order();
        let all = probes(&[
            (PackageManagerKind::Conan, false, false),
            (PackageManagerKind::Vcpkg, true, false),
            (PackageManagerKind::Cpm, false, false),
        ]);

        let err = select_from(&order, &all).unwrap_err();
        let PackageManagerError::NoneViable { attempted } = err;
        assert_eq!(attempted.len(), 3);
    }

    #[test]
    fn test_custom_preference_order_wins() {
        let order = [PackageManagerKind::Cpm, PackageManagerKind::Conan];
        let all = probes(&[
            (PackageManagerKind::Conan, true, true),
            (PackageManagerKind::Cpm, true, true),
        ]);

        let outcome = select_from(&order, &all).unwrap();
        assert_eq!(outcome.selected.kind, PackageManagerKind::Cpm);
    }

    #[test]
    fn test_configured_preference_parsing() {
        let mut config = OrchestratorConfig::default();
        config.package_manager.preference =
            vec!["cpm".to_string(), "bogus".to_string(), "conan".to_string()];
        let resolver = PackageManagerResolver::new(&config);

        let order = resolver.order(&[]);
        assert_eq!(order, vec![PackageManagerKind::Cpm, PackageManagerKind::Conan]);
    }
}
