//! Well-known roots: kind inference and coverage tier computation

use scope_types::{AccessScopeKind, CanonicalPath, ScopeCoverageSummary};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The handful of locations that give grants their meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellKnownRoots {
    pub home: CanonicalPath,
    pub applications: CanonicalPath,
    pub startup_disk: CanonicalPath,
    /// Mount point directory for external volumes
    pub volumes: CanonicalPath,
}

impl WellKnownRoots {
    /// Standard layout for a user whose home is `home`
    pub fn for_home(home: &Path) -> Self {
        Self {
            home: CanonicalPath::from_normalized(home),
            applications: CanonicalPath::from_normalized("/Applications"),
            startup_disk: CanonicalPath::root(),
            volumes: CanonicalPath::from_normalized("/Volumes"),
        }
    }

    /// Infers the provenance of a grant from its canonical root
    pub fn classify(&self, root: &CanonicalPath) -> AccessScopeKind {
        if *root == self.startup_disk {
            AccessScopeKind::StartupDisk
        } else if *root == self.home {
            AccessScopeKind::Home
        } else if *root == self.applications {
            AccessScopeKind::Applications
        } else if root.is_within(&self.volumes) && *root != self.volumes {
            AccessScopeKind::ExternalVolume
        } else {
            AccessScopeKind::CustomFolder
        }
    }

    /// Computes the coverage summary for a set of granted roots
    pub fn coverage<'a, I>(&self, roots: I) -> ScopeCoverageSummary
    where
        I: IntoIterator<Item = &'a CanonicalPath>,
    {
        let mut home = false;
        let mut applications = false;
        let mut startup_disk = false;
        let mut count = 0;

        for root in roots {
            count += 1;
            home |= self.home.is_within(root);
            applications |= self.applications.is_within(root);
            startup_disk |= self.startup_disk.is_within(root);
        }

        ScopeCoverageSummary::from_coverage(home, applications, startup_disk, count)
    }
}
