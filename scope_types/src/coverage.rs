//! Coverage summary derived from the set of granted roots

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of the filesystem is currently reachable.
///
/// Ordered: `Minimal < Standard < FullMac`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoverageTier {
    Minimal,
    Standard,
    FullMac,
}

impl fmt::Display for CoverageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageTier::Minimal => write!(f, "Minimal"),
            CoverageTier::Standard => write!(f, "Standard"),
            CoverageTier::FullMac => write!(f, "Full Mac"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeCoverageSummary {
    pub tier: CoverageTier,
    pub home_covered: bool,
    pub applications_covered: bool,
    pub startup_disk_covered: bool,
    pub scope_count: usize,
}

impl ScopeCoverageSummary {
    /// Builds a summary from which well-known roots are covered.
    ///
    /// A startup-disk grant implies the other two.
    pub fn from_coverage(
        home_covered: bool,
        applications_covered: bool,
        startup_disk_covered: bool,
        scope_count: usize,
    ) -> Self {
        let tier = if startup_disk_covered {
            CoverageTier::FullMac
        } else if home_covered && applications_covered {
            CoverageTier::Standard
        } else {
            CoverageTier::Minimal
        };
        Self {
            tier,
            home_covered: home_covered || startup_disk_covered,
            applications_covered: applications_covered || startup_disk_covered,
            startup_disk_covered,
            scope_count,
        }
    }
}
