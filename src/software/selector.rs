// Version selection: de-duplication, branch/release-type filters and "latest"

use crate::error::Error;
use crate::software::Package;
use crate::software::version::{ReleaseType, Version};
use std::fmt;

/// Constraints a user can put on the candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionFilter {
    /// `MAJOR.MINOR` branch, e.g. "4.29"
    pub branch: Option<String>,
    pub release_type: Option<ReleaseType>,
}

impl VersionFilter {
    pub fn new(branch: Option<String>, release_type: Option<ReleaseType>) -> Self {
        Self {
            branch,
            release_type,
        }
    }
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(branch) = &self.branch {
            parts.push(format!("branch {}", branch));
        }
        if let Some(release_type) = self.release_type {
            parts.push(format!("release type {}", release_type));
        }
        if parts.is_empty() {
            write!(f, "no filters")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Keep only versions on `branch`
pub fn filter_by_branch(versions: Vec<Version>, branch: &str) -> Vec<Version> {
    versions
        .into_iter()
        .filter(|v| v.branch() == branch)
        .collect()
}

/// Keep only versions of `release_type`; no-op when unset
pub fn filter_by_release_type(
    versions: Vec<Version>,
    release_type: Option<ReleaseType>,
) -> Vec<Version> {
    match release_type {
        Some(release_type) => versions
            .into_iter()
            .filter(|v| v.release_type() == Some(release_type))
            .collect(),
        None => versions,
    }
}

/// Sort ascending and drop labels that render to the same version
pub fn dedup_sorted(mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort();
    versions.dedup_by(|a, b| a.to_string() == b.to_string());
    versions
}

/// De-duplicated candidates matching `filter`, oldest first
pub fn select(versions: Vec<Version>, filter: &VersionFilter) -> Vec<Version> {
    let versions = match &filter.branch {
        Some(branch) => filter_by_branch(versions, branch),
        None => versions,
    };
    let versions = filter_by_release_type(versions, filter.release_type);
    dedup_sorted(versions)
}

/// Newest version matching `filter`
pub fn latest(
    versions: Vec<Version>,
    package: Package,
    filter: &VersionFilter,
) -> Result<Version, Error> {
    select(versions, filter)
        .pop()
        .ok_or_else(|| Error::NoMatchingVersion {
            package,
            filter: filter.to_string(),
        })
}

/// Distinct branches, newest first
pub fn branches(versions: &[Version]) -> Vec<String> {
    let mut keyed: Vec<(u32, u32)> = versions.iter().map(|v| (v.major(), v.minor())).collect();
    keyed.sort_unstable_by(|a, b| b.cmp(a));
    keyed.dedup();
    keyed
        .into_iter()
        .map(|(major, minor)| format!("{}.{}", major, minor))
        .collect()
}
