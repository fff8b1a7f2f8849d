// Version model for EOS and CloudVision releases

use crate::error::Error;
use crate::software::Package;
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

lazy_static::lazy_static! {
    /// MAJOR.MINOR.PATCH[.EXTRA][M|F|I[-INT]]
    static ref EOS_PATTERN: Regex =
        Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?(?:([MFI])(-INT)?)?$")
            .expect("Failed to compile EOS version pattern");
    /// YEAR.MINOR.PATCH
    static ref CVP_PATTERN: Regex =
        Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("Failed to compile CVP version pattern");
}

/// EOS release train a version belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    Maintenance,
    Feature,
    Internal,
}

impl ReleaseType {
    pub fn letter(&self) -> char {
        match self {
            ReleaseType::Maintenance => 'M',
            ReleaseType::Feature => 'F',
            ReleaseType::Internal => 'I',
        }
    }

    /// Name shown to users
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseType::Maintenance => "Maintenance",
            ReleaseType::Feature => "Feature",
            ReleaseType::Internal => "Internal",
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "M" => Some(ReleaseType::Maintenance),
            "F" => Some(ReleaseType::Feature),
            "I" => Some(ReleaseType::Internal),
            _ => None,
        }
    }
}

/// Sort rank of a release type. Internal builds sit below everything, the
/// Maintenance release of a numeric triple ships after its Feature release.
fn release_rank(release_type: Option<ReleaseType>) -> u8 {
    match release_type {
        Some(ReleaseType::Internal) => 0,
        None => 1,
        Some(ReleaseType::Feature) => 2,
        Some(ReleaseType::Maintenance) => 3,
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for ReleaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M" | "MAINTENANCE" => Ok(ReleaseType::Maintenance),
            "F" | "FEATURE" => Ok(ReleaseType::Feature),
            "I" | "INT" | "INTERNAL" => Ok(ReleaseType::Internal),
            _ => Err(format!(
                "unsupported release type '{}'. Expected M, F or I",
                s
            )),
        }
    }
}

impl Serialize for ReleaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed software version. Immutable once built by [`Version::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    package: Package,
    major: u32,
    minor: u32,
    patch: u32,
    extra: Option<u32>,
    release_type: Option<ReleaseType>,
    internal: bool,
}

impl Version {
    /// Parse a raw version string with the grammar of `package`.
    pub fn parse(raw: &str, package: Package) -> Result<Self, Error> {
        let invalid = || Error::InvalidVersionFormat {
            package,
            raw: raw.to_string(),
        };

        let pattern: &Regex = match package {
            Package::Eos => &*EOS_PATTERN,
            Package::Cvp => &*CVP_PATTERN,
        };
        let caps = pattern.captures(raw).ok_or_else(invalid)?;

        let number = |caps: &Captures, idx: usize| -> Result<Option<u32>, Error> {
            caps.get(idx)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
                .transpose()
        };

        let major = number(&caps, 1)?.ok_or_else(invalid)?;
        let minor = number(&caps, 2)?.ok_or_else(invalid)?;
        let patch = number(&caps, 3)?.ok_or_else(invalid)?;

        let (extra, release_type, internal) = match package {
            Package::Eos => (
                number(&caps, 4)?,
                caps.get(5).and_then(|m| ReleaseType::from_letter(m.as_str())),
                caps.get(6).is_some(),
            ),
            Package::Cvp => (None, None, false),
        };

        Ok(Self {
            package,
            major,
            minor,
            patch,
            extra,
            release_type,
            internal,
        })
    }

    pub fn package(&self) -> Package {
        self.package
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    #[cfg(test)]
    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn release_type(&self) -> Option<ReleaseType> {
        self.release_type
    }

    /// True when the version carries the `-INT` internal build marker
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// `MAJOR.MINOR` prefix used to group releases
    pub fn branch(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Same version without the `-INT` marker
    pub fn without_internal_marker(&self) -> Self {
        Self {
            internal: false,
            ..self.clone()
        }
    }

    fn order_key(&self) -> (u32, u32, u32, u32, u8, bool) {
        (
            self.major,
            self.minor,
            self.patch,
            self.extra.unwrap_or(0),
            release_rank(self.release_type),
            !self.internal,
        )
    }
}

impl Ord for Version {
    /// Versions of different packages are grouped by package; within a
    /// package the order follows the release key, and an explicit `.0` extra
    /// segment sorts after an omitted one so the order agrees with equality.
    fn cmp(&self, other: &Self) -> Ordering {
        self.package
            .cmp(&other.package)
            .then_with(|| self.order_key().cmp(&other.order_key()))
            .then_with(|| self.extra.is_some().cmp(&other.extra.is_some()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(extra) = self.extra {
            write!(f, ".{}", extra)?;
        }
        if let Some(release_type) = self.release_type {
            write!(f, "{}", release_type)?;
        }
        if self.internal {
            write!(f, "-INT")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
