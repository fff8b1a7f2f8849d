// Software module: version model, selection, flavor table and catalog resolution

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub mod catalog;
pub mod flavor;
pub mod selector;
pub mod version;

pub use catalog::CatalogNode;
pub use flavor::FlavorMapping;
pub use selector::VersionFilter;
pub use version::{ReleaseType, Version};

/// Software family published on the Arista portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    Eos,
    Cvp,
}

impl Package {
    pub const ALL: [Package; 2] = [Package::Eos, Package::Cvp];

    /// Lowercase key used on the command line and in JSON output
    pub fn key(&self) -> &'static str {
        match self {
            Package::Eos => "eos",
            Package::Cvp => "cvp",
        }
    }

    /// Flavor used when the user does not pass `--format`
    pub fn default_flavor(&self) -> &'static str {
        match self {
            Package::Eos => "default",
            Package::Cvp => "ova",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Package::Eos => write!(f, "EOS"),
            Package::Cvp => write!(f, "CVP"),
        }
    }
}

impl FromStr for Package {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eos" => Ok(Package::Eos),
            "cvp" | "cloudvision" => Ok(Package::Cvp),
            _ => Err(format!(
                "unsupported package '{}'. Supported packages: eos, cvp",
                s
            )),
        }
    }
}
