// Typed errors raised by the version, catalog and flavor modules

use crate::software::Package;
use thiserror::Error;

/// Errors produced while parsing versions, selecting candidates and resolving
/// files inside a catalog. None of them are fatal on their own: the caller
/// decides whether to skip (catalog scanning) or abort (user input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid {package} version format: '{raw}'")]
    InvalidVersionFormat { package: Package, raw: String },

    #[error("no {package} version found matching {filter}")]
    NoMatchingVersion { package: Package, filter: String },

    #[error("{package} {version} is not published in the catalog")]
    VersionNotInCatalog { package: Package, version: String },

    #[error("flavor '{flavor}' is not published for {package} {version}")]
    FlavorNotFoundInCatalog {
        package: Package,
        version: String,
        flavor: String,
    },

    #[error("unknown {package} flavor '{flavor}'")]
    UnknownFlavor { package: Package, flavor: String },
}

impl Error {
    /// Short, actionable advice shown under the error message.
    pub fn hint(&self) -> String {
        match self {
            Error::InvalidVersionFormat { package, .. } => match package {
                Package::Eos => {
                    "EOS versions look like 4.29.3M, 4.30.1F or 4.29.0.2F-INT".to_string()
                }
                Package::Cvp => "CloudVision versions look like 2024.3.0".to_string(),
            },
            Error::NoMatchingVersion { .. } => {
                "try loosening the filters (drop --branch or --release-type)".to_string()
            }
            Error::VersionNotInCatalog { package, .. } => format!(
                "run 'ardl info versions --package {}' to see published versions",
                package.key()
            ),
            Error::FlavorNotFoundInCatalog { package, .. }
            | Error::UnknownFlavor { package, .. } => format!(
                "supported {} flavors: {}",
                package,
                crate::software::flavor::flavor_keys(*package).join(", ")
            ),
        }
    }
}
