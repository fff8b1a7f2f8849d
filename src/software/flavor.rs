// Flavor table: how each (package, flavor) pair names its files on the portal

use crate::error::Error;
use crate::software::Package;
use crate::software::version::Version;
use FilenameRule::{FixedInternal, LabInfix, Standard};
use serde::Serialize;
use std::collections::HashSet;

/// Filename construction rule. Filenames must match what the portal serves,
/// so every exception is its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameRule {
    /// `{prefix}-{version}{extension}`
    Standard,
    /// `{prefix}-lab-{version}{extension}`, used by container images
    LabInfix,
    /// `{prefix}-{version}-INT{extension}` whatever the version's own marker
    FixedInternal,
}

/// One row of the flavor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlavorMapping {
    pub package: Package,
    pub flavor: &'static str,
    pub prefix: &'static str,
    pub extension: &'static str,
    pub rule: FilenameRule,
    pub description: &'static str,
}

const fn row(
    package: Package,
    flavor: &'static str,
    prefix: &'static str,
    extension: &'static str,
    rule: FilenameRule,
    description: &'static str,
) -> FlavorMapping {
    FlavorMapping {
        package,
        flavor,
        prefix,
        extension,
        rule,
        description,
    }
}

const fn eos(
    flavor: &'static str,
    prefix: &'static str,
    extension: &'static str,
    rule: FilenameRule,
    description: &'static str,
) -> FlavorMapping {
    row(Package::Eos, flavor, prefix, extension, rule, description)
}

const fn cvp(
    flavor: &'static str,
    prefix: &'static str,
    extension: &'static str,
    description: &'static str,
) -> FlavorMapping {
    row(Package::Cvp, flavor, prefix, extension, Standard, description)
}

#[rustfmt::skip]
static EOS_FLAVORS: &[FlavorMapping] = &[
    eos("64",         "EOS64",      ".swi",        Standard,      "64-bit switch image"),
    eos("INT",        "EOS",        ".swi",        FixedInternal, "internal switch image"),
    eos("2GB-INT",    "EOS-2GB",    ".swi",        FixedInternal, "internal 2GB switch image"),
    eos("cEOS",       "cEOS",       ".tar.xz",     LabInfix,      "container lab image"),
    eos("cEOS64",     "cEOS64",     ".tar.xz",     LabInfix,      "64-bit container lab image"),
    eos("cEOSarm",    "cEOSarm",    ".tar.xz",     LabInfix,      "ARM container lab image"),
    eos("vEOS",       "vEOS",       ".vmdk",       Standard,      "VM image"),
    eos("vEOS-lab",   "vEOS-lab",   ".vmdk",       Standard,      "VM lab image"),
    eos("vEOS64-lab", "vEOS64-lab", ".vmdk",       Standard,      "64-bit VM lab image"),
    eos("EOS-2GB",    "EOS-2GB",    ".swi",        Standard,      "2GB flash switch image"),
    eos("SOURCE",     "EOS",        "-source.tar", Standard,      "source archive"),
    eos("default",    "EOS",        ".swi",        Standard,      "32-bit switch image"),
];

#[rustfmt::skip]
static CVP_FLAVORS: &[FlavorMapping] = &[
    cvp("ova",     "cvp",               ".ova",     "OVA appliance"),
    cvp("rpm",     "cvp-rpm-installer", "",         "RPM installer"),
    cvp("kvm",     "cvp",               "-kvm.tgz", "KVM appliance"),
    cvp("upgrade", "cvp-upgrade",       ".tgz",     "upgrade bundle"),
];

/// Every flavor declared for `package`
pub fn flavors(package: Package) -> &'static [FlavorMapping] {
    match package {
        Package::Eos => EOS_FLAVORS,
        Package::Cvp => CVP_FLAVORS,
    }
}

/// Flavor keys declared for `package`, in table order
pub fn flavor_keys(package: Package) -> Vec<&'static str> {
    flavors(package).iter().map(|m| m.flavor).collect()
}

/// Find the mapping for `flavor`. Unknown flavors are never defaulted.
pub fn lookup(package: Package, flavor: &str) -> Result<&'static FlavorMapping, Error> {
    flavors(package)
        .iter()
        .find(|m| m.flavor == flavor)
        .ok_or_else(|| Error::UnknownFlavor {
            package,
            flavor: flavor.to_string(),
        })
}

/// Check the static table: one row per (package, flavor), no empty prefixes,
/// rows filed under the right package.
pub fn validate_table() -> anyhow::Result<()> {
    for package in Package::ALL {
        let mut seen = HashSet::new();
        for mapping in flavors(package) {
            if mapping.package != package {
                anyhow::bail!(
                    "flavor '{}' is filed under {} but declared for {}",
                    mapping.flavor,
                    package,
                    mapping.package
                );
            }
            if mapping.prefix.is_empty() {
                anyhow::bail!("{} flavor '{}' has an empty prefix", package, mapping.flavor);
            }
            if !seen.insert(mapping.flavor) {
                anyhow::bail!("{} flavor '{}' is declared twice", package, mapping.flavor);
            }
        }
    }
    Ok(())
}

impl FlavorMapping {
    /// Filename the portal uses for `version` in this flavor
    pub fn render_filename(&self, version: &Version) -> String {
        match self.rule {
            FilenameRule::Standard => format!("{}-{}{}", self.prefix, version, self.extension),
            FilenameRule::LabInfix => {
                format!("{}-lab-{}{}", self.prefix, version, self.extension)
            }
            FilenameRule::FixedInternal => format!(
                "{}-{}-INT{}",
                self.prefix,
                version.without_internal_marker(),
                self.extension
            ),
        }
    }

    /// Filename pattern with a `{version}` placeholder, for display
    pub fn filename_template(&self) -> String {
        match self.rule {
            FilenameRule::Standard => format!("{}-{{version}}{}", self.prefix, self.extension),
            FilenameRule::LabInfix => format!("{}-lab-{{version}}{}", self.prefix, self.extension),
            FilenameRule::FixedInternal => {
                format!("{}-{{version}}-INT{}", self.prefix, self.extension)
            }
        }
    }

    /// Container images can be imported into Docker
    pub fn is_container(&self) -> bool {
        self.rule == FilenameRule::LabInfix
    }

    /// Disk images EVE-NG can run
    pub fn is_virtual_disk(&self) -> bool {
        self.extension == ".vmdk"
    }
}
