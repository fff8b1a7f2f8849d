// Catalog resolution over the portal's folder tree

use crate::error::Error;
use crate::software::Package;
use crate::software::flavor::{self, FlavorMapping};
use crate::software::selector;
use crate::software::version::Version;
use serde::Serialize;
use std::collections::VecDeque;

/// A node of the portal folder tree. Folders carry children, files carry a
/// `file_name` and usually the server `path` announced by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogNode {
    pub label: String,
    pub children: Vec<CatalogNode>,
    pub file_name: Option<String>,
    pub path: Option<String>,
}

impl CatalogNode {
    pub fn folder(label: impl Into<String>, children: Vec<CatalogNode>) -> Self {
        Self {
            label: label.into(),
            children,
            file_name: None,
            path: None,
        }
    }

    pub fn file(name: impl Into<String>, path: Option<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            children: Vec::new(),
            file_name: Some(name),
            path,
        }
    }

    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }
}

/// One file published for a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Folder label as the portal names it, e.g. "EOS-4.29.3M"
    pub version_label: String,
    pub file_name: String,
    pub file_path: String,
    pub flavor: &'static str,
}

/// Where a package keeps its releases in the tree and how deep to look
struct Traversal {
    /// Folder labels leading to the release root, each searched within
    /// `search_depth` levels of the previous one
    root: &'static [&'static str],
    search_depth: usize,
    /// Levels below the release root holding version folders (branch/version)
    version_depth: usize,
    /// Levels below a version folder holding its files
    file_depth: usize,
    /// Prefix the portal puts in front of version folder labels
    label_prefix: &'static str,
}

const EOS_TRAVERSAL: Traversal = Traversal {
    root: &["EOS", "Active Releases"],
    search_depth: 2,
    version_depth: 2,
    file_depth: 2,
    label_prefix: "EOS-",
};

const CVP_TRAVERSAL: Traversal = Traversal {
    root: &["CloudVision", "Active Releases"],
    search_depth: 2,
    version_depth: 2,
    file_depth: 2,
    label_prefix: "",
};

fn traversal(package: Package) -> &'static Traversal {
    match package {
        Package::Eos => &EOS_TRAVERSAL,
        Package::Cvp => &CVP_TRAVERSAL,
    }
}

/// Breadth-first list of the descendants of `node` down to `max_depth`
/// levels, each with its path from the tree root.
fn descendants<'a>(
    node: &'a CatalogNode,
    node_path: &str,
    max_depth: usize,
) -> Vec<(String, &'a CatalogNode)> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([(node_path.to_string(), node, 0usize)]);

    while let Some((path, current, depth)) = queue.pop_front() {
        if depth == max_depth {
            continue;
        }
        for child in &current.children {
            let child_path = format!("{}/{}", path, child.label);
            queue.push_back((child_path.clone(), child, depth + 1));
            found.push((child_path, child));
        }
    }

    found
}

fn find_folder<'a>(
    node: &'a CatalogNode,
    node_path: &str,
    label: &str,
    max_depth: usize,
) -> Option<(String, &'a CatalogNode)> {
    descendants(node, node_path, max_depth)
        .into_iter()
        .find(|(_, child)| !child.is_file() && child.label == label)
}

fn release_root(tree: &CatalogNode, package: Package) -> Option<(String, &CatalogNode)> {
    let rule = traversal(package);
    let mut current = (String::new(), tree);
    for label in rule.root {
        current = find_folder(current.1, &current.0, label, rule.search_depth)?;
    }
    Some(current)
}

/// Parse a folder label as a version of `package`, ignoring the portal prefix
fn version_from_label(label: &str, package: Package) -> Option<Version> {
    let rule = traversal(package);
    let raw = label.strip_prefix(rule.label_prefix).unwrap_or(label);
    Version::parse(raw, package).ok()
}

/// Every folder label under the package's release root, version-shaped or
/// not. An absent release root yields no labels.
pub fn list_version_labels(tree: &CatalogNode, package: Package) -> Vec<String> {
    let Some((root_path, root)) = release_root(tree, package) else {
        return Vec::new();
    };
    descendants(root, &root_path, traversal(package).version_depth)
        .into_iter()
        .filter(|(_, node)| !node.is_file())
        .map(|(_, node)| node.label.clone())
        .collect()
}

/// Versions published for `package`, oldest first, without duplicates.
/// Labels that are not versions ("Active Releases", branch folders) are skipped.
pub fn available_versions(tree: &CatalogNode, package: Package) -> Vec<Version> {
    let versions = list_version_labels(tree, package)
        .iter()
        .filter_map(|label| version_from_label(label, package))
        .collect();
    selector::dedup_sorted(versions)
}

fn version_folder<'a>(
    tree: &'a CatalogNode,
    version: &Version,
) -> Result<(String, &'a CatalogNode), Error> {
    let package = version.package();
    let not_found = || Error::VersionNotInCatalog {
        package,
        version: version.to_string(),
    };

    let (root_path, root) = release_root(tree, package).ok_or_else(not_found)?;
    descendants(root, &root_path, traversal(package).version_depth)
        .into_iter()
        .find(|(_, node)| {
            !node.is_file()
                && version_from_label(&node.label, package)
                    .is_some_and(|v| v.to_string() == version.to_string())
        })
        .ok_or_else(not_found)
}

/// Server path of the file `mapping` names for `version`
pub fn resolve_file_path(
    tree: &CatalogNode,
    version: &Version,
    mapping: &FlavorMapping,
) -> Result<String, Error> {
    let package = version.package();
    let (folder_path, folder) = version_folder(tree, version)?;
    let file_name = mapping.render_filename(version);

    descendants(folder, &folder_path, traversal(package).file_depth)
        .into_iter()
        .find(|(_, node)| node.file_name.as_deref() == Some(file_name.as_str()))
        .map(|(path, node)| node.path.clone().unwrap_or(path))
        .ok_or_else(|| Error::FlavorNotFoundInCatalog {
            package,
            version: version.to_string(),
            flavor: mapping.flavor.to_string(),
        })
}

/// Extension of the checksum file published next to each image
pub fn checksum_extension(package: Package) -> &'static str {
    match package {
        Package::Eos => "sha512sum",
        Package::Cvp => "md5",
    }
}

/// Sibling checksum file of `file_path`
pub fn resolve_checksum_path(file_path: &str, package: Package) -> String {
    format!("{}.{}", file_path, checksum_extension(package))
}

/// Every file published for `version` that belongs to a known flavor
pub fn entries_for_version(
    tree: &CatalogNode,
    version: &Version,
) -> Result<Vec<CatalogEntry>, Error> {
    let package = version.package();
    let (folder_path, folder) = version_folder(tree, version)?;

    let entries = descendants(folder, &folder_path, traversal(package).file_depth)
        .into_iter()
        .filter_map(|(path, node)| {
            let file_name = node.file_name.as_deref()?;
            let mapping = flavor::flavors(package)
                .iter()
                .find(|m| m.render_filename(version) == file_name)?;
            Some(CatalogEntry {
                version_label: folder.label.clone(),
                file_name: file_name.to_string(),
                file_path: node.path.clone().unwrap_or(path),
                flavor: mapping.flavor,
            })
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::flavor::lookup;

    const EOS_BASE: &str = "/support/download/EOS-USA/Active Releases";

    fn eos_release(branch: &str, version: &str, with_ceos: bool) -> CatalogNode {
        let base = format!("{}/{}/EOS-{}", EOS_BASE, branch, version);
        let mut children = vec![
            CatalogNode::file(
                format!("EOS-{}.swi", version),
                Some(format!("{}/EOS-{}.swi", base, version)),
            ),
            CatalogNode::file(
                format!("EOS-{}.swi.sha512sum", version),
                Some(format!("{}/EOS-{}.swi.sha512sum", base, version)),
            ),
            CatalogNode::file(
                format!("EOS64-{}.swi", version),
                Some(format!("{}/EOS64-{}.swi", base, version)),
            ),
        ];
        if with_ceos {
            children.push(CatalogNode::folder(
                "cEOS-lab",
                vec![CatalogNode::file(
                    format!("cEOS-lab-{}.tar.xz", version),
                    Some(format!("{}/cEOS-lab/cEOS-lab-{}.tar.xz", base, version)),
                )],
            ));
        }
        CatalogNode::folder(format!("EOS-{}", version), children)
    }

    fn sample_tree() -> CatalogNode {
        CatalogNode::folder(
            "",
            vec![
                CatalogNode::folder(
                    "EOS",
                    vec![
                        CatalogNode::folder(
                            "Active Releases",
                            vec![
                                CatalogNode::folder(
                                    "4.29",
                                    vec![
                                        eos_release("4.29", "4.29.3M", true),
                                        eos_release("4.29", "4.29.2M", false),
                                        eos_release("4.29", "4.29.10M", false),
                                        CatalogNode::folder("Release Notes", vec![]),
                                    ],
                                ),
                                CatalogNode::folder(
                                    "4.30",
                                    vec![eos_release("4.30", "4.30.1F", true)],
                                ),
                            ],
                        ),
                        CatalogNode::folder(
                            "EOS-Archive",
                            vec![CatalogNode::folder(
                                "4.20",
                                vec![eos_release("4.20", "4.20.1F", false)],
                            )],
                        ),
                    ],
                ),
                CatalogNode::folder(
                    "CloudVision",
                    vec![CatalogNode::folder(
                        "CloudVision Portal",
                        vec![CatalogNode::folder(
                            "Active Releases",
                            vec![CatalogNode::folder(
                                "2024.3",
                                vec![
                                    CatalogNode::folder(
                                        "2024.3.0",
                                        vec![
                                            CatalogNode::file("cvp-2024.3.0.ova", None),
                                            CatalogNode::file("cvp-2024.3.0.ova.md5", None),
                                        ],
                                    ),
                                    CatalogNode::folder(
                                        "2024.3.1",
                                        vec![CatalogNode::file("cvp-2024.3.1-kvm.tgz", None)],
                                    ),
                                ],
                            )],
                        )],
                    )],
                ),
            ],
        )
    }

    fn eos(raw: &str) -> Version {
        Version::parse(raw, Package::Eos).unwrap()
    }

    #[test]
    fn test_list_version_labels_includes_non_versions() {
        let labels = list_version_labels(&sample_tree(), Package::Eos);
        assert!(labels.contains(&"4.29".to_string()));
        assert!(labels.contains(&"Release Notes".to_string()));
        assert!(labels.contains(&"EOS-4.29.3M".to_string()));
        // archive is outside Active Releases
        assert!(!labels.contains(&"EOS-4.20.1F".to_string()));
    }

    #[test]
    fn test_available_versions_skips_non_versions() {
        let versions: Vec<String> = available_versions(&sample_tree(), Package::Eos)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(versions, vec!["4.29.2M", "4.29.3M", "4.29.10M", "4.30.1F"]);

        let cvp: Vec<String> = available_versions(&sample_tree(), Package::Cvp)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(cvp, vec!["2024.3.0", "2024.3.1"]);
    }

    #[test]
    fn test_available_versions_deduplicates() {
        let tree = CatalogNode::folder(
            "",
            vec![CatalogNode::folder(
                "EOS",
                vec![CatalogNode::folder(
                    "Active Releases",
                    vec![
                        CatalogNode::folder("4.29", vec![eos_release("4.29", "4.29.3M", false)]),
                        CatalogNode::folder("Other", vec![CatalogNode::folder("4.29.3M", vec![])]),
                    ],
                )],
            )],
        );
        assert_eq!(available_versions(&tree, Package::Eos), vec![eos("4.29.3M")]);
    }

    #[test]
    fn test_missing_release_root_yields_nothing() {
        let tree = CatalogNode::folder("", vec![CatalogNode::folder("EOS", vec![])]);
        assert!(list_version_labels(&tree, Package::Eos).is_empty());
        assert!(available_versions(&tree, Package::Cvp).is_empty());
    }

    #[test]
    fn test_resolve_file_path() {
        let tree = sample_tree();
        let ceos = lookup(Package::Eos, "cEOS").unwrap();
        let path = resolve_file_path(&tree, &eos("4.29.3M"), ceos).unwrap();
        assert_eq!(
            path,
            "/support/download/EOS-USA/Active Releases/4.29/EOS-4.29.3M/cEOS-lab/cEOS-lab-4.29.3M.tar.xz"
        );

        let eos64 = lookup(Package::Eos, "64").unwrap();
        let path = resolve_file_path(&tree, &eos("4.30.1F"), eos64).unwrap();
        assert!(path.ends_with("/EOS-4.30.1F/EOS64-4.30.1F.swi"));
    }

    #[test]
    fn test_resolve_file_path_without_server_path() {
        let tree = sample_tree();
        let version = Version::parse("2024.3.0", Package::Cvp).unwrap();
        let ova = lookup(Package::Cvp, "ova").unwrap();
        let path = resolve_file_path(&tree, &version, ova).unwrap();
        assert_eq!(
            path,
            "/CloudVision/CloudVision Portal/Active Releases/2024.3/2024.3.0/cvp-2024.3.0.ova"
        );
    }

    #[test]
    fn test_resolve_missing_flavor() {
        let err = resolve_file_path(
            &sample_tree(),
            &eos("4.29.2M"),
            lookup(Package::Eos, "cEOS").unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::FlavorNotFoundInCatalog {
                package: Package::Eos,
                version: "4.29.2M".to_string(),
                flavor: "cEOS".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_missing_version() {
        let err = resolve_file_path(
            &sample_tree(),
            &eos("4.31.0F"),
            lookup(Package::Eos, "64").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::VersionNotInCatalog { .. }));
    }

    #[test]
    fn test_checksum_path() {
        assert_eq!(
            resolve_checksum_path("/a/b/EOS-4.29.3M.swi", Package::Eos),
            "/a/b/EOS-4.29.3M.swi.sha512sum"
        );
        assert_eq!(
            resolve_checksum_path("/a/cvp-2024.3.0.ova", Package::Cvp),
            "/a/cvp-2024.3.0.ova.md5"
        );
    }

    #[test]
    fn test_entries_for_version() {
        let entries = entries_for_version(&sample_tree(), &eos("4.29.3M")).unwrap();
        let flavors: Vec<&str> = entries.iter().map(|e| e.flavor).collect();
        assert_eq!(flavors, vec!["default", "64", "cEOS"]);
        assert!(entries.iter().all(|e| e.version_label == "EOS-4.29.3M"));
        assert_eq!(entries[2].file_name, "cEOS-lab-4.29.3M.tar.xz");
    }
}
