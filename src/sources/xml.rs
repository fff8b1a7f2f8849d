// Folder tree XML parsing

use crate::software::CatalogNode;
use anyhow::Result;

/// Parse the portal folder tree (`<dir label>` folders and
/// `<file path>name</file>` leaves) into catalog nodes
pub fn parse_folder_tree(raw: &str) -> Result<CatalogNode> {
    let doc = roxmltree::Document::parse(raw)
        .map_err(|e| anyhow::anyhow!("Invalid folder tree XML: {}", e))?;
    Ok(convert(doc.root_element()))
}

fn convert(node: roxmltree::Node<'_, '_>) -> CatalogNode {
    if node.has_tag_name("file") {
        let path = node.attribute("path").map(str::to_string);
        let text = node.text().map(str::trim).unwrap_or_default();
        let name = if text.is_empty() {
            // fall back to the last path segment
            path.as_deref()
                .and_then(|p| p.rsplit('/').next())
                .unwrap_or_default()
                .to_string()
        } else {
            text.to_string()
        };
        return CatalogNode::file(name, path);
    }

    CatalogNode::folder(
        node.attribute("label").unwrap_or_default(),
        node.children()
            .filter(|child| child.is_element())
            .map(convert)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::catalog;
    use crate::software::flavor::lookup;
    use crate::software::{Package, Version};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cvpFolderList>
  <dir label="EOS">
    <dir label="Active Releases">
      <dir label="4.29">
        <dir label="EOS-4.29.3M">
          <file path="/support/download/EOS-USA/Active Releases/4.29/EOS-4.29.3M/EOS-4.29.3M.swi">EOS-4.29.3M.swi</file>
          <dir label="cEOS-lab">
            <file path="/support/download/EOS-USA/Active Releases/4.29/EOS-4.29.3M/cEOS-lab/cEOS-lab-4.29.3M.tar.xz">cEOS-lab-4.29.3M.tar.xz</file>
          </dir>
        </dir>
      </dir>
    </dir>
  </dir>
</cvpFolderList>"#;

    #[test]
    fn test_parse_folder_tree() {
        let tree = parse_folder_tree(SAMPLE).unwrap();
        assert_eq!(tree.label, "");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].label, "EOS");

        let versions = catalog::available_versions(&tree, Package::Eos);
        assert_eq!(versions, vec![Version::parse("4.29.3M", Package::Eos).unwrap()]);

        let path = catalog::resolve_file_path(
            &tree,
            &versions[0],
            lookup(Package::Eos, "cEOS").unwrap(),
        )
        .unwrap();
        assert!(path.ends_with("cEOS-lab/cEOS-lab-4.29.3M.tar.xz"));
    }

    #[test]
    fn test_file_name_falls_back_to_path() {
        let tree = parse_folder_tree(r#"<root><file path="/a/b/image.swi"/></root>"#).unwrap();
        assert_eq!(tree.children[0].file_name.as_deref(), Some("image.swi"));
    }

    #[test]
    fn test_invalid_xml() {
        let err = parse_folder_tree("<dir label=").unwrap_err();
        assert!(err.to_string().contains("Invalid folder tree XML"));
    }
}
