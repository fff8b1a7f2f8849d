// Checksum verification of downloaded images

use crate::software::Package;
use anyhow::Result;
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Checksum algorithms published by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Sha512,
    Md5,
}

impl ChecksumKind {
    pub fn for_package(package: Package) -> Self {
        match package {
            Package::Eos => ChecksumKind::Sha512,
            Package::Cvp => ChecksumKind::Md5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChecksumKind::Sha512 => "sha512",
            ChecksumKind::Md5 => "md5",
        }
    }
}

/// Hex digest of a file, read in chunks
pub fn compute_file_checksum(path: &Path, kind: ChecksumKind) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
    let mut buffer = vec![0u8; 64 * 1024];

    let digest = match kind {
        ChecksumKind::Sha512 => {
            let mut hasher = Sha512::new();
            loop {
                let read = file.read(&mut buffer)?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
            }
            hex::encode(hasher.finalize())
        }
        ChecksumKind::Md5 => {
            let mut context = md5::Context::new();
            loop {
                let read = file.read(&mut buffer)?;
                if read == 0 {
                    break;
                }
                context.consume(&buffer[..read]);
            }
            format!("{:x}", context.finalize())
        }
    };

    Ok(digest)
}

/// First token of a `sha512sum`/`md5sum` style file
pub fn parse_checksum_file(contents: &str) -> Option<String> {
    contents
        .split_whitespace()
        .next()
        .filter(|token| token.chars().all(|c| c.is_ascii_hexdigit()))
        .map(|token| token.to_ascii_lowercase())
}

/// Compare `image` against the digest published in `checksum_file`
pub fn verify_file(image: &Path, checksum_file: &Path, kind: ChecksumKind) -> Result<()> {
    let contents = std::fs::read_to_string(checksum_file)?;
    let expected = parse_checksum_file(&contents).ok_or_else(|| {
        anyhow::anyhow!("No {} digest found in {}", kind.name(), checksum_file.display())
    })?;
    let computed = compute_file_checksum(image, kind)?;

    if computed != expected {
        anyhow::bail!(
            "Checksum mismatch for {}: expected {}:{}, got {}:{}",
            image.display(),
            kind.name(),
            expected,
            kind.name(),
            computed
        );
    }

    Ok(())
}

/// Async wrapper for [`verify_file`], run on the blocking thread pool
pub async fn verify_file_async(
    image: PathBuf,
    checksum_file: PathBuf,
    kind: ChecksumKind,
) -> Result<()> {
    tokio::task::spawn_blocking(move || verify_file(&image, &checksum_file, kind))
        .await
        .map_err(|e| anyhow::anyhow!("Checksum task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const HELLO_SHA512: &str = "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f989dd35bc5ff499670da34255b45b0cfd830e81f605dcf7dc5542e93ae9cd76f";

    #[test]
    fn test_compute_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("image.swi");
        fs::write(&image, b"hello world").unwrap();

        assert_eq!(compute_file_checksum(&image, ChecksumKind::Md5).unwrap(), HELLO_MD5);
        assert_eq!(
            compute_file_checksum(&image, ChecksumKind::Sha512).unwrap(),
            HELLO_SHA512
        );
    }

    #[test]
    fn test_parse_checksum_file() {
        assert_eq!(
            parse_checksum_file(&format!("{}  EOS-4.29.3M.swi\n", HELLO_MD5.to_uppercase())),
            Some(HELLO_MD5.to_string())
        );
        assert_eq!(parse_checksum_file(""), None);
        assert_eq!(parse_checksum_file("<html>denied</html>"), None);
    }

    #[test]
    fn test_verify_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cvp-2024.3.0.ova");
        let good = dir.path().join("good.md5");
        let bad = dir.path().join("bad.md5");
        fs::write(&image, b"hello world").unwrap();
        fs::write(&good, format!("{}  cvp-2024.3.0.ova", HELLO_MD5)).unwrap();
        fs::write(&bad, "00000000000000000000000000000000  cvp-2024.3.0.ova").unwrap();

        verify_file(&image, &good, ChecksumKind::Md5).unwrap();
        let err = verify_file(&image, &bad, ChecksumKind::Md5).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[tokio::test]
    async fn test_verify_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("EOS-4.29.3M.swi");
        let sum = dir.path().join("EOS-4.29.3M.swi.sha512sum");
        fs::write(&image, b"hello world").unwrap();
        fs::write(&sum, format!("{}  EOS-4.29.3M.swi", HELLO_SHA512)).unwrap();

        verify_file_async(image.clone(), sum, ChecksumKind::Sha512)
            .await
            .unwrap();
        let missing = dir.path().join("missing.sha512sum");
        assert!(
            verify_file_async(image, missing, ChecksumKind::Sha512)
                .await
                .is_err()
        );
    }

    #[test]
    fn test_kind_for_package() {
        assert_eq!(ChecksumKind::for_package(Package::Eos), ChecksumKind::Sha512);
        assert_eq!(ChecksumKind::for_package(Package::Cvp), ChecksumKind::Md5);
    }
}
