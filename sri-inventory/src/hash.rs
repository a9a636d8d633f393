use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha384};

use crate::error::{Error, Result};

/// Prefix of every digest produced here, as expected by the `integrity`
/// attribute.
pub const SRI_PREFIX: &str = "sha384-";

/// Computes the Subresource Integrity string for a buffer:
/// `sha384-` followed by the standard base64 encoding of the SHA-384 digest.
pub fn sri_hash(content: impl AsRef<[u8]>) -> String {
    let digest = Sha384::digest(content.as_ref());
    format!("{SRI_PREFIX}{}", BASE64.encode(digest))
}

/// Reads `path` and returns its [`sri_hash`].
pub fn sri_hash_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::io(path, source))?;
    Ok(sri_hash(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn matches_known_digest() {
        // sha384("") from the SRI spec examples.
        assert_eq!(
            sri_hash(b""),
            "sha384-OLBgp1GsljhM2TJ+sbHjaiH9txEUvgdDTAzHv2P24donTt6/529l+9Ua0vFImLlb"
        );
    }

    #[test]
    fn string_and_bytes_agree() {
        assert_eq!(sri_hash("console.log(1)"), sri_hash(b"console.log(1)".to_vec()));
    }

    #[test]
    fn deterministic_and_sensitive_to_single_byte() {
        let a = sri_hash(b"alert('a')");
        assert_eq!(a, sri_hash(b"alert('a')"));
        assert_ne!(a, sri_hash(b"alert('b')"));
        assert!(a.starts_with(SRI_PREFIX));
        // 48 digest bytes encode to 64 base64 characters.
        assert_eq!(a.len(), SRI_PREFIX.len() + 64);
    }

    #[test]
    fn hashes_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"var x = 1;").unwrap();
        file.flush().unwrap();
        assert_eq!(sri_hash_file(file.path()).unwrap(), sri_hash(b"var x = 1;"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = sri_hash_file(dir.path().join("nope.js")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
