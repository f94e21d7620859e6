//! Metadata checksum verification (SHA-256, SHA-1 sidecar files).

use depot_util::errors::DepotError;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Compare fetched data against a checksum sidecar value.
///
/// Sidecar content may be just the hash, or `hash  filename`.
pub fn check(data: &[u8], sidecar: &str, algo: Algo, url: &str) -> miette::Result<()> {
    let expected = extract_hash(sidecar);
    let actual = match algo {
        Algo::Sha256 => hex_sha256(data),
        Algo::Sha1 => hex_sha1(data),
    };
    if actual.eq_ignore_ascii_case(&expected) {
        tracing::debug!("{} ok for {url}", algo.name());
        Ok(())
    } else {
        Err(DepotError::RepositoryAccess {
            coordinate: url.to_string(),
            message: format!(
                "{} mismatch: expected {expected}, got {actual}",
                algo.name()
            ),
        }
        .into())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Algo {
    Sha256,
    Sha1,
}

impl Algo {
    fn name(&self) -> &'static str {
        match self {
            Algo::Sha256 => "SHA-256",
            Algo::Sha1 => "SHA-1",
        }
    }

    /// Sidecar file suffix for this algorithm.
    pub fn suffix(&self) -> &'static str {
        match self {
            Algo::Sha256 => ".sha256",
            Algo::Sha1 => ".sha1",
        }
    }
}

/// Extract the hex hash from a checksum file.
fn extract_hash(content: &str) -> String {
    content.split_whitespace().next().unwrap_or("").to_string()
}

fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hex_sha1(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
