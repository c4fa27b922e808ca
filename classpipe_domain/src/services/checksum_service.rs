// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Chunk and whole-file integrity checking. Synchronous and CPU-bound;
//! infrastructure wraps calls in `tokio::task::spawn_blocking` for async
//! contexts.

use crate::value_objects::{Md5Checksum, Sha256Checksum};
use md5::{Digest as Md5Digest, Md5};
use sha2::{Digest as Sha2Digest, Sha256};

pub trait ChecksumService: Send + Sync {
    fn md5(&self, data: &[u8]) -> Md5Checksum;
    fn sha256(&self, data: &[u8]) -> Sha256Checksum;
    fn verify_md5(&self, data: &[u8], expected: &Md5Checksum) -> bool {
        &self.md5(data) == expected
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HashChecksumService;

impl ChecksumService for HashChecksumService {
    fn md5(&self, data: &[u8]) -> Md5Checksum {
        let digest = Md5::digest(data);
        Md5Checksum::from_hex(hex::encode(digest)).expect("hex::encode always produces a valid-length hex string")
    }

    fn sha256(&self, data: &[u8]) -> Sha256Checksum {
        let digest = Sha256::digest(data);
        Sha256Checksum::from_hex(hex::encode(digest)).expect("hex::encode always produces a valid-length hex string")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_empty_input_matches_known_digest() {
        let service = HashChecksumService;
        let checksum = service.md5(b"");
        assert_eq!(checksum.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn verify_md5_detects_tampering() {
        let service = HashChecksumService;
        let checksum = service.md5(b"hello");
        assert!(service.verify_md5(b"hello", &checksum));
        assert!(!service.verify_md5(b"hellx", &checksum));
    }
}
