// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Typed checksum wrappers so a SHA-256 digest can't be compared against an
//! MD5 digest by accident.

use crate::PipelineError;
use serde::{Deserialize, Serialize};

macro_rules! hex_checksum {
    ($name:ident, $expected_len:literal) => {
        #[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn from_hex(hex_str: impl Into<String>) -> Result<Self, PipelineError> {
                let hex_str = hex_str.into();
                if hex_str.len() != $expected_len || !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(PipelineError::validation(format!(
                        "{} must be {} lowercase hex characters",
                        stringify!($name),
                        $expected_len
                    )));
                }
                Ok(Self(hex_str.to_lowercase()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

hex_checksum!(Md5Checksum, 32);
hex_checksum!(Sha256Checksum, 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(Md5Checksum::from_hex("abc").is_err());
    }

    #[test]
    fn accepts_valid_md5_and_lowercases_it() {
        let md5 = Md5Checksum::from_hex("D41D8CD98F00B204E9800998ECF8427E").unwrap();
        assert_eq!(md5.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
