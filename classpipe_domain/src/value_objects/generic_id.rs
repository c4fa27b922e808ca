// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Generic ID Value Object
//!
//! A type-safe ID built on ULID (time-ordered, 128-bit) with a phantom marker
//! type per entity category. Concrete entity IDs (`ClassSessionId`, `UploadSessionId`,
//! ...) are newtype wrappers around `GenericId<Marker>` where `Marker` is a
//! private zero-sized type implementing `IdCategory`. This keeps IDs from
//! different entities from being interchangeable at compile time while sharing
//! one implementation of parsing, validation, and serialization.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use ulid::Ulid;

use crate::PipelineError;

/// Category-specific behavior for an ID marker type.
pub trait IdCategory {
    fn category_name() -> &'static str;

    /// Validates category-specific constraints. The default rejects nil ULIDs.
    fn validate_id(ulid: &Ulid) -> Result<(), PipelineError> {
        if *ulid == Ulid::nil() {
            return Err(PipelineError::validation(format!("{} id cannot be nil", Self::category_name())));
        }
        Ok(())
    }
}

/// Generic identifier value object for domain entities.
///
/// Not used directly — entity modules define a newtype wrapper around
/// `GenericId<SomeMarker>` (see `class_session_id.rs` for the pattern).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<T: IdCategory> GenericId<T> {
    /// Creates a new time-ordered entity id.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, PipelineError> {
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Creates an id from a timestamp — useful for boundary ids in range queries and tests.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Result<Self, PipelineError> {
        let random = rand::random::<u128>() & ((1u128 << 80) - 1);
        let ulid = Ulid::from_parts(timestamp_ms, random);
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn from_string(s: &str) -> Result<Self, PipelineError> {
        let ulid = Ulid::from_str(s).map_err(|e| PipelineError::validation(format!("invalid id format: {e}")))?;
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp_ms() as i64).unwrap_or_else(chrono::Utc::now)
    }

    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        T::validate_id(&self.value)
    }

    pub fn is_nil(&self) -> bool {
        self.value == Ulid::nil()
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self {
            value: Ulid(0),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> Hash for GenericId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> FromStr for GenericId<T> {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<T: IdCategory> From<Ulid> for GenericId<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid).unwrap_or_else(|_| Self::new())
    }
}

impl<T: IdCategory> From<GenericId<T>> for Ulid {
    fn from(id: GenericId<T>) -> Self {
        id.value
    }
}

impl<T: IdCategory> AsRef<Ulid> for GenericId<T> {
    fn as_ref(&self) -> &Ulid {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
    struct TestEntity;

    impl IdCategory for TestEntity {
        fn category_name() -> &'static str {
            "test"
        }
    }

    type TestId = GenericId<TestEntity>;

    #[test]
    fn ids_are_unique_and_time_ordered() {
        let id1 = TestId::new();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = TestId::new();

        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn serde_roundtrip_preserves_equality() {
        let id = TestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn nil_id_fails_validation() {
        assert!(TestId::new().validate().is_ok());
        assert!(TestId::nil().validate().is_err());
    }

    #[test]
    fn from_timestamp_preserves_timestamp() {
        let ts = 1_700_000_000_000u64;
        let id = TestId::from_timestamp_ms(ts).unwrap();
        assert_eq!(id.timestamp_ms(), ts);
    }
}
