//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors and
/// conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a participation (one entitlement term).
    ParticipationId
);

uuid_id!(
    /// Unique identifier for an individual member.
    MemberId
);

uuid_id!(
    /// Unique identifier for an organization member.
    OrganizationId
);

uuid_id!(
    /// Unique identifier for a subscription product in the catalog.
    ProductId
);

uuid_id!(
    /// Unique identifier for a pricing tier.
    TierId
);

uuid_id!(
    /// Unique identifier for a change request.
    ChangeRequestId
);

uuid_id!(
    /// Unique identifier for a history record.
    HistoryRecordId
);

uuid_id!(
    /// Unique identifier for a chapter.
    ChapterId
);

uuid_id!(
    /// Unique identifier for a committee.
    CommitteeId
);

/// Member type / category code (e.g. `regular`, `student`, `retired`).
///
/// Codes are case-insensitive and stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberType(String);

impl MemberType {
    /// Creates a new MemberType, validating that it's not empty.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("member_type"));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MemberType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberType> for String {
    fn from(value: MemberType) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participation_id_generates_unique_values() {
        let id1 = ParticipationId::new();
        let id2 = ParticipationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn product_id_parses_from_string() {
        let uuid = "550e8400-e29b-41d4-a716-446655440000";
        let id: ProductId = uuid.parse().unwrap();
        assert_eq!(id.to_string(), uuid);
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = MemberId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""00000000-0000-0000-0000-000000000000""#);
    }

    #[test]
    fn member_type_rejects_empty() {
        assert!(MemberType::new("   ").is_err());
    }

    #[test]
    fn member_type_is_normalized() {
        let t = MemberType::new(" Student ").unwrap();
        assert_eq!(t.as_str(), "student");
        assert_eq!(t, MemberType::new("STUDENT").unwrap());
    }

    #[test]
    fn member_type_deserialization_validates() {
        let ok: MemberType = serde_json::from_str(r#""regular""#).unwrap();
        assert_eq!(ok.as_str(), "regular");
        assert!(serde_json::from_str::<MemberType>(r#""""#).is_err());
    }
}
