//! Store-assigned identifiers.
//!
//! Both ids are UUIDs rendered as the hyphenated string in JSON, in paths and
//! in storage, so a delivery-man id compares equal wherever it shows up.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

macro_rules! opaque_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses a path segment, rejecting it with a 400.
            pub fn parse_path(raw: &str) -> Result<Self, AppError> {
                raw.parse()
                    .map_err(|_| AppError::validation(format!("Invalid {} id", $label)))
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }
    };
}

opaque_id!(UserId, "user");
opaque_id!(BookingId, "booking");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_json_agree() {
        let id = UserId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_str().unwrap(), id.to_string());
        assert_eq!(id.to_string().parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn bad_path_segment_is_a_validation_error() {
        assert!(matches!(BookingId::parse_path("65a1f0"), Err(AppError::ValidationError(_))));
    }
}
