//! Newtype wrappers for domain identifiers.
//!
//! GitHub and Discord both hand out numeric IDs, and a pull request carries two
//! of them (the stable `id` and the human-facing `number`). Wrapping each one
//! keeps a `PrNumber` from ever being used where a `PrId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stable, immutable GitHub identifier of a pull request.
///
/// This is the key of the thread registry: unlike the number, it never
/// changes and is unique across repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrId(pub u64);

impl fmt::Display for PrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PrId {
    fn from(n: u64) -> Self {
        PrId(n)
    }
}

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// A Discord snowflake identifying a thread.
///
/// Discord serializes snowflakes as strings, so this wraps a `String` rather
/// than a `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(s: impl Into<String>) -> Self {
        ThreadId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        ThreadId(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        ThreadId(s.to_string())
    }
}

/// A Discord snowflake identifying a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(s: impl Into<String>) -> Self {
        ChannelId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        ChannelId(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod pr_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_is_a_bare_number(n: u64) {
                let json = serde_json::to_string(&PrId(n)).unwrap();
                prop_assert_eq!(json, n.to_string());
            }

            #[test]
            fn display_has_no_prefix(n: u64) {
                prop_assert_eq!(format!("{}", PrId(n)), n.to_string());
            }
        }
    }

    mod pr_number {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_format(n: u64) {
                let pr = PrNumber(n);
                prop_assert_eq!(format!("{}", pr), format!("#{}", n));
            }

            #[test]
            fn comparison_matches_underlying(a: u64, b: u64) {
                prop_assert_eq!(PrNumber(a) == PrNumber(b), a == b);
            }
        }
    }

    mod snowflakes {
        use super::*;

        #[test]
        fn thread_id_deserializes_from_string() {
            let id: ThreadId = serde_json::from_str("\"1234567890\"").unwrap();
            assert_eq!(id.as_str(), "1234567890");
        }

        #[test]
        fn channel_id_display_is_raw() {
            assert_eq!(ChannelId::new("42").to_string(), "42");
        }
    }
}
