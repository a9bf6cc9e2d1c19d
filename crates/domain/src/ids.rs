use std::fmt;

use serde::{Deserialize, Serialize};

/// String-backed id newtype. Pool ids are handed to the host game and NPC ids
/// are chosen by it.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(PoolId);
define_id!(NpcId);
define_id!(PlayerId);

impl PoolId {
    /// Id of the hand-authored pool used when generation fails.
    pub const FALLBACK: &'static str = "fallback";

    pub fn fallback() -> Self {
        Self::new(Self::FALLBACK)
    }

    /// Pool ids are minted as `pool_<n>` from a monotonic counter.
    pub fn numbered(n: u64) -> Self {
        Self(format!("pool_{n}"))
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == Self::FALLBACK
    }
}

impl PlayerId {
    /// Relationship scores are tracked against this single implicit player.
    pub const DEFAULT_PLAYER: &'static str = "player";

    pub fn default_player() -> Self {
        Self::new(Self::DEFAULT_PLAYER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_pool_ids_are_prefixed() {
        assert_eq!(PoolId::numbered(0).as_str(), "pool_0");
        assert_eq!(PoolId::numbered(12).to_string(), "pool_12");
        assert!(!PoolId::numbered(3).is_fallback());
        assert!(PoolId::fallback().is_fallback());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = NpcId::from("mycologist");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"mycologist\"");
    }
}
