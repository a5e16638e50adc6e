//! Chunk and module identifiers.
//!
//! Build systems assign either numeric indices or names; both appear in
//! payloads and manifests, and JSON object keys are always text. All-digit
//! keys are collapsed to the numeric form so `"0"` and `0` address the same
//! entry.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            /// Numeric id assigned by the build system.
            Index(u64),
            /// Named id.
            Name(String),
        }

        impl $name {
            /// Parses text the way object-key lookups treat ids: an
            /// all-digit string collapses to the numeric form.
            pub fn parse(s: &str) -> Self {
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(n) = s.parse::<u64>() {
                        return $name::Index(n);
                    }
                }
                $name::Name(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $name::Index(n) => write!(f, "{}", n),
                    $name::Name(s) => write!(f, "{}", s),
                }
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name::Index(n)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::parse(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::parse(&s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $name::Index(n) => serializer.serialize_u64(*n),
                    $name::Name(s) => serializer.serialize_str(s),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct IdVisitor;

                impl<'de> Visitor<'de> for IdVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("a non-negative integer or a string")
                    }

                    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Self::Value, E> {
                        Ok($name::Index(n))
                    }

                    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Self::Value, E> {
                        u64::try_from(n)
                            .map($name::Index)
                            .map_err(|_| E::custom("id must not be negative"))
                    }

                    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                        Ok($name::parse(s))
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

define_id! {
    /// Identifies a deployable chunk.
    ChunkId
}

define_id! {
    /// Identifies a module delivered inside a chunk.
    ModuleId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_strings_collapse_to_index() {
        assert_eq!(ChunkId::parse("0"), ChunkId::Index(0));
        assert_eq!(ChunkId::parse("42"), ChunkId::Index(42));
        assert_eq!(ChunkId::parse("vendor"), ChunkId::Name("vendor".into()));
        assert_eq!(ChunkId::parse(""), ChunkId::Name(String::new()));
        // Mixed digits and letters stay names.
        assert_eq!(ChunkId::parse("4a"), ChunkId::Name("4a".into()));
    }

    #[test]
    fn json_numbers_and_strings_address_the_same_id() {
        let from_num: ChunkId = serde_json::from_str("3").unwrap();
        let from_str: ChunkId = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(from_num, from_str);
    }

    #[test]
    fn map_keys_round_trip() {
        use std::collections::BTreeMap;
        let mut map: BTreeMap<ModuleId, u32> = BTreeMap::new();
        map.insert(ModuleId::Index(0), 1);
        map.insert(ModuleId::Name("app".into()), 2);
        let text = serde_json::to_string(&map).unwrap();
        let back: BTreeMap<ModuleId, u32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn display_is_bare() {
        assert_eq!(ChunkId::Index(7).to_string(), "7");
        assert_eq!(ChunkId::Name("main".into()).to_string(), "main");
    }

    #[test]
    fn negative_ids_rejected() {
        assert!(serde_json::from_str::<ChunkId>("-1").is_err());
    }
}
