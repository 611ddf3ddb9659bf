//! Core types: commodity identifiers.

use std::fmt;

/// A commodity identifier, stored inline as a fixed-capacity string.
///
/// `Commodity` is `Copy` and hashable, so it can be used directly as a map
/// key without allocation. Names are capped at [`Commodity::MAX_LEN`] bytes,
/// which covers the agricultural universe ("Soybeans" is the longest
/// standard name at 8).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Commodity {
    bytes: [u8; Self::MAX_LEN],
    len: u8,
}

impl Commodity {
    /// Maximum identifier length in bytes.
    pub const MAX_LEN: usize = 16;

    /// Create a commodity identifier.
    ///
    /// # Panics
    ///
    /// Panics if `name` is longer than [`Commodity::MAX_LEN`] bytes.
    #[track_caller]
    pub fn new(name: &str) -> Self {
        match Self::try_new(name) {
            Some(commodity) => commodity,
            None => panic!("commodity name '{name}' exceeds {} bytes", Self::MAX_LEN),
        }
    }

    /// Create a commodity identifier, returning `None` if `name` is too long.
    pub fn try_new(name: &str) -> Option<Self> {
        if name.len() > Self::MAX_LEN {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Some(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        // `try_new` only ever copies in a whole &str, so the prefix is valid UTF-8
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commodity({:?})", self.as_str())
    }
}

impl serde::Serialize for Commodity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Commodity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::Deserialize;
        let name = String::deserialize(deserializer)?;
        Commodity::try_new(&name).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "commodity name '{name}' exceeds {} bytes",
                Commodity::MAX_LEN
            ))
        })
    }
}
