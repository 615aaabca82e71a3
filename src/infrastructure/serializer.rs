//! Value serialization for stored envelopes.
//!
//! Two engines are supported:
//! - `compact-binary` - MessagePack via `rmp-serde` (cargo feature `msgpack`)
//! - `portable-default` - JSON via `serde_json`
//!
//! Both are self-describing formats, which the facade relies on to read an
//! envelope's metadata without knowing the stored value's type.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CacheError, CacheResult};

/// Serialization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    CompactBinary,
    PortableDefault,
}

impl Engine {
    /// Picks the best engine compiled into this build.
    pub fn detect() -> Self {
        if cfg!(feature = "msgpack") {
            Self::CompactBinary
        } else {
            Self::PortableDefault
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CompactBinary => "compact-binary",
            Self::PortableDefault => "portable-default",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact-binary" | "msgpack" => Ok(Self::CompactBinary),
            "portable-default" | "json" => Ok(Self::PortableDefault),
            other => Err(CacheError::UnknownEngine(other.to_string())),
        }
    }
}

/// Turns values into bytes and back using the configured [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Serializer {
    engine: Engine,
}

impl Serializer {
    /// Creates a serializer, auto-detecting the engine when none is given.
    pub fn new(engine: Option<Engine>) -> Self {
        Self {
            engine: engine.unwrap_or_else(Engine::detect),
        }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Switches engine by name.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnknownEngine`] if the name is not recognized.
    pub fn set_engine(&mut self, engine: &str) -> CacheResult<&mut Self> {
        self.engine = engine.parse()?;
        Ok(self)
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>> {
        match self.engine {
            #[cfg(feature = "msgpack")]
            Engine::CompactBinary => rmp_serde::to_vec(value)
                .map_err(|e| CacheError::SerializationError(e.to_string())),
            #[cfg(not(feature = "msgpack"))]
            Engine::CompactBinary => Err(not_compiled()),
            Engine::PortableDefault => {
                serde_json::to_vec(value).map_err(|e| CacheError::SerializationError(e.to_string()))
            }
        }
    }

    /// Decodes bytes produced by [`Self::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SerializationError`] for corrupt input or input
    /// written by the other engine.
    pub fn unserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        match self.engine {
            #[cfg(feature = "msgpack")]
            Engine::CompactBinary => rmp_serde::from_slice(bytes)
                .map_err(|e| CacheError::SerializationError(e.to_string())),
            #[cfg(not(feature = "msgpack"))]
            Engine::CompactBinary => Err(not_compiled()),
            Engine::PortableDefault => serde_json::from_slice(bytes)
                .map_err(|e| CacheError::SerializationError(e.to_string())),
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(not(feature = "msgpack"))]
fn not_compiled() -> CacheError {
    CacheError::SerializationError(
        "compact-binary engine is not compiled in (enable the `msgpack` feature)".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
        scores: BTreeMap<String, Vec<u32>>,
        parent: Option<Box<Profile>>,
    }

    fn sample() -> Profile {
        let mut scores = BTreeMap::new();
        scores.insert("math".to_string(), vec![90, 85]);
        Profile {
            name: "foo".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            scores,
            parent: Some(Box::new(Profile {
                name: "bar".to_string(),
                tags: vec![],
                scores: BTreeMap::new(),
                parent: None,
            })),
        }
    }

    #[test]
    fn test_engine_parsing() {
        assert_eq!("compact-binary".parse::<Engine>().unwrap(), Engine::CompactBinary);
        assert_eq!("JSON".parse::<Engine>().unwrap(), Engine::PortableDefault);
        assert!(matches!(
            "igbinary".parse::<Engine>(),
            Err(CacheError::UnknownEngine(_))
        ));
    }

    #[test]
    fn test_set_engine_rejects_unknown_and_keeps_current() {
        let mut serializer = Serializer::new(Some(Engine::PortableDefault));
        assert!(serializer.set_engine("foo").is_err());
        assert_eq!(serializer.engine(), Engine::PortableDefault);
    }

    #[test]
    fn test_json_nested_values() {
        let serializer = Serializer::new(Some(Engine::PortableDefault));
        let bytes = serializer.serialize(&sample()).unwrap();
        let decoded: Profile = serializer.unserialize(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_json_is_plain_json() {
        let serializer = Serializer::new(Some(Engine::PortableDefault));
        let bytes = serializer.serialize(&serde_json::json!({"foo": "bar"})).unwrap();
        assert_eq!(bytes, br#"{"foo":"bar"}"#);
    }

    #[cfg(feature = "msgpack")]
    #[test]
    fn test_msgpack_nested_values() {
        let serializer = Serializer::new(Some(Engine::CompactBinary));
        let bytes = serializer.serialize(&sample()).unwrap();
        let decoded: Profile = serializer.unserialize(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[cfg(feature = "msgpack")]
    #[test]
    fn test_detect_prefers_compact_binary() {
        assert_eq!(Engine::detect(), Engine::CompactBinary);
        assert_eq!(Serializer::default().engine(), Engine::CompactBinary);
    }

    #[test]
    fn test_corrupt_bytes_are_an_error() {
        let serializer = Serializer::new(Some(Engine::PortableDefault));
        let result = serializer.unserialize::<Profile>(b"\x00not json");
        assert!(matches!(result, Err(CacheError::SerializationError(_))));
    }
}
