//! Serialization of [`NodePath`] as its canonical text.

use core::fmt;

use serde_core::de::{Deserialize, Deserializer, Error, Visitor};
use serde_core::ser::{Serialize, Serializer};

use crate::path::NodePath;

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(NodePathVisitor)
    }
}

struct NodePathVisitor;

impl Visitor<'_> for NodePathVisitor {
    type Value = NodePath;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a textual node path")
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        NodePath::parse(v).map_err(Error::custom)
    }
}

// -----------------------------------------------------------------------------
// Tests
