//! JSON:API resource objects

use crate::store::{Record, RecordKey};
use crate::types::JsonObject;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reference to another resource (`{"type": ..., "id": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Store key of the referenced record
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.kind, &self.id)
    }
}

/// Linkage of a relationship: to-one or to-many
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// One entry of a resource's `relationships` object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    /// Resource linkage; absent or `null` means unknown or empty to-one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<JsonObject>,
}

impl Relationship {
    /// All linked identifiers (empty, one, or many)
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match &self.data {
            Some(RelationshipData::One(identifier)) => std::slice::from_ref(identifier),
            Some(RelationshipData::Many(identifiers)) => identifiers,
            None => &[],
        }
    }
}

/// A JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: JsonObject,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonObject>,
}

impl Resource {
    /// Decode a resource object from a JSON value
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// Identifier of this resource
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.kind, &self.id)
    }

    /// Raw attribute value; `null` counts as absent
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// String attribute
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }

    /// Attribute decoded into any deserializable type
    pub fn attribute_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.attribute(name)
            .and_then(|v| T::deserialize(v).ok())
    }

    /// A relationship by name
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// The to-one target of a relationship
    pub fn related(&self, name: &str) -> Option<&ResourceIdentifier> {
        match self.relationship(name)?.data.as_ref()? {
            RelationshipData::One(identifier) => Some(identifier),
            RelationshipData::Many(_) => None,
        }
    }

    /// Every target of a relationship (to-one yields at most one)
    pub fn related_all(&self, name: &str) -> &[ResourceIdentifier] {
        self.relationship(name)
            .map(Relationship::identifiers)
            .unwrap_or_default()
    }
}

impl Record for Resource {
    fn key(&self) -> RecordKey {
        RecordKey::new(&self.kind, &self.id)
    }
}

/// Ids may be sent as strings or numbers; both are stored as strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "resource id must be a string or number, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
