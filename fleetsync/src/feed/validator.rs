//! Snapshot validation.
//!
//! Turns a decoded payload into a [`Snapshot`] or a [`ValidationError`]
//! naming the first constraint that failed. Validation is pure: it never
//! mutates its input and never panics on malformed data.
//!
//! Identities are unique within a snapshot; a repeated identity rejects the
//! whole payload.
//!
//! # Expected Payload
//!
//! ```json
//! {
//!   "type": "FeatureCollection",
//!   "features": [
//!     {
//!       "type": "Feature",
//!       "geometry": { "type": "Point", "coordinates": [-76.99, -12.04] },
//!       "properties": { "vehicleCode": "V1" }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::error::ValidationError;
use super::snapshot::{EntityId, EntityPosition, Position, Snapshot};

/// Property that carries entity identity unless configured otherwise.
pub const DEFAULT_IDENTITY_PROPERTY: &str = "vehicleCode";

/// Validates stream payloads against the feature-collection schema.
#[derive(Debug, Clone)]
pub struct SnapshotValidator {
    identity_property: String,
}

impl Default for SnapshotValidator {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_PROPERTY)
    }
}

impl SnapshotValidator {
    /// Create a validator that reads identity from `identity_property`.
    pub fn new(identity_property: impl Into<String>) -> Self {
        Self {
            identity_property: identity_property.into(),
        }
    }

    /// Decode a text message and validate it.
    pub fn validate_text(&self, text: &str) -> Result<Snapshot, ValidationError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        self.validate(&raw)
    }

    /// Validate a decoded payload.
    pub fn validate(&self, raw: &Value) -> Result<Snapshot, ValidationError> {
        let features = validate_collection(raw)?;

        let entities = features
            .iter()
            .enumerate()
            .map(|(index, feature)| self.validate_feature(index, feature))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            if !seen.insert(&entity.id) {
                return Err(ValidationError::DuplicateIdentity {
                    index,
                    id: entity.id.to_string(),
                });
            }
        }

        Ok(Snapshot::new(entities))
    }

    fn validate_feature(&self, index: usize, feature: &Value) -> Result<EntityPosition, ValidationError> {
        let position = feature_position(index, feature)?;

        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let id = identity(&properties, &self.identity_property).ok_or_else(|| {
            ValidationError::MissingIdentity {
                index,
                property: self.identity_property.clone(),
            }
        })?;

        Ok(EntityPosition {
            id,
            position,
            properties: Arc::new(properties),
        })
    }
}

/// Check the collection envelope and return its feature list.
///
/// Shared by every payload of the feature-collection family (live snapshots
/// and reference locations).
pub fn validate_collection(raw: &Value) -> Result<&Vec<Value>, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotACollection)?;

    if object.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(ValidationError::NotACollection);
    }

    object
        .get("features")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingFeatures)
}

/// Extract the first two coordinates of a feature's geometry.
pub fn feature_position(index: usize, feature: &Value) -> Result<Position, ValidationError> {
    let coordinates = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .ok_or(ValidationError::MissingGeometry { index })?;

    let pair = coordinates
        .as_array()
        .filter(|c| c.len() >= 2)
        .ok_or(ValidationError::NonNumericCoordinate { index })?;

    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(longitude), Some(latitude)) => Ok(Position::new(longitude, latitude)),
        _ => Err(ValidationError::NonNumericCoordinate { index }),
    }
}

/// Identity from a string or numeric property value.
fn identity(properties: &Map<String, Value>, property: &str) -> Option<EntityId> {
    match properties.get(property)? {
        Value::String(s) if !s.is_empty() => Some(EntityId::new(s.as_str())),
        Value::Number(n) => Some(EntityId::new(n.to_string())),
        _ => None,
    }
}
