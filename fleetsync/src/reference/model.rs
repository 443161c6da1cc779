//! Reference location model.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::error::ReferenceDataError;
use crate::feed::{feature_position, validate_collection, Position};

/// Kind of a reference location, from its `type` property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Warehouse,
    Office,
    /// Any other non-empty `type` value.
    Other(String),
}

impl FromStr for LocationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "warehouse" => Self::Warehouse,
            "office" => Self::Office,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warehouse => write!(f, "warehouse"),
            Self::Office => write!(f, "office"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// A fixed point of interest shown alongside the moving entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLocation {
    /// Display name (`name` property).
    pub name: Option<String>,

    /// Location kind (`type` property).
    pub kind: Option<LocationKind>,

    /// Where the location is.
    pub position: Position,

    /// All feature properties.
    pub properties: Map<String, Value>,
}

/// Reference locations, in server order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceCollection {
    locations: Vec<ReferenceLocation>,
}

impl ReferenceCollection {
    /// Parse a feature collection of reference locations.
    ///
    /// Unlike live snapshots, locations need no identity property.
    pub fn from_geojson(raw: &Value) -> Result<Self, ReferenceDataError> {
        let features = validate_collection(raw)?;

        let mut locations = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            let position = feature_position(index, feature)?;
            let properties = feature
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();

            let text = |key: &str| {
                properties
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let name = text("name");
            let kind = text("type").and_then(|t| t.parse().ok());

            locations.push(ReferenceLocation {
                name,
                kind,
                position,
                properties,
            });
        }

        Ok(Self { locations })
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True if there are no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Iterate in server order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceLocation> {
        self.locations.iter()
    }

    /// Locations of one kind.
    pub fn of_kind<'a>(&'a self, kind: &'a LocationKind) -> impl Iterator<Item = &'a ReferenceLocation> + 'a {
        self.locations
            .iter()
            .filter(move |l| l.kind.as_ref() == Some(kind))
    }
}

impl<'a> IntoIterator for &'a ReferenceCollection {
    type Item = &'a ReferenceLocation;
    type IntoIter = std::slice::Iter<'a, ReferenceLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ValidationError;
    use serde_json::json;

    fn locations() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-77.03, -12.04]},
                    "properties": {"type": "warehouse", "name": "Central"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-77.01, -12.10]},
                    "properties": {"type": "office", "name": "Miraflores"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-76.95, -12.08]},
                    "properties": {}
                }
            ]
        })
    }

    #[test]
    fn test_parse_locations() {
        let collection = ReferenceCollection::from_geojson(&locations()).unwrap();
        assert_eq!(collection.len(), 3);

        let first = collection.iter().next().unwrap();
        assert_eq!(first.name.as_deref(), Some("Central"));
        assert_eq!(first.kind, Some(LocationKind::Warehouse));
        assert_eq!(first.position, Position::new(-77.03, -12.04));

        let last = collection.iter().last().unwrap();
        assert_eq!(last.name, None);
        assert_eq!(last.kind, None);
    }

    #[test]
    fn test_filter_by_kind() {
        let collection = ReferenceCollection::from_geojson(&locations()).unwrap();
        let offices: Vec<_> = collection.of_kind(&LocationKind::Office).collect();
        assert_eq!(offices.len(), 1);
        assert_eq!(offices[0].name.as_deref(), Some("Miraflores"));
    }

    #[test]
    fn test_unknown_kind_kept() {
        assert_eq!(
            "depot".parse::<LocationKind>().unwrap(),
            LocationKind::Other("depot".into())
        );
        assert_eq!(LocationKind::Other("depot".into()).to_string(), "depot");
    }

    #[test]
    fn test_invalid_collection() {
        let err = ReferenceCollection::from_geojson(&json!({"type": "Feature"})).unwrap_err();
        assert_eq!(err, ReferenceDataError::Invalid(ValidationError::NotACollection));

        let err = ReferenceCollection::from_geojson(&json!({
            "type": "FeatureCollection",
            "features": [{"geometry": {"coordinates": ["a", 1.0]}}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ReferenceDataError::Invalid(ValidationError::NonNumericCoordinate { index: 0 })
        );
    }
}
