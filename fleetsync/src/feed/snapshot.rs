//! Core data types for the live position feed.
//!
//! - [`EntityId`] - Stable identity used to match entities across snapshots
//! - [`Position`] - Longitude/latitude pair
//! - [`EntityPosition`] - One entity inside a snapshot
//! - [`Snapshot`] - Immutable, ordered set of entity positions
//! - [`BoundingBox`] - Region covering a snapshot (fit-to-view hint)

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

/// Stable identity of a moving entity (e.g. a vehicle code).
///
/// Identity is the only key used to match entities between snapshots;
/// coordinates never identify an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identity from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
}

impl Position {
    /// Create a position from a longitude/latitude pair.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Linear interpolation towards `target`.
    ///
    /// `t == 0.0` yields `self`, `t == 1.0` yields `target` exactly.
    pub fn lerp(&self, target: &Position, t: f64) -> Position {
        if t >= 1.0 {
            return *target;
        }
        Position {
            longitude: self.longitude + (target.longitude - self.longitude) * t,
            latitude: self.latitude + (target.latitude - self.latitude) * t,
        }
    }
}

/// One entity as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPosition {
    /// Entity identity.
    pub id: EntityId,

    /// Position at snapshot time.
    pub position: Position,

    /// Feature properties captured at snapshot time.
    ///
    /// Shared between a snapshot and every frame derived from it.
    pub properties: Arc<Map<String, Value>>,
}

impl EntityPosition {
    /// Create an entity with no extra properties.
    pub fn new(id: impl Into<EntityId>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            properties: Arc::new(Map::new()),
        }
    }

    /// Copy of this entity placed at another position.
    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            id: self.id.clone(),
            position,
            properties: Arc::clone(&self.properties),
        }
    }
}

/// Immutable, ordered collection of entity positions.
///
/// Cloning is cheap: the entity list is reference counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entities: Arc<[EntityPosition]>,
}

impl Snapshot {
    /// Build a snapshot from an ordered entity list.
    pub fn new(entities: Vec<EntityPosition>) -> Self {
        Self {
            entities: entities.into(),
        }
    }

    /// Snapshot with no entities.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the snapshot holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in snapshot order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityPosition> {
        self.entities.iter()
    }

    /// Entities as a slice.
    pub fn entities(&self) -> &[EntityPosition] {
        &self.entities
    }

    /// Look up an entity by identity.
    pub fn get(&self, id: &EntityId) -> Option<&EntityPosition> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Position of an entity, if present.
    pub fn position_of(&self, id: &EntityId) -> Option<Position> {
        self.get(id).map(|e| e.position)
    }

    /// Bounding box covering every entity, or `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut iter = self.entities.iter();
        let first = iter.next()?;
        let mut bounds = BoundingBox::around(first.position);
        for entity in iter {
            bounds.extend(entity.position);
        }
        Some(bounds)
    }

    /// Render as a GeoJSON feature collection.
    ///
    /// Each feature keeps its original properties with the snapshot's
    /// coordinates, which is what map renderers consume.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .entities
            .iter()
            .map(|e| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [e.position.longitude, e.position.latitude],
                    },
                    "properties": Value::Object((*e.properties).clone()),
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a EntityPosition;
    type IntoIter = std::slice::Iter<'a, EntityPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Axis-aligned region in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Degenerate box containing a single point.
    pub fn around(position: Position) -> Self {
        Self {
            min_lon: position.longitude,
            min_lat: position.latitude,
            max_lon: position.longitude,
            max_lat: position.latitude,
        }
    }

    /// Grow the box to include `position`.
    pub fn extend(&mut self, position: Position) {
        self.min_lon = self.min_lon.min(position.longitude);
        self.min_lat = self.min_lat.min(position.latitude);
        self.max_lon = self.max_lon.max(position.longitude);
        self.max_lat = self.max_lat.max(position.latitude);
    }

    /// Center of the box.
    pub fn center(&self) -> Position {
        Position::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// True if `position` lies inside the box (edges included).
    pub fn contains(&self, position: Position) -> bool {
        position.longitude >= self.min_lon
            && position.longitude <= self.max_lon
            && position.latitude >= self.min_lat
            && position.latitude <= self.max_lat
    }
}
