use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::data::coords::LatLng;

/// Shape identifier, the creation timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub i64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("malformed coordinates for {kind} shape {id}: {source}")]
    MalformedCoordinates {
        id: i64,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("non-finite coordinate in {kind} shape {id}")]
    NonFiniteCoordinate { id: i64, kind: String },
    #[error("invalid radius {radius} for {kind} shape {id}")]
    InvalidRadius { id: i64, kind: String, radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleCoordinates {
    pub center: LatLng,
    pub radius: f64, // meters, as reported by the drawing tool
}

/// Geometry as produced by the map drawing tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Marker(LatLng),
    Circle(CircleCoordinates),
    Polygon(Vec<LatLng>),
    Rectangle(Vec<LatLng>),
    Polyline(Vec<LatLng>),
    CircleMarker(CircleCoordinates),
    /// A layer type this crate does not know, kept as exported.
    Unsupported { kind: String, coordinates: Value },
}

impl ShapeGeometry {
    /// The drawing tool's layer type name.
    pub fn kind(&self) -> &str {
        match self {
            ShapeGeometry::Marker(_) => "marker",
            ShapeGeometry::Circle(_) => "circle",
            ShapeGeometry::Polygon(_) => "polygon",
            ShapeGeometry::Rectangle(_) => "rectangle",
            ShapeGeometry::Polyline(_) => "polyline",
            ShapeGeometry::CircleMarker(_) => "circlemarker",
            ShapeGeometry::Unsupported { kind, .. } => kind,
        }
    }

    fn positions(&self) -> Vec<LatLng> {
        match self {
            ShapeGeometry::Marker(pos) => vec![*pos],
            ShapeGeometry::Circle(c) | ShapeGeometry::CircleMarker(c) => vec![c.center],
            ShapeGeometry::Polygon(ring)
            | ShapeGeometry::Rectangle(ring)
            | ShapeGeometry::Polyline(ring) => ring.clone(),
            ShapeGeometry::Unsupported { .. } => Vec::new(),
        }
    }

    fn coordinates_value(&self) -> Value {
        let value = match self {
            ShapeGeometry::Marker(pos) => serde_json::to_value(pos),
            ShapeGeometry::Circle(c) | ShapeGeometry::CircleMarker(c) => serde_json::to_value(c),
            ShapeGeometry::Polygon(ring)
            | ShapeGeometry::Rectangle(ring)
            | ShapeGeometry::Polyline(ring) => serde_json::to_value(ring),
            ShapeGeometry::Unsupported { coordinates, .. } => Ok(coordinates.clone()),
        };
        // Plain f64 arrays and structs always serialize.
        value.unwrap_or(Value::Null)
    }
}

/// A user-drawn zone with an optional sound label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShape", into = "RawShape")]
pub struct Shape {
    pub id: ShapeId,
    pub geometry: ShapeGeometry,
    pub sound: Option<String>,
}

impl Shape {
    pub fn new(id: ShapeId, geometry: ShapeGeometry) -> Self {
        Self {
            id,
            geometry,
            sound: None,
        }
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn kind(&self) -> &str {
        self.geometry.kind()
    }

    /// Finite positions and a finite, non-negative circle radius.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let id = self.id.0;
        if self.geometry.positions().iter().any(|p| !p.is_finite()) {
            return Err(ShapeError::NonFiniteCoordinate {
                id,
                kind: self.kind().to_string(),
            });
        }
        if let ShapeGeometry::Circle(c) | ShapeGeometry::CircleMarker(c) = &self.geometry {
            if !c.radius.is_finite() || c.radius < 0.0 {
                return Err(ShapeError::InvalidRadius {
                    id,
                    kind: self.kind().to_string(),
                    radius: c.radius,
                });
            }
        }
        Ok(())
    }
}

/// Wire form of a shape, matching the drawing UI export.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawShape {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
    #[serde(rename = "soundType", default)]
    sound_type: Option<String>,
}

impl TryFrom<RawShape> for Shape {
    type Error = ShapeError;

    fn try_from(raw: RawShape) -> Result<Self, Self::Error> {
        let RawShape {
            id,
            kind,
            coordinates,
            sound_type,
        } = raw;

        let malformed = |source| ShapeError::MalformedCoordinates {
            id,
            kind: kind.clone(),
            source,
        };

        let geometry = match kind.as_str() {
            "marker" => ShapeGeometry::Marker(serde_json::from_value(coordinates).map_err(malformed)?),
            "circle" => ShapeGeometry::Circle(serde_json::from_value(coordinates).map_err(malformed)?),
            "circlemarker" => {
                ShapeGeometry::CircleMarker(serde_json::from_value(coordinates).map_err(malformed)?)
            }
            "polygon" => ShapeGeometry::Polygon(serde_json::from_value(coordinates).map_err(malformed)?),
            "rectangle" => {
                ShapeGeometry::Rectangle(serde_json::from_value(coordinates).map_err(malformed)?)
            }
            "polyline" => ShapeGeometry::Polyline(serde_json::from_value(coordinates).map_err(malformed)?),
            _ => ShapeGeometry::Unsupported {
                kind: kind.clone(),
                coordinates,
            },
        };

        let shape = Shape {
            id: ShapeId(id),
            geometry,
            sound: sound_type,
        };
        shape.validate()?;
        Ok(shape)
    }
}

impl From<Shape> for RawShape {
    fn from(shape: Shape) -> Self {
        RawShape {
            id: shape.id.0,
            kind: shape.geometry.kind().to_string(),
            coordinates: shape.geometry.coordinates_value(),
            sound_type: shape.sound,
        }
    }
}
