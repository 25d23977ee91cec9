//! TopoJSON decoding into GeoJSON features.
//!
//! A topology stores shared boundaries once, as arcs. Geometries reference
//! arcs by index (a negative index `!i` means arc `i` reversed), and
//! quantised topologies store arc positions as integer deltas that a
//! `transform` maps back to coordinates.

use std::collections::HashMap;

use geojson::{feature, Feature, FeatureCollection, Geometry, JsonObject, Position};
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no object named '{0}'")]
    MissingObject(String),
    #[error("arc index {0} is out of range")]
    ArcOutOfRange(i64),
    #[error("position has fewer than two coordinates")]
    InvalidPosition,
}

/// Quantisation parameters: `coordinate = quantised * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

impl Topology {
    /// Names of the objects (layers) in the topology, sorted.
    pub fn layers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.objects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// A geometry object of a topology.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct TopoGeometry {
    pub id: Option<JsonValue>,
    pub properties: Option<JsonObject>,
    pub bbox: Option<Vec<f64>>,
    pub kind: GeometryKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Null,
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<i64>),
    MultiLineString(Vec<Vec<i64>>),
    Polygon(Vec<Vec<i64>>),
    MultiPolygon(Vec<Vec<Vec<i64>>>),
    GeometryCollection(Vec<TopoGeometry>),
}

// Geometry types carry their payload in differently named members, and the
// `type` member may be null, so geometries are read through this loose shape.
#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<JsonValue>,
    #[serde(default)]
    properties: Option<JsonObject>,
    #[serde(default)]
    bbox: Option<Vec<f64>>,
    #[serde(default)]
    arcs: JsonValue,
    #[serde(default)]
    coordinates: JsonValue,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

impl TryFrom<RawGeometry> for TopoGeometry {
    type Error = serde_json::Error;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_deref() {
            None => GeometryKind::Null,
            Some("Point") => GeometryKind::Point(serde_json::from_value(raw.coordinates)?),
            Some("MultiPoint") => GeometryKind::MultiPoint(serde_json::from_value(raw.coordinates)?),
            Some("LineString") => GeometryKind::LineString(serde_json::from_value(raw.arcs)?),
            Some("MultiLineString") => {
                GeometryKind::MultiLineString(serde_json::from_value(raw.arcs)?)
            }
            Some("Polygon") => GeometryKind::Polygon(serde_json::from_value(raw.arcs)?),
            Some("MultiPolygon") => GeometryKind::MultiPolygon(serde_json::from_value(raw.arcs)?),
            Some("GeometryCollection") => GeometryKind::GeometryCollection(raw.geometries),
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "unknown geometry type '{other}'"
                )))
            }
        };
        Ok(TopoGeometry {
            id: raw.id,
            properties: raw.properties,
            bbox: raw.bbox,
            kind,
        })
    }
}

/// Converts the object `name` of `topology` to a feature collection.
///
/// A geometry collection yields one feature per member geometry, any other
/// object a single feature.
pub fn feature_collection(
    topology: &Topology,
    name: &str,
) -> Result<FeatureCollection, TopologyError> {
    let object = topology
        .objects
        .get(name)
        .ok_or_else(|| TopologyError::MissingObject(name.to_string()))?;
    let decoder = Decoder::new(topology);

    let features = match &object.kind {
        GeometryKind::GeometryCollection(members) => members
            .iter()
            .map(|member| decoder.feature(member))
            .collect::<Result<Vec<_>, _>>()?,
        _ => vec![decoder.feature(object)?],
    };

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

struct Decoder<'a> {
    arcs: &'a [Vec<Vec<f64>>],
    transform: Option<Transform>,
}

impl<'a> Decoder<'a> {
    fn new(topology: &'a Topology) -> Self {
        Self {
            arcs: &topology.arcs,
            transform: topology.transform,
        }
    }

    fn feature(&self, object: &TopoGeometry) -> Result<Feature, TopologyError> {
        let id = match &object.id {
            Some(JsonValue::String(s)) => Some(feature::Id::String(s.clone())),
            Some(JsonValue::Number(n)) => Some(feature::Id::Number(n.clone())),
            _ => None,
        };
        Ok(Feature {
            bbox: object.bbox.clone(),
            geometry: self.geometry(object)?,
            id,
            properties: Some(object.properties.clone().unwrap_or_default()),
            foreign_members: None,
        })
    }

    fn geometry(&self, object: &TopoGeometry) -> Result<Option<Geometry>, TopologyError> {
        let value = match &object.kind {
            GeometryKind::Null => return Ok(None),
            GeometryKind::Point(p) => geojson::Value::Point(self.point(p)?),
            GeometryKind::MultiPoint(points) => geojson::Value::MultiPoint(
                points
                    .iter()
                    .map(|p| self.point(p))
                    .collect::<Result<_, _>>()?,
            ),
            GeometryKind::LineString(arcs) => geojson::Value::LineString(self.line(arcs)?),
            GeometryKind::MultiLineString(lines) => geojson::Value::MultiLineString(
                lines
                    .iter()
                    .map(|arcs| self.line(arcs))
                    .collect::<Result<_, _>>()?,
            ),
            GeometryKind::Polygon(rings) => geojson::Value::Polygon(self.polygon(rings)?),
            GeometryKind::MultiPolygon(polygons) => geojson::Value::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| self.polygon(rings))
                    .collect::<Result<_, _>>()?,
            ),
            GeometryKind::GeometryCollection(members) => {
                let mut geometries = Vec::with_capacity(members.len());
                for member in members {
                    if let Some(geometry) = self.geometry(member)? {
                        geometries.push(geometry);
                    }
                }
                geojson::Value::GeometryCollection(geometries)
            }
        };
        Ok(Some(Geometry::new(value)))
    }

    /// Absolute position, mapped through the transform if any.
    fn point(&self, position: &[f64]) -> Result<Position, TopologyError> {
        if position.len() < 2 {
            return Err(TopologyError::InvalidPosition);
        }
        let mut out = position.to_vec();
        if let Some(t) = self.transform {
            out[0] = position[0] * t.scale[0] + t.translate[0];
            out[1] = position[1] * t.scale[1] + t.translate[1];
        }
        Ok(out)
    }

    /// Appends arc `index` to `points`, sharing the junction position with the previous arc.
    fn arc(&self, index: i64, points: &mut Vec<Position>) -> Result<(), TopologyError> {
        let (arc_index, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange(index))?;

        points.pop();
        let start = points.len();
        let (mut x, mut y) = (0.0, 0.0);
        for position in arc {
            if position.len() < 2 {
                return Err(TopologyError::InvalidPosition);
            }
            let mut out = position.clone();
            if let Some(t) = self.transform {
                // quantised arcs are delta-encoded
                x += position[0];
                y += position[1];
                out[0] = x * t.scale[0] + t.translate[0];
                out[1] = y * t.scale[1] + t.translate[1];
            }
            points.push(out);
        }
        if reversed {
            points[start..].reverse();
        }
        Ok(())
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = Vec::new();
        for &index in arcs {
            self.arc(index, &mut points)?;
        }
        if points.len() == 1 {
            points.push(points[0].clone());
        }
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = self.line(arcs)?;
        if let Some(first) = points.first().cloned() {
            while points.len() < 4 {
                points.push(first.clone());
            }
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Position>>, TopologyError> {
        rings.iter().map(|arcs| self.ring(arcs)).collect()
    }
}
