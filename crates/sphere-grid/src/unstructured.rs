//! Unstructured point sets.

use crate::error::{GridError, GridResult};
use crate::structured::StructuredGrid;
use serde::{Deserialize, Serialize};

/// A point on the sphere, longitude and latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLonLat {
    pub lon: f64,
    pub lat: f64,
}

impl PointLonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Serialize, Deserialize)]
struct UnstructuredGridDef {
    name: String,
    points: Vec<PointLonLat>,
}

/// A grid made of individual points without shared latitude rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnstructuredGridDef", into = "UnstructuredGridDef")]
pub struct UnstructuredGrid {
    name: String,
    points: Vec<PointLonLat>,
}

impl UnstructuredGrid {
    /// Create a point set. Latitudes must lie within [-90, 90].
    pub fn new(name: impl Into<String>, points: Vec<PointLonLat>) -> GridResult<Self> {
        if points.is_empty() {
            return Err(GridError::Empty);
        }
        if let Some((row, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !(-90.0..=90.0).contains(&p.lat))
        {
            return Err(GridError::LatitudeOutOfRange { row, lat: p.lat });
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// The points of a structured grid, forgetting the row structure.
    pub fn from_structured(grid: &StructuredGrid) -> Self {
        Self {
            name: format!("{}-points", grid.name()),
            points: grid.points().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[PointLonLat] {
        &self.points
    }

    pub fn point(&self, i: usize) -> PointLonLat {
        self.points[i]
    }
}

impl TryFrom<UnstructuredGridDef> for UnstructuredGrid {
    type Error = GridError;

    fn try_from(def: UnstructuredGridDef) -> Result<Self, Self::Error> {
        Self::new(def.name, def.points)
    }
}

impl From<UnstructuredGrid> for UnstructuredGridDef {
    fn from(grid: UnstructuredGrid) -> Self {
        Self {
            name: grid.name,
            points: grid.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_structured_preserves_order() {
        let grid = StructuredGrid::regular_lonlat(4, 3).unwrap();
        let points = UnstructuredGrid::from_structured(&grid);
        assert_eq!(points.size(), 12);
        assert_eq!(points.point(0), PointLonLat::new(0.0, 90.0));
        assert_eq!(points.point(5), PointLonLat::new(90.0, 0.0));
    }

    #[test]
    fn test_rejects_bad_latitude() {
        let err = UnstructuredGrid::new("bad", vec![PointLonLat::new(0.0, -95.0)]).unwrap_err();
        assert!(matches!(err, GridError::LatitudeOutOfRange { row: 0, .. }));
        assert_eq!(UnstructuredGrid::new("empty", vec![]).unwrap_err(), GridError::Empty);
    }

    #[test]
    fn test_deserialize_validates_points() {
        let grid = UnstructuredGrid::new("pair", vec![PointLonLat::new(10.0, 45.5), PointLonLat::new(-170.0, -89.0)])
            .unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: UnstructuredGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let out_of_range = r#"{"name": "bad", "points": [{"lon": 0.0, "lat": 91.0}]}"#;
        let err = serde_json::from_str::<UnstructuredGrid>(out_of_range).unwrap_err();
        assert!(err.to_string().contains("outside [-90, 90]"));

        let empty = r#"{"name": "none", "points": []}"#;
        assert!(serde_json::from_str::<UnstructuredGrid>(empty).is_err());
    }
}
