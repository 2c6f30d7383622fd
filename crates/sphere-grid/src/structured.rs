//! Structured grids: ordered latitude rows, each a window of a regular
//! circle of longitudes.

use crate::error::{GridError, GridResult};
use crate::gaussian::gaussian_latitudes;
use crate::unstructured::PointLonLat;
use serde::{Deserialize, Serialize};

/// One latitude row of a structured grid.
///
/// The row holds `nx` equally spaced points cut out of a full circle of
/// `global_nx` points that starts at `lon_origin`. For a global row
/// `nx == global_nx` and `lon_first == lon_origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatitudeRow {
    /// Latitude in degrees
    pub lat: f64,
    /// Number of points in this row
    pub nx: usize,
    /// Number of points on the full circle the row is cut from
    pub global_nx: usize,
    /// Longitude of point 0 of the full circle (degrees)
    pub lon_origin: f64,
    /// Longitude of the first point of this row (degrees)
    pub lon_first: f64,
}

impl LatitudeRow {
    /// A full circle of `nx` points starting at `lon_origin`.
    pub fn global(lat: f64, nx: usize, lon_origin: f64) -> Self {
        Self {
            lat,
            nx,
            global_nx: nx,
            lon_origin,
            lon_first: lon_origin,
        }
    }

    /// Longitude spacing in degrees.
    pub fn dlon(&self) -> f64 {
        360.0 / self.global_nx as f64
    }

    /// Longitude of point `i` of this row in degrees.
    pub fn lon(&self, i: usize) -> f64 {
        self.lon_first + i as f64 * self.dlon()
    }

    /// Whether the row covers its whole circle.
    pub fn is_global(&self) -> bool {
        self.nx == self.global_nx
    }
}

#[derive(Serialize, Deserialize)]
struct StructuredGridDef {
    name: String,
    rows: Vec<LatitudeRow>,
}

/// A grid organised in latitude rows, ordered north to south.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StructuredGridDef", into = "StructuredGridDef")]
pub struct StructuredGrid {
    name: String,
    rows: Vec<LatitudeRow>,
    /// Index of the first point of each row in storage order (plus total)
    offsets: Vec<usize>,
}

impl StructuredGrid {
    /// Create a grid from explicit rows.
    ///
    /// Rows must be non-empty, lie within [-90, 90] and have monotone
    /// decreasing (non-increasing) latitudes.
    pub fn new(name: impl Into<String>, rows: Vec<LatitudeRow>) -> GridResult<Self> {
        if rows.is_empty() {
            return Err(GridError::Empty);
        }

        let mut previous = f64::INFINITY;
        for (row, r) in rows.iter().enumerate() {
            if !(-90.0..=90.0).contains(&r.lat) {
                return Err(GridError::LatitudeOutOfRange { row, lat: r.lat });
            }
            if r.lat > previous {
                return Err(GridError::NotMonotone {
                    row,
                    lat: r.lat,
                    previous,
                });
            }
            if r.nx == 0 || r.global_nx == 0 {
                return Err(GridError::InvalidDimension(format!(
                    "row {} has no longitudes",
                    row
                )));
            }
            if r.nx > r.global_nx {
                return Err(GridError::RowTooWide {
                    row,
                    nx: r.nx,
                    global_nx: r.global_nx,
                });
            }
            previous = r.lat;
        }

        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for r in &rows {
            total += r.nx;
            offsets.push(total);
        }

        Ok(Self {
            name: name.into(),
            rows,
            offsets,
        })
    }

    /// Regular lon/lat grid including both poles (`L{nx}x{ny}`).
    pub fn regular_lonlat(nx: usize, ny: usize) -> GridResult<Self> {
        if nx == 0 || ny < 2 {
            return Err(GridError::InvalidDimension(format!("L{}x{}", nx, ny)));
        }
        let dlat = 180.0 / (ny - 1) as f64;
        let rows = (0..ny)
            .map(|j| LatitudeRow::global(90.0 - j as f64 * dlat, nx, 0.0))
            .collect();
        Self::new(format!("L{}x{}", nx, ny), rows)
    }

    /// Lon/lat grid shifted by half a cell in both directions (`S{nx}x{ny}`).
    ///
    /// The poles are not part of the grid.
    pub fn shifted_lonlat(nx: usize, ny: usize) -> GridResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(GridError::InvalidDimension(format!("S{}x{}", nx, ny)));
        }
        let dlat = 180.0 / ny as f64;
        let origin = 0.5 * 360.0 / nx as f64;
        let rows = (0..ny)
            .map(|j| LatitudeRow::global(90.0 - (j as f64 + 0.5) * dlat, nx, origin))
            .collect();
        Self::new(format!("S{}x{}", nx, ny), rows)
    }

    /// Regular Gaussian grid with `n` latitudes per hemisphere (`F{n}`).
    pub fn regular_gaussian(n: usize) -> GridResult<Self> {
        if n == 0 {
            return Err(GridError::InvalidDimension("F0".to_string()));
        }
        let rows = gaussian_latitudes(n)
            .into_iter()
            .map(|lat| LatitudeRow::global(lat, 4 * n, 0.0))
            .collect();
        Self::new(format!("F{}", n), rows)
    }

    /// Octahedral reduced Gaussian grid (`O{n}`): 20 points on the first
    /// latitude, four more on every following one up to the equator.
    pub fn octahedral_gaussian(n: usize) -> GridResult<Self> {
        if n == 0 {
            return Err(GridError::InvalidDimension("O0".to_string()));
        }
        let pl: Vec<usize> = (0..2 * n)
            .map(|j| {
                let k = if j < n { j } else { 2 * n - 1 - j };
                20 + 4 * k
            })
            .collect();
        Self::reduced_gaussian(format!("O{}", n), &pl)
    }

    /// Reduced Gaussian grid with `pl[j]` longitudes on Gaussian latitude `j`.
    pub fn reduced_gaussian(name: impl Into<String>, pl: &[usize]) -> GridResult<Self> {
        if pl.is_empty() || pl.len() % 2 != 0 {
            return Err(GridError::InvalidDimension(format!(
                "reduced Gaussian grid needs an even, non-zero number of latitudes (got {})",
                pl.len()
            )));
        }
        let rows = gaussian_latitudes(pl.len() / 2)
            .into_iter()
            .zip(pl)
            .map(|(lat, &nx)| LatitudeRow::global(lat, nx, 0.0))
            .collect();
        Self::new(name, rows)
    }

    /// Cut out the window `[lon_min, lon_max] x [lat_min, lat_max]` (degrees).
    ///
    /// Every kept row remembers the circle it was cut from, so transforms
    /// can still run on the global circle and pick the window afterwards.
    pub fn crop(&self, lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> GridResult<Self> {
        const EPS: f64 = 1e-9;
        let window = format!("[{}, {}] x [{}, {}]", lon_min, lon_max, lat_min, lat_max);
        // lon_min > lon_max wraps past 360 degrees
        let width = if lon_max < lon_min {
            lon_max - lon_min + 360.0
        } else {
            lon_max - lon_min
        };
        let in_window = |lon: f64| width >= 360.0 || (lon - lon_min).rem_euclid(360.0) <= width + EPS;

        let mut rows = Vec::new();
        for row in &self.rows {
            if row.lat < lat_min - EPS || row.lat > lat_max + EPS {
                continue;
            }
            let included: Vec<bool> = (0..row.nx).map(|i| in_window(row.lon(i))).collect();
            let count = included.iter().filter(|&&inside| inside).count();
            if count == 0 {
                continue;
            }
            let start = if count == row.nx {
                0
            } else {
                (0..row.nx)
                    .find(|&i| {
                        let previous = if i == 0 {
                            row.is_global() && included[row.nx - 1]
                        } else {
                            included[i - 1]
                        };
                        included[i] && !previous
                    })
                    .unwrap_or(0)
            };
            let lon_first = lon_min + (row.lon(start) - lon_min).rem_euclid(360.0);
            rows.push(LatitudeRow {
                lat: row.lat,
                nx: count,
                global_nx: row.global_nx,
                lon_origin: row.lon_origin,
                lon_first: if count == row.nx { row.lon_first } else { lon_first },
            });
        }

        if rows.is_empty() {
            return Err(GridError::EmptyCrop(window));
        }
        Self::new(format!("{}:{}", self.name, window), rows)
    }

    /// Grid name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of latitude rows.
    pub fn ny(&self) -> usize {
        self.rows.len()
    }

    /// Largest number of points in any row.
    pub fn nxmax(&self) -> usize {
        self.rows.iter().map(|r| r.nx).max().unwrap_or(0)
    }

    /// Largest full-circle width of any row.
    pub fn global_nxmax(&self) -> usize {
        self.rows.iter().map(|r| r.global_nx).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[LatitudeRow] {
        &self.rows
    }

    pub fn row(&self, j: usize) -> &LatitudeRow {
        &self.rows[j]
    }

    /// Latitude of row `j` in degrees.
    pub fn y(&self, j: usize) -> f64 {
        self.rows[j].lat
    }

    /// Longitude of point `i` in row `j` in degrees.
    pub fn x(&self, i: usize, j: usize) -> f64 {
        self.rows[j].lon(i)
    }

    /// Storage index of the first point of row `j`.
    pub fn row_offset(&self, j: usize) -> usize {
        self.offsets[j]
    }

    /// Total number of points.
    pub fn size(&self) -> usize {
        self.offsets[self.rows.len()]
    }

    /// True when every row has the same layout of longitudes.
    pub fn is_regular(&self) -> bool {
        let first = &self.rows[0];
        self.rows.iter().all(|r| {
            r.nx == first.nx
                && r.global_nx == first.global_nx
                && r.lon_first == first.lon_first
        })
    }

    /// True when no row was cut out of a larger circle.
    pub fn is_global(&self) -> bool {
        self.rows.iter().all(LatitudeRow::is_global)
    }

    /// Points in storage order (row by row, west to east).
    pub fn points(&self) -> impl Iterator<Item = PointLonLat> + '_ {
        self.rows
            .iter()
            .flat_map(|row| (0..row.nx).map(move |i| PointLonLat::new(row.lon(i), row.lat)))
    }
}

impl TryFrom<StructuredGridDef> for StructuredGrid {
    type Error = GridError;

    fn try_from(def: StructuredGridDef) -> Result<Self, Self::Error> {
        Self::new(def.name, def.rows)
    }
}

impl From<StructuredGrid> for StructuredGridDef {
    fn from(grid: StructuredGrid) -> Self {
        Self {
            name: grid.name,
            rows: grid.rows,
        }
    }
}
