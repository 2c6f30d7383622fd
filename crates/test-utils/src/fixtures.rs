//! Common grid fixtures for spectral transform tests.

use sphere_grid::{Grid, LatitudeRow, PointLonLat, StructuredGrid, UnstructuredGrid};

/// Grid names covering every structured grid family.
pub mod names {
    /// Regular Gaussian, 32 latitudes x 64 longitudes
    pub const REGULAR_GAUSSIAN: &str = "F16";

    /// Octahedral reduced Gaussian, 32 latitudes
    pub const OCTAHEDRAL: &str = "O16";

    /// Regular lon/lat including both poles
    pub const LONLAT: &str = "L48x25";

    /// Lon/lat shifted by half a cell, poles excluded
    pub const SHIFTED: &str = "S48x24";

    /// All of the above.
    pub const ALL: [&str; 4] = [REGULAR_GAUSSIAN, OCTAHEDRAL, LONLAT, SHIFTED];
}

/// Regional windows as `(lon_min, lon_max, lat_min, lat_max)` in degrees.
pub mod windows {
    /// Europe, lying across the zero meridian
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 45.0, 35.0, 72.0);

    /// Northern mid-latitudes only
    pub const NORTH: (f64, f64, f64, f64) = (20.0, 140.0, 10.0, 80.0);

    /// Wider in the south than in the north
    pub const SOUTH_HEAVY: (f64, f64, f64, f64) = (100.0, 200.0, -60.0, 20.0);
}

/// Build a grid from its name.
///
/// # Panics
///
/// Panics if the name is not a known grid.
pub fn grid(name: &str) -> Grid {
    Grid::from_name(name).unwrap_or_else(|e| panic!("fixture grid {}: {}", name, e))
}

/// Structured grid from its name.
pub fn structured(name: &str) -> StructuredGrid {
    match grid(name) {
        Grid::Structured(grid) => grid,
        Grid::Unstructured(_) => panic!("fixture grid {} is not structured", name),
    }
}

/// Crop a named grid to a window.
pub fn cropped(name: &str, window: (f64, f64, f64, f64)) -> StructuredGrid {
    let (lon_min, lon_max, lat_min, lat_max) = window;
    structured(name)
        .crop(lon_min, lon_max, lat_min, lat_max)
        .unwrap_or_else(|e| panic!("cropping {}: {}", name, e))
}

/// The points of a named structured grid as an unstructured grid.
pub fn as_points(name: &str) -> UnstructuredGrid {
    UnstructuredGrid::from_structured(&structured(name))
}

/// A scattered point set including both poles, the equator and the
/// date line.
pub fn scattered_points() -> UnstructuredGrid {
    let mut points = vec![
        PointLonLat::new(0.0, 90.0),
        PointLonLat::new(0.0, -90.0),
        PointLonLat::new(180.0, 0.0),
        PointLonLat::new(-180.0, 0.0),
    ];
    for k in 0..40 {
        let lon = (k as f64 * 137.507_764) % 360.0 - 180.0;
        let lat = 89.0 - (k as f64 * 4.45) % 178.0;
        points.push(PointLonLat::new(lon, lat));
    }
    UnstructuredGrid::new("scattered", points).unwrap_or_else(|e| panic!("scattered points: {}", e))
}

/// A structured grid whose rows are not symmetric about the equator.
pub fn asymmetric_rows() -> StructuredGrid {
    let rows = [70.0, 35.0, 5.0, -20.0, -50.0]
        .iter()
        .zip([24, 30, 36, 30, 18])
        .map(|(&lat, nx)| LatitudeRow::global(lat, nx, 0.0))
        .collect();
    StructuredGrid::new("asymmetric", rows).unwrap_or_else(|e| panic!("asymmetric rows: {}", e))
}
