//! Wind recovery: the transform of the U, V spectra gives `u·cosφ` and
//! `v·cosφ`, which are divided by `cosφ` here.
//!
//! Rows or points at a pole have `cosφ = 0` (or a rounding residue of it);
//! their winds come out infinite or NaN and are left as such.

use rayon::prelude::*;
use sphere_grid::StructuredGrid;

/// Divide `nb_fields` field-major fields on a structured grid by the cosine
/// of each row's latitude.
pub fn divide_rows_by_coslat(grid: &StructuredGrid, nb_fields: usize, gp: &mut [f64]) {
    let npts = grid.size();
    gp.par_chunks_mut(npts).take(nb_fields).for_each(|field| {
        for (j, row) in grid.rows().iter().enumerate() {
            let coslat = row.lat.to_radians().cos();
            let offset = grid.row_offset(j);
            for value in &mut field[offset..offset + row.nx] {
                *value /= coslat;
            }
        }
    });
}

/// Divide `nb_fields` field-major fields on a point set by the cosine of
/// each point's latitude (given in radians).
pub fn divide_points_by_coslat(lats: &[f64], nb_fields: usize, gp: &mut [f64]) {
    let npts = lats.len();
    gp.par_chunks_mut(npts).take(nb_fields).for_each(|field| {
        for (value, lat) in field.iter_mut().zip(lats) {
            *value /= lat.cos();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let grid = StructuredGrid::regular_lonlat(4, 5).unwrap();
        let mut gp = vec![1.0; 2 * grid.size()];
        divide_rows_by_coslat(&grid, 2, &mut gp);

        let npts = grid.size();
        for field in 0..2 {
            // 45 degrees north
            for i in 0..4 {
                let value = gp[field * npts + grid.row_offset(1) + i];
                assert!((value - std::f64::consts::SQRT_2).abs() < 1e-12);
            }
            assert_eq!(gp[field * npts + grid.row_offset(2)], 1.0);
        }
        // pole rows are not masked
        assert!(gp[0].abs() > 1e15 || !gp[0].is_finite());
    }

    #[test]
    fn test_points() {
        let lats = [0.0, 60f64.to_radians()];
        let mut gp = vec![3.0, 3.0];
        divide_points_by_coslat(&lats, 1, &mut gp);
        assert_eq!(gp[0], 3.0);
        assert!((gp[1] - 6.0).abs() < 1e-12);
    }
}
