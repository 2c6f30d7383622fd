//! Integration tests for winds derived from vorticity and divergence.

use spectral_trans::{FourierMethod, Trans, TransConfig, EARTH_RADIUS};
use sphere_grid::Grid;
use test_utils::{
    as_points, assert_approx_eq, assert_fields_close, coefficient_index, grid, names, random_spectra, solid_body_vorticity,
    spectral_buffer_len, structured,
};

const U0: f64 = 25.0;

fn build(grid: impl Into<Grid>, truncation: usize, config: TransConfig) -> Trans {
    Trans::new(grid.into(), truncation, config).expect("Failed to build transform")
}

fn winds(trans: &Trans, nb_fields: usize, vorticity: &[f64], divergence: &[f64]) -> Vec<f64> {
    let mut gp = vec![f64::NAN; trans.grid_len(2 * nb_fields)];
    trans
        .invtrans_vordiv2wind(nb_fields, vorticity, divergence, &mut gp)
        .expect("invtrans_vordiv2wind failed");
    gp
}

// =============================================================================
// Analytic Flows
// =============================================================================

#[test]
fn test_solid_body_rotation() {
    let t = 20;
    for name in [names::REGULAR_GAUSSIAN, names::OCTAHEDRAL, names::SHIFTED] {
        let grid = structured(name);
        let trans = build(grid.clone(), t, TransConfig::default());
        let vorticity = solid_body_vorticity(t, 1, U0, EARTH_RADIUS);
        let divergence = vec![0.0; spectral_buffer_len(t, 1)];
        let gp = winds(&trans, 1, &vorticity, &divergence);

        let npts = grid.size();
        for (k, point) in grid.points().enumerate() {
            let u = gp[k];
            let v = gp[npts + k];
            assert!(u.is_finite() && v.is_finite(), "{} point {}", name, k);
            assert_approx_eq!(u, U0 * point.lat.to_radians().cos(), 1e-9, "{}: u at point {}", name, k);
            assert_approx_eq!(v, 0.0, 1e-9, "{}: v at point {}", name, k);
        }
    }
}

#[test]
fn test_divergent_meridional_flow() {
    // D = D(0,1)·P̄₁⁰ gives v = −(√3/2)·a·D(0,1)·cosφ and u = 0
    let t = 10;
    let grid = structured(names::OCTAHEDRAL);
    let trans = build(grid.clone(), t, TransConfig::default());
    let vorticity = vec![0.0; spectral_buffer_len(t, 1)];
    let mut divergence = vec![0.0; spectral_buffer_len(t, 1)];
    divergence[coefficient_index(t, 1, 0, 1, 0, 0)] = -2.0 * U0 / (EARTH_RADIUS * 3f64.sqrt());
    let gp = winds(&trans, 1, &vorticity, &divergence);

    let npts = grid.size();
    for (k, point) in grid.points().enumerate() {
        assert_approx_eq!(gp[k], 0.0, 1e-9, "u at point {}", k);
        assert_approx_eq!(gp[npts + k], U0 * point.lat.to_radians().cos(), 1e-9, "v at point {}", k);
    }
}

#[test]
fn test_winds_finite_away_from_poles() {
    let t = 10;
    let grid = structured(names::LONLAT);
    let trans = build(grid.clone(), t, TransConfig::default());
    let vorticity = random_spectra(t, 1, 3);
    let divergence = random_spectra(t, 1, 4);
    let gp = winds(&trans, 1, &vorticity, &divergence);

    let npts = grid.size();
    for j in 1..grid.ny() - 1 {
        let offset = grid.row_offset(j);
        for field in 0..2 {
            let row = &gp[field * npts + offset..field * npts + offset + grid.row(j).nx];
            assert!(row.iter().all(|v| v.is_finite()), "row {} has non-finite winds", j);
        }
    }
}

// =============================================================================
// Equivalence
// =============================================================================

#[test]
fn test_wind_backends_agree() {
    let t = 15;
    let vorticity = random_spectra(t, 2, 41);
    let divergence = random_spectra(t, 2, 42);
    let grid = structured(names::OCTAHEDRAL);

    let expected = winds(&build(grid.clone(), t, TransConfig::default()), 2, &vorticity, &divergence);
    for method in [FourierMethod::Dense, FourierMethod::DenseTransposed] {
        let trans = build(grid.clone(), t, TransConfig::default().with_fourier(method));
        assert_fields_close!(&winds(&trans, 2, &vorticity, &divergence), &expected, 1e-10);
    }

    for precompute in [true, false] {
        let trans = build(
            as_points(names::OCTAHEDRAL),
            t,
            TransConfig::default().with_precompute(precompute),
        );
        assert_fields_close!(&winds(&trans, 2, &vorticity, &divergence), &expected, 1e-10);
    }
}

#[test]
fn test_mixed_matches_separate_calls() {
    let t = 12;
    let trans = build(grid(names::OCTAHEDRAL), t, TransConfig::default());
    let scalar = random_spectra(t, 2, 1);
    let vorticity = random_spectra(t, 1, 2);
    let divergence = random_spectra(t, 1, 3);

    let mut mixed = vec![0.0; trans.grid_len(4)];
    trans
        .invtrans_mixed(2, &scalar, 1, &vorticity, &divergence, &mut mixed)
        .unwrap();

    let wind = winds(&trans, 1, &vorticity, &divergence);
    let mut scalars = vec![0.0; trans.grid_len(2)];
    trans.invtrans(2, &scalar, &mut scalars).unwrap();

    let npts = trans.grid().size();
    assert_eq!(&mixed[..2 * npts], &wind[..]);
    assert_eq!(&mixed[2 * npts..], &scalars[..]);
}

#[test]
fn test_earth_radius_scales_winds() {
    let t = 8;
    let vorticity = random_spectra(t, 1, 7);
    let divergence = random_spectra(t, 1, 8);
    let grid = structured(names::REGULAR_GAUSSIAN);

    let unit = winds(&build(grid.clone(), t, TransConfig::default().with_radius(1.0)), 1, &vorticity, &divergence);
    let earth = winds(&build(grid, t, TransConfig::default()), 1, &vorticity, &divergence);
    let scaled: Vec<f64> = unit.iter().map(|v| v * EARTH_RADIUS).collect();
    assert_fields_close!(&earth, &scaled, 1e-12);
}
