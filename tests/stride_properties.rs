//! Property-based tests for the decoders' arithmetic: stride consistency
//! between resolutions, pressure-code formatting and grid slicing.

use std::fs::{self, File};
use std::io::Write;

use proptest::prelude::*;
use tempfile::TempDir;

use opactab::config::{
    MoleculeDescriptor, MoleculeRegistry, RetrievalConfig, AMU, OPACITY_FINE_STEP,
};
use opactab::grid::WavenumberGrid;
use opactab::opacity::{pressure_code, OpacityDecoder, OpacityTable};

/// Decode a synthetic single-temperature opacity file at the given
/// resolution over a window covering the whole native span.
fn decode(samples: &[f32], resolution: f64) -> OpacityTable {
    let dir = TempDir::new().expect("tempdir");
    let config = RetrievalConfig::new(
        dir.path().join("opacities"),
        dir.path().join("cia"),
        resolution,
        1e-2,
        (1.0, 1e9),
    );

    let mut registry = MoleculeRegistry::new();
    registry.insert(
        "mol",
        MoleculeDescriptor {
            file_tag: "00001".to_string(),
            molecular_mass: 2.0 * AMU,
            temperatures: vec![500],
            // Half a fine step below the sample count keeps the grid length
            // away from float-boundary ties.
            max_wavenumber: (samples.len() as f64 - 0.5) * OPACITY_FINE_STEP,
        },
    );

    let molecule_dir = config.opacity_dir.join("mol");
    fs::create_dir_all(&molecule_dir).expect("create opacity dir");
    let code = pressure_code(config.pressure);
    let mut file = File::create(molecule_dir.join(format!("Out_00000_00001_00500_{code}.bin")))
        .expect("create opacity file");
    for v in samples {
        file.write_all(&v.to_le_bytes()).expect("write sample");
    }
    drop(file);

    OpacityDecoder::new(&config, &registry)
        .decode("mol")
        .expect("decode")
}

proptest! {
    /// Decoding at resolution 2r keeps exactly every second element of the
    /// resolution-r result, starting at the same index.
    #[test]
    fn test_stride_halving(
        samples in prop::collection::vec(0.0f32..1e6, 8..200),
        stride in 1usize..4,
    ) {
        let resolution = stride as f64 * OPACITY_FINE_STEP;
        let fine = decode(&samples, resolution);
        let coarse = decode(&samples, resolution * 2.0);

        prop_assert_eq!(coarse.n_rows(), (fine.n_rows() + 1) / 2);
        for row in 0..coarse.n_rows() {
            prop_assert_eq!(coarse.value(row, 0), fine.value(2 * row, 0));
        }
    }

    /// Pressures of a bar and above encode as `p` plus digits.
    #[test]
    fn test_pressure_code_positive_log(pressure in 1.0f64..1e6) {
        let code = pressure_code(pressure);
        prop_assert!(code.starts_with('p'), "{code}");
        prop_assert!(code.len() >= 4);
        prop_assert!(code[1..].bytes().all(|b| b.is_ascii_digit()), "{code}");
    }

    /// Pressures clearly below a bar encode as `n` plus digits.
    #[test]
    fn test_pressure_code_negative_log(pressure in 1e-6f64..0.97) {
        let code = pressure_code(pressure);
        prop_assert!(code.starts_with('n'), "{code}");
        prop_assert!(code.len() >= 4);
        prop_assert!(code[1..].bytes().all(|b| b.is_ascii_digit()), "{code}");
    }

    /// Slicing a grid preserves the values of the parent range.
    #[test]
    fn test_grid_slice_matches_parent(
        start in -1e4f64..1e4,
        step in 0.001f64..100.0,
        len in 0usize..500,
        a in 0usize..600,
        b in 0usize..600,
    ) {
        let grid = WavenumberGrid::new(start, step, len);
        let sub = grid.slice(a, b);

        prop_assert!(sub.len() <= len);
        for i in 0..sub.len() {
            let expected = grid.value_at(a + i);
            let got = sub.value_at(i);
            prop_assert!(
                (got - expected).abs() <= 1e-9 * expected.abs().max(1.0),
                "index {i}: {got} vs {expected}"
            );
        }
    }
}
