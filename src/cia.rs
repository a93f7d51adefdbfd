//! Collision-induced absorption (CIA) table decoding.
//!
//! CIA tables are text files of repeating blocks, one per temperature: a
//! header line carrying the block's starting wavenumber, followed by a fixed
//! number of `wavenumber absorption` data lines at 1 cm^-1 spacing. Decoding
//! extracts the native window of interest from every block, downsamples by
//! the resolution stride, stacks the blocks as rows, then zero-pads or
//! truncates the wavenumber axis at both edges so it matches a
//! caller-supplied reference grid (typically the opacity decoder's output
//! grid for the same window). Regions outside the native coverage are zero,
//! never extrapolated.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opactab::cia::CiaDecoder;
//! use opactab::config::RetrievalConfig;
//! use opactab::grid::WavenumberGrid;
//!
//! let config = RetrievalConfig::new("/data/opacities", "/data/hitran", 2.0, 1e-2, (1.1, 1.7));
//! let reference = WavenumberGrid::from_range(5_000.0, 9_200.0, 2.0);
//!
//! let table = CiaDecoder::new(&config).decode("H2", "He", &reference)?;
//! assert_eq!(table.n_wavenumbers(), reference.len());
//! # Ok::<(), opactab::error::DecodeError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::RetrievalConfig;
use crate::error::DecodeError;
use crate::grid::WavenumberGrid;

/// Filename suffixes probed for a species pair, in priority order. The
/// first `<species1>-<species2><suffix>` that exists wins.
pub const CIA_FILENAME_SUFFIXES: [&str; 5] = [
    "_2011.cia",
    "_2018.cia",
    "_2018b.cia",
    "_norm_2011.cia",
    "_eq_2011.cia",
];

/// CIA absorption coefficients on a temperature x wavenumber grid, aligned
/// to a reference wavenumber grid.
///
/// Rows are temperature indices in the order of the configured CIA ladder,
/// columns are wavenumber indices of the reference grid. Immutable once
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CiaTable {
    n_temperatures: usize,
    n_wavenumbers: usize,
    data: Vec<f64>,
}

impl CiaTable {
    /// Number of temperature rows.
    pub fn n_temperatures(&self) -> usize {
        self.n_temperatures
    }

    /// Number of wavenumber columns; always equals the reference grid length.
    pub fn n_wavenumbers(&self) -> usize {
        self.n_wavenumbers
    }

    /// Absorption coefficient at a temperature row and wavenumber column.
    ///
    /// Panics if either index is out of range.
    pub fn value(&self, temperature_index: usize, wavenumber_index: usize) -> f64 {
        assert!(wavenumber_index < self.n_wavenumbers);
        self.data[temperature_index * self.n_wavenumbers + wavenumber_index]
    }

    /// One temperature row: the coefficients across the reference grid.
    pub fn row(&self, temperature_index: usize) -> &[f64] {
        let start = temperature_index * self.n_wavenumbers;
        &self.data[start..start + self.n_wavenumbers]
    }

    /// The full row-major `[n_temperatures x n_wavenumbers]` backing slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> DecodeError {
    DecodeError::MalformedCia {
        path: path.to_path_buf(),
        line: line + 1,
        reason: reason.into(),
    }
}

/// Parse a whitespace-separated numeric field of a given line, reporting
/// the 1-based file line on failure.
fn parse_field(path: &Path, lines: &[&str], line: usize, field: usize) -> Result<f64, DecodeError> {
    let text = lines
        .get(line)
        .ok_or_else(|| malformed(path, line, "line past end of file"))?;
    let token = text
        .split_whitespace()
        .nth(field)
        .ok_or_else(|| malformed(path, line, format!("missing field {field}")))?;
    token
        .parse::<f64>()
        .map_err(|_| malformed(path, line, format!("unparseable numeric field {field}: '{token}'")))
}

/// Drop or zero-pad columns at both edges of a row-major matrix.
///
/// Positive `pad_start` drops that many leading columns, negative values
/// prepend zeros; `pad_end` mirrors this on the trailing edge (positive
/// appends zeros, negative drops). Drops saturate at the matrix width.
fn align_columns(
    data: &[f64],
    n_rows: usize,
    n_cols: usize,
    pad_start: i64,
    pad_end: i64,
) -> (Vec<f64>, usize) {
    let drop_start = (pad_start.max(0) as usize).min(n_cols);
    let drop_end = (-pad_end).max(0) as usize;
    let leading_zeros = (-pad_start).max(0) as usize;
    let trailing_zeros = pad_end.max(0) as usize;

    let kept = n_cols.saturating_sub(drop_start + drop_end);
    let out_cols = leading_zeros + kept + trailing_zeros;

    let mut out = vec![0.0f64; n_rows * out_cols];
    for row in 0..n_rows {
        let src = &data[row * n_cols + drop_start..row * n_cols + drop_start + kept];
        let dst_start = row * out_cols + leading_zeros;
        out[dst_start..dst_start + kept].copy_from_slice(src);
    }
    (out, out_cols)
}

/// Stateless decoder for CIA text tables.
pub struct CiaDecoder<'a> {
    config: &'a RetrievalConfig,
}

impl<'a> CiaDecoder<'a> {
    /// Create a decoder over a configuration.
    pub fn new(config: &'a RetrievalConfig) -> Self {
        Self { config }
    }

    /// Find the CIA file for a species pair by probing
    /// [`CIA_FILENAME_SUFFIXES`] in order against the configured directory.
    pub fn locate(&self, species1: &str, species2: &str) -> Result<PathBuf, DecodeError> {
        for suffix in CIA_FILENAME_SUFFIXES {
            let path = self
                .config
                .cia_dir
                .join(format!("{species1}-{species2}{suffix}"));
            if path.exists() {
                return Ok(path);
            }
        }
        Err(DecodeError::MissingCiaTable {
            species1: species1.to_string(),
            species2: species2.to_string(),
        })
    }

    /// Decode the CIA table for a species pair, aligned to `reference`.
    ///
    /// The result has one row per configured CIA temperature and exactly
    /// `reference.len()` columns; columns the native table does not cover
    /// are zero.
    pub fn decode(
        &self,
        species1: &str,
        species2: &str,
        reference: &WavenumberGrid,
    ) -> Result<CiaTable, DecodeError> {
        self.config.validate()?;
        let resolution = self.config.resolution;
        let stride = resolution as usize;
        if stride == 0 || stride as f64 != resolution {
            return Err(DecodeError::Config(format!(
                "CIA decoding requires a whole-number resolution of at least 1 cm^-1, got {resolution}"
            )));
        }

        let path = self.locate(species1, species2)?;
        debug!("decoding CIA table {}", path.display());
        let text = fs::read_to_string(&path)?;
        let lines: Vec<&str> = text.lines().collect();

        let lines_per_block = parse_field(&path, &lines, 0, 3)? as usize;
        let window_min = self.config.cia_wavenumber_min;
        let window_max = self.config.cia_wavenumber_max;
        let native = WavenumberGrid::from_range(window_min, window_max + 1.0, resolution);
        let n_temperatures = self.config.cia_temperatures.len();

        let mut rows = Vec::with_capacity(n_temperatures * native.len());
        for block in 0..n_temperatures {
            let header = block * (lines_per_block + 1);
            let start_wavenumber = parse_field(&path, &lines, header, 1)?;

            // Data line offsets within the block that cover the native
            // window, relative to the block's starting wavenumber.
            let offset_min = (window_min + 1.0 - start_wavenumber) as i64;
            let offset_max = (window_max + 2.0 - start_wavenumber) as i64;

            let mut offset = offset_min;
            while offset < offset_max {
                if offset < 1 {
                    return Err(malformed(
                        &path,
                        header,
                        format!(
                            "block starting at {start_wavenumber} cm^-1 does not cover the \
                             native window [{window_min}, {window_max}] cm^-1"
                        ),
                    ));
                }
                rows.push(parse_field(&path, &lines, header + offset as usize, 1)?);
                offset += stride as i64;
            }
        }

        // Reconcile the native grid with the reference grid: positive pads
        // drop columns, negative pads insert zeros (leading edge), and
        // vice versa on the trailing edge.
        let pad_start = ((reference.first() - native.first()) / resolution) as i64;
        let pad_end = ((reference.last() - native.last()) / resolution) as i64;
        let (data, n_wavenumbers) =
            align_columns(&rows, n_temperatures, native.len(), pad_start, pad_end);

        if n_wavenumbers != reference.len() {
            return Err(DecodeError::Config(format!(
                "aligned CIA table has {n_wavenumbers} wavenumber columns but the reference \
                 grid has {}; grids are incompatible",
                reference.len()
            )));
        }

        Ok(CiaTable {
            n_temperatures,
            n_wavenumbers,
            data,
        })
    }
}
