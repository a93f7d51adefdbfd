//! Binary opacity table decoding.
//!
//! Opacity tables are stored as one raw binary file per
//! molecule/temperature/pressure combination: a dense sequence of
//! little-endian 4-byte IEEE-754 floats sampled every
//! [`OPACITY_FINE_STEP`](crate::config::OPACITY_FINE_STEP) cm^-1 starting at
//! wavenumber 0. Decoding reads every temperature file of the molecule,
//! downsamples each by the stride `resolution / fine_step`, stacks the
//! sequences as columns and slices the rows to the requested wavenumber
//! window.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opactab::config::{MoleculeRegistry, RetrievalConfig};
//! use opactab::opacity::OpacityDecoder;
//!
//! let config = RetrievalConfig::new("/data/opacities", "/data/hitran", 2.0, 1e-2, (1.1, 1.7));
//! let registry = MoleculeRegistry::builtin();
//!
//! let table = OpacityDecoder::new(&config, &registry).decode("12C-1H4__YT10to10_e2b")?;
//! assert_eq!(table.n_rows(), table.grid().len());
//! # Ok::<(), opactab::error::DecodeError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::config::{MoleculeDescriptor, MoleculeRegistry, RetrievalConfig, OPACITY_FINE_STEP};
use crate::error::DecodeError;
use crate::grid::WavenumberGrid;

/// Absorption cross sections for one molecule on a wavenumber x temperature
/// grid, restricted to the requested window.
///
/// Rows are wavenumber indices (matching the carried grid), columns are
/// temperature indices in the order of the molecule's temperature series.
/// Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct OpacityTable {
    grid: WavenumberGrid,
    n_temperatures: usize,
    data: Vec<f64>,
}

impl OpacityTable {
    /// The wavenumber grid slice the rows correspond to.
    pub fn grid(&self) -> &WavenumberGrid {
        &self.grid
    }

    /// Number of wavenumber rows; always equals `self.grid().len()`.
    pub fn n_rows(&self) -> usize {
        self.grid.len()
    }

    /// Number of temperature columns.
    pub fn n_temperatures(&self) -> usize {
        self.n_temperatures
    }

    /// Cross section at a wavenumber row and temperature column.
    ///
    /// Panics if either index is out of range.
    pub fn value(&self, wavenumber_index: usize, temperature_index: usize) -> f64 {
        assert!(temperature_index < self.n_temperatures);
        self.data[wavenumber_index * self.n_temperatures + temperature_index]
    }

    /// One wavenumber row: the cross sections across all temperatures.
    pub fn row(&self, wavenumber_index: usize) -> &[f64] {
        let start = wavenumber_index * self.n_temperatures;
        &self.data[start..start + self.n_temperatures]
    }

    /// The full row-major `[n_rows x n_temperatures]` backing slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Encode a pressure in bars as the filename token `[n|p]<|log10 * 100|>`
/// with the magnitude zero-padded to three digits.
///
/// ```
/// use opactab::opacity::pressure_code;
/// assert_eq!(pressure_code(1e-2), "n200");
/// assert_eq!(pressure_code(1.0), "p000");
/// assert_eq!(pressure_code(10.0), "p100");
/// ```
pub fn pressure_code(pressure: f64) -> String {
    // Truncation toward zero, matching the encoder that named the files.
    let code = (pressure.log10() * 100.0) as i32;
    let sign = if code < 0 { 'n' } else { 'p' };
    format!("{}{:03}", sign, code.abs())
}

fn opacity_filename(descriptor: &MoleculeDescriptor, temperature: u32, pressure: &str) -> String {
    format!(
        "Out_00000_{}_{:05}_{}.bin",
        descriptor.file_tag, temperature, pressure
    )
}

/// Read a whole binary opacity file as little-endian f32 samples.
///
/// The buffer is sized up front from the file length; a byte count that is
/// not a multiple of 4 is rejected as truncated.
fn read_samples(path: &Path) -> Result<Vec<f32>, DecodeError> {
    let file = File::open(path)?;
    let length = file.metadata()?.len();
    if length % 4 != 0 {
        return Err(DecodeError::TruncatedBinary {
            path: path.to_path_buf(),
            length,
        });
    }
    let mut samples = vec![0.0f32; (length / 4) as usize];
    let mut reader = BufReader::new(file);
    reader.read_f32_into::<LittleEndian>(&mut samples)?;
    Ok(samples)
}

/// Stateless decoder for binary opacity tables.
///
/// Holds only borrowed configuration; every [`decode`](Self::decode) call is
/// independent and idempotent, so decodes for different molecules may run in
/// parallel from the caller's side.
pub struct OpacityDecoder<'a> {
    config: &'a RetrievalConfig,
    registry: &'a MoleculeRegistry,
}

impl<'a> OpacityDecoder<'a> {
    /// Create a decoder over a configuration and molecule registry.
    pub fn new(config: &'a RetrievalConfig, registry: &'a MoleculeRegistry) -> Self {
        Self { config, registry }
    }

    /// Decode the opacity table of `molecule_id` at the configured
    /// resolution, pressure and wavelength window.
    ///
    /// The returned table's rows span the wavenumber window
    /// `[1e4/wavelength_max, 1e4/wavelength_min]`, clipped to the molecule's
    /// native grid; its columns follow the descriptor's temperature series.
    pub fn decode(&self, molecule_id: &str) -> Result<OpacityTable, DecodeError> {
        self.config.validate()?;
        let descriptor = self.registry.get(molecule_id)?;

        let resolution = self.config.resolution;
        let stride = (resolution / OPACITY_FINE_STEP) as usize;
        if stride == 0 {
            return Err(DecodeError::Config(format!(
                "resolution {resolution} cm^-1 is below the native sampling step {OPACITY_FINE_STEP} cm^-1"
            )));
        }

        let (wavenumber_min, wavenumber_max) = self.config.wavenumber_bounds();
        let full_grid = WavenumberGrid::from_range(0.0, descriptor.max_wavenumber, resolution);
        let index_max = (((wavenumber_max / resolution) as usize) + 1).min(full_grid.len());
        let index_min = ((wavenumber_min / resolution) as usize).min(index_max);

        let n_rows = index_max - index_min;
        let n_temperatures = descriptor.temperatures.len();
        let code = pressure_code(self.config.pressure);
        debug!(
            "decoding opacity table for {molecule_id}: {n_temperatures} temperatures, \
             stride {stride}, rows [{index_min}, {index_max})"
        );

        let mut data = vec![0.0f64; n_rows * n_temperatures];
        for (column, &temperature) in descriptor.temperatures.iter().enumerate() {
            let path = self
                .config
                .opacity_dir
                .join(molecule_id)
                .join(opacity_filename(descriptor, temperature, &code));

            let samples = match read_samples(&path) {
                Err(DecodeError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    return Err(DecodeError::MissingOpacityFile {
                        molecule: molecule_id.to_string(),
                        temperature,
                        path,
                    });
                }
                other => other?,
            };

            let downsampled: Vec<f64> = samples
                .iter()
                .step_by(stride)
                .map(|&v| f64::from(v))
                .collect();
            if downsampled.len() < index_max {
                return Err(DecodeError::ShortOpacityFile {
                    path,
                    expected: index_max,
                    actual: downsampled.len(),
                });
            }

            for (row, &value) in downsampled[index_min..index_max].iter().enumerate() {
                data[row * n_temperatures + column] = value;
            }
        }

        Ok(OpacityTable {
            grid: full_grid.slice(index_min, index_max),
            n_temperatures,
            data,
        })
    }
}
