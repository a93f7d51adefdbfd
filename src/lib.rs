//! # opactab - Opacity & CIA Table Decoders
//!
//! `opactab` prepares molecular-absorption and collision-induced-absorption
//! (CIA) numeric data for atmospheric retrieval pipelines. Given a molecule
//! identifier and a set of physical conditions (probed pressure, temperature
//! grid, wavenumber resolution), it produces aligned two-dimensional arrays
//! of absorption cross sections, indexed consistently by wavenumber and
//! temperature, ready for a downstream radiative-transfer or fitting model.
//!
//! ## Key Features
//!
//! - **Opacity Table Decoder**: reads fixed-format binary files (one per
//!   molecule/temperature/pressure combination), reconstructs the wavenumber
//!   grid, and returns a `[wavenumber x temperature]` cross-section matrix
//!   restricted to a requested wavenumber window.
//!
//! - **CIA Table Decoder**: reads HITRAN-style multi-block text files (one
//!   block per temperature), assembles a `[temperature x wavenumber]` matrix,
//!   and zero-pads or truncates it so its wavenumber axis matches a
//!   caller-supplied reference grid.
//!
//! - **Explicit Configuration**: all paths, grids and per-molecule metadata
//!   live in an immutable [`config::RetrievalConfig`] and
//!   [`config::MoleculeRegistry`] passed into each decode call; there is no
//!   process-wide mutable state, and every decode is idempotent.
//!
//! - **Typed Failures**: unknown identifiers, missing files and malformed
//!   file contents surface as [`error::DecodeError`] variants; there is no
//!   partial-result mode and nothing exits the process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use opactab::cia::CiaDecoder;
//! use opactab::config::{MoleculeRegistry, RetrievalConfig};
//! use opactab::opacity::OpacityDecoder;
//!
//! let config = RetrievalConfig::new(
//!     "/data/opacities",
//!     "/data/hitran",
//!     2.0,        // output resolution in cm^-1
//!     1e-2,       // probed pressure in bars
//!     (1.1, 1.7), // wavelength window in microns
//! );
//! let registry = MoleculeRegistry::builtin();
//!
//! // Decode a molecular opacity table.
//! let opacity = OpacityDecoder::new(&config, &registry)
//!     .decode("1H2-16O__POKAZATEL_e2b")?;
//! println!(
//!     "{} wavenumber points x {} temperatures",
//!     opacity.n_rows(),
//!     opacity.n_temperatures()
//! );
//!
//! // Decode a CIA table aligned to the opacity grid.
//! let cia = CiaDecoder::new(&config).decode("H2", "He", opacity.grid())?;
//! assert_eq!(cia.n_wavenumbers(), opacity.grid().len());
//! # Ok::<(), opactab::error::DecodeError>(())
//! ```
//!
//! ## File Formats
//!
//! ### Binary opacity files
//!
//! One file per molecule/temperature/pressure combination, named
//! `Out_00000_<tag>_<temperature:05>_<pressure_code>.bin` under a directory
//! per molecule. The pressure code encodes `log10(pressure)` as a signed,
//! scaled, zero-padded token (`0.01 bar -> n200`). The content is a dense
//! sequence of little-endian 4-byte IEEE-754 floats sampled every 0.01 cm^-1
//! starting at wavenumber 0.
//!
//! ### CIA text files
//!
//! Named `<species1>-<species2>[_norm|_eq]_<year>[b].cia`, probed in a fixed
//! priority order. Each file repeats, once per temperature, a header line
//! (field 1 = starting wavenumber of the block; field 3 of the first header
//! = data lines per block) followed by that many `wavenumber absorption`
//! data lines.
//!
//! ## Architecture
//!
//! - [`config`]: immutable retrieval configuration, molecule registry,
//!   physical constants, TOML loading
//! - [`grid`]: the fixed-step [`grid::WavenumberGrid`] shared by both tables
//! - [`opacity`]: binary opacity decoding
//! - [`cia`]: CIA block parsing and reference-grid alignment
//! - [`error`]: the [`error::DecodeError`] type

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod cia;
pub mod config;
pub mod error;
pub mod grid;
pub mod opacity;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::cia::{CiaDecoder, CiaTable, CIA_FILENAME_SUFFIXES};
    pub use crate::config::{MoleculeDescriptor, MoleculeRegistry, RetrievalConfig};
    pub use crate::error::DecodeError;
    pub use crate::grid::WavenumberGrid;
    pub use crate::opacity::{pressure_code, OpacityDecoder, OpacityTable};
}
