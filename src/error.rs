//! Error type shared by the opacity and CIA decoders.
//!
//! Variants fall into three families: configuration errors (unknown
//! identifiers, invalid resolution), missing data (a required file absent
//! after exhausting all known names) and malformed data (file contents
//! inconsistent with the expected layout). All failures abort the current
//! decode call; there are no retries and no partial results.

use std::path::PathBuf;

/// Errors that can occur while decoding opacity or CIA tables
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// I/O error while reading a data file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Molecule identifier absent from the registry
    #[error("unknown molecule identifier: {0}")]
    UnknownMolecule(String),

    /// Opacity file for a required temperature does not exist
    #[error("opacity file for {molecule} at {temperature} K not found: {}", .path.display())]
    MissingOpacityFile {
        /// Molecule identifier being decoded
        molecule: String,
        /// Temperature in Kelvin whose file is absent
        temperature: u32,
        /// Full path that was probed
        path: PathBuf,
    },

    /// No CIA file exists for the species pair under any known filename suffix
    #[error("no CIA table found for {species1}-{species2}")]
    MissingCiaTable {
        /// First species of the colliding pair
        species1: String,
        /// Second species of the colliding pair
        species2: String,
    },

    /// Binary opacity file length is not a whole number of 4-byte floats
    #[error("{}: length {length} bytes is not a multiple of 4", .path.display())]
    TruncatedBinary {
        /// Offending file
        path: PathBuf,
        /// Actual file length in bytes
        length: u64,
    },

    /// Binary opacity file holds fewer samples than the requested window spans
    #[error(
        "{}: {actual} downsampled values cover less than the requested window ({expected} needed)",
        .path.display()
    )]
    ShortOpacityFile {
        /// Offending file
        path: PathBuf,
        /// Downsampled values required by the requested window
        expected: usize,
        /// Downsampled values actually present
        actual: usize,
    },

    /// CIA file structure or numeric field could not be parsed
    #[error("{}: line {line}: {reason}", .path.display())]
    MalformedCia {
        /// Offending file
        path: PathBuf,
        /// 1-based line number within the file
        line: usize,
        /// What went wrong on that line
        reason: String,
    },
}
