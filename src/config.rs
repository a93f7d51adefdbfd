//! Retrieval configuration and per-molecule metadata.
//!
//! Everything the decoders consume from the outside lives here as an
//! explicit, immutable value: filesystem paths, the output resolution, the
//! probed pressure, the wavelength window, the CIA temperature ladder and
//! native window, and the per-molecule descriptor registry. A configuration
//! is constructed once (in code or from a TOML file) and passed by reference
//! into each decode call; no process-wide mutable state exists.
//!
//! ```toml
//! # retrieval.toml
//! opacity_dir = "/data/opacities"
//! cia_dir = "/data/hitran"
//! resolution = 2.0
//! pressure = 1e-2
//! wavelength_min = 1.1
//! wavelength_max = 1.7
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DecodeError;

/// Atomic mass unit in grams.
pub const AMU: f64 = 1.660_539_040e-24;

/// Boltzmann's constant in erg/K.
pub const BOLTZMANN: f64 = 1.380_648_52e-16;

/// On-disk sampling step of the binary opacity files, cm^-1.
pub const OPACITY_FINE_STEP: f64 = 0.01;

/// Native wavenumber span of an opacity table unless the molecule's line
/// list ends earlier, cm^-1.
pub const DEFAULT_MAX_WAVENUMBER: f64 = 18_000.0;

fn default_cia_temperatures() -> Vec<f64> {
    // np.r_[200:3025:25]
    (200..3025).step_by(25).map(f64::from).collect()
}

fn default_cia_wavenumber_min() -> f64 {
    6_250.0
}

fn default_cia_wavenumber_max() -> f64 {
    10_000.0
}

/// Immutable configuration consumed by both decoders.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Directory holding one subdirectory of binary opacity files per molecule.
    pub opacity_dir: PathBuf,

    /// Directory holding the `.cia` text files.
    pub cia_dir: PathBuf,

    /// Output wavenumber spacing in cm^-1. Must be positive, a multiple of
    /// [`OPACITY_FINE_STEP`] for opacity decoding and a whole number of
    /// cm^-1 for CIA decoding.
    pub resolution: f64,

    /// Probed pressure in bars, encoded into opacity filenames.
    pub pressure: f64,

    /// Lower wavelength bound of the window of interest, microns.
    pub wavelength_min: f64,

    /// Upper wavelength bound of the window of interest, microns.
    pub wavelength_max: f64,

    /// Temperatures of the CIA table blocks, in file order. Defaults to the
    /// HITRAN ladder 200..3000 K in 25 K steps.
    #[serde(default = "default_cia_temperatures")]
    pub cia_temperatures: Vec<f64>,

    /// Lower bound of the native CIA wavenumber window, cm^-1.
    #[serde(default = "default_cia_wavenumber_min")]
    pub cia_wavenumber_min: f64,

    /// Upper bound (inclusive) of the native CIA wavenumber window, cm^-1.
    #[serde(default = "default_cia_wavenumber_max")]
    pub cia_wavenumber_max: f64,
}

impl RetrievalConfig {
    /// Build a configuration with the default CIA ladder and window.
    pub fn new(
        opacity_dir: impl Into<PathBuf>,
        cia_dir: impl Into<PathBuf>,
        resolution: f64,
        pressure: f64,
        wavelength_window: (f64, f64),
    ) -> Self {
        Self {
            opacity_dir: opacity_dir.into(),
            cia_dir: cia_dir.into(),
            resolution,
            pressure,
            wavelength_min: wavelength_window.0,
            wavelength_max: wavelength_window.1,
            cia_temperatures: default_cia_temperatures(),
            cia_wavenumber_min: default_cia_wavenumber_min(),
            cia_wavenumber_max: default_cia_wavenumber_max(),
        }
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DecodeError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, DecodeError> {
        toml::from_str(content).map_err(|e| DecodeError::Config(e.to_string()))
    }

    /// Check the physical inputs before a decode. Fails fast with
    /// [`DecodeError::Config`] instead of producing a nonsense grid.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !(self.resolution > 0.0) {
            return Err(DecodeError::Config(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if !(self.pressure > 0.0) {
            return Err(DecodeError::Config(format!(
                "pressure must be positive, got {} bar",
                self.pressure
            )));
        }
        if !(self.wavelength_min > 0.0 && self.wavelength_min < self.wavelength_max) {
            return Err(DecodeError::Config(format!(
                "invalid wavelength window [{}, {}] micron",
                self.wavelength_min, self.wavelength_max
            )));
        }
        if self.cia_wavenumber_min >= self.cia_wavenumber_max {
            return Err(DecodeError::Config(format!(
                "invalid CIA native window [{}, {}] cm^-1",
                self.cia_wavenumber_min, self.cia_wavenumber_max
            )));
        }
        if self.cia_temperatures.is_empty() {
            return Err(DecodeError::Config(
                "CIA temperature ladder is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The wavenumber window `[1e4/wavelength_max, 1e4/wavelength_min]`
    /// corresponding to the configured wavelength window.
    pub fn wavenumber_bounds(&self) -> (f64, f64) {
        (1e4 / self.wavelength_max, 1e4 / self.wavelength_min)
    }
}

/// Per-molecule metadata the opacity decoder needs.
#[derive(Debug, Clone)]
pub struct MoleculeDescriptor {
    /// High-wavenumber tag embedded in the binary filenames, e.g. `42000`.
    pub file_tag: String,

    /// Mean molecular mass in grams.
    pub molecular_mass: f64,

    /// Temperatures (K) the opacity tables are sampled at, in file order.
    /// Lengths differ between molecules; ammonia's ladder is truncated.
    pub temperatures: Vec<u32>,

    /// Upper bound of the molecule's native wavenumber grid, cm^-1. The
    /// returned window is clipped here even if the request extends further.
    pub max_wavenumber: f64,
}

/// Lookup of molecule identifier to [`MoleculeDescriptor`].
///
/// Unknown identifiers fail with a typed error at lookup time rather than
/// surfacing as a raw map miss deep inside a decode.
#[derive(Debug, Clone, Default)]
pub struct MoleculeRegistry {
    molecules: HashMap<String, MoleculeDescriptor>,
}

/// The ExoMol temperature ladder shared by the built-in line lists:
/// 50..700 K in 50 K steps, 700..1500 K in 100 K steps, 1500..3100 K in
/// 200 K steps (29 entries).
fn exomol_temperature_ladder() -> Vec<u32> {
    let mut temps: Vec<u32> = (50..700).step_by(50).collect();
    temps.extend((700..1500).step_by(100));
    temps.extend((1500..3100).step_by(200));
    temps
}

impl MoleculeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of the four built-in ExoMol line lists.
    pub fn builtin() -> Self {
        let ladder = exomol_temperature_ladder();
        let mut registry = Self::new();
        registry.insert(
            "1H2-16O__POKAZATEL_e2b",
            MoleculeDescriptor {
                file_tag: "42000".to_string(),
                molecular_mass: 18.0 * AMU,
                temperatures: ladder.clone(),
                max_wavenumber: DEFAULT_MAX_WAVENUMBER,
            },
        );
        registry.insert(
            "12C-1H4__YT10to10_e2b",
            MoleculeDescriptor {
                file_tag: "13000".to_string(),
                molecular_mass: 16.0 * AMU,
                temperatures: ladder.clone(),
                max_wavenumber: DEFAULT_MAX_WAVENUMBER,
            },
        );
        registry.insert(
            "1H-12C-14N__Harris_e2b",
            MoleculeDescriptor {
                file_tag: "18000".to_string(),
                molecular_mass: 27.0 * AMU,
                temperatures: ladder.clone(),
                max_wavenumber: DEFAULT_MAX_WAVENUMBER,
            },
        );
        // The CoYuTe ammonia tables stop at 12000 cm^-1 and carry a
        // truncated temperature ladder.
        registry.insert(
            "14N-1H3__CoYuTe_e2b",
            MoleculeDescriptor {
                file_tag: "20000".to_string(),
                molecular_mass: 17.0 * AMU,
                temperatures: ladder[..22].to_vec(),
                max_wavenumber: 12_000.0,
            },
        );
        registry
    }

    /// Register a molecule, replacing any previous descriptor for the id.
    pub fn insert(&mut self, id: impl Into<String>, descriptor: MoleculeDescriptor) {
        self.molecules.insert(id.into(), descriptor);
    }

    /// Look up a molecule, failing with
    /// [`DecodeError::UnknownMolecule`] if the id is not registered.
    pub fn get(&self, id: &str) -> Result<&MoleculeDescriptor, DecodeError> {
        self.molecules
            .get(id)
            .ok_or_else(|| DecodeError::UnknownMolecule(id.to_string()))
    }

    /// Number of registered molecules.
    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    /// Whether the registry holds no molecules.
    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Iterate over the registered molecule identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.molecules.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            opacity_dir = "/data/opacities"
            cia_dir = "/data/hitran"
            resolution = 2.0
            pressure = 1e-2
            wavelength_min = 1.1
            wavelength_max = 1.7
        "#;

        let config = RetrievalConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.opacity_dir, PathBuf::from("/data/opacities"));
        assert_eq!(config.resolution, 2.0);
        assert_eq!(config.pressure, 1e-2);
        assert!(config.validate().is_ok());

        // defaults fill in the CIA ladder and window
        assert_eq!(config.cia_temperatures.len(), 113);
        assert_eq!(config.cia_temperatures[0], 200.0);
        assert_eq!(*config.cia_temperatures.last().unwrap(), 3_000.0);
        assert_eq!(config.cia_wavenumber_min, 6_250.0);
        assert_eq!(config.cia_wavenumber_max, 10_000.0);
    }

    #[test]
    fn test_parse_config_missing_field() {
        let toml = r#"
            opacity_dir = "/data/opacities"
            resolution = 2.0
        "#;
        assert!(matches!(
            RetrievalConfig::from_toml_str(toml),
            Err(DecodeError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let mut config =
            RetrievalConfig::new("/opac", "/cia", 2.0, 1e-2, (1.1, 1.7));
        assert!(config.validate().is_ok());

        config.resolution = 0.0;
        assert!(config.validate().is_err());
        config.resolution = 2.0;

        config.pressure = -1.0;
        assert!(config.validate().is_err());
        config.pressure = 1e-2;

        config.wavelength_min = 2.0; // inverted window
        assert!(config.validate().is_err());
        config.wavelength_min = 1.1;

        config.cia_temperatures.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wavenumber_bounds() {
        let config = RetrievalConfig::new("/opac", "/cia", 2.0, 1e-2, (1.0, 2.0));
        let (lo, hi) = config.wavenumber_bounds();
        assert_eq!(lo, 5_000.0);
        assert_eq!(hi, 10_000.0);
    }

    #[test]
    fn test_builtin_registry() {
        let registry = MoleculeRegistry::builtin();
        assert_eq!(registry.len(), 4);

        let water = registry.get("1H2-16O__POKAZATEL_e2b").unwrap();
        assert_eq!(water.file_tag, "42000");
        assert_eq!(water.temperatures.len(), 29);
        assert_eq!(water.temperatures[0], 50);
        assert_eq!(*water.temperatures.last().unwrap(), 2_900);
        assert_eq!(water.max_wavenumber, 18_000.0);

        let ammonia = registry.get("14N-1H3__CoYuTe_e2b").unwrap();
        assert_eq!(ammonia.temperatures.len(), 22);
        assert_eq!(ammonia.max_wavenumber, 12_000.0);

        assert!(matches!(
            registry.get("He"),
            Err(DecodeError::UnknownMolecule(id)) if id == "He"
        ));
    }

    #[test]
    fn test_exomol_ladder_shape() {
        let ladder = exomol_temperature_ladder();
        assert_eq!(ladder.len(), 29);
        assert_eq!(&ladder[..3], &[50, 100, 150]);
        assert_eq!(ladder[13], 700);
        assert_eq!(ladder[21], 1_500);
        assert_eq!(*ladder.last().unwrap(), 2_900);
    }
}
