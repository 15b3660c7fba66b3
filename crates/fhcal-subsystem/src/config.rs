//! Subsystem configuration, validation, and error types.
//!
//! [`SubsystemConfig`] is read once at run start. [`validate()`](SubsystemConfig::validate)
//! checks every invariant; the conversions into
//! [`ProcessorConfig`] and [`CollectionLayout`] are what the step
//! processor actually consumes.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use fhcal_core::LayerId;
use fhcal_hits::{CollectionLayout, NO_SUPER_DETECTOR};
use fhcal_step::{LightModel, ProcessorConfig, SinkPolicy, POLYSTYRENE_BIRKS_CONSTANT};
use sha2::{Digest, Sha256};

/// Environment variable naming the calibration tree.
pub const CALIBRATION_ROOT_VAR: &str = "CALIBRATIONROOT";

/// Location of the tower map below the calibration root.
pub const TOWER_MAP: &str = "ForwardHcal/mapping/towerMap_FHCAL_v005.txt";

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building or validating a [`SubsystemConfig`].
///
/// All of them are fatal at run start.
#[derive(Debug)]
pub enum ConfigError {
    /// The calibration root is not set.
    MissingCalibrationRoot,
    /// The mapping file could not be read.
    Mapping {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The classifier knows no volumes.
    EmptyClassifier {
        /// Classifier name.
        name: String,
    },
    /// A geometry parameter is out of range.
    InvalidGeometry {
        /// Parameter name.
        parameter: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A material name is empty.
    MissingMaterial {
        /// Which material slot.
        slot: &'static str,
    },
    /// The Birks constant is NaN, infinite, or negative.
    InvalidBirksConstant {
        /// The invalid value.
        value: f64,
    },
    /// The subsystem name is empty.
    EmptyName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCalibrationRoot => {
                write!(f, "{CALIBRATION_ROOT_VAR} is not set; cannot locate the tower map")
            }
            Self::Mapping { path, source } => {
                write!(f, "mapping file {}: {source}", path.display())
            }
            Self::EmptyClassifier { name } => {
                write!(f, "classifier '{name}' knows no volumes")
            }
            Self::InvalidGeometry { parameter, value } => {
                write!(f, "geometry parameter {parameter} is out of range: {value}")
            }
            Self::MissingMaterial { slot } => write!(f, "{slot} material is not set"),
            Self::InvalidBirksConstant { value } => {
                write!(f, "birks_constant must be finite and non-negative, got {value}")
            }
            Self::EmptyName => write!(f, "subsystem name is empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mapping { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ── MappingFile ────────────────────────────────────────────────────

/// The tower map the geometry is built from.
///
/// Only its location and fingerprint matter here; parsing belongs to the
/// geometry builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingFile {
    path: PathBuf,
    fingerprint: Option<String>,
}

impl MappingFile {
    /// Use the file at `path`, unfingerprinted.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprint: None,
        }
    }

    /// Resolve the tower map below a calibration root.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCalibrationRoot`] if `root` is `None`.
    pub fn from_calibration_root(root: Option<&Path>) -> Result<Self, ConfigError> {
        let root = root.ok_or(ConfigError::MissingCalibrationRoot)?;
        Ok(Self::new(root.join(TOWER_MAP)))
    }

    /// Resolve the tower map below `$CALIBRATIONROOT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let root = std::env::var_os(CALIBRATION_ROOT_VAR).map(PathBuf::from);
        Self::from_calibration_root(root.as_deref())
    }

    /// Read the file and record its SHA-256 fingerprint.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Mapping`] if the file cannot be read.
    pub fn with_fingerprint(mut self) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(&self.path).map_err(|source| ConfigError::Mapping {
            path: self.path.clone(),
            source,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        self.fingerprint = Some(hex::encode(hasher.finalize()));
        Ok(self)
    }

    /// Path of the tower map.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the file contents, once computed.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

// ── GeometryParams ─────────────────────────────────────────────────

/// Placement, tower and envelope dimensions (cm, degrees) and materials.
///
/// The geometry itself is built elsewhere; these values are validated
/// and printed at run start.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryParams {
    /// Envelope centre (cm). Default: (0, 0, 400).
    pub place: [f64; 3],
    /// Envelope rotation about x, y, z (degrees). Default: 0.
    pub rotation: [f64; 3],
    /// Tower size in x (cm). Default: 10.
    pub tower_dx: f64,
    /// Tower size in y (cm). Default: 10.
    pub tower_dy: f64,
    /// Tower depth (cm). Default: 100.
    pub tower_dz: f64,
    /// Envelope depth (cm). Default: 100.
    pub dz: f64,
    /// Inner radius at the front face (cm). Default: 5.
    pub r_min1: f64,
    /// Outer radius at the front face (cm). Default: 262.
    pub r_max1: f64,
    /// Inner radius at the back face (cm). Default: 5.
    pub r_min2: f64,
    /// Outer radius at the back face (cm). Default: 336.9.
    pub r_max2: f64,
    /// Wavelength-shifter width (cm). Default: 0.3.
    pub wls_dw: f64,
    /// Support width (cm). Default: 0.2.
    pub support_dw: f64,
    /// Absorber plate thickness (cm). Default: 2.
    pub thickness_absorber: f64,
    /// Scintillator plate thickness (cm). Default: 0.231.
    pub thickness_scintillator: f64,
    /// Scintillator material. Default: `G4_POLYSTYRENE`.
    pub scintillator_material: String,
    /// Absorber material. Default: `G4_Fe`.
    pub absorber_material: String,
    /// Support material. Default: `G4_Fe`.
    pub support_material: String,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            place: [0.0, 0.0, 400.0],
            rotation: [0.0; 3],
            tower_dx: 10.0,
            tower_dy: 10.0,
            tower_dz: 100.0,
            dz: 100.0,
            r_min1: 5.0,
            r_max1: 262.0,
            r_min2: 5.0,
            r_max2: 336.9,
            wls_dw: 0.3,
            support_dw: 0.2,
            thickness_absorber: 2.0,
            thickness_scintillator: 0.231,
            scintillator_material: "G4_POLYSTYRENE".into(),
            absorber_material: "G4_Fe".into(),
            support_material: "G4_Fe".into(),
        }
    }
}

impl GeometryParams {
    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [
            ("place_x", self.place[0]),
            ("place_y", self.place[1]),
            ("place_z", self.place[2]),
            ("rot_x", self.rotation[0]),
            ("rot_y", self.rotation[1]),
            ("rot_z", self.rotation[2]),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidGeometry { parameter, value });
            }
        }
        for (parameter, value) in [
            ("tower_dx", self.tower_dx),
            ("tower_dy", self.tower_dy),
            ("tower_dz", self.tower_dz),
            ("dz", self.dz),
            ("rMax1", self.r_max1),
            ("rMax2", self.r_max2),
            ("thickness_absorber", self.thickness_absorber),
            ("thickness_scintillator", self.thickness_scintillator),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidGeometry { parameter, value });
            }
        }
        for (parameter, value) in [
            ("rMin1", self.r_min1),
            ("rMin2", self.r_min2),
            ("wls_dw", self.wls_dw),
            ("support_dw", self.support_dw),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidGeometry { parameter, value });
            }
        }
        if self.r_min1 >= self.r_max1 {
            return Err(ConfigError::InvalidGeometry {
                parameter: "rMin1",
                value: self.r_min1,
            });
        }
        if self.r_min2 >= self.r_max2 {
            return Err(ConfigError::InvalidGeometry {
                parameter: "rMin2",
                value: self.r_min2,
            });
        }
        for (slot, material) in [
            ("scintillator", &self.scintillator_material),
            ("absorber", &self.absorber_material),
            ("support", &self.support_material),
        ] {
            if material.trim().is_empty() {
                return Err(ConfigError::MissingMaterial { slot });
            }
        }
        Ok(())
    }
}

// ── SubsystemConfig ────────────────────────────────────────────────

/// Everything the FHCAL subsystem reads at run start.
#[derive(Clone, Debug, PartialEq)]
pub struct SubsystemConfig {
    /// Subsystem name. Default: `FHCAL`.
    pub name: String,
    /// Super-detector grouping; `None` or `"NONE"` means ungrouped.
    pub super_detector: Option<String>,
    /// Layer stamped into hits. Default: 0.
    pub layer: LayerId,
    /// Record hits at all. Default: true.
    pub active: bool,
    /// Record absorber hits. Default: false.
    pub absorber_active: bool,
    /// Record support hits. Default: false.
    pub support_active: bool,
    /// Keep truth for tracks depositing in passive volumes. Default: false.
    pub absorber_truth: bool,
    /// Every volume absorbs whatever reaches it. Default: false.
    pub blackhole: bool,
    /// Birks constant (mm/MeV) for the scintillator light yield; `None`
    /// records unquenched ionization energy. Default: 0.0794.
    pub birks_constant: Option<f64>,
    /// Geometry and materials.
    pub geometry: GeometryParams,
    /// Tower map.
    pub mapping: MappingFile,
}

impl SubsystemConfig {
    /// Default configuration reading the tower map from `mapping`.
    pub fn new(mapping: MappingFile) -> Self {
        Self {
            name: "FHCAL".into(),
            super_detector: None,
            layer: LayerId(0),
            active: true,
            absorber_active: false,
            support_active: false,
            absorber_truth: false,
            blackhole: false,
            birks_constant: Some(POLYSTYRENE_BIRKS_CONSTANT),
            geometry: GeometryParams::default(),
            mapping,
        }
    }

    /// Default configuration with the tower map below `$CALIBRATIONROOT`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCalibrationRoot`] if the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        MappingFile::from_env().map(Self::new)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if let Some(value) = self.birks_constant {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidBirksConstant { value });
            }
        }
        self.geometry.validate()
    }

    /// Collections this configuration produces.
    pub fn layout(&self) -> CollectionLayout {
        CollectionLayout::new(
            &self.name,
            self.super_detector.as_deref(),
            self.absorber_active,
            self.support_active,
        )
    }

    /// Settings for the step processor.
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            layer: self.layer,
            absorber_truth: self.absorber_truth,
            sinks: if self.blackhole {
                SinkPolicy::ALL
            } else {
                SinkPolicy::NONE
            },
            light_model: match self.birks_constant {
                Some(constant) => LightModel::Birks { constant },
                None => LightModel::Ionization,
            },
        }
    }
}

impl fmt::Display for SubsystemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.geometry;
        writeln!(f, "{} parameters:", self.name)?;
        writeln!(
            f,
            "  super_detector: {}",
            self.super_detector.as_deref().unwrap_or(NO_SUPER_DETECTOR)
        )?;
        writeln!(f, "  layer: {}", self.layer)?;
        writeln!(
            f,
            "  active: {}, absorberactive: {}, supportactive: {}, blackhole: {}",
            self.active, self.absorber_active, self.support_active, self.blackhole
        )?;
        writeln!(f, "  absorbertruth: {}", self.absorber_truth)?;
        match self.birks_constant {
            Some(kb) => writeln!(f, "  birks_constant: {kb} mm/MeV")?,
            None => writeln!(f, "  birks_constant: off")?,
        }
        writeln!(
            f,
            "  place: ({}, {}, {}) cm, rot: ({}, {}, {}) deg",
            g.place[0], g.place[1], g.place[2], g.rotation[0], g.rotation[1], g.rotation[2]
        )?;
        writeln!(
            f,
            "  tower: {} x {} x {} cm, dz: {} cm",
            g.tower_dx, g.tower_dy, g.tower_dz, g.dz
        )?;
        writeln!(
            f,
            "  rMin1: {}, rMax1: {}, rMin2: {}, rMax2: {} cm",
            g.r_min1, g.r_max1, g.r_min2, g.r_max2
        )?;
        writeln!(
            f,
            "  wls_dw: {}, support_dw: {} cm",
            g.wls_dw, g.support_dw
        )?;
        writeln!(
            f,
            "  thickness_absorber: {}, thickness_scintillator: {} cm",
            g.thickness_absorber, g.thickness_scintillator
        )?;
        writeln!(
            f,
            "  materials: scintillator {}, absorber {}, support {}",
            g.scintillator_material, g.absorber_material, g.support_material
        )?;
        write!(f, "  mapping: {}", self.mapping.path.display())?;
        if let Some(fingerprint) = self.mapping.fingerprint() {
            write!(f, " (sha256 {fingerprint})")?;
        }
        Ok(())
    }
}
