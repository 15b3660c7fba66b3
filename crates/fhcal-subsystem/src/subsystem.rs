//! The FHCAL subsystem: run-start wiring of configuration, classifier and
//! stepping action.

use std::fmt;
use std::sync::Arc;

use fhcal_core::VolumeClassifier;
use fhcal_hits::CollectionLayout;
use fhcal_step::StepProcessor;
use tracing::info;

use crate::config::{ConfigError, SubsystemConfig};

/// A configured forward hadronic calorimeter.
///
/// Built from a validated [`SubsystemConfig`] whose tower map exists and
/// has been fingerprinted. At run start
/// [`init_run()`](ForwardHcalSubsystem::init_run) receives the geometry's
/// classifier and hands out the stepping action; further processors for
/// concurrent event workers come from
/// [`processor()`](ForwardHcalSubsystem::processor).
pub struct ForwardHcalSubsystem {
    config: SubsystemConfig,
    layout: CollectionLayout,
    classifier: Option<Arc<dyn VolumeClassifier>>,
}

impl ForwardHcalSubsystem {
    /// Validate `config`, fingerprint its tower map and derive the
    /// collection layout.
    ///
    /// # Errors
    ///
    /// The first invalid setting, or [`ConfigError::Mapping`] if the tower
    /// map cannot be read.
    pub fn new(mut config: SubsystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        config.mapping = config.mapping.with_fingerprint()?;
        let layout = config.layout();
        Ok(Self {
            config,
            layout,
            classifier: None,
        })
    }

    /// Wire the classifier and create the stepping action.
    ///
    /// Returns `None` when the subsystem is not active: no steps are
    /// recorded and no collections are produced.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyClassifier`] if the classifier knows no volumes.
    pub fn init_run(
        &mut self,
        classifier: Arc<dyn VolumeClassifier>,
    ) -> Result<Option<StepProcessor>, ConfigError> {
        if classifier.volume_count() == 0 {
            return Err(ConfigError::EmptyClassifier {
                name: classifier.name().to_owned(),
            });
        }
        info!(
            subsystem = %self.config.name,
            classifier = classifier.name(),
            volumes = classifier.volume_count(),
            mapping = %self.config.mapping.path().display(),
            fingerprint = self.config.mapping.fingerprint().unwrap_or_default(),
            active = self.config.active,
            absorber_active = self.config.absorber_active,
            support_active = self.config.support_active,
            blackhole = self.config.blackhole,
            "run initialised"
        );
        if self.config.active {
            for (category, name) in self.layout.enabled() {
                info!(
                    subsystem = %self.config.name,
                    %category,
                    collection = name,
                    "hit collection created"
                );
            }
        }
        self.classifier = Some(classifier);
        Ok(self.processor())
    }

    /// A fresh stepping action, or `None` before `init_run()` or when the
    /// subsystem is not active.
    pub fn processor(&self) -> Option<StepProcessor> {
        if !self.config.active {
            return None;
        }
        let classifier = self.classifier.clone()?;
        Some(StepProcessor::new(
            self.config.name.clone(),
            classifier,
            self.layout.clone(),
            self.config.processor_config(),
        ))
    }

    /// True if steps are recorded.
    pub fn is_active(&self) -> bool {
        self.config.active
    }

    /// True once `init_run()` succeeded.
    pub fn is_initialised(&self) -> bool {
        self.classifier.is_some()
    }

    /// The configuration this subsystem was built from.
    pub fn config(&self) -> &SubsystemConfig {
        &self.config
    }

    /// Collections the subsystem produces when active.
    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }
}

impl fmt::Debug for ForwardHcalSubsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardHcalSubsystem")
            .field("name", &self.config.name)
            .field("active", &self.config.active)
            .field("layout", &self.layout)
            .field("classifier", &self.classifier.as_ref().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingFile;
    use fhcal_core::{Category, CellIndex, VolumeId, VolumeTable};
    use fhcal_step::{SinkPolicy, Steppable};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tower_map() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Tower 0 0 0 0.0 0.0 400.0 10.0 10.0 100.0").unwrap();
        file
    }

    fn config(map: &NamedTempFile) -> SubsystemConfig {
        SubsystemConfig::new(MappingFile::new(map.path()))
    }

    fn table() -> Arc<dyn VolumeClassifier> {
        let table = VolumeTable::builder("towers")
            .active(VolumeId(1), CellIndex::tower(0, 0))
            .build()
            .unwrap();
        Arc::new(table)
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let map = tower_map();
        let mut c = config(&map);
        c.name.clear();
        assert!(matches!(
            ForwardHcalSubsystem::new(c),
            Err(ConfigError::EmptyName)
        ));
    }

    #[test]
    fn missing_tower_map_is_rejected_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("towerMap_FHCAL_v005.txt");
        let err = ForwardHcalSubsystem::new(SubsystemConfig::new(MappingFile::new(&missing)))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Mapping { ref path, .. } if *path == missing));
    }

    #[test]
    fn construction_fingerprints_the_tower_map() {
        let map = tower_map();
        let subsystem = ForwardHcalSubsystem::new(config(&map)).unwrap();
        let fingerprint = subsystem.config().mapping.fingerprint().unwrap();
        assert_eq!(fingerprint.len(), 64);
    }

    #[test]
    fn empty_classifier_is_rejected() {
        let map = tower_map();
        let mut subsystem = ForwardHcalSubsystem::new(config(&map)).unwrap();
        let empty = VolumeTable::builder("empty").build().unwrap();
        let err = subsystem.init_run(Arc::new(empty)).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyClassifier { ref name } if name == "empty"));
        assert!(!subsystem.is_initialised());
    }

    #[test]
    fn init_run_creates_the_stepping_action() {
        let map = tower_map();
        let mut c = config(&map);
        c.absorber_active = true;
        c.blackhole = true;
        let mut subsystem = ForwardHcalSubsystem::new(c).unwrap();
        assert!(subsystem.processor().is_none());

        let processor = subsystem.init_run(table()).unwrap().unwrap();
        assert_eq!(processor.name(), "FHCAL");
        assert!(processor.layout().is_enabled(Category::Absorber));
        assert!(!processor.layout().is_enabled(Category::Support));
        assert_eq!(processor.config().sinks, SinkPolicy::ALL);
        assert!(subsystem.processor().is_some());
    }

    #[test]
    fn inactive_subsystem_has_no_stepping_action() {
        let map = tower_map();
        let mut c = config(&map);
        c.active = false;
        let mut subsystem = ForwardHcalSubsystem::new(c).unwrap();
        assert!(subsystem.init_run(table()).unwrap().is_none());
        assert!(subsystem.is_initialised());
        assert!(!subsystem.is_active());
    }
}
