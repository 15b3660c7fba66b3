//! Naming and enablement of the per-category hit collections.

use fhcal_core::Category;

/// Super-detector value meaning "not grouped under a super-detector".
pub const NO_SUPER_DETECTOR: &str = "NONE";

/// Which collections an event produces and what they are called.
///
/// Collections are named `G4HIT_<suffix>`, `G4HIT_ABSORBER_<suffix>` and
/// `G4HIT_SUPPORT_<suffix>`. The suffix is the super-detector name when
/// one is configured, otherwise the subsystem name. The active
/// collection always exists; absorber and support collections exist only
/// when their category is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionLayout {
    active: String,
    absorber: Option<String>,
    support: Option<String>,
}

impl CollectionLayout {
    /// Derive the layout from the subsystem name and flags.
    pub fn new(
        name: &str,
        super_detector: Option<&str>,
        absorber_enabled: bool,
        support_enabled: bool,
    ) -> Self {
        let suffix = match super_detector {
            Some(s) if s != NO_SUPER_DETECTOR => s,
            _ => name,
        };
        Self {
            active: format!("G4HIT_{suffix}"),
            absorber: absorber_enabled.then(|| format!("G4HIT_ABSORBER_{suffix}")),
            support: support_enabled.then(|| format!("G4HIT_SUPPORT_{suffix}")),
        }
    }

    /// Collection name for `category`, or `None` if the category is off.
    pub fn name(&self, category: Category) -> Option<&str> {
        match category {
            Category::Active => Some(&self.active),
            Category::Absorber => self.absorber.as_deref(),
            Category::Support => self.support.as_deref(),
        }
    }

    /// True if hits of `category` are recorded.
    pub fn is_enabled(&self, category: Category) -> bool {
        self.name(category).is_some()
    }

    /// Enabled `(category, name)` pairs in collection order.
    pub fn enabled(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
        Category::ALL
            .into_iter()
            .filter_map(|c| self.name(c).map(|n| (c, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_defaults_to_subsystem_name() {
        let layout = CollectionLayout::new("FHCAL", None, true, false);
        assert_eq!(layout.name(Category::Active), Some("G4HIT_FHCAL"));
        assert_eq!(layout.name(Category::Absorber), Some("G4HIT_ABSORBER_FHCAL"));
        assert_eq!(layout.name(Category::Support), None);
    }

    #[test]
    fn none_super_detector_is_ignored() {
        let layout = CollectionLayout::new("FHCAL", Some("NONE"), false, false);
        assert_eq!(layout.name(Category::Active), Some("G4HIT_FHCAL"));
    }

    #[test]
    fn super_detector_overrides_suffix() {
        let layout = CollectionLayout::new("FHCAL_0", Some("FHCAL"), true, true);
        let names: Vec<&str> = layout.enabled().map(|(_, n)| n).collect();
        assert_eq!(
            names,
            vec!["G4HIT_FHCAL", "G4HIT_ABSORBER_FHCAL", "G4HIT_SUPPORT_FHCAL"]
        );
    }
}
