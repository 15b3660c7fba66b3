//! Volume classification: which bookkeeping category a geometry volume
//! belongs to, and which logical cell it reads out into.
//!
//! The geometry collaborator implements [`VolumeClassifier`]; the step
//! processor calls it once per step, so implementations must be pure and
//! cheap. [`VolumeTable`] is the in-memory O(1) implementation used when
//! the volume list is known up front.

use std::fmt;

use indexmap::IndexMap;

use crate::error::ClassifyError;
use crate::id::{CellIndex, VolumeId};

/// Bookkeeping category of a sensitive volume.
///
/// Each category feeds its own hit collection; deposits from different
/// categories are never merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Scintillator: the light-producing, read-out medium.
    Active,
    /// Passive absorber plates.
    Absorber,
    /// Mechanical support structure.
    Support,
}

impl Category {
    /// All categories, in collection order.
    pub const ALL: [Category; 3] = [Category::Active, Category::Absorber, Category::Support];

    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Absorber => "absorber",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Not part of the calorimeter's bookkeeping.
    Inert,
    /// Scintillator volume reading out into the given cell.
    Active(CellIndex),
    /// Absorber volume belonging to the given cell.
    Absorber(CellIndex),
    /// Support volume belonging to the given cell.
    Support(CellIndex),
}

impl Classification {
    /// The category, or `None` for inert volumes.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Inert => None,
            Self::Active(_) => Some(Category::Active),
            Self::Absorber(_) => Some(Category::Absorber),
            Self::Support(_) => Some(Category::Support),
        }
    }

    /// The logical cell, or `None` for inert volumes.
    pub fn cell(&self) -> Option<CellIndex> {
        match *self {
            Self::Inert => None,
            Self::Active(c) | Self::Absorber(c) | Self::Support(c) => Some(c),
        }
    }

    /// Category and cell together, or `None` for inert volumes.
    pub fn sensitive(&self) -> Option<(Category, CellIndex)> {
        Some((self.category()?, self.cell()?))
    }

    /// Build a classification from a category and cell.
    pub fn of(category: Category, cell: CellIndex) -> Self {
        match category {
            Category::Active => Self::Active(cell),
            Category::Absorber => Self::Absorber(cell),
            Category::Support => Self::Support(cell),
        }
    }
}

/// Maps opaque volume handles to a [`Classification`].
///
/// # Contract
///
/// - `classify()` MUST be deterministic and side-effect free.
/// - A volume the mapping does not know is an error, not `Inert`: an
///   unknown volume means the geometry and the mapping have diverged.
///
/// # Object safety
///
/// This trait is object-safe; the subsystem shares one classifier across
/// event workers as `Arc<dyn VolumeClassifier>`.
pub trait VolumeClassifier: Send + Sync {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Classify a volume.
    fn classify(&self, volume: VolumeId) -> Result<Classification, ClassifyError>;

    /// Number of volumes the classifier knows about.
    ///
    /// Run start rejects a classifier that knows none.
    fn volume_count(&self) -> usize;
}

/// Hash-table backed classifier.
///
/// Built once with [`VolumeTable::builder`] and immutable afterwards.
#[derive(Clone, Debug)]
pub struct VolumeTable {
    name: String,
    entries: IndexMap<VolumeId, Classification>,
}

impl VolumeTable {
    /// Start building a table with the given name.
    pub fn builder(name: impl Into<String>) -> VolumeTableBuilder {
        VolumeTableBuilder {
            name: name.into(),
            entries: IndexMap::new(),
            duplicate: None,
        }
    }

    /// Number of volumes registered under `category`.
    pub fn count(&self, category: Category) -> usize {
        self.entries
            .values()
            .filter(|c| c.category() == Some(category))
            .count()
    }

    /// Iterate over all registrations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, Classification)> + '_ {
        self.entries.iter().map(|(v, c)| (*v, *c))
    }
}

impl VolumeClassifier for VolumeTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, volume: VolumeId) -> Result<Classification, ClassifyError> {
        self.entries
            .get(&volume)
            .copied()
            .ok_or(ClassifyError::UnknownVolume { volume })
    }

    fn volume_count(&self) -> usize {
        self.entries.len()
    }
}

/// Builder for [`VolumeTable`].
///
/// Registration methods chain; the first duplicate registration is
/// remembered and reported by [`build()`](VolumeTableBuilder::build).
#[derive(Debug)]
pub struct VolumeTableBuilder {
    name: String,
    entries: IndexMap<VolumeId, Classification>,
    duplicate: Option<VolumeId>,
}

impl VolumeTableBuilder {
    /// Register a volume with an explicit classification.
    pub fn insert(mut self, volume: VolumeId, classification: Classification) -> Self {
        if self.entries.insert(volume, classification).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(volume);
        }
        self
    }

    /// Register a scintillator volume.
    pub fn active(self, volume: VolumeId, cell: CellIndex) -> Self {
        self.insert(volume, Classification::Active(cell))
    }

    /// Register an absorber volume.
    pub fn absorber(self, volume: VolumeId, cell: CellIndex) -> Self {
        self.insert(volume, Classification::Absorber(cell))
    }

    /// Register a support volume.
    pub fn support(self, volume: VolumeId, cell: CellIndex) -> Self {
        self.insert(volume, Classification::Support(cell))
    }

    /// Register a volume that is known but not part of the bookkeeping
    /// (envelopes, air gaps).
    pub fn inert(self, volume: VolumeId) -> Self {
        self.insert(volume, Classification::Inert)
    }

    /// Finish the table.
    pub fn build(self) -> Result<VolumeTable, ClassifyError> {
        if let Some(volume) = self.duplicate {
            return Err(ClassifyError::DuplicateVolume { volume });
        }
        Ok(VolumeTable {
            name: self.name,
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VolumeTable {
        VolumeTable::builder("fhcal")
            .inert(VolumeId(1))
            .active(VolumeId(10), CellIndex::tower(1, 2))
            .absorber(VolumeId(11), CellIndex::tower(1, 2))
            .support(VolumeId(12), CellIndex::tower(1, 2))
            .build()
            .unwrap()
    }

    #[test]
    fn classifies_registered_volumes() {
        let t = table();
        assert_eq!(t.classify(VolumeId(1)).unwrap(), Classification::Inert);
        assert_eq!(
            t.classify(VolumeId(10)).unwrap(),
            Classification::Active(CellIndex::tower(1, 2))
        );
        assert_eq!(
            t.classify(VolumeId(11)).unwrap().category(),
            Some(Category::Absorber)
        );
        assert_eq!(t.volume_count(), 4);
        assert_eq!(t.count(Category::Support), 1);
    }

    #[test]
    fn unknown_volume_is_an_error_not_inert() {
        let err = table().classify(VolumeId(99)).unwrap_err();
        assert_eq!(err, ClassifyError::UnknownVolume { volume: VolumeId(99) });
    }

    #[test]
    fn duplicate_registration_rejected() {
        let err = VolumeTable::builder("dup")
            .active(VolumeId(5), CellIndex::tower(0, 0))
            .absorber(VolumeId(5), CellIndex::tower(0, 0))
            .build()
            .unwrap_err();
        assert_eq!(err, ClassifyError::DuplicateVolume { volume: VolumeId(5) });
    }

    #[test]
    fn inert_has_no_cell() {
        assert_eq!(Classification::Inert.sensitive(), None);
        let cell = CellIndex::tower(3, 4);
        assert_eq!(
            Classification::of(Category::Support, cell).sensitive(),
            Some((Category::Support, cell))
        );
    }
}
