//! Insertion-ordered, keyed container of finalized hit records.

use fhcal_core::{Category, CollectionFull, HitKey, LayerId, TrackId};
use indexmap::IndexMap;

use crate::hit::HitRecord;

/// Finalized hits of one category for one event.
///
/// Keys are assigned on insertion from a monotonically increasing
/// sequence combined with the record's layer (see [`HitKey`]), so they
/// are unique for the collection's lifetime and iteration order equals
/// insertion order. Once all `u32` sequence numbers are used, further
/// inserts fail. There is no removal; the orchestrator replaces the
/// whole collection between events.
#[derive(Clone, Debug)]
pub struct HitCollection {
    name: String,
    category: Category,
    next_sequence: u64,
    hits: IndexMap<HitKey, HitRecord>,
}

impl HitCollection {
    /// Create an empty collection.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            next_sequence: 0,
            hits: IndexMap::new(),
        }
    }

    /// Insert a finalized record, returning its key.
    ///
    /// The key is also stamped into the stored record.
    ///
    /// # Errors
    ///
    /// [`CollectionFull`] if the sequence numbers are exhausted; the
    /// record is not stored.
    pub fn insert(&mut self, mut hit: HitRecord) -> Result<HitKey, CollectionFull> {
        debug_assert_eq!(
            hit.category(),
            self.category,
            "hit filed into the wrong category collection"
        );
        let sequence = u32::try_from(self.next_sequence).map_err(|_| CollectionFull {
            collection: self.name.clone(),
        })?;
        self.next_sequence += 1;
        let key = HitKey::new(hit.layer(), sequence);
        hit.assign_key(key);
        self.hits.insert(key, hit);
        Ok(key)
    }

    /// Look up a record by key.
    pub fn get(&self, key: HitKey) -> Option<&HitRecord> {
        self.hits.get(&key)
    }

    /// Iterate over `(key, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (HitKey, &HitRecord)> + '_ {
        self.hits.iter().map(|(k, h)| (*k, h))
    }

    /// Iterate over the records produced by one track.
    pub fn hits_for_track(&self, track: TrackId) -> impl Iterator<Item = &HitRecord> + '_ {
        self.hits.values().filter(move |h| h.track() == track)
    }

    /// Distinct layers present, ascending.
    pub fn layers(&self) -> Vec<LayerId> {
        let mut layers: Vec<LayerId> = self.hits.keys().map(HitKey::layer).collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }

    /// Sum of `edep` over all records (GeV).
    pub fn total_edep(&self) -> f64 {
        self.hits.values().map(HitRecord::edep).sum()
    }

    /// Collection name, e.g. `G4HIT_FHCAL`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category of every record in this collection.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True if no record has been inserted.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Consume the collection, yielding records in insertion order.
    pub fn into_records(self) -> impl Iterator<Item = HitRecord> {
        self.hits.into_values()
    }
}

impl<'a> IntoIterator for &'a HitCollection {
    type Item = (&'a HitKey, &'a HitRecord);
    type IntoIter = indexmap::map::Iter<'a, HitKey, HitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
