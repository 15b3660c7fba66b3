//! The per-event set of hit collections.

use fhcal_core::{Category, CollectionFull, EventId};

use crate::collection::HitCollection;
use crate::hit::HitRecord;
use crate::layout::CollectionLayout;
use crate::shower::{HitRef, ShowerLedger};

/// All hit output of one event.
///
/// Holds one [`HitCollection`] per enabled category plus the shower
/// ledger. Records enter only through [`file()`](EventHits::file), which
/// takes ownership of a finalized record; consumers get shared access.
#[derive(Clone, Debug)]
pub struct EventHits {
    event: EventId,
    active: HitCollection,
    absorber: Option<HitCollection>,
    support: Option<HitCollection>,
    showers: ShowerLedger,
}

impl EventHits {
    /// Create empty collections for `event` following `layout`.
    pub fn new(event: EventId, layout: &CollectionLayout) -> Self {
        let make = |category| {
            layout
                .name(category)
                .map(|name| HitCollection::new(name, category))
        };
        Self {
            event,
            active: HitCollection::new(
                layout.name(Category::Active).unwrap_or_default(),
                Category::Active,
            ),
            absorber: make(Category::Absorber),
            support: make(Category::Support),
            showers: ShowerLedger::new(),
        }
    }

    /// File a finalized record into the collection of its category.
    ///
    /// Returns the reference under which it was filed, or `None` if the
    /// category has no collection in this event (the record is dropped).
    ///
    /// # Errors
    ///
    /// [`CollectionFull`] if the category's collection cannot key
    /// another record.
    pub fn file(&mut self, hit: HitRecord) -> Result<Option<HitRef>, CollectionFull> {
        let category = hit.category();
        let shower = hit.shower();
        let collection = match category {
            Category::Active => Some(&mut self.active),
            Category::Absorber => self.absorber.as_mut(),
            Category::Support => self.support.as_mut(),
        };
        let Some(collection) = collection else {
            return Ok(None);
        };
        let key = collection.insert(hit)?;
        let hit_ref = HitRef { category, key };
        if let Some(shower) = shower {
            self.showers.record(shower, hit_ref);
        }
        Ok(Some(hit_ref))
    }

    /// The event these hits belong to.
    pub fn event(&self) -> EventId {
        self.event
    }

    /// Collection for `category`, if enabled.
    pub fn collection(&self, category: Category) -> Option<&HitCollection> {
        match category {
            Category::Active => Some(&self.active),
            Category::Absorber => self.absorber.as_ref(),
            Category::Support => self.support.as_ref(),
        }
    }

    /// The active (scintillator) collection.
    pub fn active(&self) -> &HitCollection {
        &self.active
    }

    /// The absorber collection, if absorber hits are recorded.
    pub fn absorber(&self) -> Option<&HitCollection> {
        self.absorber.as_ref()
    }

    /// The support collection, if support hits are recorded.
    pub fn support(&self) -> Option<&HitCollection> {
        self.support.as_ref()
    }

    /// Resolve a [`HitRef`] to its record.
    pub fn resolve(&self, hit: HitRef) -> Option<&HitRecord> {
        self.collection(hit.category)?.get(hit.key)
    }

    /// Shower-to-hit links.
    pub fn showers(&self) -> &ShowerLedger {
        &self.showers
    }

    /// Total number of records across all collections.
    pub fn len(&self) -> usize {
        Category::ALL
            .iter()
            .filter_map(|c| self.collection(*c))
            .map(HitCollection::len)
            .sum()
    }

    /// True if no collection holds a record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
