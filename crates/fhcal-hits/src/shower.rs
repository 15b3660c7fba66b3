//! Shower ancestry: which finalized hits each shower produced.

use fhcal_core::{Category, HitKey, ShowerId};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Reference to a finalized hit: its collection category and key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HitRef {
    /// Collection the hit was filed into.
    pub category: Category,
    /// Key within that collection.
    pub key: HitKey,
}

/// Links showers to the hits they deposited, in filing order.
///
/// Most showers touch only a handful of cells in one event, so the
/// per-shower list is a `SmallVec` that stays inline for up to four hits.
#[derive(Clone, Debug, Default)]
pub struct ShowerLedger {
    showers: IndexMap<ShowerId, SmallVec<[HitRef; 4]>>,
}

impl ShowerLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `shower` produced `hit`.
    pub fn record(&mut self, shower: ShowerId, hit: HitRef) {
        self.showers.entry(shower).or_default().push(hit);
    }

    /// Hits recorded for `shower`; empty if none.
    pub fn hits(&self, shower: ShowerId) -> &[HitRef] {
        self.showers.get(&shower).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Iterate over showers in first-hit order.
    pub fn iter(&self) -> impl Iterator<Item = (ShowerId, &[HitRef])> + '_ {
        self.showers.iter().map(|(s, v)| (*s, v.as_slice()))
    }

    /// Number of showers with at least one hit.
    pub fn len(&self) -> usize {
        self.showers.len()
    }

    /// True if no shower has been recorded.
    pub fn is_empty(&self) -> bool {
        self.showers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhcal_core::LayerId;

    #[test]
    fn records_hits_per_shower_in_order() {
        let mut ledger = ShowerLedger::new();
        let a = HitRef {
            category: Category::Active,
            key: HitKey::new(LayerId(0), 0),
        };
        let b = HitRef {
            category: Category::Absorber,
            key: HitKey::new(LayerId(0), 0),
        };
        ledger.record(ShowerId(2), a);
        ledger.record(ShowerId(1), b);
        ledger.record(ShowerId(2), b);

        assert_eq!(ledger.hits(ShowerId(2)), &[a, b]);
        assert_eq!(ledger.hits(ShowerId(1)), &[b]);
        assert!(ledger.hits(ShowerId(7)).is_empty());
        let order: Vec<ShowerId> = ledger.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec![ShowerId(2), ShowerId(1)]);
    }
}
