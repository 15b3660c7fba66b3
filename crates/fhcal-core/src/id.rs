//! Strongly-typed identifiers for tracks, showers, volumes, cells and hits.

use std::fmt;

/// Identifies a transport track within one event.
///
/// Track ids are assigned by the transport engine and are unique within
/// an event. Secondaries carry their own id and point at their parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub i32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TrackId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Identifies a shower (the lineage of a primary and its secondaries).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShowerId(pub i32);

impl fmt::Display for ShowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ShowerId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Opaque handle of a placed geometry volume.
///
/// The step processor never interprets the value; it only hands it to a
/// [`VolumeClassifier`](crate::VolumeClassifier).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub u64);

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VolumeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Detector layer a hit is filed under.
///
/// The layer occupies the upper 32 bits of every [`HitKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LayerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an event processed by the subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EventId(pub u64);

impl EventId {
    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Logical calorimeter cell: tower column `j`, tower row `k`, and an
/// optional longitudinal segment `l`.
///
/// The forward calorimeter is read out per tower, so `l` is `None` for
/// towers decoded from placement copy numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    /// Tower column.
    pub j: u16,
    /// Tower row.
    pub k: u16,
    /// Longitudinal segment, if the readout is segmented.
    pub l: Option<u16>,
}

impl CellIndex {
    /// A tower cell without longitudinal segmentation.
    pub const fn tower(j: u16, k: u16) -> Self {
        Self { j, k, l: None }
    }

    /// Decode a tower placement copy number.
    ///
    /// Towers are placed with `copy = j << 16 | k`.
    pub const fn from_copy_number(copy: u32) -> Self {
        Self {
            j: (copy >> 16) as u16,
            k: (copy & 0xFFFF) as u16,
            l: None,
        }
    }

    /// Encode back into a placement copy number. Drops `l`.
    pub const fn copy_number(&self) -> u32 {
        ((self.j as u32) << 16) | self.k as u32
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.l {
            Some(l) => write!(f, "({}, {}, {})", self.j, self.k, l),
            None => write!(f, "({}, {})", self.j, self.k),
        }
    }
}

/// Key of a finalized hit inside a hit collection.
///
/// Encodes the layer in the upper 32 bits and a per-collection sequence
/// number in the lower 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitKey(pub u64);

impl HitKey {
    /// Build a key from a layer and sequence number.
    pub const fn new(layer: LayerId, sequence: u32) -> Self {
        Self(((layer.0 as u64) << 32) | sequence as u64)
    }

    /// The layer encoded in this key.
    pub const fn layer(&self) -> LayerId {
        LayerId((self.0 >> 32) as u32)
    }

    /// The sequence number encoded in this key.
    pub const fn sequence(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

impl fmt::Display for HitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer(), self.sequence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn copy_number_decodes_column_and_row() {
        let cell = CellIndex::from_copy_number((12 << 16) | 34);
        assert_eq!(cell, CellIndex::tower(12, 34));
        assert_eq!(cell.to_string(), "(12, 34)");
    }

    #[test]
    fn hit_key_places_layer_in_upper_bits() {
        let key = HitKey::new(LayerId(3), 7);
        assert_eq!(key.0, (3u64 << 32) | 7);
        assert_eq!(key.layer(), LayerId(3));
        assert_eq!(key.sequence(), 7);
        assert_eq!(key.to_string(), "3:7");
    }

    #[test]
    fn hit_keys_order_by_sequence_within_a_layer() {
        assert!(HitKey::new(LayerId(1), 1) < HitKey::new(LayerId(1), 2));
        assert!(HitKey::new(LayerId(1), u32::MAX) < HitKey::new(LayerId(2), 0));
    }

    proptest! {
        #[test]
        fn decoded_cells_keep_copy_number_bits(copy in any::<u32>()) {
            let cell = CellIndex::from_copy_number(copy);
            prop_assert_eq!(u32::from(cell.j), copy >> 16);
            prop_assert_eq!(u32::from(cell.k), copy & 0xFFFF);
            prop_assert!(cell.l.is_none());
        }
    }
}
