//! The [`HitRecord`] accumulator.

use fhcal_core::{CellIndex, Category, HitKey, LayerId, Point3, ShowerId, TrackId};

/// One continuous energy deposition by one track in one logical cell.
///
/// A record is opened by the step processor at the first step of a
/// (track, category, cell) context, extended by every following step of
/// that context, and moved into a [`HitCollection`](crate::HitCollection)
/// when the context closes. Fields are read-only from outside; only the
/// owner of an open record can fold further steps into it.
///
/// Energies are in GeV, positions in mm, times in ns.
#[derive(Clone, Debug, PartialEq)]
pub struct HitRecord {
    key: Option<HitKey>,
    category: Category,
    layer: LayerId,
    cell: CellIndex,
    track: TrackId,
    shower: Option<ShowerId>,
    entry: Point3,
    exit: Point3,
    entry_time: f64,
    exit_time: f64,
    edep: f64,
    eion: f64,
    light_yield: f64,
    steps: u32,
    geantino: bool,
}

impl HitRecord {
    /// Open a record at the given entry point with zero deposit.
    ///
    /// The exit point starts equal to the entry point.
    pub fn open(
        category: Category,
        layer: LayerId,
        cell: CellIndex,
        track: TrackId,
        shower: Option<ShowerId>,
        entry: Point3,
        entry_time: f64,
    ) -> Self {
        Self {
            key: None,
            category,
            layer,
            cell,
            track,
            shower,
            entry,
            exit: entry,
            entry_time,
            exit_time: entry_time,
            edep: 0.0,
            eion: 0.0,
            light_yield: 0.0,
            steps: 0,
            geantino: false,
        }
    }

    /// Fold one step into the record.
    ///
    /// Deposits are added to the running totals and the exit point moves
    /// to the step's end. Callers reject negative deposits before folding,
    /// so `edep` never decreases.
    pub fn fold(&mut self, edep: f64, eion: f64, light_yield: f64, exit: Point3, exit_time: f64) {
        debug_assert!(edep >= 0.0, "negative deposit folded into hit");
        self.edep += edep;
        self.eion += eion;
        self.light_yield += light_yield;
        self.exit = exit;
        self.exit_time = exit_time;
        self.steps += 1;
    }

    /// Mark this record as produced by a geantino.
    ///
    /// Geantino records carry no energy but are kept on close so geometry
    /// scans can see which cells were traversed.
    pub fn mark_geantino(&mut self) {
        self.geantino = true;
    }

    /// True if the record is worth filing: it carries energy, or it is a
    /// geantino record.
    pub fn has_content(&self) -> bool {
        self.edep > 0.0 || self.geantino
    }

    pub(crate) fn assign_key(&mut self, key: HitKey) {
        self.key = Some(key);
    }

    /// Key in the owning collection; `None` while the record is open.
    pub fn key(&self) -> Option<HitKey> {
        self.key
    }

    /// Bookkeeping category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Detector layer.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Logical cell.
    pub fn cell(&self) -> CellIndex {
        self.cell
    }

    /// Track that produced the deposit.
    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Shower the track belongs to, if the transport engine tracks showers.
    pub fn shower(&self) -> Option<ShowerId> {
        self.shower
    }

    /// Pre-step position of the first folded step.
    pub fn entry(&self) -> Point3 {
        self.entry
    }

    /// Post-step position of the most recent folded step.
    pub fn exit(&self) -> Point3 {
        self.exit
    }

    /// Global time at entry (ns).
    pub fn entry_time(&self) -> f64 {
        self.entry_time
    }

    /// Global time at exit (ns).
    pub fn exit_time(&self) -> f64 {
        self.exit_time
    }

    /// Total energy deposit (GeV).
    pub fn edep(&self) -> f64 {
        self.edep
    }

    /// Ionization energy deposit (GeV). Zero outside the active category.
    pub fn eion(&self) -> f64 {
        self.eion
    }

    /// Scintillation light yield in GeV-equivalent. Zero outside the
    /// active category.
    pub fn light_yield(&self) -> f64 {
        self.light_yield
    }

    /// Number of steps folded into the record.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// True if produced by a geantino.
    pub fn is_geantino(&self) -> bool {
        self.geantino
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> HitRecord {
        HitRecord::open(
            Category::Active,
            LayerId(0),
            CellIndex::tower(4, 5),
            TrackId(1),
            Some(ShowerId(1)),
            Point3::new(0.0, 0.0, 4000.0),
            10.0,
        )
    }

    #[test]
    fn opens_empty_with_exit_at_entry() {
        let hit = open();
        assert_eq!(hit.edep(), 0.0);
        assert_eq!(hit.exit(), hit.entry());
        assert_eq!(hit.exit_time(), 10.0);
        assert_eq!(hit.steps(), 0);
        assert!(hit.key().is_none());
        assert!(!hit.has_content());
    }

    #[test]
    fn fold_accumulates_and_moves_exit() {
        let mut hit = open();
        hit.fold(0.25, 0.2, 0.15, Point3::new(0.0, 0.0, 4001.0), 10.1);
        hit.fold(0.5, 0.4, 0.3, Point3::new(0.0, 0.0, 4002.5), 10.3);
        assert_eq!(hit.edep(), 0.75);
        assert!((hit.eion() - 0.6).abs() < 1e-12);
        assert!((hit.light_yield() - 0.45).abs() < 1e-12);
        assert_eq!(hit.exit(), Point3::new(0.0, 0.0, 4002.5));
        assert_eq!(hit.exit_time(), 10.3);
        assert_eq!(hit.entry(), Point3::new(0.0, 0.0, 4000.0));
        assert_eq!(hit.steps(), 2);
        assert!(hit.has_content());
    }

    #[test]
    fn geantino_record_has_content_without_energy() {
        let mut hit = open();
        hit.mark_geantino();
        hit.fold(0.0, 0.0, 0.0, Point3::new(1.0, 0.0, 4000.0), 10.0);
        assert!(hit.has_content());
        assert!(hit.is_geantino());
    }
}
