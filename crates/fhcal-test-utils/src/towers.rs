//! A tower-grid volume table.
//!
//! Every tower `(j, k)` owns three volumes (scintillator, absorber,
//! support); one inert envelope surrounds them all.

use fhcal_core::{CellIndex, VolumeId, VolumeTable};

/// Name of the table built by [`table`].
pub const TABLE_NAME: &str = "fhcal-towers";

/// The inert envelope volume.
pub const ENVELOPE: VolumeId = VolumeId(1);

/// A volume no table knows about.
pub const UNMAPPED: VolumeId = VolumeId(u64::MAX);

fn volume(cell: CellIndex, code: u64) -> VolumeId {
    VolumeId(1000 + u64::from(cell.copy_number()) * 4 + code)
}

/// Scintillator volume of `cell`.
pub fn active(cell: CellIndex) -> VolumeId {
    volume(cell, 1)
}

/// Absorber volume of `cell`.
pub fn absorber(cell: CellIndex) -> VolumeId {
    volume(cell, 2)
}

/// Support volume of `cell`.
pub fn support(cell: CellIndex) -> VolumeId {
    volume(cell, 3)
}

/// Table with `columns × rows` towers plus the envelope.
pub fn table(columns: u16, rows: u16) -> VolumeTable {
    let mut builder = VolumeTable::builder(TABLE_NAME).inert(ENVELOPE);
    for j in 0..columns {
        for k in 0..rows {
            let cell = CellIndex::tower(j, k);
            builder = builder
                .active(active(cell), cell)
                .absorber(absorber(cell), cell)
                .support(support(cell), cell);
        }
    }
    builder
        .build()
        .expect("tower volumes are distinct by construction")
}
