//! OCR versus TOS field comparison for the active transaction.

use serde::Serialize;
use shared::domain::{LaneId, SessionId, TransactionId, TransactionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciledField {
    ContainerNo,
    IsoCode,
    TruckPlate,
    TrailerPlate,
    SealNo,
}

impl ReconciledField {
    pub fn label(self) -> &'static str {
        match self {
            ReconciledField::ContainerNo => "Container No",
            ReconciledField::IsoCode => "ISO Code",
            ReconciledField::TruckPlate => "Truck Plate",
            ReconciledField::TrailerPlate => "Trailer Plate",
            ReconciledField::SealNo => "Seal No",
        }
    }

    fn values(self, record: &TransactionRecord) -> (&str, &str) {
        let ocr = &record.ocr_data;
        let system = &record.system_data;
        match self {
            ReconciledField::ContainerNo => (&ocr.container_no, &system.container_no),
            ReconciledField::IsoCode => (&ocr.iso_code, &system.iso_code),
            ReconciledField::TruckPlate => (&ocr.truck_plate, &system.truck_plate),
            ReconciledField::TrailerPlate => (&ocr.trailer_plate, &system.trailer_plate),
            ReconciledField::SealNo => (&ocr.seal_no, &system.seal_no),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldVerdict {
    Match,
    Mismatch,
}

/// Exact string comparison; no trimming or case folding.
pub fn compare(ocr: &str, system: &str) -> FieldVerdict {
    if ocr == system {
        FieldVerdict::Match
    } else {
        FieldVerdict::Mismatch
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldComparison {
    pub field: ReconciledField,
    pub ocr: String,
    pub system: String,
    pub verdict: FieldVerdict,
    /// The TOS has no value for this field; views print "Not found".
    pub system_missing: bool,
}

impl FieldComparison {
    pub fn of(field: ReconciledField, record: &TransactionRecord) -> Self {
        let (ocr, system) = field.values(record);
        Self {
            field,
            ocr: ocr.to_string(),
            system: system.to_string(),
            verdict: compare(ocr, system),
            system_missing: system.is_empty(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.verdict == FieldVerdict::Match
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconciliationOptions {
    pub include_seal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveReconciliation {
    pub transaction_id: TransactionId,
    pub session_id: SessionId,
    pub lane_id: LaneId,
    pub timestamp: String,
    pub booking_no: String,
    pub vgm: String,
    pub notes: String,
    pub rows: Vec<FieldComparison>,
}

impl ActiveReconciliation {
    pub fn mismatches(&self) -> impl Iterator<Item = &FieldComparison> {
        self.rows.iter().filter(|row| !row.is_match())
    }

    pub fn all_match(&self) -> bool {
        self.rows.iter().all(FieldComparison::is_match)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReconciliationView {
    /// Nothing to compare: no lane selected, or the lane is idle.
    Placeholder { lane_id: Option<LaneId> },
    Active(ActiveReconciliation),
}

impl ReconciliationView {
    pub fn can_open_correction(&self) -> bool {
        matches!(self, ReconciliationView::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveReconciliation> {
        match self {
            ReconciliationView::Active(active) => Some(active),
            ReconciliationView::Placeholder { .. } => None,
        }
    }
}

pub fn reconcile(
    lane_id: Option<&LaneId>,
    record: Option<&TransactionRecord>,
    options: ReconciliationOptions,
) -> ReconciliationView {
    let Some(record) = record.filter(|record| record.has_transaction()) else {
        return ReconciliationView::Placeholder {
            lane_id: lane_id.cloned(),
        };
    };

    let mut fields = vec![
        ReconciledField::ContainerNo,
        ReconciledField::IsoCode,
        ReconciledField::TruckPlate,
        ReconciledField::TrailerPlate,
    ];
    if options.include_seal {
        fields.push(ReconciledField::SealNo);
    }

    ReconciliationView::Active(ActiveReconciliation {
        transaction_id: record.id.clone(),
        session_id: record.session_id.clone(),
        lane_id: record.lane_id.clone(),
        timestamp: record.timestamp.clone(),
        booking_no: record.system_data.booking_no.clone(),
        vgm: record.system_data.vgm.clone(),
        notes: record.notes.clone(),
        rows: fields
            .into_iter()
            .map(|field| FieldComparison::of(field, record))
            .collect(),
    })
}
