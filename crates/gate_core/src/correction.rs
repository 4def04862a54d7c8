//! Correction session and its Closed/Editing/Confirming state machine.

use std::{fmt, str::FromStr};

use serde::Serialize;
use shared::domain::{LaneId, OutcomeKind, TransactionRecord};
use thiserror::Error;
use tracing::debug;

/// Number of leading characters of a container number that form the BIC code.
pub const BIC_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectionError {
    #[error("no correction session is open")]
    NotOpen,
    #[error("correction was already submitted; acknowledge it to finish")]
    AlreadySubmitted,
    #[error("correction has not been submitted yet")]
    NotSubmitted,
    #[error("lane {lane_id} has no active transaction to correct")]
    NoActiveTransaction { lane_id: LaneId },
    #[error("unknown correction field '{0}'")]
    UnknownField(String),
}

/// Splits a container number into its BIC prefix and numeric remainder.
///
/// Counts characters rather than bytes; a value shorter than the prefix keeps
/// everything in the BIC part.
pub fn split_container_no(container_no: &str) -> (String, String) {
    match container_no.char_indices().nth(BIC_LEN) {
        Some((idx, _)) => (
            container_no[..idx].to_string(),
            container_no[idx..].to_string(),
        ),
        None => (container_no.to_string(), String::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Bic,
    ContNumber,
    Trailer,
    Truck,
    Iso,
    Vgm,
}

impl TextField {
    /// Identifier fields are stored uppercase; numbers and weights verbatim.
    pub fn is_uppercased(self) -> bool {
        matches!(
            self,
            TextField::Bic | TextField::Trailer | TextField::Truck | TextField::Iso
        )
    }
}

impl FromStr for TextField {
    type Err = CorrectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bic" => Ok(TextField::Bic),
            "cont" | "cont_number" | "container" => Ok(TextField::ContNumber),
            "trailer" => Ok(TextField::Trailer),
            "truck" => Ok(TextField::Truck),
            "iso" => Ok(TextField::Iso),
            "vgm" => Ok(TextField::Vgm),
            other => Err(CorrectionError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagField {
    StandardContainer,
    Stickers,
    Passgate,
}

impl FromStr for FlagField {
    type Err = CorrectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" | "standard_container" => Ok(FlagField::StandardContainer),
            "stickers" => Ok(FlagField::Stickers),
            "passgate" => Ok(FlagField::Passgate),
            other => Err(CorrectionError::UnknownField(other.to_string())),
        }
    }
}

/// Fields that contribute to the change count. `vgm` and the system ISO do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Bic,
    ContNumber,
    Trailer,
    Truck,
    Iso,
    StandardContainer,
    Stickers,
    Passgate,
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackedField::Bic => "bic",
            TrackedField::ContNumber => "cont_number",
            TrackedField::Trailer => "trailer",
            TrackedField::Truck => "truck",
            TrackedField::Iso => "iso",
            TrackedField::StandardContainer => "standard_container",
            TrackedField::Stickers => "stickers",
            TrackedField::Passgate => "passgate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableFields {
    pub bic: String,
    pub cont_number: String,
    pub trailer: String,
    pub truck: String,
    pub iso: String,
    pub vgm: String,
    pub is_standard_container: bool,
    pub has_stickers: bool,
    pub is_passgate_requested: bool,
}

impl EditableFields {
    /// Seeds the form from a record. Flags always start from their defaults.
    pub fn seed(record: &TransactionRecord) -> Self {
        let (bic, cont_number) = split_container_no(&record.ocr_data.container_no);
        Self {
            bic,
            cont_number,
            trailer: record.ocr_data.trailer_plate.clone(),
            truck: record.ocr_data.truck_plate.clone(),
            iso: record.ocr_data.iso_code.clone(),
            vgm: record.system_data.vgm.clone(),
            is_standard_container: true,
            has_stickers: false,
            is_passgate_requested: false,
        }
    }

    pub fn container_no(&self) -> String {
        format!("{}{}", self.bic, self.cont_number)
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Bic => &self.bic,
            TextField::ContNumber => &self.cont_number,
            TextField::Trailer => &self.trailer,
            TextField::Truck => &self.truck,
            TextField::Iso => &self.iso,
            TextField::Vgm => &self.vgm,
        }
    }

    pub fn flag(&self, flag: FlagField) -> bool {
        match flag {
            FlagField::StandardContainer => self.is_standard_container,
            FlagField::Stickers => self.has_stickers,
            FlagField::Passgate => self.is_passgate_requested,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Bic => &mut self.bic,
            TextField::ContNumber => &mut self.cont_number,
            TextField::Trailer => &mut self.trailer,
            TextField::Truck => &mut self.truck,
            TextField::Iso => &mut self.iso,
            TextField::Vgm => &mut self.vgm,
        }
    }

    fn flag_mut(&mut self, flag: FlagField) -> &mut bool {
        match flag {
            FlagField::StandardContainer => &mut self.is_standard_container,
            FlagField::Stickers => &mut self.has_stickers,
            FlagField::Passgate => &mut self.is_passgate_requested,
        }
    }

    pub fn changed_fields(&self, baseline: &Self) -> Vec<TrackedField> {
        let checks = [
            (TrackedField::Bic, self.bic != baseline.bic),
            (TrackedField::ContNumber, self.cont_number != baseline.cont_number),
            (TrackedField::Trailer, self.trailer != baseline.trailer),
            (TrackedField::Truck, self.truck != baseline.truck),
            (TrackedField::Iso, self.iso != baseline.iso),
            (
                TrackedField::StandardContainer,
                self.is_standard_container != baseline.is_standard_container,
            ),
            (TrackedField::Stickers, self.has_stickers != baseline.has_stickers),
            (
                TrackedField::Passgate,
                self.is_passgate_requested != baseline.is_passgate_requested,
            ),
        ];
        checks
            .into_iter()
            .filter_map(|(field, changed)| changed.then_some(field))
            .collect()
    }

    pub fn change_count(&self, baseline: &Self) -> usize {
        self.changed_fields(baseline).len()
    }
}

/// Editing state for one record. The record itself is a private snapshot and is
/// never modified; committing builds a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionSession {
    record: TransactionRecord,
    iso_system: String,
    baseline: EditableFields,
    fields: EditableFields,
}

impl CorrectionSession {
    pub fn open(record: &TransactionRecord) -> Self {
        Self::with_baseline(record, EditableFields::seed(record))
    }

    /// Builds a session around an explicit baseline instead of the seeded one.
    pub fn with_baseline(record: &TransactionRecord, baseline: EditableFields) -> Self {
        Self {
            record: record.clone(),
            iso_system: record.system_data.iso_code.clone(),
            fields: baseline.clone(),
            baseline,
        }
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    pub fn fields(&self) -> &EditableFields {
        &self.fields
    }

    pub fn baseline(&self) -> &EditableFields {
        &self.baseline
    }

    /// ISO code from the TOS. Shown next to the OCR value, never editable.
    pub fn iso_system(&self) -> &str {
        &self.iso_system
    }

    pub fn edit(&mut self, field: TextField, value: &str) {
        let value = if field.is_uppercased() {
            value.to_uppercase()
        } else {
            value.to_string()
        };
        *self.fields.text_mut(field) = value;
    }

    pub fn set_flag(&mut self, flag: FlagField, value: bool) {
        *self.fields.flag_mut(flag) = value;
    }

    pub fn reset(&mut self) {
        self.fields = self.baseline.clone();
    }

    pub fn change_count(&self) -> usize {
        self.fields.change_count(&self.baseline)
    }

    pub fn changed_fields(&self) -> Vec<TrackedField> {
        self.fields.changed_fields(&self.baseline)
    }

    pub fn classify(&self) -> OutcomeKind {
        if self.fields.is_passgate_requested && !self.baseline.is_passgate_requested {
            OutcomeKind::PassgateConfirmed
        } else {
            OutcomeKind::PlainUpdate
        }
    }

    // vgm edits are not committed; notes take the outcome's fixed message.
    pub fn build_commit(&self, outcome: OutcomeKind) -> TransactionRecord {
        let mut record = self.record.clone();
        record.ocr_data.container_no = self.fields.container_no();
        record.ocr_data.trailer_plate = self.fields.trailer.clone();
        record.ocr_data.truck_plate = self.fields.truck.clone();
        record.ocr_data.iso_code = self.fields.iso.clone();
        record.notes = outcome.commit_note().to_string();
        record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Closed,
    Editing,
    Confirming,
}

#[derive(Debug, Clone, Default)]
enum WorkflowState {
    #[default]
    Closed,
    Editing(CorrectionSession),
    Confirming {
        session: CorrectionSession,
        outcome: OutcomeKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedCorrection {
    pub record: TransactionRecord,
    pub outcome: OutcomeKind,
}

#[derive(Debug, Clone, Default)]
pub struct CorrectionWorkflow {
    state: WorkflowState,
}

impl CorrectionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self.state {
            WorkflowState::Closed => WorkflowPhase::Closed,
            WorkflowState::Editing(_) => WorkflowPhase::Editing,
            WorkflowState::Confirming { .. } => WorkflowPhase::Confirming,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase() != WorkflowPhase::Closed
    }

    pub fn session(&self) -> Option<&CorrectionSession> {
        match &self.state {
            WorkflowState::Closed => None,
            WorkflowState::Editing(session) | WorkflowState::Confirming { session, .. } => {
                Some(session)
            }
        }
    }

    pub fn outcome(&self) -> OutcomeKind {
        match self.state {
            WorkflowState::Confirming { outcome, .. } => outcome,
            _ => OutcomeKind::None,
        }
    }

    pub fn change_count(&self) -> usize {
        self.session().map_or(0, CorrectionSession::change_count)
    }

    /// Starts a session for `record`, discarding any session already open.
    pub fn open(&mut self, record: &TransactionRecord) -> Result<(), CorrectionError> {
        self.open_session(CorrectionSession::open(record))
    }

    /// Installs a prepared session. The session's record must carry an active
    /// transaction; a refused session leaves the workflow untouched.
    pub fn open_session(&mut self, session: CorrectionSession) -> Result<(), CorrectionError> {
        if !session.record().has_transaction() {
            return Err(CorrectionError::NoActiveTransaction {
                lane_id: session.record().lane_id.clone(),
            });
        }
        if let Some(previous) = self.session() {
            debug!(
                transaction_id = %previous.record().id,
                changes = previous.change_count(),
                "discarding open correction session"
            );
        }
        debug!(transaction_id = %session.record().id, "correction session opened");
        self.state = WorkflowState::Editing(session);
        Ok(())
    }

    pub fn edit(&mut self, field: TextField, value: &str) -> Result<usize, CorrectionError> {
        let session = self.editing_mut()?;
        session.edit(field, value);
        Ok(session.change_count())
    }

    pub fn set_flag(&mut self, flag: FlagField, value: bool) -> Result<usize, CorrectionError> {
        let session = self.editing_mut()?;
        session.set_flag(flag, value);
        Ok(session.change_count())
    }

    pub fn reset(&mut self) -> Result<(), CorrectionError> {
        self.editing_mut()?.reset();
        Ok(())
    }

    /// Closes the session without side effects.
    pub fn cancel(&mut self) -> Result<(), CorrectionError> {
        match self.state {
            WorkflowState::Editing(_) => {
                self.state = WorkflowState::Closed;
                debug!("correction session cancelled");
                Ok(())
            }
            WorkflowState::Confirming { .. } => Err(CorrectionError::AlreadySubmitted),
            WorkflowState::Closed => Err(CorrectionError::NotOpen),
        }
    }

    /// Drops whatever session exists, in any phase.
    pub fn force_close(&mut self) {
        if self.is_open() {
            debug!(phase = ?self.phase(), "correction session force-closed");
        }
        self.state = WorkflowState::Closed;
    }

    pub fn submit(&mut self) -> Result<OutcomeKind, CorrectionError> {
        match std::mem::take(&mut self.state) {
            WorkflowState::Editing(session) => {
                let outcome = session.classify();
                debug!(?outcome, changes = session.change_count(), "correction submitted");
                self.state = WorkflowState::Confirming { session, outcome };
                Ok(outcome)
            }
            other => {
                let err = match other {
                    WorkflowState::Confirming { .. } => CorrectionError::AlreadySubmitted,
                    _ => CorrectionError::NotOpen,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    pub fn acknowledge(&mut self) -> Result<CommittedCorrection, CorrectionError> {
        match std::mem::take(&mut self.state) {
            WorkflowState::Confirming { session, outcome } => Ok(CommittedCorrection {
                record: session.build_commit(outcome),
                outcome,
            }),
            other => {
                let err = match other {
                    WorkflowState::Editing(_) => CorrectionError::NotSubmitted,
                    _ => CorrectionError::NotOpen,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    fn editing_mut(&mut self) -> Result<&mut CorrectionSession, CorrectionError> {
        match &mut self.state {
            WorkflowState::Editing(session) => Ok(session),
            WorkflowState::Confirming { .. } => Err(CorrectionError::AlreadySubmitted),
            WorkflowState::Closed => Err(CorrectionError::NotOpen),
        }
    }
}

#[cfg(test)]
#[path = "tests/correction_tests.rs"]
mod tests;
