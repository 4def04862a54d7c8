use super::*;
use shared::domain::{
    CaptureImages, LaneStatus, OcrData, SessionId, SystemData, TransactionId,
};

fn record_with_container(lane: &str, container_no: &str) -> TransactionRecord {
    TransactionRecord {
        id: TransactionId::new(format!("TRX-{lane}")),
        session_id: SessionId::new(format!("SMG-{lane}")),
        timestamp: "21/10/2025 13:21:44".into(),
        lane_id: LaneId::new(lane),
        status: LaneStatus::Waiting,
        images: CaptureImages {
            panorama: "https://img.example/panorama.jpg".into(),
            ..CaptureImages::default()
        },
        ocr_data: OcrData {
            container_no: container_no.into(),
            iso_code: "45G1".into(),
            truck_plate: "51L-88941".into(),
            trailer_plate: "15R-24425".into(),
            seal_no: "DS42505".into(),
        },
        system_data: SystemData {
            container_no: container_no.into(),
            iso_code: "45G1".into(),
            truck_plate: "51L-88941".into(),
            trailer_plate: "15R-24425".into(),
            seal_no: "DS42505".into(),
            vgm: "28,500".into(),
            booking_no: "SMG211025-001".into(),
            eir: "EIR-8821".into(),
        },
        notes: "Container có dán Tem nguy hiểm".into(),
    }
}

fn record() -> TransactionRecord {
    record_with_container("L02", "MAGU5327080")
}

fn editing_workflow(record: &TransactionRecord) -> CorrectionWorkflow {
    let mut workflow = CorrectionWorkflow::new();
    workflow.open(record).expect("open");
    workflow
}

#[test]
fn split_container_no_takes_four_character_bic() {
    assert_eq!(
        split_container_no("MAGU5327080"),
        ("MAGU".to_string(), "5327080".to_string())
    );
    assert_eq!(split_container_no(""), (String::new(), String::new()));
    assert_eq!(split_container_no("MAG"), ("MAG".to_string(), String::new()));
    assert_eq!(split_container_no("MAGU"), ("MAGU".to_string(), String::new()));
}

#[test]
fn open_seeds_fields_and_default_flags() {
    let record = record();
    let workflow = editing_workflow(&record);
    let session = workflow.session().expect("session");
    let fields = session.fields();

    assert_eq!(workflow.phase(), WorkflowPhase::Editing);
    assert_eq!(fields.bic, "MAGU");
    assert_eq!(fields.cont_number, "5327080");
    assert_eq!(fields.trailer, "15R-24425");
    assert_eq!(fields.truck, "51L-88941");
    assert_eq!(fields.iso, "45G1");
    assert_eq!(fields.vgm, "28,500");
    assert!(fields.is_standard_container);
    assert!(!fields.has_stickers);
    assert!(!fields.is_passgate_requested);
    assert_eq!(session.iso_system(), "45G1");
    assert_eq!(session.baseline(), fields);
}

#[test]
fn open_on_empty_container_number_seeds_empty_parts() {
    let record = record_with_container("L06", "");
    let workflow = editing_workflow(&record);
    let fields = workflow.session().expect("session").fields();
    assert_eq!(fields.bic, "");
    assert_eq!(fields.cont_number, "");
}

#[test]
fn open_rejects_idle_record() {
    let mut record = record();
    record.status = LaneStatus::Idle;
    let mut workflow = CorrectionWorkflow::new();
    let err = workflow.open(&record).expect_err("idle");
    assert_eq!(
        err,
        CorrectionError::NoActiveTransaction {
            lane_id: LaneId::new("L02")
        }
    );
    assert_eq!(workflow.phase(), WorkflowPhase::Closed);
}

#[test]
fn prepared_session_on_idle_record_is_refused() {
    let active = record();
    let mut idle = record();
    idle.status = LaneStatus::Idle;

    let mut workflow = editing_workflow(&active);
    workflow.edit(TextField::Truck, "30C-22432").expect("truck");

    let err = workflow
        .open_session(CorrectionSession::with_baseline(
            &idle,
            EditableFields::seed(&idle),
        ))
        .expect_err("idle");
    assert_eq!(
        err,
        CorrectionError::NoActiveTransaction {
            lane_id: LaneId::new("L02")
        }
    );
    assert_eq!(workflow.phase(), WorkflowPhase::Editing);
    assert_eq!(workflow.change_count(), 1);
}

#[test]
fn commit_without_edits_rejoins_original_container_number() {
    for container_no in ["MAGU5327080", "TGBU3719401", "MSKU123456", "ABCD"] {
        let record = record_with_container("L03", container_no);
        let mut workflow = editing_workflow(&record);
        workflow.submit().expect("submit");
        let committed = workflow.acknowledge().expect("ack");
        assert_eq!(committed.record.ocr_data.container_no, container_no);
    }
}

#[test]
fn change_count_tracks_each_edited_field() {
    let record = record();
    let mut workflow = editing_workflow(&record);

    assert_eq!(workflow.edit(TextField::Bic, "TGBU").expect("bic"), 1);
    assert_eq!(workflow.edit(TextField::ContNumber, "0000001").expect("cont"), 2);
    assert_eq!(workflow.edit(TextField::Trailer, "15R-00000").expect("trailer"), 3);
    assert_eq!(workflow.edit(TextField::Truck, "30C-22432").expect("truck"), 4);
    assert_eq!(workflow.edit(TextField::Iso, "22G1").expect("iso"), 5);
    assert_eq!(
        workflow
            .set_flag(FlagField::StandardContainer, false)
            .expect("standard"),
        6
    );
    assert_eq!(workflow.set_flag(FlagField::Stickers, true).expect("stickers"), 7);
    assert_eq!(workflow.set_flag(FlagField::Passgate, true).expect("passgate"), 8);
}

#[test]
fn vgm_edits_are_not_counted() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    assert_eq!(workflow.edit(TextField::Vgm, "30,000").expect("vgm"), 0);
    assert_eq!(workflow.session().expect("session").fields().vgm, "30,000");
}

#[test]
fn editing_back_to_baseline_drops_field_from_count() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Truck, "99X-00000").expect("truck");
    workflow.set_flag(FlagField::Stickers, true).expect("stickers");
    assert_eq!(workflow.change_count(), 2);

    workflow.edit(TextField::Truck, "51l-88941").expect("truck back");
    workflow.set_flag(FlagField::Stickers, false).expect("stickers back");
    assert_eq!(workflow.change_count(), 0);
}

#[test]
fn identifier_fields_are_uppercased_and_numbers_kept_verbatim() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Bic, "tgbu").expect("bic");
    workflow.edit(TextField::Iso, "22g1").expect("iso");
    workflow.edit(TextField::Trailer, "15r-1").expect("trailer");
    workflow.edit(TextField::ContNumber, "12ab").expect("cont");
    workflow.edit(TextField::Vgm, "28,5 t").expect("vgm");

    let fields = workflow.session().expect("session").fields();
    assert_eq!(fields.bic, "TGBU");
    assert_eq!(fields.iso, "22G1");
    assert_eq!(fields.trailer, "15R-1");
    assert_eq!(fields.cont_number, "12ab");
    assert_eq!(fields.vgm, "28,5 t");
}

#[test]
fn reset_restores_baseline_after_many_edits() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    for value in ["a", "b", "c"] {
        workflow.edit(TextField::Bic, value).expect("bic");
        workflow.edit(TextField::Vgm, value).expect("vgm");
    }
    workflow.set_flag(FlagField::Passgate, true).expect("passgate");
    workflow.set_flag(FlagField::StandardContainer, false).expect("standard");

    workflow.reset().expect("reset");
    let session = workflow.session().expect("session");
    assert_eq!(session.fields(), session.baseline());
    assert_eq!(workflow.change_count(), 0);
    assert_eq!(workflow.phase(), WorkflowPhase::Editing);

    workflow.reset().expect("reset twice");
    assert_eq!(workflow.change_count(), 0);
}

#[test]
fn passgate_toggled_on_is_confirmed() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.set_flag(FlagField::Passgate, true).expect("passgate");
    assert_eq!(workflow.submit().expect("submit"), OutcomeKind::PassgateConfirmed);
    assert_eq!(workflow.outcome(), OutcomeKind::PassgateConfirmed);
}

#[test]
fn passgate_left_off_is_plain_update() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Truck, "30C-22432").expect("truck");
    assert_eq!(workflow.submit().expect("submit"), OutcomeKind::PlainUpdate);
}

#[test]
fn passgate_already_requested_at_baseline_is_plain_update() {
    let record = record();
    let mut baseline = EditableFields::seed(&record);
    baseline.is_passgate_requested = true;

    let mut kept = CorrectionWorkflow::new();
    kept
        .open_session(CorrectionSession::with_baseline(&record, baseline.clone()))
        .expect("open kept");
    assert_eq!(kept.submit().expect("submit"), OutcomeKind::PlainUpdate);

    let mut cleared = CorrectionWorkflow::new();
    cleared
        .open_session(CorrectionSession::with_baseline(&record, baseline))
        .expect("open cleared");
    cleared.set_flag(FlagField::Passgate, false).expect("passgate off");
    assert_eq!(cleared.submit().expect("submit"), OutcomeKind::PlainUpdate);
}

#[test]
fn confirming_rejects_edits_reset_and_cancel() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.submit().expect("submit");

    assert_eq!(
        workflow.edit(TextField::Bic, "XXXX"),
        Err(CorrectionError::AlreadySubmitted)
    );
    assert_eq!(
        workflow.set_flag(FlagField::Passgate, true),
        Err(CorrectionError::AlreadySubmitted)
    );
    assert_eq!(workflow.reset(), Err(CorrectionError::AlreadySubmitted));
    assert_eq!(workflow.cancel(), Err(CorrectionError::AlreadySubmitted));
    assert_eq!(workflow.submit(), Err(CorrectionError::AlreadySubmitted));
    assert_eq!(workflow.phase(), WorkflowPhase::Confirming);
}

#[test]
fn acknowledge_before_submit_is_rejected() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    assert_eq!(workflow.acknowledge(), Err(CorrectionError::NotSubmitted));
    assert_eq!(workflow.phase(), WorkflowPhase::Editing);

    let mut closed = CorrectionWorkflow::new();
    assert_eq!(closed.acknowledge(), Err(CorrectionError::NotOpen));
}

#[test]
fn cancel_discards_session() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Bic, "ZZZZ").expect("bic");
    workflow.cancel().expect("cancel");
    assert_eq!(workflow.phase(), WorkflowPhase::Closed);
    assert!(workflow.session().is_none());
    assert_eq!(workflow.cancel(), Err(CorrectionError::NotOpen));
}

#[test]
fn acknowledge_builds_committed_record() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Bic, "tgbu").expect("bic");
    workflow.edit(TextField::ContNumber, "3719401").expect("cont");
    workflow.edit(TextField::Trailer, "15r-99999").expect("trailer");
    workflow.edit(TextField::Truck, "30c-22432").expect("truck");
    workflow.edit(TextField::Iso, "22g1").expect("iso");
    workflow.edit(TextField::Vgm, "31,000").expect("vgm");
    workflow.submit().expect("submit");

    let committed = workflow.acknowledge().expect("ack");
    assert_eq!(committed.outcome, OutcomeKind::PlainUpdate);
    assert_eq!(workflow.phase(), WorkflowPhase::Closed);

    let updated = committed.record;
    assert_eq!(updated.ocr_data.container_no, "TGBU3719401");
    assert_eq!(updated.ocr_data.trailer_plate, "15R-99999");
    assert_eq!(updated.ocr_data.truck_plate, "30C-22432");
    assert_eq!(updated.ocr_data.iso_code, "22G1");
    assert_eq!(updated.ocr_data.seal_no, record.ocr_data.seal_no);
    assert_eq!(updated.notes, OutcomeKind::PlainUpdate.commit_note());
    assert_eq!(updated.system_data, record.system_data);
    assert_eq!(updated.system_data.vgm, "28,500");
    assert_eq!(updated.images, record.images);
    assert_eq!(updated.id, record.id);
    assert_eq!(updated.session_id, record.session_id);
    assert_eq!(updated.timestamp, record.timestamp);
    assert_eq!(updated.lane_id, record.lane_id);
}

#[test]
fn passgate_commit_uses_passgate_note() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.set_flag(FlagField::Passgate, true).expect("passgate");
    workflow.submit().expect("submit");
    let committed = workflow.acknowledge().expect("ack");
    assert_eq!(
        committed.record.notes,
        OutcomeKind::PassgateConfirmed.commit_note()
    );
}

#[test]
fn reopening_on_another_record_discards_previous_edits() {
    let record_a = record_with_container("L02", "MAGU5327080");
    let record_b = record_with_container("L03", "TGBU3719401");
    let mut workflow = editing_workflow(&record_a);
    workflow.edit(TextField::Bic, "ZZZZ").expect("bic");
    workflow.set_flag(FlagField::Passgate, true).expect("passgate");

    workflow.open(&record_b).expect("open b");
    let session = workflow.session().expect("session");
    assert_eq!(session.record().lane_id, LaneId::new("L03"));
    assert_eq!(session.fields(), &EditableFields::seed(&record_b));
    assert_eq!(workflow.change_count(), 0);
}

#[test]
fn reopening_from_confirming_starts_fresh() {
    let record = record();
    let mut workflow = editing_workflow(&record);
    workflow.set_flag(FlagField::Passgate, true).expect("passgate");
    workflow.submit().expect("submit");

    workflow.open(&record).expect("reopen");
    assert_eq!(workflow.phase(), WorkflowPhase::Editing);
    assert_eq!(workflow.outcome(), OutcomeKind::None);
    assert!(!workflow.session().expect("session").fields().is_passgate_requested);
}

#[test]
fn input_record_is_untouched_until_commit() {
    let record = record();
    let snapshot = record.clone();
    let mut workflow = editing_workflow(&record);
    workflow.edit(TextField::Bic, "ZZZZ").expect("bic");
    workflow.edit(TextField::Truck, "00A-00000").expect("truck");
    assert_eq!(record, snapshot);
    workflow.submit().expect("submit");
    assert_eq!(record, snapshot);
    workflow.acknowledge().expect("ack");
    assert_eq!(record, snapshot);
}

#[test]
fn field_names_parse_from_operator_input() {
    assert_eq!("BIC".parse::<TextField>(), Ok(TextField::Bic));
    assert_eq!("cont".parse::<TextField>(), Ok(TextField::ContNumber));
    assert_eq!("passgate".parse::<FlagField>(), Ok(FlagField::Passgate));
    assert_eq!(
        "iso_system".parse::<TextField>(),
        Err(CorrectionError::UnknownField("iso_system".into()))
    );
}
