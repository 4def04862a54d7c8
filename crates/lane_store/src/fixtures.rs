//! Mock lane board and gate transactions.

use chrono::{NaiveDate, NaiveDateTime};
use shared::domain::{
    CaptureImages, Lane, LaneDirection, LaneId, LaneStatus, OcrData, SessionId, SystemData,
    TransactionId, TransactionRecord,
};

use crate::history::HistoryEntry;

const IMAGE_BASE: &str = "https://res.cloudinary.com/ditrwpwyv/image/upload";

fn image(path: &str) -> String {
    format!("{IMAGE_BASE}/{path}")
}

#[allow(clippy::too_many_arguments)]
fn lane(
    id: &str,
    name: &str,
    direction: LaneDirection,
    status: LaneStatus,
    current_truck: Option<&str>,
    container_no: Option<&str>,
    duration: Option<&str>,
    last_updated: &str,
) -> Lane {
    Lane {
        id: LaneId::new(id),
        name: name.to_string(),
        direction,
        status,
        current_truck: current_truck.map(str::to_string),
        container_no: container_no.map(str::to_string),
        duration: duration.map(str::to_string),
        last_updated: last_updated.to_string(),
    }
}

pub fn lanes() -> Vec<Lane> {
    use LaneDirection::{Inbound, Outbound};

    vec![
        lane("L01", "Cổng vào 1", Inbound, LaneStatus::Idle, None, None, None, "00:00:00"),
        lane(
            "L02",
            "Cổng vào 2",
            Inbound,
            LaneStatus::Waiting,
            Some("51L-88941"),
            None,
            Some("30s"),
            "00:30:15",
        ),
        lane(
            "L03",
            "Cổng vào 3",
            Inbound,
            LaneStatus::Waiting,
            Some("30C-22432"),
            Some("TGBU3719401"),
            Some("15s"),
            "01:43:22",
        ),
        lane(
            "L04",
            "Cổng ra 4",
            Outbound,
            LaneStatus::Failed,
            Some("30C-42421"),
            Some("MSKU123456"),
            Some("120s"),
            "03:14:10",
        ),
        lane(
            "L05",
            "Cổng ra 5",
            Outbound,
            LaneStatus::Failed,
            Some("30C-57145"),
            Some("PONU987654"),
            Some("45s"),
            "05:07:33",
        ),
        lane(
            "L06",
            "Cổng ra 6",
            Outbound,
            LaneStatus::Waiting,
            Some("30C-24468"),
            None,
            Some("10s"),
            "00:17:45",
        ),
        lane(
            "L07",
            "Cổng ra 7",
            Outbound,
            LaneStatus::Success,
            Some("29H-11223"),
            Some("MAEU998877"),
            Some("25s"),
            "00:15:20",
        ),
    ]
}

pub fn transactions() -> Vec<TransactionRecord> {
    vec![
        TransactionRecord {
            id: TransactionId::new("TRX-2025-L02"),
            session_id: SessionId::new("SMG211020250002"),
            timestamp: "21/10/2025 13:21:44".into(),
            lane_id: LaneId::new("L02"),
            status: LaneStatus::Waiting,
            images: CaptureImages {
                panorama: image("v1768962138/z7452131383618_5ace9091ab24563d0195eb8e829890ac_ryxv7x.jpg"),
                front: image("v1768911949/2c8a1e5e-2cd8-4387-83f9-69044efe2803_s3f0xr.jpg"),
                back: image("v1768911939/18608947-a1ed-4a7d-a0c5-8c9a477f483d_dsub4r.jpg"),
                left: image("v1768911958/a2d47dec-871d-46dd-b892-1a03fe0baff9_r2p7ax.jpg"),
                right: image("v1768911933/ff1e831e-f830-45a8-a8bb-eee152daa8f3_fuylf3.jpg"),
                top: image("v1768911958/64fdf52e-5e3f-46f5-ace9-7ee44598e20d_cwww2r.jpg"),
            },
            ocr_data: OcrData {
                container_no: "MAGU5327080".into(),
                iso_code: "45G1".into(),
                truck_plate: "51L-88941".into(),
                trailer_plate: "15R-24425".into(),
                seal_no: "DS42505".into(),
            },
            system_data: SystemData {
                container_no: "MAGU5327080".into(),
                iso_code: "45G1".into(),
                truck_plate: "51L-88941".into(),
                trailer_plate: "15R-24425".into(),
                seal_no: "DS42505".into(),
                vgm: "28,500".into(),
                booking_no: "SMG211025-001".into(),
                eir: "EIR-8821".into(),
            },
            notes: "Container có dán Tem nguy hiểm".into(),
        },
        TransactionRecord {
            id: TransactionId::new("TRX-2025-L03"),
            session_id: SessionId::new("SMG211020250003"),
            timestamp: "21/10/2025 13:45:10".into(),
            lane_id: LaneId::new("L03"),
            status: LaneStatus::Waiting,
            images: CaptureImages {
                panorama: image("v1768969934/97bf8fe8-f1a8-4270-ab41-cef9cffd6ba8_c30chi.jpg"),
                front: image("v1768969934/37117cf3-d376-4467-8301-9914171af68e_izbqp8.jpg"),
                back: image("v1768969907/db889cd9-d559-49c2-ac65-c91d27461b5a_u3mufh.jpg"),
                left: image("v1768969934/95b534ec-d4de-4213-a9e2-7f31e963f917_qcfol9.jpg"),
                right: image("v1768969935/0f73838b-93ce-42c6-8c52-cc683ee36ef5_gezrbi.jpg"),
                top: image("v1768969934/69ac52ca-e370-48fb-a080-d6f4f45050a3_ocs3me.jpg"),
            },
            ocr_data: OcrData {
                container_no: "TGBU3719401".into(),
                iso_code: "45G1".into(),
                truck_plate: "30C-22432".into(),
                trailer_plate: "15R-24425".into(),
                seal_no: "DS42505".into(),
            },
            system_data: SystemData {
                container_no: "TGBU3719401".into(),
                iso_code: "45G1".into(),
                truck_plate: "30C-22432".into(),
                trailer_plate: "15R-24425".into(),
                seal_no: "DS42505".into(),
                vgm: "28,500".into(),
                booking_no: "SMG211025-001".into(),
                eir: "EIR-8821".into(),
            },
            notes: "Container có dấu hiệu móp nhẹ vách trái".into(),
        },
    ]
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

pub fn history() -> Vec<HistoryEntry> {
    vec![
        HistoryEntry::fixture(at(20, 9, 40), "Gate In 03", "OOLU887766", "51D-99881", LaneStatus::Success),
        HistoryEntry::fixture(at(20, 9, 55), "Gate In 01", "MAEU223344", "29C-11223", LaneStatus::Success),
        HistoryEntry::fixture(at(20, 10, 15), "Gate Out 01", "MSKU123456", "30C-42421", LaneStatus::Failed),
        HistoryEntry::fixture(at(20, 10, 28), "Gate Out 02", "PONU987654", "30C-57145", LaneStatus::Success),
        HistoryEntry::fixture(at(20, 10, 30), "Gate In 02", "TGBU3719401", "51L-88941", LaneStatus::Waiting),
    ]
}
