use std::fmt::Write as _;

use gate_core::{
    DashboardEvent, DashboardSnapshot, FieldComparison, ReconciliationView, SyncOverlay,
    WorkflowPhase,
};
use lane_store::HistoryEntry;
use shared::domain::{Lane, LaneDirection};

const NOT_FOUND: &str = "Not found";

pub fn lanes(lanes: &[Lane]) -> String {
    let mut out = String::new();
    for lane in lanes {
        let direction = match lane.direction {
            LaneDirection::Inbound => "IN ",
            LaneDirection::Outbound => "OUT",
        };
        let _ = writeln!(
            out,
            "{:<4} {} {:<12} {:<15} {:<10} {:<12} {}",
            lane.id.as_str(),
            direction,
            lane.name,
            lane.status.label(),
            lane.current_truck.as_deref().unwrap_or("-"),
            lane.container_no.as_deref().unwrap_or("-"),
            lane.last_updated,
        );
    }
    out
}

fn row(row: &FieldComparison) -> String {
    let system = if row.system_missing {
        NOT_FOUND
    } else {
        row.system.as_str()
    };
    let verdict = if row.is_match() { "OK" } else { "MISMATCH" };
    format!(
        "  {:<14} {:<14} {:<14} {verdict}",
        row.field.label(),
        row.ocr,
        system
    )
}

pub fn view(view: &ReconciliationView) -> String {
    match view {
        ReconciliationView::Placeholder { lane_id: Some(lane_id) } => {
            format!("lane {lane_id}: no active transaction\n")
        }
        ReconciliationView::Placeholder { lane_id: None } => "no lane selected\n".to_string(),
        ReconciliationView::Active(active) => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "lane {} | session {} | {} | {}",
                active.lane_id, active.session_id, active.transaction_id, active.timestamp
            );
            let _ = writeln!(
                out,
                "booking {} | vgm {}",
                active.booking_no, active.vgm
            );
            let _ = writeln!(out, "  {:<14} {:<14} {:<14} result", "field", "OCR", "TOS");
            for comparison in &active.rows {
                let _ = writeln!(out, "{}", row(comparison));
            }
            if !active.notes.is_empty() {
                let _ = writeln!(out, "notes: {}", active.notes);
            }
            out
        }
    }
}

pub fn form(snapshot: &DashboardSnapshot) -> String {
    let Some(fields) = snapshot.fields.as_ref() else {
        return String::new();
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "correction [{}] changes={}",
        phase(snapshot.phase),
        snapshot.change_count
    );
    let _ = writeln!(out, "  bic={} cont={}", fields.bic, fields.cont_number);
    let _ = writeln!(out, "  truck={} trailer={}", fields.truck, fields.trailer);
    let _ = writeln!(
        out,
        "  iso={} (system {}) vgm={}",
        fields.iso,
        snapshot.iso_system.as_deref().unwrap_or("-"),
        fields.vgm
    );
    let _ = writeln!(
        out,
        "  standard={} stickers={} passgate={}",
        fields.is_standard_container, fields.has_stickers, fields.is_passgate_requested
    );
    if !snapshot.changed_fields.is_empty() {
        let changed: Vec<String> = snapshot
            .changed_fields
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(out, "  changed: {}", changed.join(", "));
    }
    out
}

pub fn overlay(overlay: &SyncOverlay) -> Option<String> {
    match overlay {
        SyncOverlay::Idle => None,
        SyncOverlay::Syncing { lane_id, .. } => {
            Some(format!("syncing lane {lane_id} with TOS..."))
        }
        SyncOverlay::Failed { notice, .. } => Some(format!(
            "sync failed: {} ('retry' or 'dismiss')",
            notice.message()
        )),
    }
}

fn phase(phase: WorkflowPhase) -> &'static str {
    match phase {
        WorkflowPhase::Closed => "closed",
        WorkflowPhase::Editing => "editing",
        WorkflowPhase::Confirming => "confirming",
    }
}

pub fn event(event: &DashboardEvent) -> String {
    match event {
        DashboardEvent::LaneSelected {
            lane_id,
            has_transaction,
        } => format!("lane {lane_id} selected (transaction: {has_transaction})"),
        DashboardEvent::CorrectionCommitted { lane_id, outcome } => {
            format!("lane {lane_id}: {}", outcome.commit_note())
        }
        DashboardEvent::SyncStarted { lane_id, .. } => format!("lane {lane_id}: TOS sync started"),
        DashboardEvent::SyncCompleted { lane_id, .. } => {
            format!("lane {lane_id}: TOS sync completed")
        }
        DashboardEvent::SyncFailed {
            lane_id, notice, ..
        } => format!("lane {lane_id}: TOS sync failed: {}", notice.detail()),
    }
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "no matching history\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let session = entry
            .session_id
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "{} {:<12} {:<12} {:<10} {:<16} {}",
            entry.recorded_at.format("%d/%m/%Y %H:%M"),
            entry.lane,
            entry.container_no,
            entry.truck_plate,
            session,
            entry.status.label(),
        );
    }
    out
}
