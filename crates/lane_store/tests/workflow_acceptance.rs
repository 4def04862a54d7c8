use std::{sync::Arc, time::Duration};

use gate_core::{
    DashboardError, DashboardOptions, FlagField, GateDashboard, ReconciledField,
    SimulatedFailure, SimulatedTosSync, SyncFailureCategory, SyncOverlay, SyncPolicy, TextField,
    WorkflowPhase,
};
use lane_store::LaneStore;
use shared::domain::{LaneFilter, LaneId, OutcomeKind};

fn dashboard(
    store: &LaneStore,
    sink: Arc<SimulatedTosSync>,
    include_seal_row: bool,
) -> GateDashboard {
    GateDashboard::new(
        Arc::new(store.clone()),
        sink,
        SyncPolicy::default(),
        DashboardOptions { include_seal_row },
    )
}

#[tokio::test(start_paused = true)]
async fn operator_corrects_and_confirms_passgate() {
    let store = LaneStore::with_fixtures();
    let sink = Arc::new(SimulatedTosSync::default());
    let dashboard = dashboard(&store, sink.clone(), true);

    let board = dashboard.lanes(&LaneFilter::All).await.expect("lanes");
    assert_eq!(board.len(), 7);

    let idle = dashboard
        .select_lane(&LaneId::new("L01"))
        .await
        .expect("select idle lane");
    assert!(!idle.can_open_correction());
    assert!(matches!(
        dashboard.open_correction().await,
        Err(DashboardError::NoActiveTransaction(_))
    ));

    let view = dashboard
        .select_lane(&LaneId::new("L03"))
        .await
        .expect("select L03");
    let active = view.active().expect("active reconciliation");
    assert!(active.all_match());
    assert!(active
        .rows
        .iter()
        .any(|row| row.field == ReconciledField::SealNo));

    let fields = dashboard.open_correction().await.expect("open");
    assert_eq!(fields.text(TextField::Bic), "TGBU");
    assert_eq!(fields.text(TextField::ContNumber), "3719401");

    assert_eq!(
        dashboard
            .edit(TextField::Truck, "30c-22433")
            .await
            .expect("edit truck"),
        1
    );
    assert_eq!(
        dashboard
            .set_flag(FlagField::Passgate, true)
            .await
            .expect("passgate"),
        2
    );
    assert_eq!(
        dashboard.submit_correction().await.expect("submit"),
        OutcomeKind::PassgateConfirmed
    );
    assert_eq!(dashboard.snapshot().await.phase, WorkflowPhase::Confirming);

    dashboard.acknowledge().await.expect("sync acknowledged");
    assert_eq!(sink.calls(), 1);

    let snapshot = dashboard.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Closed);
    assert_eq!(snapshot.overlay, SyncOverlay::Idle);

    let record = dashboard.current_record().await.expect("record");
    assert_eq!(record.ocr_data.truck_plate, "30C-22433");
    assert_eq!(record.notes, OutcomeKind::PassgateConfirmed.commit_note());

    let stored = store
        .transaction(&LaneId::new("L03"))
        .await
        .expect("stored record");
    assert_eq!(stored, record);

    let history = store.search_history("30c-22433").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, Some(OutcomeKind::PassgateConfirmed));
}

#[tokio::test]
async fn rejected_sync_keeps_local_commit_until_dismissed() {
    let store = LaneStore::with_fixtures();
    let sink = Arc::new(SimulatedTosSync::with_failure(
        Duration::ZERO,
        SimulatedFailure::Always,
    ));
    let dashboard = dashboard(&store, sink.clone(), false);

    dashboard
        .select_lane(&LaneId::new("L02"))
        .await
        .expect("select L02");
    dashboard.open_correction().await.expect("open");
    dashboard
        .edit(TextField::Iso, "22g1")
        .await
        .expect("edit iso");
    assert_eq!(
        dashboard.submit_correction().await.expect("submit"),
        OutcomeKind::PlainUpdate
    );

    let notice = match dashboard.acknowledge().await {
        Err(DashboardError::SyncFailed(notice)) => notice,
        other => panic!("expected sync failure, got {other:?}"),
    };
    assert_eq!(notice.category(), SyncFailureCategory::Rejected);
    assert!(matches!(
        dashboard.snapshot().await.overlay,
        SyncOverlay::Failed { .. }
    ));

    let stored = store
        .transaction(&LaneId::new("L02"))
        .await
        .expect("stored record");
    assert_eq!(stored.ocr_data.iso_code, "22G1");
    assert_eq!(stored.notes, OutcomeKind::PlainUpdate.commit_note());

    dashboard.dismiss_sync_error().await.expect("dismiss");
    assert_eq!(dashboard.snapshot().await.overlay, SyncOverlay::Idle);
    assert_eq!(sink.calls(), 1);
}
