use super::*;

use std::sync::Arc;

use crate::api::ApiError;
use crate::config::PanelConfig;
use crate::panel::test_helpers::*;
use crate::render::PanelContent;

/// Just past the third tick (0s, 5s, 10s).
const THREE_TICKS: Duration = Duration::from_millis(12_500);

#[tokio::test(start_paused = true)]
async fn first_tick_is_immediate_then_every_interval() {
    let (panel, api, view) = test_panel();
    let handle = spawn_scheduler(panel, TICK, RefreshPolicy::Overlap);

    settle().await;
    assert_eq!(api.list_calls(), 1);

    tokio::time::sleep(THREE_TICKS).await;
    assert_eq!(api.list_calls(), 3);
    assert_eq!(view.snapshot().content, Some(PanelContent::Empty));

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_polling() {
    let (panel, api, view) = test_panel();
    for _ in 0..3 {
        api.push_list(Reply::Now(Err(ApiError::Status { status: 502 })));
    }
    api.push_list_ok(vec![message(1, "Ana", "back", false)]);

    let handle = spawn_scheduler(panel, TICK, RefreshPolicy::Overlap);
    tokio::time::sleep(THREE_TICKS).await;
    assert_eq!(view.snapshot().content, Some(PanelContent::Error));

    tokio::time::sleep(TICK).await;
    assert_eq!(api.list_calls(), 4);
    assert_eq!(view.block_count(), 1);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_ends_polling() {
    let (panel, api, _view) = test_panel();
    let handle = spawn_scheduler(panel, TICK, RefreshPolicy::Overlap);
    tokio::time::sleep(THREE_TICKS).await;
    assert!(handle.is_running());

    handle.stop().await;
    tokio::time::sleep(TICK * 4).await;

    assert_eq!(api.list_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_ends_polling() {
    let (panel, api, _view) = test_panel();
    let handle = spawn_scheduler(panel, TICK, RefreshPolicy::Overlap);
    settle().await;

    drop(handle);
    tokio::time::sleep(TICK * 4).await;

    assert_eq!(api.list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_clamped() {
    let (panel, api, _view) = test_panel();
    let handle = spawn_scheduler(panel, Duration::ZERO, RefreshPolicy::Overlap);

    tokio::time::sleep(MIN_POLL_INTERVAL * 3 + MIN_POLL_INTERVAL / 2).await;

    assert_eq!(api.list_calls(), 4);
    handle.stop().await;
}

// =============================================================================
// refresh policy
// =============================================================================

#[tokio::test(start_paused = true)]
async fn overlap_policy_issues_a_request_every_tick() {
    let (panel, api, _view) = test_panel();
    for _ in 0..3 {
        api.push_list(Reply::Hang);
    }

    let handle = spawn_scheduler(panel.clone(), TICK, RefreshPolicy::Overlap);
    tokio::time::sleep(THREE_TICKS).await;

    assert_eq!(api.list_calls(), 3);
    assert_eq!(panel.state().refreshes_in_flight, 3);
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn skip_policy_waits_for_the_pending_request() {
    let (panel, api, _view) = test_panel();
    api.push_list(Reply::Hang);

    let handle = spawn_scheduler(panel.clone(), TICK, RefreshPolicy::SkipWhileInFlight);
    tokio::time::sleep(THREE_TICKS).await;

    assert_eq!(api.list_calls(), 1);
    assert_eq!(panel.state().refreshes_in_flight, 1);
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_aborts_scheduled_refreshes() {
    let (panel, api, view) = test_panel();
    api.push_list(Reply::Hang);
    api.push_list(Reply::Hang);

    let handle = spawn_scheduler(panel.clone(), TICK, RefreshPolicy::Overlap);
    tokio::time::sleep(TICK + TICK / 2).await;
    assert_eq!(panel.state().refreshes_in_flight, 2);

    handle.stop().await;

    assert_eq!(panel.state().refreshes_in_flight, 0);
    assert_eq!(view.snapshot().renders, 0);
}

// =============================================================================
// Panel::start
// =============================================================================

#[tokio::test(start_paused = true)]
async fn start_builds_panel_and_polls() {
    let api = Arc::new(FakeApi::default());
    let view = Arc::new(RecordingView::new());
    api.push_list_ok(vec![message(1, "Ana", "hola", false)]);
    let config = PanelConfig::new("42").unwrap();

    let (panel, handle) = Panel::start(&config, api.clone(), view.clone());
    settle().await;

    assert_eq!(panel.event_id().as_str(), "42");
    assert_eq!(api.list_calls(), 1);
    assert_eq!(view.snapshot().count, Some(1));
    handle.stop().await;
}
