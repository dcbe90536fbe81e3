//! End-to-end pipeline tests against the in-memory board.

mod common;

use std::fs;

use board_trend::{RunOptions, Status, TrendError, TrendPoint, TrendTracker};
use chrono::Local;
use common::{date, sample_board, RecordingRenderer, BOARD_NAME};

fn tracker_in(
    dir: &tempfile::TempDir,
    renderer: &RecordingRenderer,
) -> TrendTracker<common::FakeBoard> {
    TrendTracker::builder()
        .data_dir(dir.path())
        .renderer(renderer.clone())
        .build(sample_board(), BOARD_NAME)
        .unwrap()
}

#[test]
fn build_fails_for_unknown_board() {
    let tmp = tempfile::tempdir().unwrap();
    let result = TrendTracker::builder()
        .data_dir(tmp.path())
        .build(sample_board(), "Missing");
    assert!(matches!(result, Err(TrendError::BoardNotFound(_))));
}

#[test]
fn initialize_loads_cards_and_report_card() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    assert!(tracker.cards().is_empty());

    tracker.initialize_cards().unwrap();
    assert_eq!(tracker.cards().len(), 7);
    assert_eq!(tracker.report_card().unwrap().id, "card-6");
    assert_eq!(tracker.total_remaining().unwrap(), 8.5);
    assert!(tracker.to_string().contains("cards=7"));
}

#[test]
fn add_datapoint_appends_truncated_total() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    tracker.initialize_cards().unwrap();
    fs::write(tracker.trend_store().path(), "2024-01-01 = 10\n").unwrap();

    let point = tracker.add_datapoint().unwrap();
    assert_eq!(point, TrendPoint::new(Local::now().date_naive(), 8));

    let points = tracker.trend_store().read().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1], point);
}

#[test]
fn unestimated_days_setting_changes_total() {
    let tmp = tempfile::tempdir().unwrap();
    let mut tracker = TrendTracker::builder()
        .data_dir(tmp.path())
        .unestimated_days(2.0)
        .renderer(RecordingRenderer::default())
        .build(sample_board(), BOARD_NAME)
        .unwrap();
    tracker.initialize_cards().unwrap();

    // Docs, Weekly Report and Stray have no estimate.
    assert_eq!(tracker.total_remaining().unwrap(), 11.5);
}

#[test]
fn generate_trend_renders_store_contents() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let tracker = tracker_in(&tmp, &renderer);
    fs::write(
        tracker.trend_store().path(),
        "2024-01-01 = 10\n2024-01-08 = 6\n2024-01-15 = 6\n",
    )
    .unwrap();

    let artifacts = tracker.generate_trend().unwrap();
    assert_eq!(artifacts.image, tmp.path().join("figure.png"));
    assert_eq!(artifacts.document, tmp.path().join("figure.html"));

    let charts = renderer.charts.borrow();
    let (chart, base) = &charts[0];
    assert_eq!(chart.title, "Project X Trend");
    assert_eq!(base, &tmp.path().join("figure"));
    let statuses: Vec<Status> = chart.points.iter().map(|p| p.status).collect();
    assert_eq!(statuses, vec![Status::Start, Status::Better, Status::Same]);
}

#[test]
fn generate_trend_without_history_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let tracker = tracker_in(&tmp, &renderer);

    assert!(matches!(
        tracker.generate_trend(),
        Err(TrendError::EmptyHistory(_))
    ));
    assert!(renderer.charts.borrow().is_empty());
}

#[test]
fn estimated_trend_rewrites_estimate_store() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let tracker = tracker_in(&tmp, &renderer);
    fs::write(tracker.trend_store().path(), "2024-01-25 = 12\n2024-02-01 = 9\n").unwrap();
    fs::write(tracker.estimate_store().path(), "1999-01-01 = 1000\n").unwrap();

    tracker.generate_estimated_trend(4).unwrap();

    assert_eq!(
        tracker.estimate_store().read().unwrap(),
        vec![
            TrendPoint::new(date(2024, 1, 25), 12),
            TrendPoint::new(date(2024, 2, 1), 9),
            TrendPoint::new(date(2024, 2, 8), 5),
            TrendPoint::new(date(2024, 2, 15), 1),
            TrendPoint::new(date(2024, 2, 22), 0),
        ]
    );
    // The trend file itself is untouched.
    assert_eq!(tracker.trend_store().read().unwrap().len(), 2);

    let charts = renderer.charts.borrow();
    assert_eq!(charts[0].0.title, "Project X Estimated Trend");
    assert_eq!(charts[0].0.points.len(), 5);
    assert_eq!(charts[0].1, tmp.path().join("estimate"));
}

#[test]
fn estimated_trend_rejects_non_positive_decrement() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let tracker = tracker_in(&tmp, &renderer);
    fs::write(tracker.trend_store().path(), "2024-02-01 = 9\n").unwrap();

    assert!(matches!(
        tracker.generate_estimated_trend(0),
        Err(TrendError::InvalidDecrement(0))
    ));
    assert!(!tracker.estimate_store().path().exists());
}

#[test]
fn publish_replaces_report_card_attachments() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    tracker.initialize_cards().unwrap();

    assert!(tracker.publish().unwrap());

    let api = tracker.api();
    let uploads = api.uploads.borrow();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].card_id, "card-6");
    assert_eq!(uploads[0].path, tmp.path().join("figure.png"));
    assert!(uploads[0].cover);
    assert_eq!(uploads[1].path, tmp.path().join("estimate.png"));
    assert!(!uploads[1].cover);

    let attachments = api.attachments.borrow();
    let ids: Vec<&str> = attachments["card-6"].iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["att-new-1", "att-new-2"]);
}

#[test]
fn publish_without_report_card_is_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let mut api = sample_board();
    api.cards.retain(|c| c.name != "Weekly Report");
    let mut tracker = TrendTracker::builder()
        .data_dir(tmp.path())
        .renderer(RecordingRenderer::default())
        .build(api, BOARD_NAME)
        .unwrap();
    tracker.initialize_cards().unwrap();

    assert!(tracker.report_card().is_none());
    assert!(!tracker.publish().unwrap());
    assert!(tracker.api().uploads.borrow().is_empty());
}

#[test]
fn full_run_appends_then_charts_both_series() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);

    tracker.initialize_cards().unwrap();
    tracker.add_datapoint().unwrap();
    tracker.generate_trend().unwrap();
    tracker.generate_estimated_trend(4).unwrap();
    tracker.publish().unwrap();

    let charts = renderer.charts.borrow();
    assert_eq!(charts.len(), 2);
    assert_eq!(charts[0].0.points.len(), 1);
    // 8 days at 4 per week: two projected weeks.
    let values: Vec<u64> = charts[1].0.points.iter().map(|p| p.y).collect();
    assert_eq!(values, vec![8, 4, 0]);
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn default_run_options_are_valid() {
    let options = RunOptions::default();
    assert_eq!(options.weekly_decrement, 4);
    assert!(!options.add);
    assert!(options.publish);
    options.validate().unwrap();
}

#[test]
fn run_rejects_bad_decrement_before_fetching_cards() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    fs::write(tracker.trend_store().path(), "2024-02-01 = 9\n").unwrap();

    for est in [0, -3] {
        let options = RunOptions {
            weekly_decrement: est,
            ..RunOptions::default()
        };
        assert!(matches!(
            tracker.run(&options),
            Err(TrendError::InvalidDecrement(e)) if e == est
        ));
    }
    assert!(tracker.cards().is_empty());
    assert!(tracker.api().field_item_requests.borrow().is_empty());
    assert!(renderer.charts.borrow().is_empty());
    assert_eq!(tracker.trend_store().read().unwrap().len(), 1);
}

#[test]
fn run_with_add_appends_before_charting() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    fs::write(tracker.trend_store().path(), "2024-01-01 = 10\n").unwrap();

    let options = RunOptions {
        add: true,
        publish: false,
        ..RunOptions::default()
    };
    tracker.run(&options).unwrap();

    let charts = renderer.charts.borrow();
    let trend: Vec<u64> = charts[0].0.points.iter().map(|p| p.y).collect();
    assert_eq!(trend, vec![10, 8]);
    assert!(tracker.api().uploads.borrow().is_empty());
}

#[test]
fn run_without_add_charts_existing_history() {
    let tmp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let mut tracker = tracker_in(&tmp, &renderer);
    fs::write(tracker.trend_store().path(), "2024-01-01 = 10\n").unwrap();

    tracker.run(&RunOptions::default()).unwrap();

    assert_eq!(tracker.trend_store().read().unwrap().len(), 1);
    assert_eq!(renderer.charts.borrow()[0].0.points.len(), 1);
    assert_eq!(tracker.api().uploads.borrow().len(), 2);
}
