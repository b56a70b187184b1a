//! End-to-end playthroughs of both chapters through the public API.

use sprout_engine::runtime::{self, DemoOptions};
use sprout_engine::signals::PlayRequest;
use sprout_engine::trackers::DepositItem;
use sprout_engine::{ChapterOneSequencer, StageContext};
use sprout_script::demo;

const DT: f32 = 1.0 / 30.0;

fn run_secs(seq: &mut ChapterOneSequencer, stage: &mut StageContext, secs: f32) {
    let ticks = (secs / DT).ceil() as usize;
    for _ in 0..ticks {
        seq.advance(DT, stage);
    }
}

fn show_count(events: &[String], index: usize) -> usize {
    let prefix = format!("dialog.show {index} ");
    events.iter().filter(|e| e.starts_with(&prefix)).count()
}

#[test]
fn chapter_one_playthrough_plays_each_line_once_and_hands_off() {
    let report = runtime::run_chapter_one(DemoOptions::default());

    for index in 0..=11 {
        assert_eq!(
            show_count(&report.events, index),
            1,
            "line {index} should play exactly once"
        );
    }
    for index in 12..25 {
        assert_eq!(
            show_count(&report.events, index),
            0,
            "line {index} belongs to the next scene"
        );
    }
    assert_eq!(report.pending_scene.as_deref(), Some("chapter_3"));
    assert!(report
        .events
        .iter()
        .any(|e| e == "scene.switch chapter_3"));
}

#[test]
fn chapter_one_rejects_jumps_past_the_gate() {
    let mut stage = StageContext::new(false);
    let mut seq = ChapterOneSequencer::new(demo::chapter_one());
    run_secs(&mut seq, &mut stage, 60.0);
    assert_eq!(seq.next_allowed(), 4);

    let sender = seq.play_sender();
    sender.send(PlayRequest::ordered(13));
    run_secs(&mut seq, &mut stage, 30.0);
    assert!(!seq.has_played(13));
    assert!(stage
        .events()
        .iter()
        .any(|e| e.starts_with("dialog.reject 13")));
}

#[test]
fn chapter_one_smaller_auto_count_stops_earlier() {
    let mut config = demo::chapter_one();
    config.first_auto_count = 2;
    let mut stage = StageContext::new(false);
    let mut seq = ChapterOneSequencer::new(config);
    run_secs(&mut seq, &mut stage, 60.0);

    assert!(seq.has_played(0));
    assert!(seq.has_played(1));
    assert!(!seq.has_played(2));
    assert_eq!(seq.next_allowed(), 2);
}

#[test]
fn chapter_one_early_watering_completes_on_the_sixth_seed() {
    let mut stage = StageContext::new(false);
    let mut seq = ChapterOneSequencer::new(demo::chapter_one());
    run_secs(&mut seq, &mut stage, 60.0);

    let sender = seq.play_sender();
    for index in 4..=8 {
        sender.send(PlayRequest::ordered(index));
        run_secs(&mut seq, &mut stage, 60.0);
    }
    assert!(seq.is_waiting_for_seeds());

    for pot in 0..5 {
        let item = DepositItem::new(&format!("seed_{pot}"), "Seed");
        seq.pots()[pot].borrow_mut().on_item_enter(&item, &mut stage);
    }
    run_secs(&mut seq, &mut stage, 1.0);

    // Water before the last seed: remembered, not acted on.
    seq.notify_watering_done(&mut stage);
    run_secs(&mut seq, &mut stage, 5.0);
    assert!(!seq.has_played(11));

    let item = DepositItem::new("seed_5", "Seed");
    seq.pots()[5].borrow_mut().on_item_enter(&item, &mut stage);
    run_secs(&mut seq, &mut stage, 60.0);
    assert!(seq.has_played(11));
    assert_eq!(stage.pending_scene(), Some("chapter_3"));
}

#[test]
fn chapter_three_playthrough_covers_measure_graphs_and_quiz() {
    let report = runtime::run_chapter_three(DemoOptions::default());

    for index in [9, 12, 17, 19, 20, 21, 22, 23, 24] {
        assert_eq!(
            show_count(&report.events, index),
            1,
            "line {index} should play exactly once"
        );
    }
    assert_eq!(show_count(&report.events, 18), 0);

    assert!(report.events.iter().any(|e| e == "chapter3.pot_gate"));
    assert!(report.events.iter().any(|e| e == "chapter3.gate_open"));
    assert!(report.events.iter().any(|e| e == "chapter3.all_measured"));
    assert!(report.events.iter().any(|e| e == "skybox.black"));
    assert!(report.events.iter().any(|e| e == "skybox.restore"));
    assert!(report.events.iter().any(|e| e == "audio.cue sfx.winning"));

    let snaps = report
        .events
        .iter()
        .filter(|e| e.starts_with("ruler.snap"))
        .count();
    assert_eq!(snaps, 6);
}

#[test]
fn event_log_json_round_trips_through_disk() {
    let report = runtime::run_chapter_one(DemoOptions {
        ticks_per_second: 20,
        verbose: false,
    });
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("chapter_one.json");
    runtime::write_event_log(&path, &report).expect("write event log");

    let raw = std::fs::read_to_string(&path).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    assert_eq!(value["chapter"], "one");
    assert_eq!(value["lines_played"], 12);
    assert!(value["events"]
        .as_array()
        .map(|events| !events.is_empty())
        .unwrap_or(false));
}
