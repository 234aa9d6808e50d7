//! Publish throttling during drags: coalescing, cadence, and the
//! unconditional final flush.

use serde_json::json;
use zoneedit::Editor;

fn dragging_editor() -> Editor {
    let mut ed = Editor::new();
    ed.set_surface_size(100.0, 100.0);
    ed.set_image(Some("frame.jpg".into()));
    ed.set_zones_value(&json!([{
        "id": "a",
        "polygon": [
            {"x": 0.2, "y": 0.2}, {"x": 0.8, "y": 0.2},
            {"x": 0.8, "y": 0.8}, {"x": 0.2, "y": 0.8},
        ],
    }]));
    ed
}

#[test]
fn rapid_moves_in_one_window_publish_once() {
    let mut ed = dragging_editor();
    ed.pointer_down(20.0, 20.0);
    let mut publishes = 0;
    for i in 0..8 {
        let now = i as f64 * 2.0; // all inside one 100ms window
        let out = ed.pointer_move(22.0 + i as f32, 20.0, now);
        if out.publish {
            publishes += 1;
        }
    }
    let out = ed.pointer_up();
    if out.publish {
        publishes += 1;
    }
    assert_eq!(publishes, 1, "N coalesced moves + up = exactly one publish");
    // And it reflects the last move, not an earlier one
    let v = ed.zones()[0].polygon[0];
    assert!((v.x - 0.29).abs() < 1e-4, "got {}", v.x);
}

#[test]
fn long_drag_publishes_on_window_cadence() {
    let mut ed = dragging_editor();
    ed.pointer_down(20.0, 20.0);
    let mut publish_times = Vec::new();
    let mut now = 0.0;
    while now <= 400.0 {
        ed.pointer_move(20.0 + (now / 10.0) as f32, 20.0, now);
        // The host drives poll on every frame while work is pending
        if ed.poll(now).publish {
            publish_times.push(now);
        }
        now += 16.0;
    }
    assert!(
        (3..=5).contains(&publish_times.len()),
        "expected ~1 publish per 100ms over 400ms, got {publish_times:?}"
    );
    for pair in publish_times.windows(2) {
        assert!(pair[1] - pair[0] >= 100.0, "publishes closer than the window: {publish_times:?}");
    }
}

#[test]
fn final_flush_lands_inside_the_window() {
    let mut ed = dragging_editor();
    ed.pointer_down(20.0, 20.0);
    ed.pointer_move(25.0, 20.0, 0.0);
    assert!(ed.poll(16.0).publish, "first deferral fires on the next frame");
    // Still inside the fresh window when the drag ends
    ed.pointer_move(40.0, 20.0, 30.0);
    assert!(!ed.poll(31.0).publish);
    let out = ed.pointer_up();
    assert!(out.publish, "drag end publishes even inside the window");
    assert!(!ed.needs_poll(), "nothing left pending after the flush");
    let v = ed.zones()[0].polygon[0];
    assert!((v.x - 0.4).abs() < 1e-4);
}

#[test]
fn pointer_leave_acts_as_drag_end() {
    let mut ed = dragging_editor();
    ed.pointer_down(20.0, 20.0);
    ed.pointer_move(33.0, 20.0, 0.0);
    let out = ed.pointer_leave();
    assert!(out.publish);
    assert!(!ed.needs_poll());
    assert_eq!(ed.hover(), None, "leave also ends hover");
}

#[test]
fn hover_recompute_waits_for_the_quiet_period() {
    let mut ed = dragging_editor();
    let out = ed.pointer_move(20.0, 20.0, 0.0);
    assert!(out.schedule && !out.redraw);
    assert!(!ed.poll(30.0).redraw, "debounce not elapsed yet");
    assert_eq!(ed.hover(), None);
    let out = ed.poll(60.0);
    assert!(out.redraw);
    assert!(matches!(ed.hover(), Some(zoneedit::model::Hit::Vertex { zone: 0, vertex: 0, .. })));
    // A fresh move restarts the quiet period
    ed.pointer_move(50.0, 50.0, 70.0);
    assert!(!ed.poll(100.0).redraw);
    assert!(ed.poll(125.0).redraw);
    assert!(matches!(ed.hover(), Some(zoneedit::model::Hit::Body { zone: 0 })));
}
