use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::json;
use std::collections::HashSet;
use zoneedit::mapper::SurfaceMap;
use zoneedit::model::{Key, Mode};
use zoneedit::Editor;

proptest! {
    #[test]
    fn to_norm_round_trips_on_surface(px in 0.0f32..640.0, py in 0.0f32..480.0) {
        let map = SurfaceMap::new(640.0, 480.0);
        let (nx, ny) = map.to_norm(px, py);
        let (rx, ry) = map.to_px(nx, ny);
        prop_assert!((rx - px).abs() < 1e-2);
        prop_assert!((ry - py).abs() < 1e-2);
    }

    #[test]
    fn to_norm_always_clamps(px in -1e6f32..1e6, py in -1e6f32..1e6) {
        let map = SurfaceMap::new(640.0, 480.0);
        let (nx, ny) = map.to_norm(px, py);
        prop_assert!((0.0..=1.0).contains(&nx));
        prop_assert!((0.0..=1.0).contains(&ny));
    }
}

#[derive(Clone, Debug)]
enum Op {
    ReplaceZones { n: u8 },
    Begin,
    Cancel,
    Complete,
    Down { x: u16, y: u16 },
    Move { x: u16, y: u16 },
    Up,
    Leave,
    Press { key: u8 },
    Poll { dt: u8 },
    Disable(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4).prop_map(|n| Op::ReplaceZones { n }),
        Just(Op::Begin),
        Just(Op::Cancel),
        Just(Op::Complete),
        (any::<u16>(), any::<u16>()).prop_map(|(x, y)| Op::Down { x, y }),
        (any::<u16>(), any::<u16>()).prop_map(|(x, y)| Op::Move { x, y }),
        Just(Op::Up),
        Just(Op::Leave),
        (0u8..5).prop_map(|key| Op::Press { key }),
        any::<u8>().prop_map(|dt| Op::Poll { dt }),
        any::<bool>().prop_map(Op::Disable),
    ]
}

fn sample_zones(n: u8) -> serde_json::Value {
    let zones: Vec<_> = (0..n)
        .map(|i| {
            let off = i as f32 * 0.1;
            json!({
                "id": format!("z{i}"),
                "polygon": [
                    {"x": 0.1 + off, "y": 0.1}, {"x": 0.4 + off, "y": 0.1},
                    {"x": 0.4 + off, "y": 0.4}, {"x": 0.1 + off, "y": 0.4},
                ],
            })
        })
        .collect();
    json!(zones)
}

fn check_invariants(ed: &Editor) -> Result<(), TestCaseError> {
    let mut ids = HashSet::new();
    for z in ed.zones() {
        prop_assert!(z.polygon.len() >= 3, "polygon below floor: {z:?}");
        for v in &z.polygon {
            prop_assert!((0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y), "unclamped {v:?}");
        }
        prop_assert!(!z.id.trim().is_empty());
        prop_assert!(ids.insert(z.id.clone()), "duplicate id {}", z.id);
    }
    if let Some(zi) = ed.selected_zone() {
        prop_assert!(zi < ed.zones().len());
        if let Some(vi) = ed.selected_vertex() {
            prop_assert!(vi < ed.zones()[zi].polygon.len());
        }
    } else {
        prop_assert!(ed.selected_vertex().is_none(), "vertex selection without a zone");
    }
    if let Mode::DraggingVertex { zone, vertex } = ed.mode() {
        prop_assert!(zone < ed.zones().len() && vertex < ed.zones()[zone].polygon.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn op_sequences_preserve_store_invariants(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let mut ed = Editor::new();
        ed.set_surface_size(320.0, 240.0);
        ed.set_image(Some("frame.jpg".into()));
        let mut now = 0.0f64;
        for op in ops {
            match op {
                Op::ReplaceZones { n } => { ed.set_zones_value(&sample_zones(n)); }
                Op::Begin => { ed.begin_drawing(); }
                Op::Cancel => { ed.cancel_drawing(); }
                Op::Complete => { ed.complete_drawing(); }
                Op::Down { x, y } => { ed.pointer_down(x as f32 % 400.0, y as f32 % 300.0); }
                Op::Move { x, y } => {
                    now += 4.0;
                    ed.pointer_move(x as f32 % 400.0 - 40.0, y as f32 % 300.0 - 30.0, now);
                }
                Op::Up => { ed.pointer_up(); }
                Op::Leave => { ed.pointer_leave(); }
                Op::Press { key } => {
                    let key = [Key::Delete, Key::Backspace, Key::Escape, Key::Tab, Key::Enter][key as usize];
                    ed.key_down(key);
                }
                Op::Poll { dt } => {
                    now += dt as f64;
                    ed.poll(now);
                }
                Op::Disable(flag) => { ed.set_disabled(flag); }
            }
            check_invariants(&ed)?;
        }
    }
}
