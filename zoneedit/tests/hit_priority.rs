//! Hit-testing priority across overlapping zones, exercised through the
//! editor's public surface.

use serde_json::json;
use zoneedit::model::Hit;
use zoneedit::Editor;

fn editor(zones: serde_json::Value) -> Editor {
    let mut ed = Editor::new();
    ed.set_surface_size(200.0, 200.0);
    ed.set_image(Some("frame.jpg".into()));
    ed.set_zones_value(&zones);
    ed
}

#[test]
fn vertex_wins_over_enclosing_body_regardless_of_order() {
    // Zone "inner" has a vertex at (0.4, 0.4), which lies strictly inside
    // the body of "outer". Try both list orders.
    let inner = json!({
        "id": "inner",
        "polygon": [
            {"x": 0.4, "y": 0.4}, {"x": 0.5, "y": 0.4}, {"x": 0.5, "y": 0.5}, {"x": 0.4, "y": 0.5},
        ],
    });
    let outer = json!({
        "id": "outer",
        "polygon": [
            {"x": 0.1, "y": 0.1}, {"x": 0.9, "y": 0.1}, {"x": 0.9, "y": 0.9}, {"x": 0.1, "y": 0.9},
        ],
    });

    let ed = editor(json!([inner.clone(), outer.clone()]));
    let hit = ed.hit_test(80.0, 80.0);
    assert!(matches!(hit, Some(Hit::Vertex { zone: 0, vertex: 0, .. })), "got {hit:?}");

    let ed = editor(json!([outer, inner]));
    let hit = ed.hit_test(80.0, 80.0);
    assert!(matches!(hit, Some(Hit::Vertex { zone: 1, vertex: 0, .. })), "got {hit:?}");
}

#[test]
fn selected_zone_probed_before_later_siblings() {
    // Two coincident rings; the selected one must win no matter where it
    // sits in the list.
    let ring = json!([
        {"x": 0.25, "y": 0.25}, {"x": 0.75, "y": 0.25},
        {"x": 0.75, "y": 0.75}, {"x": 0.25, "y": 0.75},
    ]);
    let mut ed = editor(json!([
        {"id": "a", "polygon": ring},
        {"id": "b", "polygon": ring},
    ]));

    assert!(matches!(ed.hit_test(100.0, 100.0), Some(Hit::Body { zone: 0 })));
    ed.select_zone(Some(1));
    assert!(matches!(ed.hit_test(100.0, 100.0), Some(Hit::Body { zone: 1 })));
    assert!(matches!(ed.hit_test(50.0, 50.0), Some(Hit::Vertex { zone: 1, vertex: 0, .. })));
}

#[test]
fn edges_shadow_interiors_but_not_vertices() {
    let ed = editor(json!([{
        "id": "a",
        "polygon": [
            {"x": 0.25, "y": 0.25}, {"x": 0.75, "y": 0.25},
            {"x": 0.75, "y": 0.75}, {"x": 0.25, "y": 0.75},
        ],
    }]));
    // Just inside the bottom edge: edge hit, not body
    let hit = ed.hit_test(100.0, 146.0);
    assert!(matches!(hit, Some(Hit::Edge { zone: 0, edge: 2, .. })), "got {hit:?}");
    // Near a corner both a vertex and two edges qualify; the vertex wins
    let hit = ed.hit_test(52.0, 52.0);
    assert!(matches!(hit, Some(Hit::Vertex { zone: 0, vertex: 0, .. })), "got {hit:?}");
}

#[test]
fn misses_return_none() {
    let ed = editor(json!([{
        "id": "a",
        "polygon": [
            {"x": 0.25, "y": 0.25}, {"x": 0.75, "y": 0.25},
            {"x": 0.75, "y": 0.75}, {"x": 0.25, "y": 0.75},
        ],
    }]));
    assert_eq!(ed.hit_test(10.0, 10.0), None);
    assert_eq!(ed.hit_test(190.0, 100.0), None);
}
