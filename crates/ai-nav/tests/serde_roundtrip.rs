#![cfg(feature = "serde")]

use ai_nav::{find_path, HeuristicKind, NavGraph, PathfindingConfig, Polygon, Vec2};

fn room() -> Polygon {
    let mut polygon = Polygon::rectangle(Vec2::new(0.0, 0.0), Vec2::new(8.0, 8.0));
    polygon.add_child(Polygon::rectangle(Vec2::new(3.0, 3.0), Vec2::new(5.0, 5.0)));
    polygon
}

#[test]
fn polygon_roundtrips_via_serde_without_derived_data() {
    let mut polygon = room();
    polygon.triangulate().expect("triangulate");

    let json = serde_json::to_string(&polygon).expect("serialize polygon");
    assert!(!json.contains("triangles"));
    let restored: Polygon = serde_json::from_str(&json).expect("deserialize polygon");
    assert_eq!(restored.points(), polygon.points());
    assert_eq!(restored.children(), room().children());
    assert!(restored.triangles().is_empty());

    let start = Vec2::new(0.5, 0.5);
    let goal = Vec2::new(7.5, 7.5);
    let a = NavGraph::from_polygon(room());
    let b = NavGraph::from_polygon(restored);
    assert_eq!(a.polygon().triangles(), b.polygon().triangles());
    assert_eq!(find_path(start, goal, &a, None), find_path(start, goal, &b, None));
}

#[test]
fn pathfinding_config_defaults_missing_fields() {
    let config: PathfindingConfig = serde_json::from_str("{}").expect("empty config");
    assert_eq!(config, PathfindingConfig::default());
    assert_eq!(config.heuristic, HeuristicKind::Euclidean);

    let config: PathfindingConfig =
        serde_json::from_str(r#"{"heuristic":"manhattan"}"#).expect("manhattan config");
    assert_eq!(config.heuristic, HeuristicKind::Manhattan);
}
