use ai_graph::{GridConnectivity, InfluenceConfig, InfluenceMap, NodeIndex, Vec2};

fn corridor() -> InfluenceMap {
    InfluenceMap::new(5, 1, 1.0, GridConnectivity::Four, InfluenceConfig::default())
}

#[test]
fn influence_spreads_one_ring_per_step() {
    let mut map = corridor();
    assert!(map.set_influence_at_position(Vec2::new(0.5, 0.5), 100.0));

    map.propagate_step();
    let first = map.influence(NodeIndex(1)).expect("cell 1");
    assert!(first > 0.0);
    assert_eq!(map.influence(NodeIndex(2)), Some(0.0));

    map.propagate_step();
    assert!(map.influence(NodeIndex(2)).expect("cell 2") > 0.0);

    // Strength falls off with distance from the source.
    for _ in 0..3 {
        map.propagate_step();
    }
    let near = map.influence(NodeIndex(1)).expect("cell 1");
    let far = map.influence(NodeIndex(4)).expect("cell 4");
    assert!(near > far, "near={near} far={far}");
}

#[test]
fn momentum_controls_how_much_a_node_keeps() {
    let config = InfluenceConfig {
        momentum: 1.0,
        ..InfluenceConfig::default()
    };
    let mut map = InfluenceMap::new(3, 1, 1.0, GridConnectivity::Four, config);
    map.set_influence_at_position(Vec2::new(0.5, 0.5), 50.0);
    map.propagate_step();

    assert_eq!(map.influence(NodeIndex(0)), Some(50.0));
    assert_eq!(map.influence(NodeIndex(1)), Some(0.0));
}

#[test]
fn propagation_waits_for_the_interval() {
    let mut map = corridor();
    map.set_influence_at_position(Vec2::new(0.5, 0.5), 100.0);

    assert!(!map.propagate_influence(0.02));
    assert!(!map.propagate_influence(0.02));
    assert_eq!(map.influence(NodeIndex(1)), Some(0.0));
    assert!(map.propagate_influence(0.02));
    assert!(map.influence(NodeIndex(1)).expect("cell 1") > 0.0);
}

#[test]
fn radius_sets_every_cell_center_in_range_and_clamps() {
    let mut map = InfluenceMap::new(5, 5, 1.0, GridConnectivity::Eight, InfluenceConfig::default());
    let count = map.set_influence_in_radius(Vec2::new(2.5, 2.5), 500.0, 1.0);
    assert_eq!(count, 5);
    assert_eq!(map.influence_at_position(Vec2::new(2.5, 3.5)), Some(100.0));
    assert_eq!(map.influence_at_position(Vec2::new(3.5, 3.5)), Some(0.0));
    assert_eq!(map.relative_influence(NodeIndex(12)), Some(1.0));
    assert_eq!(map.influence_at_position(Vec2::new(-1.0, 0.0)), None);
}

#[test]
fn removed_cells_block_propagation() {
    let mut map = corridor();
    assert!(map.remove_cell(1, 0));
    assert!(!map.remove_cell(1, 0));
    map.set_influence_at_position(Vec2::new(0.5, 0.5), 100.0);

    for _ in 0..5 {
        map.propagate_step();
    }
    assert_eq!(map.influence(NodeIndex(1)), None);
    assert_eq!(map.influence(NodeIndex(2)), Some(0.0));
    assert!(!map.set_influence_at_position(Vec2::new(1.5, 0.5), 1.0));
}

#[test]
fn reset_clears_influence_and_config_can_change() {
    let mut map = corridor();
    map.set_influence_at_position(Vec2::new(0.5, 0.5), 80.0);
    map.propagate_step();
    map.reset_influence();
    assert!((0..5).all(|i| map.influence(NodeIndex(i)) == Some(0.0)));

    map.set_config(InfluenceConfig {
        max_abs_influence: 10.0,
        ..map.config()
    });
    assert_eq!(map.config().max_abs_influence, 10.0);
    map.set_influence_at_position(Vec2::new(0.5, 0.5), 80.0);
    assert_eq!(map.influence(NodeIndex(0)), Some(10.0));
}
