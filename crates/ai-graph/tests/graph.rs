use ai_graph::{
    Connection, Graph, GraphConnection, GraphError, GraphNode2D, GridConnectivity, GridGraph,
    NodeIndex, Vec2,
};

fn node(x: f32, y: f32) -> GraphNode2D {
    GraphNode2D::new(Vec2::new(x, y))
}

#[test]
fn graph_connection_cost_defaults_to_distance() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(3.0, 4.0));
    graph.add_connection(a, b).expect("valid nodes");

    let c = graph.connection(a, b).expect("connection");
    assert!((c.cost() - 5.0).abs() < 1e-6);

    // Undirected: traversable both ways, reported once.
    let back = graph.connection(b, a).expect("mirrored connection");
    assert_eq!(back.from(), b);
    assert_eq!(back.to(), a);
    assert_eq!(graph.connection_count(), 1);
    assert_eq!(graph.node_connections(b).len(), 1);
}

#[test]
fn directed_graph_does_not_mirror_connections() {
    let mut graph: Graph<GraphNode2D> = Graph::directed();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(1.0, 0.0));
    graph.add_connection(a, b).expect("valid nodes");

    assert!(graph.connection(a, b).is_some());
    assert!(graph.connection(b, a).is_none());
    assert!(graph.node_connections(b).is_empty());
}

#[test]
fn graph_rejects_connections_to_missing_nodes() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));

    assert_eq!(
        graph.add_connection(a, NodeIndex(7)),
        Err(GraphError::InvalidNode(NodeIndex(7)))
    );
    assert_eq!(
        graph.add_connection_with_cost(a, a, 1.0),
        Err(GraphError::SelfConnection(a))
    );
    assert_eq!(graph.connection_count(), 0);
}

#[test]
fn removing_a_node_keeps_indices_stable_and_drops_its_connections() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(1.0, 0.0));
    let c = graph.add_node(node(2.0, 0.0));
    graph.add_connection(a, b).expect("a-b");
    graph.add_connection(b, c).expect("b-c");
    graph.add_connection(a, c).expect("a-c");

    assert!(graph.remove_node(b).is_some());
    assert!(!graph.is_node_valid(b));
    assert!(graph.node(b).is_none());
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.connection_count(), 1);
    assert!(graph.node_connections(a).iter().all(|c| c.to != b));

    // Slots are never reused.
    let d = graph.add_node(node(3.0, 0.0));
    assert_eq!(d, NodeIndex(3));
    assert_eq!(graph.node_pos(c), Some(Vec2::new(2.0, 0.0)));
}

#[test]
fn remove_connection_removes_both_directions_when_undirected() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(1.0, 0.0));
    graph.add_connection(a, b).expect("a-b");

    assert!(graph.remove_connection(b, a));
    assert!(graph.connection(a, b).is_none());
    assert!(graph.connection(b, a).is_none());
    assert!(!graph.remove_connection(a, b));
}

#[test]
fn cloned_graph_is_independent() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(1.0, 0.0));
    graph.add_connection(a, b).expect("a-b");

    let mut scratch = graph.clone();
    let s = scratch.add_node(node(5.0, 5.0));
    scratch.add_connection(s, a).expect("s-a");
    scratch.node_mut(a).expect("a").position = Vec2::new(-1.0, -1.0);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.connection_count(), 1);
    assert_eq!(graph.node_pos(a), Some(Vec2::new(0.0, 0.0)));
    assert_eq!(scratch.node_count(), 3);
    assert_eq!(scratch.connection_count(), 2);
}

#[test]
fn node_lookup_by_world_position_picks_the_closest_in_radius() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let _a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(2.0, 0.0));

    assert_eq!(graph.node_idx_at_world_pos(Vec2::new(1.8, 0.1), 0.5), Some(b));
    assert_eq!(graph.node_idx_at_world_pos(Vec2::new(1.0, 5.0), 0.5), None);
}

#[test]
fn connection_costs_can_be_reset_to_distance() {
    let mut graph: Graph<GraphNode2D, Connection> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(0.0, 2.0));
    graph.add_connection_with_cost(a, b, 10.0).expect("a-b");
    assert_eq!(graph.path_cost(&[a, b]), Some(10.0));

    graph.set_connection_costs_to_distance();
    assert_eq!(graph.path_cost(&[a, b]), Some(2.0));
    assert_eq!(graph.path_cost(&[b, a]), Some(2.0));
    assert_eq!(graph.path_cost(&[a, NodeIndex(9)]), None);
}

#[test]
fn clear_empties_the_graph_and_restarts_indices() {
    let mut graph: Graph<GraphNode2D> = Graph::undirected();
    let a = graph.add_node(node(0.0, 0.0));
    let b = graph.add_node(node(1.0, 0.0));
    graph.add_connection(a, b).expect("a-b");
    assert_eq!(b.index(), 1);

    graph.clear();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.connection_count(), 0);
    assert!(!graph.is_node_valid(a));
    assert_eq!(graph.next_free_node_index().index(), 0);
}

#[test]
fn grid_graph_hands_over_its_graph() {
    let grid: GridGraph<GraphNode2D> =
        GridGraph::new(3, 2, 1.0, GridConnectivity::Four, GraphNode2D::new);
    assert_eq!(grid.columns(), 3);
    assert_eq!(grid.rows(), 2);
    assert_eq!(grid.connectivity(), GridConnectivity::Four);

    let corner = grid.node_idx_at_cell(2, 1).expect("corner cell");
    assert_eq!(corner.index(), 5);

    // Two rows of two horizontal links plus three vertical links.
    let graph = grid.into_graph();
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.connection_count(), 7);
    assert_eq!(graph.node_pos(corner), Some(Vec2::new(2.5, 1.5)));
}
