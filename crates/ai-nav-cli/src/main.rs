//! navkit - polygon navigation scenes from the command line.
//!
//! - `navkit graph` - build the navigation graph and print its size
//! - `navkit path` - find one path
//! - `navkit query` - run every query listed in the scene

mod scene;

use std::path::{Path, PathBuf};

use ai_nav::{find_path_with_config, NavGraph, PathDebug, Portal, Vec2};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use scene::{parse_point, to_vec2, SceneConfig};

#[derive(Parser)]
#[command(name = "navkit")]
#[command(about = "Polygon navigation meshes and path queries", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the navigation graph and print its size
    Graph {
        /// Scene file (YAML)
        #[arg(long)]
        scene: PathBuf,
    },

    /// Find a path between two points
    Path {
        /// Scene file (YAML)
        #[arg(long)]
        scene: PathBuf,

        /// Start point as `x,y`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Vec2,

        /// End point as `x,y`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Vec2,

        /// Print the path with graph nodes and portals as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every query listed in the scene
    Query {
        /// Scene file (YAML)
        #[arg(long)]
        scene: PathBuf,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct PathReport {
    from: Vec2,
    to: Vec2,
    path: Vec<Vec2>,
    nodes: Vec<Vec2>,
    portals: Vec<Portal>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Graph { scene } => show_graph(&scene),
        Commands::Path {
            scene,
            from,
            to,
            json,
        } => {
            let (config, nav) = load(&scene)?;
            let report = run_query(&nav, &config, from, to);
            print_reports(&[report], json)
        }
        Commands::Query { scene, json } => {
            let (config, nav) = load(&scene)?;
            if config.queries.is_empty() {
                tracing::warn!(scene = %scene.display(), "scene lists no queries");
            }
            let reports: Vec<PathReport> = config
                .queries
                .iter()
                .map(|q| run_query(&nav, &config, to_vec2(q.from), to_vec2(q.to)))
                .collect();
            print_reports(&reports, json)
        }
    }
}

fn load(path: &Path) -> Result<(SceneConfig, NavGraph)> {
    let config = SceneConfig::load(path)?;
    tracing::info!(
        scene = %path.display(),
        obstacles = config.obstacles.len(),
        agent_radius = config.agent_radius,
        "Building navigation graph"
    );
    let nav = config.build_nav_graph();
    if nav.is_empty() {
        tracing::warn!(scene = %path.display(), "scene has no walkable area");
    }
    Ok((config, nav))
}

fn show_graph(path: &Path) -> Result<()> {
    let (_, nav) = load(path)?;
    let polygon = nav.polygon();

    println!("Scene: {}", path.display());
    println!("Triangles:   {}", polygon.triangles().len());
    println!("Lines:       {}", polygon.lines().len());
    println!("Nodes:       {}", nav.graph().node_count());
    println!("Connections: {}", nav.graph().connection_count());
    Ok(())
}

fn run_query(nav: &NavGraph, config: &SceneConfig, from: Vec2, to: Vec2) -> PathReport {
    let mut debug = PathDebug::default();
    let path = find_path_with_config(from, to, nav, &config.pathfinding, Some(&mut debug));
    PathReport {
        from,
        to,
        path,
        nodes: debug.node_positions,
        portals: debug.portals,
    }
}

fn print_reports(reports: &[PathReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        print!(
            "({}, {}) -> ({}, {}): ",
            report.from.x, report.from.y, report.to.x, report.to.y
        );
        if report.path.is_empty() {
            println!("no path");
            continue;
        }
        let points: Vec<String> = report
            .path
            .iter()
            .map(|p| format!("({:.3}, {:.3})", p.x, p.y))
            .collect();
        println!("{}", points.join(" -> "));
    }
    Ok(())
}
