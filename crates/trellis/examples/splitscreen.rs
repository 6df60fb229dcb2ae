//! Two viewers wander a grid of buttons, then the scene is dumped.
//!
//! Run with `cargo run --example splitscreen --features testing -- --steps 12`.

use anyhow::Result;
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trellis::{
    FocusManager, Scene, SceneConfig, WidgetKind, WidgetTemplate,
    docking::DockPadding,
    dump::{docking_table, dump_tree, dump_tree_plain},
    geom::Face,
    testing::grid::Grid,
    viewport::FixedViewport,
};

/// Command-line options.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grid rows
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Grid columns
    #[arg(long, default_value_t = 4)]
    cols: usize,

    /// Random moves per viewer
    #[arg(long, default_value_t = 8)]
    steps: usize,

    /// Seed for the move generator
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print without color escapes
    #[arg(long)]
    plain: bool,
}

pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = SceneConfig {
        active_viewers: 0b0011,
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(config).with_viewport(FixedViewport::new(640.0, 480.0));
    let grid = Grid::new(args.rows, args.cols).spacing(24.0, 4.0).build(&mut scene)?;

    let status = WidgetTemplate::new("status", WidgetKind::Label { text: "ready".into() })
        .dock(Face::Left, None, Face::Left, DockPadding::pixels(8.0))
        .dock(Face::Bottom, None, Face::Bottom, DockPadding::pixels(-8.0));
    let status = scene.create_widget(&status)?;
    scene.insert_child(grid.container, status)?;
    scene.set_auto_size(status, true, 2.0)?;

    let report = scene.update()?;
    info!(stages = ?report.stages, "first frame");

    let mut rng = StdRng::seed_from_u64(args.seed);
    for step in 0..args.steps {
        for viewer in 0..2 {
            let direction = Face::ALL[rng.random_range(0..Face::ALL.len())];
            let moved = scene.navigate_focus(direction, viewer)?;
            let focused = scene
                .focused_control(viewer)
                .and_then(|id| scene.widget(id).ok())
                .map(|w| w.name().to_string());
            info!(step, viewer, ?direction, moved, ?focused, "navigate");
        }
        scene.update()?;
    }

    let root = scene.root();
    let tree = if args.plain {
        dump_tree_plain(&scene, root)?
    } else {
        dump_tree(&scene, root)?
    };
    println!("{tree}");
    println!("{}", docking_table(&scene));
    Ok(())
}
