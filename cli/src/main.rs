use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use floorsight::config::{Config, ConfigError};
use floorsight::engine::{Engine, EngineError, Scene, ViewContext};
use floorsight::geom::{Point, Vector};
use floorsight::lighting::LitRegion;
use floorsight::mesh::Purpose;
use floorsight::registry::FloorId;
use floorsight::shape::Viewer;
use floorsight::units::Camera;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read scene {path}: {source}")]
    ReadScene { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no {purpose:?} mesh for floor {floor}")]
    MissingMesh { purpose: Purpose, floor: FloorId },
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floorsight", about = "Run vision and collision queries against a scene file")]
struct Cli {
    /// Scene JSON with floors, walls and shapes.
    #[arg(long, env = "FLOORSIGHT_SCENE")]
    scene: PathBuf,

    /// Replace the scene's configuration with `FLOORSIGHT_*` overrides.
    #[arg(long, default_value_t = false)]
    env_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the meshes of a floor.
    Mesh {
        #[arg(long, default_value_t = 0)]
        floor: FloorId,
    },
    /// Visibility polygon from a point.
    Visibility {
        #[arg(long, default_value_t = 0)]
        floor: FloorId,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
    /// Drag shapes and report the translation the walls allow.
    Drag(DragArgs),
    /// Lit regions of a floor for a viewer.
    Lights(LightsArgs),
}

#[derive(Args, Debug)]
struct DragArgs {
    /// Shapes to move together.
    #[arg(long = "shape", required = true)]
    shapes: Vec<Uuid>,
    #[arg(long, allow_hyphen_values = true)]
    dx: f64,
    #[arg(long, allow_hyphen_values = true)]
    dy: f64,
    /// Pull outlines toward their centers before testing walls.
    #[arg(long, default_value_t = false)]
    shrink: bool,
}

#[derive(Args, Debug)]
struct LightsArgs {
    #[arg(long, default_value_t = 0)]
    floor: FloorId,
    #[arg(long, env = "FLOORSIGHT_VIEWER", default_value = "")]
    viewer: String,
    #[arg(long, default_value_t = false)]
    dm: bool,
    #[arg(long, default_value_t = false)]
    full_fow: bool,
    /// Tokens the viewer is playing.
    #[arg(long = "active")]
    active_tokens: Vec<Uuid>,
    /// Viewport size as `WIDTHxHEIGHT` for light culling.
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<(f64, f64)>,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_y: f64,
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let mut engine = load_engine(&cli)?;

    let output = match cli.command {
        Command::Mesh { floor } => run_mesh(&engine, floor)?,
        Command::Visibility { floor, x, y } => json!({ "polygon": engine.visibility(floor, Point::new(x, y)) }),
        Command::Drag(args) => run_drag(&mut engine, &args)?,
        Command::Lights(args) => run_lights(&engine, args),
    };
    print_json(&output)
}

fn load_engine(cli: &Cli) -> Result<Engine, CliError> {
    let raw = std::fs::read_to_string(&cli.scene)
        .map_err(|source| CliError::ReadScene { path: cli.scene.clone(), source })?;
    let mut scene = Scene::from_json(&raw)?;
    if cli.env_config {
        scene.config = Config::from_env()?;
    }
    scene.config.validate()?;
    let engine = Engine::from_scene(scene)?;
    info!(scene = %cli.scene.display(), "cli: scene loaded");
    Ok(engine)
}

fn run_mesh(engine: &Engine, floor: FloorId) -> Result<Value, CliError> {
    let mut out = serde_json::Map::new();
    for purpose in Purpose::ALL {
        let mesh = engine.registry().get(purpose, floor).ok_or(CliError::MissingMesh { purpose, floor })?;
        out.insert(
            serde_json::to_value(purpose)?.as_str().unwrap_or("mesh").to_owned(),
            json!({
                "vertices": mesh.vertices().len(),
                "triangles": mesh.len(),
                "blocking_edges": mesh.blocking_edges().len(),
            }),
        );
    }
    Ok(Value::Object(out))
}

fn run_drag(engine: &mut Engine, args: &DragArgs) -> Result<Value, CliError> {
    let requested = Vector::new(args.dx, args.dy);
    let applied = engine.drag_selection(&args.shapes, requested, args.shrink)?;
    let centers: Vec<Value> = args
        .shapes
        .iter()
        .filter_map(|id| engine.shape(id))
        .map(|s| json!({ "id": s.id, "center": s.center() }))
        .collect();
    Ok(json!({ "requested": requested, "applied": applied, "shapes": centers }))
}

fn run_lights(engine: &Engine, args: LightsArgs) -> Value {
    let viewer = Viewer { name: args.viewer, is_dm: args.dm };
    let view = ViewContext {
        floor: args.floor,
        viewer,
        camera: Camera { pan_x: args.pan_x, pan_y: args.pan_y, zoom: args.zoom },
        viewport: args.viewport,
        full_fow: args.full_fow,
        active_tokens: args.active_tokens,
    };
    let regions: Vec<Value> = engine.lit_regions(&view).iter().map(region_json).collect();
    json!({ "regions": regions })
}

fn region_json(region: &LitRegion) -> Value {
    json!({
        "shape": region.shape,
        "aura": region.aura,
        "center": region.center,
        "inner_radius": region.inner_radius,
        "outer_radius": region.outer_radius,
        "polygon": region.polygon,
    })
}

fn parse_viewport(raw: &str) -> Result<(f64, f64), String> {
    let Some((w, h)) = raw.split_once(['x', 'X']) else {
        return Err(format!("expected WIDTHxHEIGHT, got {raw:?}"));
    };
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok((parse(w)?, parse(h)?))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
