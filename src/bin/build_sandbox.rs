//! Build Sandbox
//!
//! Headless driver for the building engine: assembles a sample structure
//! through the placement tool, or replays a saved building document and
//! reports what came out.
//!
//! Run with: cargo run --bin build_sandbox -- demo --save house.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use glam::Vec3;

use keystone_engine::game::building::PrefabHandle;
use keystone_engine::game::{
    BuildConfig, BuildError, BuildResult, Building, BuildingDocument, BuildingId, BuildingManager,
    PartKind, PartSpawner, PlacementFault, PlacementTool, PROTOTYPING,
};
use keystone_engine::physics::Pose;

#[derive(Parser)]
#[command(name = "build_sandbox", about = "Assemble and inspect socket-snapped buildings")]
struct Cli {
    /// Build config JSON (missing fields keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a small house through the placement tool
    Demo {
        /// Write the resulting building document here
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Replay a building document and print its parts and slots
    Inspect {
        /// Building document (.json)
        path: PathBuf,
    },
}

/// Spawner that only numbers the parts it is asked to create
#[derive(Default)]
struct LogSpawner {
    spawned: usize,
}

impl PartSpawner for LogSpawner {
    type Handle = usize;

    fn spawn(&mut self, kind: PartKind, prefab: PrefabHandle) -> usize {
        self.spawned += 1;
        log::debug!("[Spawn] #{} {:?} from {}", self.spawned, kind, prefab.0);
        self.spawned
    }

    fn set_pose(&mut self, handle: &usize, pose: Pose) {
        log::debug!(
            "[Spawn] #{handle} -> ({:.2}, {:.2}, {:.2})",
            pose.position.x,
            pose.position.y,
            pose.position.z
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> BuildResult<()> {
    let config = match &cli.config {
        Some(path) => BuildConfig::load(path)?,
        None => BuildConfig::default(),
    };
    let mut manager = BuildingManager::with_standard_types(config);

    match cli.command {
        Command::Demo { save } => {
            let id = build_demo_house(&mut manager)?;
            print_summary(&manager, id)?;
            if let Some(path) = save {
                manager.document(id)?.save(&path)?;
            }
        }
        Command::Inspect { path } => {
            let id = inspect(&mut manager, &path)?;
            print_summary(&manager, id)?;
        }
    }
    Ok(())
}

/// Two foundation tiles, three walls, a window wall, a stacked wall and stairs
fn build_demo_house(manager: &mut BuildingManager) -> BuildResult<BuildingId> {
    let steps = [
        (PartKind::RectFoundation, Vec3::ZERO),
        (PartKind::RectFoundation, Vec3::new(2.1, 0.0, 0.0)),
        (PartKind::Wall, Vec3::new(0.0, 0.0, 1.05)),
        (PartKind::Wall, Vec3::new(-1.05, 0.0, 0.0)),
        (PartKind::Wall, Vec3::new(0.0, 0.0, -1.05)),
        (PartKind::WindowWall, Vec3::new(2.0, 0.0, 1.1)),
        (PartKind::Wall, Vec3::new(0.0, 2.1, 1.0)),
        (PartKind::Stairs, Vec3::new(0.1, 0.0, 2.0)),
    ];

    let mut tool = PlacementTool::new(PROTOTYPING, PartKind::RectFoundation);
    let mut spawner = LogSpawner::default();
    let mut building = None;

    for (kind, cursor) in steps {
        tool.select(kind);
        let preview = tool.update(manager, Pose::from_position(cursor))?;
        if !preview.can_build {
            log::warn!("[Demo] cannot place {kind:?} near {cursor}, skipping");
            continue;
        }
        if let Some(placed) = tool.confirm(manager, &mut spawner)? {
            building.get_or_insert(placed.building);
        }
    }

    building.ok_or(BuildError::InvalidPlacement {
        kind: PartKind::RectFoundation,
        fault: PlacementFault::NotAFoundation,
    })
}

fn inspect(manager: &mut BuildingManager, path: &Path) -> BuildResult<BuildingId> {
    let document = BuildingDocument::load(path)?;
    manager.load_document(&document)
}

fn print_summary(manager: &BuildingManager, id: BuildingId) -> BuildResult<()> {
    let building: &Building = manager.get(id)?;

    println!("Building {id} ({})", manager.type_of(id)?);
    println!("  parts:");
    for (index, part) in building.parts().iter().enumerate() {
        let p = part.pose.position;
        let attached = part
            .consumed
            .map(|slot| format!("on {slot}"))
            .unwrap_or_else(|| "free".to_string());
        println!(
            "    [{index}] {} {:?} at ({:.2}, {:.2}, {:.2}) {attached}",
            part.id, part.kind, p.x, p.y, p.z
        );
    }

    let slots = building.slots();
    println!("  slots: {} ({} occupied)", slots.len(), slots.occupied_count());
    if let Some(bounds) = building.bounds() {
        println!(
            "  bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }
    println!("  mesh: {} triangles", building.mesh().triangle_count());
    Ok(())
}
