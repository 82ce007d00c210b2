use std::sync::Arc;

use clap::Parser;
use ns_path::{Goal, InventoryQuery, PathEvent, PathSettings, PathState, PathingBehavior};
use ns_sim::{AgentState, ControlIntent, step_tick};
use ns_utils::BlockPos;
use ns_world::{WorldGrid, block_state};
use tracing::{info, warn};

/// Plans and replays a route across a synthetic terrain, printing the
/// agent's progress tick by tick.
#[derive(Parser, Debug)]
#[command(name = "offline_nav")]
struct Args {
    /// Target x coordinate.
    #[arg(long, default_value_t = 40)]
    x: i32,
    /// Target z coordinate.
    #[arg(long, default_value_t = 8)]
    z: i32,
    /// Give up after this many world ticks.
    #[arg(long, default_value_t = 6000)]
    max_ticks: u32,
    /// Disable block breaking and placing.
    #[arg(long)]
    no_edits: bool,
}

const STONE: u16 = block_state(1, 0);
const DIRT: u16 = block_state(3, 0);

/// A hotbar with a stack of cobble, a water bucket and an iron pickaxe.
struct DemoInventory;

impl InventoryQuery for DemoInventory {
    fn has_throwaway_item(&self) -> bool {
        true
    }
    fn has_water_bucket(&self) -> bool {
        true
    }
    fn tool_speed_against(&self, _state: u16) -> f32 {
        6.0
    }
}

/// Rolling terrain with a gorge, a ridge and a soul sand patch, enough
/// to exercise most of the movement catalogue.
fn build_terrain() -> WorldGrid {
    let mut world = WorldGrid::default();
    for x in -16..64 {
        for z in -16..32 {
            let mut h: i32 = 64 + ((x / 7 + z / 9) % 3i32).abs();
            // Gorge across x = 18..20, three deep.
            if (18..=20).contains(&x) {
                h = 61;
            }
            // Ridge at x = 30, one jump high.
            if x == 30 {
                h += 1;
            }
            for y in 55..=h {
                world.set_block(BlockPos::new(x, y, z), if y == h { DIRT } else { STONE });
            }
        }
    }
    // Soul sand patch.
    for x in 8..12 {
        for z in 4..8 {
            let h: i32 = 64 + ((x / 7 + z / 9) % 3i32).abs();
            world.set_block(BlockPos::new(x, h, z), block_state(88, 0));
        }
    }
    world
}

fn surface_y(world: &WorldGrid, x: i32, z: i32) -> i32 {
    for y in (55..100).rev() {
        if world.block_at(x, y, z).is_some_and(|s| s != 0) {
            return y + 1;
        }
    }
    65
}

fn main() {
    tracing_subscriber::fmt().without_time().compact().init();
    let args = Args::parse();

    let mut world = Arc::new(build_terrain());
    let start = BlockPos::new(0, surface_y(&world, 0, 0), 0);
    let goal_pos = BlockPos::new(args.x, surface_y(&world, args.x, args.z), args.z);
    info!(?start, goal = ?goal_pos, "planning");

    let settings = PathSettings {
        allow_break: !args.no_edits,
        allow_place: !args.no_edits,
        ..PathSettings::default()
    };
    let mut behavior = PathingBehavior::new(settings, Arc::new(DemoInventory));
    let mut agent = AgentState {
        pos: start.center_bottom(),
        on_ground: true,
        ..Default::default()
    };
    behavior.set_goal_and_path(Goal::Block(goal_pos), start, &world);

    for tick in 0..args.max_ticks {
        let (output, event) = behavior.on_tick(&mut agent, &world);
        // Offline stand-in for the protocol layer: edits land instantly.
        // Their durations are already charged by the cost model.
        for intent in &output.intents {
            match *intent {
                ControlIntent::StartBreak { pos, .. } => {
                    Arc::make_mut(&mut world).set_block(pos, 0);
                }
                ControlIntent::Place { pos, face } => {
                    Arc::make_mut(&mut world).set_block(pos.shift(face), STONE);
                }
                _ => {}
            }
        }
        match event {
            Some(PathEvent::GoalReached) => {
                info!(tick, pos = ?BlockPos::from_feet(agent.pos), "arrived");
                return;
            }
            Some(PathEvent::CalculationFinished { found_path: false }) => {
                warn!(tick, "no path found, backing off");
            }
            _ => {}
        }
        if behavior.state() == PathState::Pathing {
            agent = step_tick(&agent, &output.input, &world);
        } else {
            // The search thread needs real time; a world tick is 50ms.
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        if tick % 100 == 0 {
            info!(tick, pos = ?BlockPos::from_feet(agent.pos), state = ?behavior.state(), "progress");
        }
    }
    warn!("tick budget exhausted before reaching the goal");
    std::process::exit(1);
}
