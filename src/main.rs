//! Mob Stack - interactive demo
//!
//! Runs the stack engine against the in-memory world. Creatures are spawned
//! at random, the merge pass folds them into stacks, and the stacking tool
//! can be used on any listed creature. While a size prompt is open, any line
//! that is not a command is sent to it as chat input.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mob_stack::core::types::{EntityId, EntityKind, UserId, Vec2};
use mob_stack::ecs::world::SimWorld;
use mob_stack::host::{Inbox, StackWorld, TagMap};
use mob_stack::simulation::{run_merge_pass, run_simulation_tick};
use mob_stack::tool::{ToolController, ToolOutcome};
use mob_stack::{Result, StackConfig, StackEngine};

/// Interactive stack engine demo
#[derive(Parser, Debug)]
#[command(name = "mob-stack")]
#[command(about = "Merge, slice and edit creature stacks in a toy world")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Creatures spawned at startup
    #[arg(long, default_value_t = 12)]
    populate: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

const KINDS: [&str; 3] = ["zombie", "cow", "skeleton"];
const WORLD_SIZE: f32 = 48.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mob_stack=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => StackConfig::load_from_toml(path)?,
        None => StackConfig::default(),
    };
    tracing::info!("Mob Stack starting (chunk size {})", config.chunk_size);

    let mut world = SimWorld::new(config.chunk_size);
    let mut engine = StackEngine::new(config);
    let mut inbox = Inbox::new();
    let mut tool_item = TagMap::new();
    let user = UserId::new();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..args.populate {
        spawn_random(&mut world, &mut rng);
    }
    tracing::info!("Spawned {} initial creatures", args.populate);

    println!("\n=== MOB STACK ===");
    println!("Commands:");
    println!("  list / l          - List creatures with their stack sizes");
    println!("  spawn <kind> [n]  - Spawn n creatures of a kind at random");
    println!("  merge / m         - Run one proximity merge pass");
    println!("  tick / t [n]      - Advance n ticks (expires prompts)");
    println!("  mode              - Show the tool mode");
    println!("  shift             - Cycle the tool mode");
    println!("  use <n>           - Use the tool on creature n from the last list");
    println!("  quit / q          - Exit");
    println!("Anything else is chat, answered by an open size prompt.");
    println!();

    let mut listed: Vec<EntityId> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut words = input.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();

        match command {
            "quit" | "q" => break,
            "list" | "l" => {
                listed = list_creatures(&engine, &world);
            }
            "spawn" => match arg {
                Some(kind) => {
                    let count: usize = words.next().and_then(|n| n.parse().ok()).unwrap_or(1);
                    for _ in 0..count {
                        let pos = random_position(&mut rng);
                        world.spawn(EntityKind::from(kind), pos);
                    }
                    println!("Spawned {} {}", count, kind);
                }
                None => println!("Usage: spawn <kind> [count]"),
            },
            "merge" | "m" => {
                let report = run_merge_pass(&mut engine, &mut world);
                println!("Merged {} creatures ({} vetoed)", report.merged, report.vetoed);
            }
            "tick" | "t" => {
                let n = arg.and_then(|n| n.parse::<u64>().ok()).unwrap_or(1);
                for _ in 0..n {
                    run_simulation_tick(&mut engine, &mut world, &mut inbox);
                }
                println!("Now at tick {}", world.current_tick);
            }
            "mode" => match ToolController::new(user, &mut tool_item).mode() {
                Ok(mode) => println!("Tool mode: {}", mode),
                Err(e) => println!("Tool is broken: {}", e),
            },
            "shift" => {
                if let Err(e) = ToolController::new(user, &mut tool_item).shift_mode(&mut inbox) {
                    println!("Tool is broken: {}", e);
                }
            }
            "use" => {
                let target = arg
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| listed.get(n).copied());
                match target {
                    Some(target) => {
                        let mut tool = ToolController::new(user, &mut tool_item);
                        let now = world.current_tick;
                        if let Ok(outcome) =
                            tool.perform_action(&mut engine, &mut world, &mut inbox, target, now)
                        {
                            tracing::debug!("Tool outcome: {:?}", outcome);
                            // The toy world materializes units at once; report them as a host would
                            if let ToolOutcome::SlicedAll { units } = &outcome {
                                for unit in units {
                                    engine.entity_spawned(&mut world, *unit);
                                }
                            }
                        }
                    }
                    None => println!("Usage: use <index from list>"),
                }
            }
            _ => {
                let now = world.current_tick;
                match engine.handle_chat(user, input, &mut world, &mut inbox, now) {
                    Ok(None) => println!("Unknown command: {}", input),
                    Ok(Some(state)) => tracing::debug!("Prompt state: {:?}", state),
                    Err(e) => println!("Prompt failed: {}", e),
                }
            }
        }

        for (_, message) in inbox.drain() {
            println!("[{:?}] {}", message.channel, message.text);
        }
    }

    engine.unload_world();
    println!("Goodbye.");
    Ok(())
}

fn random_position(rng: &mut StdRng) -> Vec2 {
    Vec2::new(rng.gen_range(0.0..WORLD_SIZE), rng.gen_range(0.0..WORLD_SIZE))
}

fn spawn_random(world: &mut SimWorld, rng: &mut StdRng) -> EntityId {
    let kind = KINDS[rng.gen_range(0..KINDS.len())];
    let pos = random_position(rng);
    world.spawn(EntityKind::from(kind), pos)
}

fn list_creatures(engine: &StackEngine, world: &SimWorld) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = world.entities().collect();
    ids.sort_by(|a, b| {
        let (ca, cb) = (world.creature(*a), world.creature(*b));
        let key = |c: Option<&mob_stack::ecs::Creature>| {
            c.map(|c| (c.kind.clone(), c.position.x, c.position.y))
        };
        key(ca)
            .partial_cmp(&key(cb))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("{:>3}  {:<10} {:>14}  {:>6}  chunk", "#", "kind", "position", "size");
    for (i, id) in ids.iter().enumerate() {
        let Some(creature) = world.creature(*id) else {
            continue;
        };
        let size = engine
            .registry()
            .lookup(*id)
            .map_or_else(|| "-".to_string(), |r| r.size().to_string());
        let chunk = world.chunk_of(*id).map(|c| format!("{},{}", c.x, c.z)).unwrap_or_default();
        println!(
            "{:>3}  {:<10} ({:>5.1},{:>5.1})  {:>6}  {}",
            i, creature.kind.as_str(), creature.position.x, creature.position.y, size, chunk
        );
    }
    ids
}
