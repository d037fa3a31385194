//! Broad Phase Demo
//!
//! Headless simulation exercising the dynamic BVH the way a game loop does:
//! - Ships are bulk loaded with the static builder (optionally in parallel)
//! - Every tick each ship moves and updates its fat AABB
//! - Every ship queries the tree for collision candidates
//! - A few rays are cast per tick for picking/targeting
//!
//! Usage: `bvh_demo [config.toml|config.ron] [--parallel]`

use std::time::{Duration, Instant};

use dynamic_bvh::foundation::logging;
use dynamic_bvh::prelude::*;
use dynamic_bvh::{BuildExecutor, ConfigError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// World bounds: -WORLD_HALF_SIZE to +WORLD_HALF_SIZE on each axis
const WORLD_HALF_SIZE: f32 = 500.0;

// Simulation
const NUM_SHIPS: u32 = 5_000;
const NUM_TICKS: u32 = 300;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const RAYS_PER_TICK: usize = 16;
const RAY_LENGTH: f32 = 250.0;
const STATS_INTERVAL: u32 = 60;

// Ships
const MIN_SHIP_RADIUS: f32 = 0.5;
const MAX_SHIP_RADIUS: f32 = 4.0;
const MAX_SHIP_SPEED: f32 = 30.0;

/// Margin used when the config file does not set one
const FALLBACK_MARGIN: f32 = 1.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),
}

struct Ship {
    id: ObjectId,
    position: Vec3,
    velocity: Vec3,
    radius: f32,
}

impl Ship {
    fn bounds(&self) -> Aabb {
        BoundingSphere::new(self.position, self.radius).to_aabb()
    }

    /// Integrate one tick, reflecting off the world walls
    fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        for axis in 0..3 {
            let limit = WORLD_HALF_SIZE - self.radius;
            if self.position[axis].abs() > limit {
                self.position[axis] = self.position[axis].clamp(-limit, limit);
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }
}

/// Runs one side of each join on a scoped thread
struct ScopedThreadExecutor;

impl BuildExecutor for ScopedThreadExecutor {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        std::thread::scope(|scope| {
            let handle = scope.spawn(a);
            let rb = b();
            match handle.join() {
                Ok(ra) => (ra, rb),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}

#[derive(Default)]
struct TickStats {
    moves: usize,
    candidate_pairs: usize,
    overlapping_pairs: usize,
    ray_hits: usize,
    query_time: Duration,
}

fn spawn_ships(rng: &mut StdRng) -> Vec<Ship> {
    (0..NUM_SHIPS)
        .map(|id| {
            let radius = rng.gen_range(MIN_SHIP_RADIUS..MAX_SHIP_RADIUS);
            let limit = WORLD_HALF_SIZE - radius;
            Ship {
                id,
                position: Vec3::new(
                    rng.gen_range(-limit..limit),
                    rng.gen_range(-limit..limit),
                    rng.gen_range(-limit..limit),
                ),
                velocity: Vec3::new(
                    rng.gen_range(-MAX_SHIP_SPEED..MAX_SHIP_SPEED),
                    rng.gen_range(-MAX_SHIP_SPEED..MAX_SHIP_SPEED),
                    rng.gen_range(-MAX_SHIP_SPEED..MAX_SHIP_SPEED),
                ),
                radius,
            }
        })
        .collect()
}

fn load_config(path: Option<&str>) -> Result<BvhConfig, DemoError> {
    let Some(path) = path else {
        return Ok(BvhConfig {
            default_margin: FALLBACK_MARGIN,
            ..BvhConfig::default()
        });
    };

    let config = BvhConfig::load_from_file(path)?;
    log::info!("Loaded BVH config from {path}: {config:?}");
    Ok(config)
}

fn build_tree(ships: &[Ship], config: &BvhConfig, parallel: bool) -> BoundingVolumeHierarchy {
    // Bulk load with fat bounds so the first ticks do not reinsert everything.
    let items: Vec<(ObjectId, Aabb)> = ships
        .iter()
        .map(|ship| (ship.id, ship.bounds().inflate(config.default_margin)))
        .collect();

    let start = Instant::now();
    let mut bvh = if parallel {
        BoundingVolumeHierarchy::build_with(&items, config.build_strategy, &ScopedThreadExecutor)
    } else {
        BoundingVolumeHierarchy::from_items(&items, config.build_strategy)
    };
    bvh.set_config(config.clone());

    log::info!(
        "Built {} ships with {:?} in {:.2?} (height {:?}, {} nodes, parallel: {parallel})",
        bvh.size(),
        config.build_strategy,
        start.elapsed(),
        bvh.height(),
        bvh.node_count(),
    );
    bvh
}

fn tick(bvh: &mut BoundingVolumeHierarchy, ships: &mut [Ship], rng: &mut StdRng) -> TickStats {
    let mut stats = TickStats::default();

    for ship in ships.iter_mut() {
        let before = bvh.leaf_id(ship.id);
        ship.advance(TICK_SECONDS);
        bvh.move_default(ship.id, &ship.bounds());
        if bvh.leaf_id(ship.id) != before {
            stats.moves += 1;
        }
    }

    let start = Instant::now();
    for ship in ships.iter() {
        for other in bvh.bounded_object_ids_by_aabb(&ship.bounds()) {
            if other <= ship.id {
                continue;
            }
            stats.candidate_pairs += 1;

            let other_ship = &ships[other as usize];
            let sphere = BoundingSphere::new(ship.position, ship.radius);
            if sphere.intersects_sphere(&BoundingSphere::new(other_ship.position, other_ship.radius)) {
                stats.overlapping_pairs += 1;
            }
        }
    }

    for _ in 0..RAYS_PER_TICK {
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let ray = Ray::new(Vec3::zeros(), direction);
        stats.ray_hits += bvh.bounded_object_ids_by_ray(&ray, RAY_LENGTH).len();
    }
    stats.query_time = start.elapsed();

    stats
}

fn main() -> Result<(), DemoError> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parallel = args.iter().any(|arg| arg == "--parallel");
    let config_path = args.iter().find(|arg| !arg.starts_with("--")).map(String::as_str);
    let config = load_config(config_path)?;

    println!("=== Dynamic BVH Broad Phase Demo ===");
    println!("  {NUM_SHIPS} ships, {NUM_TICKS} ticks, margin {}", config.default_margin);
    println!();

    let mut rng = StdRng::seed_from_u64(0xB0B);
    let mut ships = spawn_ships(&mut rng);
    let mut bvh = build_tree(&ships, &config, parallel);

    let mut total_moves = 0;
    for tick_index in 1..=NUM_TICKS {
        let stats = tick(&mut bvh, &mut ships, &mut rng);
        total_moves += stats.moves;

        if tick_index % STATS_INTERVAL == 0 {
            log::info!(
                "Tick {tick_index}: {} reinserts, {} candidate pairs, {} overlapping, {} ray hits, queries {:.2?}, height {:?}",
                stats.moves,
                stats.candidate_pairs,
                stats.overlapping_pairs,
                stats.ray_hits,
                stats.query_time,
                bvh.height(),
            );
            bvh.debug_validate();
        }
    }

    let height_before = bvh.height();
    let start = Instant::now();
    bvh.rebuild();
    log::info!(
        "Rebuilt in {:.2?}: height {height_before:?} -> {:?}",
        start.elapsed(),
        bvh.height()
    );

    println!(
        "Done: {total_moves} reinserts over {NUM_TICKS} ticks ({:.1}% of moves)",
        100.0 * total_moves as f64 / f64::from(NUM_SHIPS * NUM_TICKS)
    );
    Ok(())
}
