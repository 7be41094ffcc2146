use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use quadtree_gravity::{SimConfig, Simulation, SizeMetric};
use ultraviolet::Vec2;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Metric {
    Width,
    Area,
}

/// Runs the gravity simulation without a display and logs per-step statistics.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of randomly scattered bodies
    #[arg(short, long, default_value_t = 300)]
    bodies: usize,

    /// Number of steps to run
    #[arg(short, long, default_value_t = 100)]
    steps: usize,

    /// Barnes-Hut opening angle
    #[arg(short, long, default_value_t = 1.0)]
    theta: f32,

    /// Node size compared against theta * distance
    #[arg(long, value_enum, default_value_t = Metric::Width)]
    size_metric: Metric,

    /// Use the exact pairwise sum instead of the quadtree
    #[arg(long)]
    exact: bool,

    /// Place a sun at the center
    #[arg(long)]
    sun: bool,

    /// Seed for body generation
    #[arg(long)]
    seed: Option<u64>,

    /// Print the quadtree after the last step
    #[arg(long)]
    dump_tree: bool,

    /// Log every N steps
    #[arg(long, default_value_t = 10)]
    log_every: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SimConfig {
        body_count: args.bodies,
        theta: args.theta,
        size_metric: match args.size_metric {
            Metric::Width => SizeMetric::Width,
            Metric::Area => SizeMetric::Area,
        },
        use_barnes_hut: !args.exact,
        default_sun: args.sun,
        seed: args.seed,
        ..SimConfig::default()
    };

    let mut sim = Simulation::new(config).context("invalid simulation configuration")?;
    let start = std::time::Instant::now();

    for _ in 0..args.steps {
        sim.step();
        if args.log_every > 0 && sim.frame() % args.log_every == 0 {
            let com = sim.center_of_mass();
            let momentum = sim.total_momentum();
            info!(
                "frame {:>5}  nodes {:>6}  com ({:>7.2}, {:>7.2})  |p| {:>9.3}  peak |F| {:>8.3}",
                sim.frame(),
                sim.quadtree().len(),
                com.x,
                com.y,
                momentum.mag(),
                sim.forces()
                    .iter()
                    .map(Vec2::mag)
                    .fold(0.0_f32, f32::max)
            );
        }
    }

    let elapsed = start.elapsed();
    info!(
        "{} steps in {:.3}s ({:.2} ms/step)",
        args.steps,
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1e3 / args.steps.max(1) as f64
    );

    if args.dump_tree {
        print!("{}", sim.quadtree().dump());
    }

    Ok(())
}
