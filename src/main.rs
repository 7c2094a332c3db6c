mod simulation;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "signal_sim")]
#[command(about = "Signal-controlled intersection simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Vehicle spawn rate per lane per second
    #[arg(long)]
    spawn_rate: Option<f32>,

    /// Seconds of simulated time between summaries
    #[arg(long, default_value = "10.0")]
    report_interval: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Running intersection simulation...");
    println!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);
    if let Some(seed) = cli.seed {
        println!("Seed: {}", seed);
    }
    println!();

    let mut world = match cli.seed {
        Some(seed) => simulation::SimWorld::new_with_seed(seed),
        None => simulation::SimWorld::new(),
    };
    if let Some(rate) = cli.spawn_rate {
        world.config.set_spawn_rate(rate);
    }

    let ticks_per_report = (cli.report_interval / cli.delta).ceil().max(1.0) as u32;

    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_report.min(cli.ticks - tick);
        for _ in 0..ticks_to_run {
            tick += 1;
            world.tick(cli.delta);
        }

        println!(
            "--- After tick {} ({:.1}s simulated time) ---",
            tick,
            tick as f32 * cli.delta
        );
        world.print_summary();
        println!();
    }

    println!("=== Final State ===");
    world.print_summary();

    Ok(())
}
