use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use hm_app::{AppResult, RunOverrides, run_service};
use hm_core::units::in_mm;
use hm_meter::{Gauge, HOURS_PER_DAY};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hm-cli")]
#[command(about = "Hydrometer CLI - residential water meter simulator", long_about = None)]
struct Cli {
    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a configuration file
    Run {
        /// Path to the key=value configuration file
        config_path: PathBuf,
        /// Fixed RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Initial tap opening in percent (0-100)
        #[arg(long)]
        flow_percent: Option<f64>,
        /// Wall-clock pacing in milliseconds (overrides intervaloAtualizacao)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
        /// Folder that receives Medicoes_<matricula>/
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Do not read flow commands from stdin
        #[arg(long)]
        no_control: bool,
    },
    /// Validate a configuration file and show the resolved settings
    Validate {
        /// Path to the key=value configuration file
        config_path: PathBuf,
        /// Print the resolved configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported gauges
    Gauges,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config_path,
            seed,
            flow_percent,
            interval_ms,
            max_ticks,
            output_dir,
            no_control,
        } => {
            let overrides = RunOverrides {
                seed,
                flow_percent,
                interval: interval_ms.map(Duration::from_millis),
                max_ticks,
                output_dir,
                interactive: !no_control,
            };
            cmd_run(&config_path, &overrides)
        }
        Commands::Validate { config_path, json } => cmd_validate(&config_path, json),
        Commands::Gauges => {
            cmd_gauges();
            Ok(())
        }
    }
}

fn cmd_run(config_path: &Path, overrides: &RunOverrides) -> AppResult<()> {
    println!("Running simulation: {}", config_path.display());
    let response = run_service::run(config_path, overrides)?;
    let summary = response.summary;

    println!("✓ Run ended ({:?})", summary.reason);
    println!("  Ticks: {}", summary.ticks);
    println!("  Simulated time: {} s", summary.elapsed_s);
    println!("  Total volume: {:.6} m³", summary.final_volume.value);
    println!(
        "  Snapshots saved: {} (failed: {})",
        response.snapshots_written, response.snapshots_failed
    );
    Ok(())
}

fn cmd_validate(config_path: &Path, json: bool) -> AppResult<()> {
    let config = hm_project::load_file(config_path)?;
    if json {
        println!("{}", hm_project::to_json_pretty(&config)?);
        return Ok(());
    }

    println!("Validating configuration: {}", config_path.display());
    println!("✓ Configuration is valid");
    println!("  Gauge: {}", config.gauge);
    match config.run_duration_s {
        -1 => println!("  Run duration: unbounded"),
        s => println!("  Run duration: {s} s"),
    }
    println!("  Update interval: {} s", config.update_interval_s);
    println!("  Time scale: {} s/tick", config.time_scale_s);
    println!(
        "  Pressure: {:.2}-{:.2} bar",
        config.pressure_min_bar, config.pressure_max_bar
    );
    if config.simulate_air {
        println!(
            "  Air simulation: on ({}-{} m/s)",
            config.air_speed_min, config.air_speed_max
        );
    } else {
        println!("  Air simulation: off");
    }
    println!(
        "  Meter id: {}",
        config.meter_id.as_deref().unwrap_or("(none, snapshots disabled)")
    );

    println!("  Profiles:");
    for p in &config.profiles {
        println!(
            "    {:<10} {:>2}h-{:>2}h  {:.3}-{:.3} m/s",
            p.name, p.hour_start, p.hour_end, p.speed_min, p.speed_max
        );
    }

    let profiles = config.profile_set();
    let coverage: String = (0..HOURS_PER_DAY)
        .map(|h| match profiles.active_index(h) {
            Some(i) => char::from_digit(i as u32 % 10, 10).unwrap_or('?'),
            None => '-',
        })
        .collect();
    println!("  Hour coverage (profile index per hour): {coverage}");
    let overlaps = profiles.overlapping_hours();
    if !overlaps.is_empty() {
        println!("  Overlapping hours (first profile wins): {overlaps:?}");
    }
    Ok(())
}

fn cmd_gauges() {
    println!("{:<8} {:>10} {:>12} {:>10}", "Gauge", "Bore (mm)", "Qmax (m³/h)", "Qmax (L/s)");
    for gauge in Gauge::ALL {
        let spec = gauge.spec();
        println!(
            "{:<8} {:>10.0} {:>12.3} {:>10.3}",
            gauge.to_string(),
            in_mm(spec.internal_diameter),
            spec.max_flow.value * 3_600.0,
            spec.max_flow.value * 1_000.0
        );
    }
}
