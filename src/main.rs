//! PV station simulator entry point: CLI wiring around snapshot generation.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use pv_station_sim::StationConfig;
use pv_station_sim::io::export::export_panels_csv;
use pv_station_sim::logging;
use pv_station_sim::station::StationStore;

/// Generates a synthetic PV station and reports its state.
///
/// If no --config or --preset is given, the baseline preset is used.
#[derive(Parser, Debug)]
#[command(name = "pv-station-sim", version, about)]
struct Cli {
    /// Load the station from a TOML config file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in preset (baseline, clean, stress)
    #[arg(long)]
    preset: Option<String>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Disable probabilistic fault injection (scripted faults still apply)
    #[arg(long)]
    no_faults: bool,

    /// Export per-panel telemetry to CSV
    #[arg(long)]
    panels_out: Option<PathBuf>,

    /// Print the full snapshot as JSON instead of summary tables
    #[arg(long)]
    json: bool,

    /// Start the REST API server after generation
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

fn load_config(cli: &Cli) -> Result<StationConfig, pv_station_sim::ConfigError> {
    let mut config = match (&cli.config, &cli.preset) {
        (Some(path), _) => StationConfig::from_toml_file(path)?,
        (None, Some(name)) => StationConfig::from_preset(name)?,
        (None, None) => StationConfig::baseline(),
    };
    if let Some(seed) = cli.seed {
        config.generation.seed = Some(seed);
    }
    if cli.no_faults {
        config.faults.enabled = false;
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let config = load_config(&cli).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    let store = StationStore::new(config).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
    let snapshot = store.snapshot();

    if cli.json {
        let report = serde_json::json!({
            "seed": snapshot.seed(),
            "totalPowerKw": snapshot.total_power_kw(),
            "overview": snapshot.overview(),
            "fields": snapshot.zones(),
            "inverters": snapshot.inverters(),
            "sensors": snapshot.sensors(),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("failed to serialize snapshot: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("seed {}\n", snapshot.seed());
        for zone in snapshot.zones() {
            println!("{zone}");
        }
        println!();
        for inverter in snapshot.inverters() {
            println!("{inverter}");
        }
        println!("\nstation total {:.2} kW", snapshot.total_power_kw());
    }

    if let Some(ref path) = cli.panels_out {
        if let Err(e) = export_panels_csv(&snapshot, path) {
            error!("failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Panel telemetry written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(pv_station_sim::api::AppState { store });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            error!("failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(pv_station_sim::api::serve(state, addr)) {
            error!("server error: {e}");
            process::exit(1);
        }
    }
}
