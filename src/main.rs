//! ESS simulator entry point — CLI wiring and config-driven day-cycle runs.

use std::path::Path;
use std::process;
use std::sync::Arc;

use ess_sim::battery::BatteryController;
use ess_sim::clock::SimulatedClock;
use ess_sim::config::ScenarioConfig;
use ess_sim::forecast::DiurnalWindProfile;
use ess_sim::sim::DayCycleSimulator;
use ess_sim::telemetry::export_csv;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    avg_wind_override: Option<f64>,
    month_override: Option<u32>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("ess-sim — Streetlight energy-storage system simulator");
    eprintln!();
    eprintln!("Usage: ess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline)");
    eprintln!("  --seed <u64>             Override the wind-profile random seed");
    eprintln!("  --avg-wind <f64>         Override the average wind speed (m/s)");
    eprintln!("  --month <1-12>           Override the calendar month");
    eprintln!("  --telemetry-out <path>   Export the tick trace to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after simulation");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        avg_wind_override: None,
        month_override: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--avg-wind" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --avg-wind requires a f64 argument");
                    process::exit(1);
                }
                if let Ok(w) = args[i].parse::<f64>() {
                    cli.avg_wind_override = Some(w);
                } else {
                    eprintln!("error: --avg-wind value \"{}\" is not a valid f64", args[i]);
                    process::exit(1);
                }
            }
            "--month" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --month requires a 1-12 argument");
                    process::exit(1);
                }
                if let Ok(m) = args[i].parse::<u32>() {
                    cli.month_override = Some(m);
                } else {
                    eprintln!("error: --month value \"{}\" is not a valid month", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(wind) = cli.avg_wind_override {
        scenario.profile.avg_wind_speed_ms = wind;
    }
    if let Some(month) = cli.month_override {
        scenario.simulation.month = month;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Synthesize the day's production curve
    let estimator = scenario.profile.estimator();
    let mut profile = DiurnalWindProfile::new(
        scenario.profile.avg_wind_speed_ms,
        scenario.profile.noise_std_ms,
        scenario.simulation.seed,
    );
    let hourly_power_wh = profile.hourly_power_wh(&estimator);

    // Build and run the day cycle
    let clock = Arc::new(SimulatedClock::new());
    let controller = BatteryController::with_initial_soc(
        scenario.battery.clone(),
        clock.clone(),
        scenario.simulation.initial_soc,
    );
    let sim = DayCycleSimulator::new(
        controller,
        clock,
        hourly_power_wh,
        scenario.simulation.start_hour,
        scenario.simulation.end_hour,
        scenario.simulation.ticks_per_hour,
        Some(scenario.simulation.month),
    );
    let mut sim = match sim {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let report = match sim.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print per-hour results and the day summary
    for h in &report.summary.hourly_results {
        println!("{h}");
    }
    println!("\n{}", report.summary);

    // Export CSV if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&report.detailed_results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Mutex;

        use ess_sim::api::AppState;
        use ess_sim::clock::SystemClock;

        let battery_config = scenario.battery.clone();
        let live_controller =
            BatteryController::new(battery_config.clone(), Arc::new(SystemClock));
        let state = Arc::new(AppState {
            controller: Mutex::new(live_controller),
            battery_config,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(ess_sim::api::serve(state, addr));
    }
}
