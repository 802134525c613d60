use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleetcheck_adapter::SimulatedAdapter;
use fleetcheck_runner::{
    load_report, render_text, save_report, DeviceRegistry, HarnessConfig, RegistrySource,
    TestOrchestrator,
};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "fleetcheck.toml";

#[derive(Parser)]
#[command(name = "fleetcheck", version, about = "Verification harness for managed network devices")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with default settings
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List the devices the registry would test
    Devices {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// JSON or YAML device map (overrides the config file)
        #[arg(long)]
        devices: Option<PathBuf>,
    },

    /// Run the check suite against the simulator and write a report
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        #[arg(long)]
        devices: Option<PathBuf>,
        /// Only test this device (repeatable)
        #[arg(long = "device")]
        device: Vec<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        /// Per adapter call deadline
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Minimum spacing between device starts
        #[arg(long)]
        pause_ms: Option<u64>,
        /// Seed the simulator for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Report path (overrides the config file)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the summary of a saved report
    Report {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Report to read (defaults to the configured report path)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Init { config, force } => {
            if config.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", config.display());
            }
            HarnessConfig::default().save_to(&config)?;
            println!("Wrote {}", config.display());
        }
        Command::Devices { config, devices } => {
            let cfg = HarnessConfig::load_or_default(&config)?;
            let registry = load_registry(devices.or_else(|| cfg.devices_path()));
            match registry.source() {
                RegistrySource::Builtin => println!("Devices (built-in):"),
                RegistrySource::File(p) => println!("Devices ({}):", p.display()),
            }
            for d in registry.devices() {
                let protocols: Vec<_> = d.protocols.iter().map(String::as_str).collect();
                println!(
                    "- {} {}:{} [{}] {} interfaces, {}",
                    d.name,
                    d.address,
                    d.management_port,
                    d.device_type,
                    d.expected_interfaces,
                    protocols.join("/")
                );
            }
        }
        Command::Run {
            config,
            devices,
            device,
            concurrency,
            timeout_ms,
            pause_ms,
            seed,
            output,
        } => {
            let mut cfg = HarnessConfig::load_or_default(&config)?;
            if let Some(n) = concurrency {
                cfg.run.concurrency = n;
            }
            if let Some(ms) = timeout_ms {
                cfg.run.adapter_timeout_ms = ms;
            }
            if let Some(ms) = pause_ms {
                cfg.run.device_pause_ms = ms;
            }
            if seed.is_some() {
                cfg.simulator.seed = seed;
            }

            let registry = load_registry(devices.or_else(|| cfg.devices_path()));
            let sim = match cfg.simulator.seed {
                Some(seed) => SimulatedAdapter::seeded(seed),
                None => SimulatedAdapter::new(),
            }
            .with_port_failure_rate(cfg.simulator.port_failure_rate);

            let orch = TestOrchestrator::new(registry, Arc::new(sim), cfg.run_options());
            info!(run_id = %orch.run_id().as_str(), devices = orch.registry().len(), "starting");

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received; finishing devices in flight");
                    let _ = cancel_tx.send(true);
                }
            });

            let selected = (!device.is_empty()).then_some(device);
            let summary = orch.run_suite_until(selected.as_deref(), cancel_rx).await;

            let report = orch.generate_report();
            println!("{}", render_text(&report));
            if summary.was_cancelled() {
                println!("Cancelled; not started: {}", summary.skipped.join(", "));
            }

            let path = output.unwrap_or_else(|| cfg.report_path());
            save_report(&path, &report).with_context(|| "save report")?;
            println!("Detailed report saved to: {}", path.display());
        }
        Command::Report { config, input } => {
            let cfg = HarnessConfig::load_or_default(&config)?;
            let path = input.unwrap_or_else(|| cfg.report_path());
            let report = load_report(&path)?;
            print!("{}", render_text(&report));
        }
    }

    Ok(())
}

fn load_registry(path: Option<PathBuf>) -> DeviceRegistry {
    match path {
        Some(p) => DeviceRegistry::load(&p),
        None => DeviceRegistry::builtin(),
    }
}
