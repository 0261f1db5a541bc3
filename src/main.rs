use clap::{Args as ClapArgs, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use device_harness::apdu::Transport;
use device_harness::backend::EmulatorBackend;
use device_harness::config;
use device_harness::logging::{self, LogSettings};
use device_harness::navigator::{
    CompareOptions, NavIns, Navigator, UntilTextOptions, parse_instructions,
};
use device_harness::runner::NavigationReport;
use device_harness::snapshot::{SnapshotCase, clean_tmp_tree};
use device_harness::Device;

/// Device Harness - navigate device applications and check golden snapshots
#[derive(Parser, Debug)]
#[command(
    name = "device-harness",
    about = "Navigate device application screens and compare them with golden snapshots",
    after_help = "ENVIRONMENT VARIABLES:\n\
        DEVICE_HARNESS_GOLDEN_RUN                 Record goldens instead of comparing\n\
        DEVICE_HARNESS_DEVICE                     Device (nanos, nanosp, nanox, stax, flex)\n\
        DEVICE_HARNESS_SNAPSHOT_ROOT              Root of the snapshots directories\n\
        DEVICE_HARNESS_LOG                        Log filter\n\
        DEVICE_HARNESS_SCREEN_CHANGE_TIMEOUT_MS   Bound of screen-change waits (ms)\n\
        DEVICE_HARNESS_POLL_INTERVAL_MS           Pause between comparison attempts (ms)"
)]
struct Args {
    /// Log filter (defaults to DEVICE_HARNESS_LOG, then "info")
    #[arg(long, global = true)]
    log: Option<String>,

    /// Log events as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Copy APDU traffic to this file
    #[arg(long, global = true)]
    apdu_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Emulator and snapshot settings shared by navigation commands
#[derive(ClapArgs, Debug)]
struct Target {
    /// Application model (JSON) run by the screen emulator
    #[arg(short, long)]
    app: PathBuf,

    /// Device to emulate
    #[arg(short, long)]
    device: Option<Device>,

    /// Snapshot root
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Test case name; snapshots are compared only when set
    #[arg(short, long)]
    case: Option<PathBuf>,

    /// Record goldens instead of comparing
    #[arg(long)]
    golden_run: bool,

    /// APDU (hex) sent before navigating, its response collected after
    #[arg(long)]
    apdu: Option<String>,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run instructions, comparing every screen with its golden
    Navigate {
        #[command(flatten)]
        target: Target,

        /// Comma-separated instructions, e.g. "RIGHT_CLICK, TOUCH(200, 335), BOTH_CLICK"
        #[arg(short, long)]
        instructions: String,
    },

    /// Repeat an instruction until a text shows, then validate
    UntilText {
        #[command(flatten)]
        target: Target,

        /// Instruction moving to the next screen
        #[arg(short, long)]
        navigate: String,

        /// Comma-separated validation instructions
        #[arg(short, long)]
        validation: String,

        /// Pattern (regex) matched against each screen line
        #[arg(short, long)]
        text: String,

        /// Bound of the search (seconds)
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Remove the temporary snapshots
    Clean {
        /// Snapshot root
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Only clean this device
        #[arg(short, long)]
        device: Option<Device>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let settings = config::get();

    let mut log = LogSettings::from_config(settings).json(args.log_json);
    if let Some(level) = args.log {
        log.level = level;
    }
    if let Some(path) = args.apdu_log {
        log = log.apdu_log(path);
    }
    logging::init(&log)?;

    match args.command {
        Some(Commands::Navigate {
            target,
            instructions,
        }) => {
            let instructions = parse_instructions(&instructions)?;
            let report = run_target(&target, &instructions, |navigator, case| {
                navigator
                    .navigate_and_compare(case, instructions.clone(), CompareOptions::default())
                    .map(|()| 0)
            })?;
            finish(report, target.json)?;
        }

        Some(Commands::UntilText {
            target,
            navigate,
            validation,
            text,
            timeout,
        }) => {
            let navigate: NavIns = navigate.parse()?;
            let validation = parse_instructions(&validation)?;
            let options = UntilTextOptions::default().timeout(Duration::from_secs(timeout));
            let mut listed = vec![navigate.clone()];
            listed.extend(validation.iter().cloned());
            let report = run_target(&target, &listed, |navigator, case| {
                navigator.navigate_until_text_and_compare(
                    navigate.clone(),
                    validation.clone(),
                    &text,
                    case,
                    options,
                )
            })?;
            finish(report, target.json)?;
        }

        Some(Commands::Clean { root, device }) => {
            let root = root.unwrap_or_else(config::snapshot_root);
            if clean_tmp_tree(&root, device)? {
                println!("Removed temporary snapshots under {}", root.display());
            } else {
                println!("No temporary snapshots under {}", root.display());
            }
        }

        None => {
            println!("Device Harness - navigation and golden-snapshot testing");
            println!();
            println!("Usage: device-harness <COMMAND>");
            println!();
            println!("Commands:");
            println!("  navigate    Run instructions, comparing every screen with its golden");
            println!("  until-text  Repeat an instruction until a text shows, then validate");
            println!("  clean       Remove the temporary snapshots");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

/// Build the emulator and navigator for `target`, then run `flow` with the
/// optional APDU exchange wrapped around it
fn run_target<F>(target: &Target, instructions: &[NavIns], flow: F) -> Result<NavigationReport, Box<dyn Error>>
where
    F: FnOnce(&mut Navigator<EmulatorBackend>, Option<&SnapshotCase>) -> device_harness::NavResult<usize>,
{
    let settings = config::get();
    let device = target.device.unwrap_or(settings.device);
    let root = target.root.clone().unwrap_or_else(|| settings.snapshot_root.clone());
    let golden_run = target.golden_run || settings.golden_run;
    let case = target.case.as_ref().map(|name| SnapshotCase::new(&root, name));

    let backend = EmulatorBackend::from_file(device, &target.app)?;
    let mut navigator = Navigator::for_device(backend, device, settings.navigator_config().golden_run(golden_run))?;

    let pending = match &target.apdu {
        Some(apdu) => Some(navigator.backend_mut().exchange_async_raw(&hex::decode(apdu.trim())?)?),
        None => None,
    };

    let report = NavigationReport::start(
        device,
        case.as_ref().map(|c| c.name.display().to_string()),
        golden_run,
    )
    .instructions(instructions);
    let outcome = flow(&mut navigator, case.as_ref());

    if let Some(pending) = pending {
        match navigator.backend_mut().complete_exchange(pending) {
            Ok(rapdu) => println!("APDU response: {}", hex::encode(rapdu.to_bytes())),
            Err(e) => eprintln!("APDU exchange failed: {}", e),
        }
    }

    let report = report.finish(&outcome);
    match &case {
        Some(case) => Ok(report.collect_frames(&case.tmp_dir(device), &case.golden_dir(device))?),
        None => Ok(report),
    }
}

fn finish(report: NavigationReport, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &NavigationReport) {
    let status = if report.success { "completed" } else { "failed" };
    println!(
        "Navigation {} on {} in {} ms: {} instructions, {} steps",
        status,
        report.device,
        report.duration_ms,
        report.instructions.len(),
        report.steps
    );
    if let Some(error) = &report.error {
        println!("  Error: {}", error);
    }
    for frame in &report.frames {
        println!("  Frame {:05}: {}", frame.index, frame.tmp_path.display());
    }
}
