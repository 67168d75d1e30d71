mod adapters;
mod app;
mod core;
mod global_constants;
mod ports;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::app::{CaptureSource, ScanReport, ScannerApp};
use crate::core::models::{CaptureOutcome, DeviceClass, ScannerSettings};
use crate::global_constants::{APPLICATION_NAME, APPLICATION_TITLE};

#[derive(Debug, Parser)]
#[command(name = APPLICATION_NAME, about = APPLICATION_TITLE, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture one frame, publish it and print the recognized text.
    Scan(ScanArgs),
    /// Write default settings to the settings file and print its path.
    InitSettings,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["image", "screen"])))]
struct ScanArgs {
    /// Use a photo on disk as the camera feed.
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,
    /// Use the primary display as the camera feed.
    #[arg(long)]
    screen: bool,
    /// Treat this device as a phone (rear-facing camera).
    #[arg(long, conflicts_with = "user_agent")]
    mobile: bool,
    /// Derive the device class from a browser user-agent string.
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,
    /// Copy the recognized text to the clipboard.
    #[arg(long)]
    copy: bool,
    /// Give up on the whole session after this many seconds.
    #[arg(long, value_name = "N")]
    deadline_secs: Option<u64>,
    /// Print the diagnostic trace even when the scan succeeds.
    #[arg(long)]
    trace: bool,
}

impl ScanArgs {
    fn source(&self) -> CaptureSource {
        match &self.image {
            Some(path) => CaptureSource::Photo(path.clone()),
            None => CaptureSource::Screen,
        }
    }

    fn device_class(&self, settings: &ScannerSettings) -> DeviceClass {
        if self.mobile {
            return DeviceClass::Mobile;
        }
        match &self.user_agent {
            Some(user_agent) => DeviceClass::from_user_agent(user_agent),
            None => settings.device_class,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    log::info!("[MAIN] Starting {}", APPLICATION_TITLE);

    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => run_scan(args).await,
        Command::InitSettings => match ScannerSettings::default().save() {
            Ok(path) => {
                println!("{}", path.display());
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("Failed to write settings: {:#}", error);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_scan(args: ScanArgs) -> ExitCode {
    let settings = ScannerSettings::load().unwrap_or_else(|error| {
        log::warn!("[MAIN] Failed to load settings: {}, using defaults", error);
        ScannerSettings::default().with_overrides(|name| std::env::var(name).ok())
    });

    let mut app = ScannerApp::build(
        &settings,
        &args.source(),
        args.device_class(&settings),
        args.deadline_secs.map(Duration::from_secs),
    );

    let report = app.scan().await;
    print_report(&report, args.trace);

    if let (true, Some(CaptureOutcome::Text(text))) = (args.copy, &report.outcome) {
        match app.copy_to_clipboard(text) {
            Ok(()) => eprintln!("Copied to clipboard."),
            Err(error) => eprintln!("Could not copy to clipboard: {:#}", error),
        }
    }

    if report.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(report: &ScanReport, always_show_trace: bool) {
    match &report.outcome {
        Some(CaptureOutcome::Text(text)) => println!("{}", text),
        Some(CaptureOutcome::Error(message)) => eprintln!("{}", message),
        None => eprintln!("The scan was superseded before it finished."),
    }

    if always_show_trace || report.failed() {
        eprintln!();
        eprintln!("Debug information:");
        for line in &report.trace {
            eprintln!("  {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(arguments: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once(APPLICATION_NAME).chain(arguments.iter().copied()))
    }

    fn scan_args(arguments: &[&str]) -> ScanArgs {
        match parse(arguments).unwrap().command {
            Command::Scan(args) => args,
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_exactly_one_source() {
        assert!(parse(&["scan"]).is_err());
        assert!(parse(&["scan", "--image", "page.jpg", "--screen"]).is_err());
        assert!(parse(&["scan", "--screen"]).is_ok());
    }

    #[test]
    fn test_image_argument_selects_photo_source() {
        let args = scan_args(&["scan", "--image", "homework.jpg", "--copy", "--deadline-secs", "30"]);

        assert_eq!(args.source(), CaptureSource::Photo(PathBuf::from("homework.jpg")));
        assert!(args.copy);
        assert_eq!(args.deadline_secs, Some(30));
    }

    #[test]
    fn test_device_class_resolution_order() {
        let settings = ScannerSettings::default();

        let flagged = scan_args(&["scan", "--screen", "--mobile"]);
        let from_agent = scan_args(&[
            "scan",
            "--screen",
            "--user-agent",
            "Mozilla/5.0 (Linux; Android 14; Pixel 8)",
        ]);
        let default = scan_args(&["scan", "--screen"]);

        assert_eq!(flagged.device_class(&settings), DeviceClass::Mobile);
        assert_eq!(from_agent.device_class(&settings), DeviceClass::Mobile);
        assert_eq!(default.device_class(&settings), DeviceClass::Desktop);
    }

    #[test]
    fn test_init_settings_subcommand_parses() {
        assert!(matches!(
            parse(&["init-settings"]).unwrap().command,
            Command::InitSettings
        ));
    }
}
