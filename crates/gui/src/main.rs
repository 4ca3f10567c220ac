mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::session`, `crate::state`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use navdemo_gui_lib::build;
pub use navdemo_gui_lib::command;
pub use navdemo_gui_lib::geometry;
pub use navdemo_gui_lib::replay;
pub use navdemo_gui_lib::sample;
pub use navdemo_gui_lib::session;
pub use navdemo_gui_lib::state;

use std::path::PathBuf;
use std::process::ExitCode;

use app::NavDemoApp;
use session::Session;
use state::AppSettings;

/// Parsed command line: `navdemo [GEOMETRY] [BATCH]`, `navdemo --test-case <path>`
/// or `navdemo [GEOMETRY] --commands <path>`
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    geometry: Option<PathBuf>,
    batch: bool,
    test_case: Option<PathBuf>,
    commands: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navdemo=info,navdemo_gui_lib=info".into()),
        )
        .init();

    let args = parse_args(std::env::args().skip(1));
    let settings = AppSettings::load();

    if let Some(path) = &args.test_case {
        return run_test_case(&settings, path);
    }
    if let Some(path) = &args.commands {
        return run_commands(&settings, args.geometry.as_deref(), path);
    }
    if args.batch {
        if let Some(geometry) = &args.geometry {
            return run_batch(&settings, geometry);
        }
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("navdemo")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let initial_geometry = args.geometry;
    if let Err(e) = eframe::run_native(
        "navdemo",
        native_options,
        Box::new(move |cc| Ok(Box::new(NavDemoApp::new(cc, settings, initial_geometry)))),
    ) {
        tracing::error!("Failed to start application: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_args(args: impl Iterator<Item = String>) -> CliArgs {
    let mut parsed = CliArgs::default();
    let mut positional = 0;
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        if arg == "--test-case" || arg == "--commands" {
            let Some(path) = args.next().map(PathBuf::from) else {
                tracing::warn!("{arg} needs a path");
                continue;
            };
            if arg == "--test-case" {
                parsed.test_case = Some(path);
            } else {
                parsed.commands = Some(path);
            }
            continue;
        }
        match positional {
            0 => parsed.geometry = Some(PathBuf::from(arg)),
            1 => parsed.batch = true,
            _ => tracing::warn!("Ignoring extra argument '{arg}'"),
        }
        positional += 1;
    }
    parsed
}

/// Load, build, save the geometry set and exit
fn run_batch(settings: &AppSettings, geometry: &std::path::Path) -> ExitCode {
    let mut session = Session::new(settings);
    if session.load_geometry(geometry) {
        session.build();
        if let Some(path) = session.save_geometry_settings() {
            tracing::info!("Wrote {}", path.display());
        }
    }
    ExitCode::SUCCESS
}

/// Replay one script headlessly; success only when every assertion passed
fn run_test_case(settings: &AppSettings, path: &std::path::Path) -> ExitCode {
    let mut session = Session::new(settings);
    if !session.load_test_case(path) {
        return ExitCode::FAILURE;
    }
    let Some(report) = session.run_test_case() else {
        return ExitCode::FAILURE;
    };
    for result in &report.results {
        println!(
            "{} {}",
            if result.passed() { "PASS" } else { "FAIL" },
            result.label
        );
    }
    println!("{}", report.summary());
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Execute a command file, printing one JSON response per line
fn run_commands(
    settings: &AppSettings,
    geometry: Option<&std::path::Path>,
    path: &std::path::Path,
) -> ExitCode {
    let mut session = Session::new(settings);
    if let Some(geometry) = geometry {
        session.load_geometry(geometry);
    }
    let responses = match command::execute_file(&mut session, path) {
        Ok(responses) => responses,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for response in &responses {
        match serde_json::to_string(response) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("Could not serialize response: {e}"),
        }
    }
    if responses.iter().all(|r| r.success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_args() {
        assert_eq!(parse(&[]), CliArgs::default());
    }

    #[test]
    fn geometry_then_batch_flag() {
        let args = parse(&["Meshes/arena.obj"]);
        assert_eq!(args.geometry, Some(PathBuf::from("Meshes/arena.obj")));
        assert!(!args.batch);
        let args = parse(&["Meshes/arena.obj", "1"]);
        assert!(args.batch);
    }

    #[test]
    fn test_case_flag() {
        let args = parse(&["--test-case", "TestCases/arena.json"]);
        assert_eq!(args.test_case, Some(PathBuf::from("TestCases/arena.json")));
        assert_eq!(args.geometry, None);
    }

    #[test]
    fn commands_flag_keeps_geometry() {
        let args = parse(&["Meshes/arena.obj", "--commands", "cmds.json"]);
        assert_eq!(args.commands, Some(PathBuf::from("cmds.json")));
        assert_eq!(args.geometry, Some(PathBuf::from("Meshes/arena.obj")));
        assert!(!args.batch);
    }
}
