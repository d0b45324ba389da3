use clap::Parser;
use gowatch::cli::{version_string, CliArgs, LogLevel};
use gowatch::logging::resolve_level;
use tracing::Level;

#[test]
fn test_cli_parses_all_flags() {
    let args = CliArgs::try_parse_from([
        "gowatch",
        "-o",
        "./bin",
        "-p",
        "./cmd/api,./cmd/worker",
        "--args=-port=8080,-debug",
        "--config",
        "dev.toml",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.output.as_deref(), Some("./bin"));
    assert_eq!(args.pkg.as_deref(), Some("./cmd/api,./cmd/worker"));
    assert_eq!(
        args.run_args(),
        Some(vec!["-port=8080".to_string(), "-debug".to_string()])
    );
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("dev.toml")));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(!args.version);
}

#[test]
fn test_version_flag() {
    let short = CliArgs::try_parse_from(["gowatch", "-v"]).unwrap();
    let long = CliArgs::try_parse_from(["gowatch", "--version"]).unwrap();
    assert!(short.version);
    assert!(long.version);
    assert!(version_string().starts_with("gowatch "));
}

#[test]
fn test_empty_args_flag_is_ignored() {
    let args = CliArgs::try_parse_from(["gowatch", "--args="]).unwrap();
    assert_eq!(args.run_args(), None);

    let none = CliArgs::try_parse_from(["gowatch"]).unwrap();
    assert_eq!(none.run_args(), None);
}

#[test]
fn test_unknown_flag_is_rejected() {
    assert!(CliArgs::try_parse_from(["gowatch", "--frobnicate"]).is_err());
}

#[test]
fn test_cli_level_wins_over_env() {
    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace")), Level::WARN);
}

#[test]
fn test_env_level_used_without_cli() {
    assert_eq!(resolve_level(None, Some("DEBUG")), Level::DEBUG);
    assert_eq!(resolve_level(None, Some(" warning ")), Level::WARN);
}

#[test]
fn test_unparseable_env_level_defaults_to_info() {
    assert_eq!(resolve_level(None, Some("loud")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
}
