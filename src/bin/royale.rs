//! Console runner for a royale spec.
//!
//! Loads a spec, prints the parse errors and the starting roster, then
//! plays rounds until someone wins.
//!
//! Usage:
//!   cargo run --bin royale -- [OPTIONS] [SPEC]
//!
//! Examples:
//!   cargo run --bin royale                          # Bundled sample spec
//!   cargo run --bin royale -- my-spec.txt -s abc    # Reproducible run
//!   cargo run --bin royale -- --strict --json       # Fail on bad lines, save transcript

use serde::Serialize;
use sizeroyale::build_info;
use sizeroyale::{Game, GameConfig, GameError, RoundReport, SpecParser, Winner};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Whole-game transcript written by `--json`.
#[derive(Serialize)]
struct Transcript<'a> {
    seed: &'a str,
    rounds: &'a [RoundReport],
    winner: Option<Winner>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .format_timestamp(None)
        .init();

    let parsed = match SpecParser::parse_file(&config.spec_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Could not load {}: {}", config.spec_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if parsed.has_errors() {
        eprintln!("{} problem(s) in {}:", parsed.errors.len(), config.spec_path.display());
        for error in &parsed.errors {
            eprintln!("  {}", error);
        }
        if config.strict {
            eprintln!("Aborting (--strict).");
            return ExitCode::FAILURE;
        }
        eprintln!();
    }

    if config.verbosity > 1 {
        println!("{}", parsed.royale);
    }

    let mut game = Game::new(parsed.royale, config.seed.as_deref());
    println!("Seed: {}", game.seed());
    println!();
    println!("{}", game.royale().current_players());

    let mut rounds: Vec<RoundReport> = Vec::new();
    let mut failure = None;
    while game.game_over().is_none() {
        if rounds.len() as u32 >= config.max_rounds {
            eprintln!("Stopped after {} rounds without a winner.", config.max_rounds);
            break;
        }
        match game.advance() {
            Ok(report) => {
                print_round(&report);
                rounds.push(report);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let winner = game.game_over();
    match &winner {
        Some(Winner::Nobody) => println!("Nobody survived."),
        Some(winner) => println!("The winner is {}!", winner),
        None => {}
    }

    if config.json {
        let transcript = Transcript {
            seed: game.seed(),
            rounds: &rounds,
            winner,
        };
        let filename = format!(
            "royale_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match serde_json::to_string_pretty(&transcript) {
            Ok(json) => match std::fs::write(&filename, json) {
                Ok(()) => println!("Transcript saved to: {}", filename),
                Err(e) => eprintln!("Failed to write {}: {}", filename, e),
            },
            Err(e) => eprintln!("Failed to serialize transcript: {}", e),
        }
    }

    match failure {
        None => ExitCode::SUCCESS,
        Some(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn print_round(report: &RoundReport) {
    println!();
    println!("=== {} ===", report.heading());
    for event in &report.events {
        println!("{}", event.text);
    }
}

fn report_failure(e: &GameError) {
    if e.is_engine_bug() {
        eprintln!("Engine bug: {}", e);
    } else {
        eprintln!("The spec cannot continue: {}", e);
        eprintln!("Add events with fewer constraints to that round's section.");
    }
}

fn parse_args(args: &[String]) -> GameConfig {
    let mut config = GameConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-r" | "--max-rounds" => {
                if i + 1 < args.len() {
                    config.max_rounds = args[i + 1].parse().unwrap_or(config.max_rounds);
                    i += 1;
                }
            }
            "--strict" => {
                config.strict = true;
            }
            "--json" => {
                config.json = true;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-q" | "--quiet" => {
                config.verbosity = 0;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--version" => {
                println!("{}", build_info::version_line());
                std::process::exit(0);
            }
            other if !other.starts_with('-') => {
                config.spec_path = PathBuf::from(other);
            }
            other => {
                eprintln!("Ignoring unknown option {}", other);
            }
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Size Royale");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin royale -- [OPTIONS] [SPEC]");
    println!();
    println!("ARGS:");
    println!("    SPEC                  Spec file (default: data/royale-spec.txt)");
    println!();
    println!("OPTIONS:");
    println!("    -s, --seed <S>        Seed string for reproducibility");
    println!("    -r, --max-rounds <N>  Stop after N rounds (default: 500)");
    println!("    --strict              Abort if the spec has any errors");
    println!("    --json                Save the transcript as JSON");
    println!("    -v, --verbose         Dump the parsed royale and engine debug logs");
    println!("    -q, --quiet           Only log warnings");
    println!("    --version             Show version and build info");
    println!("    -h, --help            Show this help");
    println!();
    println!("Logging honours RUST_LOG; narrative lines use the \"narrative\" target.");
}
