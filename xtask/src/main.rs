use std::error::Error;
use std::process;

use clap::Command;
use duct::cmd;

type AnyResult<T> = Result<T, Box<dyn Error>>;
type StepFn = fn() -> AnyResult<()>;
type Step = (&'static str, StepFn);

fn cli() -> Command {
    Command::new("peakchart-task")
        .about("Tasks for managing the peakchart workspace")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("lint")
                .about("Lints code using native tooling")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("fmt").about("Check formatting"))
                .subcommand(Command::new("clippy").about("Run clippy with warnings denied")),
        )
        .subcommand(Command::new("test").about("Run the workspace tests"))
        .subcommand(Command::new("bench").about("Run the engine benchmarks"))
        .subcommand(Command::new("all").about("Run every lint and test"))
}

fn main() {
    if let Err(error) = run() {
        eprintln!("xtask error: {error}");
        process::exit(1);
    }
}

fn run() -> AnyResult<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("lint", subcommand)) => match subcommand.subcommand() {
            Some(("fmt", _)) => run_fmt_check(),
            Some(("clippy", _)) => run_clippy(),
            _ => unreachable!(),
        },
        Some(("test", _)) => run_tests(),
        Some(("bench", _)) => run_benches(),
        Some(("all", _)) => run_all(),
        _ => unreachable!(),
    }
}

fn run_fmt_check() -> AnyResult<()> {
    println!("Checking formatting...");
    run_cmd("cargo", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> AnyResult<()> {
    println!("Running clippy...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn run_tests() -> AnyResult<()> {
    println!("Running tests...");
    run_cmd("cargo", &["test", "--workspace"])
}

fn run_benches() -> AnyResult<()> {
    println!("Running benchmarks...");
    run_cmd("cargo", &["bench", "-p", "peakchart"])
}

fn run_all() -> AnyResult<()> {
    let mut errors = Vec::new();

    const STEPS: &[Step] = &[
        ("Format check", run_fmt_check),
        ("Clippy", run_clippy),
        ("Tests", run_tests),
    ];

    for (label, step) in STEPS {
        if let Err(error) = step() {
            eprintln!("{label} failed: {error}");
            errors.push(format!("{label}: {error}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("One or more tasks failed:\n{}", errors.join("\n")).into())
    }
}

fn run_cmd(program: &str, args: &[&str]) -> AnyResult<()> {
    println!("> {} {}", program, args.join(" "));
    cmd(program, args).run()?;
    Ok(())
}
