// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run an Intcode program with a given noun and verb, or search for the noun and verb that produce
//! a target value.

use clap::{Args, Parser, Subcommand};
use gravity_assist::parse::CodeFormat;
use gravity_assist::prelude::*;
use gravity_assist::search::find_pair_with_stats;
use itertools::Itertools;
use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));
const SOURCE_HELP: &str = "File containing the intcode\nuses stdin if set to '-'";

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "1202 Program Alarm runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the program once, printing the value left at address 0
    Run(RunArgs),
    /// Search for the noun and verb that leave a target value at address 0
    Search(SearchArgs),
}

#[derive(Args)]
struct Source {
    #[arg(help = SOURCE_HELP.split_once("\n").unwrap().0)]
    #[arg(long_help = SOURCE_HELP)]
    source: PathBuf,
    #[arg(help = "Input format for the intcode")]
    #[arg(short, long)]
    #[arg(default_value = "ascii")]
    format: CodeFormat,
    #[arg(long = "legacy-opcodes")]
    #[arg(help = "Skip over unrecognized opcodes instead of failing")]
    legacy_opcodes: bool,
}

impl Source {
    fn load(&self) -> Result<Vec<i64>, DisplayedError> {
        let input = if self.source.as_os_str() == "-" {
            let mut v = Vec::new();
            io::stdin().read_to_end(&mut v)?;
            v
        } else {
            fs::read(&self.source)?
        };
        Ok(self.format.parse(&input)?)
    }

    fn policy(&self) -> OpcodePolicy {
        if self.legacy_opcodes {
            OpcodePolicy::Skip
        } else {
            OpcodePolicy::Strict
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: Source,
    #[arg(long, requires = "verb")]
    #[arg(help = "Value to write at address 1 before running")]
    noun: Option<i64>,
    #[arg(long, requires = "noun")]
    #[arg(help = "Value to write at address 2 before running")]
    verb: Option<i64>,
    #[arg(long)]
    #[arg(help = "Print each executed instruction to stderr once the program stops")]
    trace: bool,
    #[arg(long)]
    #[arg(help = "Log each instruction to stderr as it runs")]
    log: bool,
    #[arg(long)]
    #[arg(help = "Print all of memory instead of just address 0")]
    dump: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    source: Source,
    #[arg(short, long, default_value_t = 19_690_720)]
    #[arg(help = "Value wanted at address 0")]
    target: i64,
    #[arg(short, long, default_value_t = 100)]
    #[arg(help = "Nouns and verbs are searched below this value")]
    bound: i64,
    #[arg(long, default_value_t = 1)]
    #[arg(help = "Address the noun is written to")]
    noun_offset: usize,
    #[arg(long, default_value_t = 2)]
    #[arg(help = "Address the verb is written to")]
    verb_offset: usize,
}

fn run(args: &RunArgs) -> Result<ExitCode, DisplayedError> {
    let mut code = args.source.load()?;
    if let (Some(noun), Some(verb)) = (args.noun, args.verb) {
        ParamPair::new(noun, verb).inject(&mut code, 1, 2)?;
    }

    let mut interp = Interpreter::new(code).with_policy(args.source.policy());
    if args.log {
        interp.log_with(io::stderr());
    }
    if args.trace {
        interp.start_trace();
    }
    let result = interp.run();
    if let Some(trace) = interp.end_trace() {
        eprintln!("{trace}");
    }
    if result? == State::RanOffEnd {
        eprintln!("warning: program ran off the end of memory without halting");
    }

    if args.dump {
        println!("{}", interp.memory().iter().join(","));
    } else {
        println!("{}", interp.mem_get(0)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn search(args: &SearchArgs) -> Result<ExitCode, DisplayedError> {
    let code = args.source.load()?;
    let config = SearchConfig::new(args.target)
        .with_bound(args.bound)
        .with_offsets(args.noun_offset, args.verb_offset)
        .with_policy(args.source.policy());

    let (pair, stats) = find_pair_with_stats(&code, &config)?;
    if let Some(ParamPair { noun, verb }) = pair.found() {
        println!("{pair}");
        println!("{}", 100 * noun + verb);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "no pair found below {} producing {} ({} trials, {} failed)",
            args.bound, args.target, stats.trials, stats.failed_trials
        );
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> Result<ExitCode, DisplayedError> {
    match Cli::parse().command {
        Command::Run(args) => run(&args),
        Command::Search(args) => search(&args),
    }
}

/// a wrapper around a [`Box`ed][Box] [dyn Error][Error] that uses its implementation of [Display]
/// for the [Debug] impl, to display the Error if returned from `main`
struct DisplayedError(Box<dyn Error>);
impl<E: Error + 'static> From<E> for DisplayedError {
    fn from(e: E) -> Self {
        Self(Box::from(e))
    }
}

impl Debug for DisplayedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
