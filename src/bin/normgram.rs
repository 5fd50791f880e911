// Copyright (c) 2016-2020 Fabian Schuiki

//! A driver that normalizes grammar files.

extern crate clap;
extern crate normgram;
#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use normgram::cfg::{self, EpsilonMode, Freeze, FrozenGrammar, TerminalTable};
use normgram::errors::*;
use std::sync::Arc;

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Normalizes context-free grammars to Chomsky Normal Form.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all log output"),
        )
        .arg(
            Arg::with_name("keep_epsilon")
                .short("e")
                .long("keep-epsilon")
                .help("Keep the empty string in the language of the grammar"),
        )
        .arg(
            Arg::with_name("literal")
                .short("L")
                .long("literal")
                .value_name("TOKEN")
                .help("Treat TOKEN as a terminal in addition to the built-in table")
                .multiple(true)
                .takes_value(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("stats")
                .long("stats")
                .help("Print statistics instead of the normalized grammar"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The grammar files to normalize")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger.
    let level = if matches.is_present("quiet") {
        LevelFilter::Off
    } else {
        match matches.occurrences_of("verbosity") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .init();

    let mut failed = false;
    for filename in matches.values_of("INPUT").into_iter().flatten() {
        match process(filename, &matches) {
            Ok(grammar) => report(filename, &grammar, &matches),
            Err(msg) => {
                error!("{}", msg);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

/// Read, normalize, and freeze a single grammar file.
fn process(
    filename: &str,
    matches: &ArgMatches,
) -> std::result::Result<Arc<FrozenGrammar>, String> {
    let text = std::fs::read_to_string(filename)
        .map_err(|e| format!("unable to read `{}`: {}", filename, e))?;
    let mode = if matches.is_present("keep_epsilon") {
        EpsilonMode::Preserve
    } else {
        EpsilonMode::Eliminate
    };
    let table = TerminalTable::default()
        .with_literals(matches.values_of("literal").into_iter().flatten());
    info!("Normalizing `{}` ({:?})", filename, mode);
    compile(&text, mode, &table).map_err(|e| format!("{}: {}", filename, e))
}

fn compile(text: &str, mode: EpsilonMode, table: &TerminalTable) -> Result<Arc<FrozenGrammar>> {
    let grammar = cfg::parse_grammar_with(text, table)?;
    cfg::normalize(&grammar, mode)?.freeze()
}

fn report(filename: &str, grammar: &FrozenGrammar, matches: &ArgMatches) {
    if !matches.is_present("stats") {
        print!("{}", grammar);
        return;
    }
    println!("{}:", filename);
    println!("  start:          {}", grammar.start());
    println!("  productions:    {}", grammar.len());
    println!("  nonterminals:   {}", grammar.nonterminals().count());
    println!("  terminals:      {}", grammar.terminals().len());
    println!("  derives ε:      {}", grammar.derives_epsilon());
    println!("  fingerprint:    {:016x}", grammar.fingerprint());
}
