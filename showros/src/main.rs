use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use clap::{App, Arg};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quake_demo::analyzer::block_dump::BlockDump;
use quake_demo::analyzer::survey::{Survey, SurveyStats};
use quake_demo::analyzer::Analyzer;

use showros::config::FixerConfig;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = App::new("showros")
        .about("Restores the recorded player's animations in a Quake demo")
        .arg(
            Arg::with_name("INPUT")
                .help("Demo file to repair")
                .required_unless("GENERATE_CONFIG")
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Where to write the repaired demo")
                .required_unless("GENERATE_CONFIG")
                .index(2),
        )
        .arg(
            Arg::with_name("VIEW_ENTITY")
                .help("Entity number of the recorded player (detected from the demo by default)")
                .index(3),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("Path to a TOML config file")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("GENERATE_CONFIG")
                .help("Print a default config file and exit")
                .long("generate-config"),
        )
        .arg(
            Arg::with_name("DUMP")
                .help("Write the repaired demo's blocks as JSON lines to this file")
                .long("dump")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("VERBOSE")
                .help("Log every animation change")
                .short("v")
                .long("verbose"),
        )
        .get_matches();

    if matches.is_present("GENERATE_CONFIG") {
        print!("{}", FixerConfig::generate_default_toml());
        return Ok(());
    }

    init_logging(matches.is_present("VERBOSE"));

    let mut config = match matches.value_of("CONFIG") {
        Some(path) => FixerConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => FixerConfig::default(),
    };
    config.apply_cli_overrides(&matches)?;

    let input = matches
        .value_of("INPUT")
        .ok_or_else(|| anyhow!("No input demo given"))?;
    let output = matches
        .value_of("OUTPUT")
        .ok_or_else(|| anyhow!("No output path given"))?;

    let (demo, fixed) = showros::fix_file(Path::new(input), Path::new(output), &config)
        .with_context(|| format!("Failed to repair {input}"))?;
    if fixed.rewritten == 0 {
        warn!(
            "no update showed {}, the output matches the input",
            config.sentinel_model
        );
    }

    let stats = Rc::new(RefCell::new(SurveyStats::new()));
    let mut analyzers: Vec<Box<dyn Analyzer>> = vec![Box::new(Survey::new(stats.clone()))];
    let dump = matches.value_of("DUMP");
    if let Some(path) = dump {
        let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
        analyzers.push(Box::new(BlockDump::new(BufWriter::new(file))));
    }

    for block in &demo.blocks {
        for analyzer in analyzers.iter_mut() {
            analyzer.process(block);
        }
    }
    for analyzer in analyzers.iter_mut() {
        analyzer.finish();
    }

    if let Some(path) = dump {
        info!("dumped {} blocks to {path}", stats.borrow().total_blocks);
    }
    info!("wrote {output}");
    Ok(())
}
