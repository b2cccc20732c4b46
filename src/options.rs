//! Command-line options. Values given on the command line override a
//! `--config` JSON file, which overrides the built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use morphed_gcp::GeneratorConfig;

fn make_options_parser() -> Command {
  Command::new("morphed-gcp")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Generate morphed graph-coloring instances as DIMACS CNF")
    .arg(
      Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON file with generator parameters"),
    )
    .arg(
      Arg::new("output")
        .short('o')
        .long("output")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .help("Directory the instance folders are written to"),
    )
    .arg(
      Arg::new("vertices")
        .short('n')
        .long("vertices")
        .value_parser(value_parser!(usize))
        .help("Number of vertices"),
    )
    .arg(
      Arg::new("neighbors")
        .short('k')
        .long("neighbors")
        .value_parser(value_parser!(usize))
        .help("Ring lattice neighbors per vertex (even)"),
    )
    .arg(
      Arg::new("edges")
        .short('m')
        .long("edges")
        .value_parser(value_parser!(usize))
        .help("Edges in the random graph"),
    )
    .arg(
      Arg::new("colors")
        .short('c')
        .long("colors")
        .value_parser(value_parser!(usize))
        .help("Target chromatic estimate and palette size"),
    )
    .arg(
      Arg::new("ratios")
        .short('p')
        .long("ratios")
        .value_delimiter(',')
        .action(ArgAction::Append)
        .value_parser(value_parser!(f64))
        .help("Comma-separated morph ratios in [0, 1]"),
    )
    .arg(
      Arg::new("instances")
        .short('i')
        .long("instances")
        .value_parser(value_parser!(usize))
        .help("Instances per ratio"),
    )
    .arg(
      Arg::new("max-attempts")
        .long("max-attempts")
        .value_parser(value_parser!(usize))
        .help("Candidates tried per instance before a ratio is given up"),
    )
    .arg(
      Arg::new("seed")
        .long("seed")
        .value_parser(value_parser!(u64))
        .help("Base random seed"),
    )
    .arg(
      Arg::new("quiet")
        .short('q')
        .long("quiet")
        .action(ArgAction::SetTrue)
        .help("Hide progress bars"),
    )
}

#[derive(Debug)]
pub struct Options {
  pub config: GeneratorConfig,
  pub quiet: bool,
}

fn override_with<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str, slot: &mut T) {
  if let Some(value) = matches.get_one::<T>(id) {
    *slot = value.clone();
  }
}

impl Options {
  pub fn parse_from_args<I, S>(args: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
  {
    let matches = make_options_parser().try_get_matches_from(args)?;

    let mut config = match matches.get_one::<PathBuf>("config") {
      Some(path) => GeneratorConfig::from_json_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?,
      None => GeneratorConfig::default(),
    };

    override_with(&matches, "output", &mut config.output_dir);
    override_with(&matches, "vertices", &mut config.num_vertices);
    override_with(&matches, "neighbors", &mut config.num_neighbors);
    override_with(&matches, "edges", &mut config.num_edges);
    override_with(&matches, "colors", &mut config.num_colors);
    override_with(&matches, "instances", &mut config.instances_per_ratio);
    override_with(&matches, "max-attempts", &mut config.max_attempts);
    if let Some(seed) = matches.get_one::<u64>("seed") {
      config.seed = Some(*seed);
    }
    if let Some(ratios) = matches.get_many::<f64>("ratios") {
      config.ratios = ratios.copied().collect();
    }

    Ok(Options {
      config,
      quiet: matches.get_flag("quiet"),
    })
  }
}
