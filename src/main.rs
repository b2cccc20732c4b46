use anyhow::{bail, Result};
use morphed_gcp::InstancePipeline;

mod options;
use options::Options;

fn main() -> Result<()> {
  let env = env_logger::Env::new()
    .filter_or("GCP_LOG", "warn")
    .write_style("GCP_LOG_STYLE");
  env_logger::init_from_env(env);

  let options = match Options::parse_from_args(std::env::args_os()) {
    Ok(options) => options,
    Err(e) => match e.downcast::<clap::Error>() {
      Ok(usage) => usage.exit(),
      Err(e) => return Err(e),
    },
  };
  log::debug!("options: {:?}", options);

  let mut pipeline = InstancePipeline::new(options.config)?;
  if options.quiet {
    pipeline = pipeline.quiet();
  }
  let summary = pipeline.run()?;

  for ratio in &summary.ratios {
    match &ratio.error {
      None => println!(
        "p={:?}: {} instances in {} ({} candidates)",
        ratio.ratio,
        ratio.accepted,
        ratio.directory.display(),
        ratio.attempts
      ),
      Some(e) => println!("p={:?}: failed after {} instances: {}", ratio.ratio, ratio.accepted, e),
    }
  }

  if summary.failed() > 0 {
    bail!("{} of {} ratios failed (seed {})", summary.failed(), summary.ratios.len(), summary.seed);
  }
  Ok(())
}
