//! Rejection-sampling driver: generate, morph, gate on the greedy estimate,
//! encode and persist, once per instance slot and ratio.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::cnf::{encode_coloring, CnfFormula};
use crate::coloring::estimate_chromatic_number;
use crate::config::GeneratorConfig;
use crate::error::{GcpError, Result};
use crate::generate::{random_graph, ring_lattice};
use crate::morph::morph_graphs;

/// Result of filling one instance slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    Accepted {
        formula: CnfFormula,
        attempts: usize,
        num_edges: usize,
    },
    /// `max_attempts` candidates were all rejected.
    Exhausted { attempts: usize },
}

/// Draw candidates for ratio `p` until one has a greedy color count equal to
/// `config.num_colors`, or `config.max_attempts` candidates were rejected.
///
/// The acceptance test is exact equality with an upper-bound heuristic, so
/// some parameter combinations can never be accepted.
pub fn run_trial<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    p: f64,
    rng: &mut R,
) -> Result<TrialOutcome> {
    // the lattice has no randomness, one copy serves every attempt
    let lattice = ring_lattice(config.num_vertices, config.num_neighbors)?;

    for attempt in 1..=config.max_attempts {
        let random = random_graph(config.num_vertices, config.num_edges, rng)?;
        let morphed = morph_graphs(&lattice, &random, p, rng)?;
        let estimate = estimate_chromatic_number(&morphed);
        if estimate != config.num_colors {
            log::trace!(
                "p={} attempt {}: rejected, greedy estimate {}",
                p,
                attempt,
                estimate
            );
            continue;
        }
        let formula = encode_coloring(&morphed, config.num_colors)?;
        return Ok(TrialOutcome::Accepted {
            formula,
            attempts: attempt,
            num_edges: morphed.edge_count(),
        });
    }
    Ok(TrialOutcome::Exhausted {
        attempts: config.max_attempts,
    })
}

/// =============== Output layout ===============

pub fn ratio_dir_name(p: f64, instances: usize) -> String {
    format!("p_{:?}_instances_{}", p, instances)
}

pub fn instance_file_name(p: f64, index: usize) -> String {
    format!("p_{:?}_{}.cnf", p, index)
}

/// Writes through a temp file in the same directory; the `.cnf` only
/// appears once complete, and the temp file is removed if anything fails.
fn write_instance(path: &Path, formula: &CnfFormula, comments: &[String]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    formula.write_dimacs(&mut BufWriter::new(tmp.as_file_mut()), comments)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// =============== Progress and summary ===============

/// Live counters for one ratio.
#[derive(Debug, Default)]
pub struct RatioProgress {
    accepted: AtomicUsize,
    attempts: AtomicUsize,
}

impl RatioProgress {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.attempts.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSummary {
    pub ratio: f64,
    pub accepted: usize,
    pub attempts: usize,
    pub directory: PathBuf,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub config: GeneratorConfig,
    pub ratios: Vec<RatioSummary>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.ratios.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// =============== Pipeline ===============

pub struct InstancePipeline {
    config: GeneratorConfig,
    seed: u64,
    progress: Vec<RatioProgress>,
    show_progress: bool,
}

impl InstancePipeline {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let progress = config.ratios.iter().map(|_| RatioProgress::default()).collect();
        Ok(InstancePipeline {
            config,
            seed,
            progress,
            show_progress: true,
        })
    }

    /// Hide the progress bars.
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Counters for the ratio at `index` in the configured list.
    pub fn progress(&self, index: usize) -> Option<&RatioProgress> {
        self.progress.get(index)
    }

    /// Seed for the ratio at `index`; each ratio draws from its own stream.
    fn ratio_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }

    pub fn ratio_dir(&self, p: f64) -> PathBuf {
        self.config
            .output_dir
            .join(ratio_dir_name(p, self.config.instances_per_ratio))
    }

    fn comments(&self, p: f64, num_edges: usize, attempts: usize) -> Vec<String> {
        let c = &self.config;
        vec![
            format!("morphed graph coloring instance, p={:?}", p),
            format!(
                "ring lattice n={} k={}, random graph m={}, colors={}",
                c.num_vertices, c.num_neighbors, c.num_edges, c.num_colors
            ),
            format!("morphed edges={} accepted after {} attempts", num_edges, attempts),
        ]
    }

    fn progress_bar(&self, multi: &MultiProgress, p: f64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = multi.add(ProgressBar::new(self.config.instances_per_ratio as u64));
        let style = ProgressStyle::with_template(
            "[p={msg}] [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(format!("{:?}", p));
        pb
    }

    /// Fill every slot of the ratio at `index`.
    fn generate_ratio(&self, index: usize, p: f64, pb: &ProgressBar) -> Result<()> {
        let progress = &self.progress[index];
        progress.reset();
        let dir = self.ratio_dir(p);
        fs::create_dir_all(&dir)?;

        let mut rng: StdRng = SeedableRng::seed_from_u64(self.ratio_seed(index));
        while progress.accepted() < self.config.instances_per_ratio {
            match run_trial(&self.config, p, &mut rng)? {
                TrialOutcome::Accepted {
                    formula,
                    attempts,
                    num_edges,
                } => {
                    progress.attempts.fetch_add(attempts, Ordering::Relaxed);
                    let sequence = progress.accepted() + 1;
                    let file_name = instance_file_name(p, sequence);
                    write_instance(
                        &dir.join(&file_name),
                        &formula,
                        &self.comments(p, num_edges, attempts),
                    )?;
                    progress.accepted.fetch_add(1, Ordering::Relaxed);
                    pb.inc(1);
                    log::info!("Instance {} created with p={:?}.", file_name, p);
                }
                TrialOutcome::Exhausted { attempts } => {
                    progress.attempts.fetch_add(attempts, Ordering::Relaxed);
                    return Err(GcpError::TargetUnreachable {
                        ratio: p,
                        target: self.config.num_colors,
                        attempts,
                    });
                }
            }
        }
        Ok(())
    }

    /// Generate all ratios in parallel and write `summary.json` into the
    /// output directory. A failing ratio is recorded in the summary and does
    /// not stop the others; only a failure to write the summary is returned
    /// as an error. Running again starts every ratio over from zero.
    pub fn run(&self) -> Result<RunSummary> {
        fs::create_dir_all(&self.config.output_dir)?;
        log::info!(
            "generating {} instances for each of {} ratios into {} (seed {})",
            self.config.instances_per_ratio,
            self.config.ratios.len(),
            self.config.output_dir.display(),
            self.seed
        );

        let multi = MultiProgress::new();
        let bars: Vec<ProgressBar> = self
            .config
            .ratios
            .iter()
            .map(|&p| self.progress_bar(&multi, p))
            .collect();

        let ratios: Vec<RatioSummary> = self
            .config
            .ratios
            .par_iter()
            .enumerate()
            .map(|(index, &p)| {
                let result = self.generate_ratio(index, p, &bars[index]);
                let error = match result {
                    Ok(()) => {
                        bars[index].finish();
                        None
                    }
                    Err(e) => {
                        bars[index].abandon();
                        log::error!("p={:?}: {}", p, e);
                        Some(e.to_string())
                    }
                };
                RatioSummary {
                    ratio: p,
                    accepted: self.progress[index].accepted(),
                    attempts: self.progress[index].attempts(),
                    directory: self.ratio_dir(p),
                    error,
                }
            })
            .collect();

        let summary = RunSummary {
            seed: self.seed,
            config: self.config.clone(),
            ratios,
        };
        summary.write_json(self.config.output_dir.join("summary.json"))?;
        Ok(summary)
    }
}
