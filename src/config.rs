use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GcpError, Result};
use crate::generate::max_edges;

/// Generator parameters. Every field may be omitted from a JSON config file;
/// missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_vertices: usize,
    /// Ring lattice degree (must be even).
    pub num_neighbors: usize,
    /// Edge count of the random graph.
    pub num_edges: usize,
    /// Target chromatic estimate and CNF palette size.
    pub num_colors: usize,
    /// Morph ratios; one output directory each.
    pub ratios: Vec<f64>,
    pub instances_per_ratio: usize,
    /// Candidates tried per instance before giving up on a ratio.
    pub max_attempts: usize,
    /// Base seed; `None` draws from the OS.
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        // with k=8 the unmorphed lattice on 100 vertices has chromatic number 5
        GeneratorConfig {
            num_vertices: 100,
            num_neighbors: 8,
            num_edges: 400,
            num_colors: 5,
            ratios: vec![0.01, 0.2],
            instances_per_ratio: 1000,
            max_attempts: 10_000,
            seed: None,
            output_dir: PathBuf::from("sat_encoded_morphed_gcp"),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Checks every generator parameter up front so a run never starts on a
    /// configuration the generators would reject.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vertices;
        let k = self.num_neighbors;
        if n == 0 {
            return Err(GcpError::invalid("num_vertices must be positive"));
        }
        if k == 0 || k >= n || k % 2 != 0 {
            return Err(GcpError::invalid(format!(
                "num_neighbors must be even with 0 < k < n, got k={} n={}",
                k, n
            )));
        }
        if self.num_edges > max_edges(n) {
            return Err(GcpError::invalid(format!(
                "num_edges {} exceeds {} possible edges on {} vertices",
                self.num_edges,
                max_edges(n),
                n
            )));
        }
        if self.num_colors == 0 {
            return Err(GcpError::invalid("num_colors must be positive"));
        }
        if self.ratios.is_empty() {
            return Err(GcpError::invalid("at least one morph ratio is required"));
        }
        if let Some(p) = self.ratios.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(GcpError::invalid(format!("ratio {} is outside [0, 1]", p)));
        }
        if let Some(p) = self
            .ratios
            .iter()
            .enumerate()
            .find_map(|(i, p)| self.ratios[..i].contains(p).then_some(p))
        {
            return Err(GcpError::invalid(format!("ratio {} is listed twice", p)));
        }
        if self.max_attempts == 0 {
            return Err(GcpError::invalid("max_attempts must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_vertices, 100);
        assert_eq!(config.ratios, vec![0.01, 0.2]);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GeneratorConfig::from_json_str(
            r#"{ "num_vertices": 20, "num_neighbors": 4, "ratios": [0.5], "seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.num_vertices, 20);
        assert_eq!(config.num_neighbors, 4);
        assert_eq!(config.ratios, vec![0.5]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.num_colors, 5);
        assert_eq!(config.output_dir, PathBuf::from("sat_encoded_morphed_gcp"));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            GeneratorConfig::from_json_str("{ \"num_vertices\": -1 }"),
            Err(GcpError::Json(_))
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases: [fn(&mut GeneratorConfig); 10] = [
            |c: &mut GeneratorConfig| c.num_vertices = 0,
            |c: &mut GeneratorConfig| c.num_neighbors = 7,
            |c: &mut GeneratorConfig| c.num_neighbors = 100,
            |c: &mut GeneratorConfig| c.num_edges = 4951,
            |c: &mut GeneratorConfig| c.num_colors = 0,
            |c: &mut GeneratorConfig| c.ratios.clear(),
            |c: &mut GeneratorConfig| c.ratios = vec![0.5, 1.2],
            |c: &mut GeneratorConfig| c.ratios = vec![f64::NAN],
            |c: &mut GeneratorConfig| c.ratios = vec![0.2, 0.4, 0.2],
            |c: &mut GeneratorConfig| c.max_attempts = 0,
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut config = GeneratorConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(GcpError::InvalidParameter(_))),
                "case {} should be rejected",
                i
            );
        }
    }

    #[test]
    fn complete_random_graph_is_allowed() {
        let config = GeneratorConfig {
            num_edges: 4950,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
