//! # Configuration Logic
//!
//! CLI argument parsing and validation using clap derive. Flag names keep
//! the original tool's spelling (`--readSites`, `--longWithin`).

use std::path::Path;

use clap::Parser;

use crate::error::{PbwtError, Result};

/// pbwt: compact storage and matching for bi-allelic haplotype panels
#[derive(Parser, Debug, Clone)]
#[command(name = "pbwt")]
#[command(version)]
#[command(about = "Store and match bi-allelic haplotype panels with the positional Burrows-Wheeler transform", long_about = None)]
pub struct Config {
    // ============ Modes ============
    /// Verify panel and match invariants while scanning (slow)
    #[arg(long)]
    pub check: bool,

    /// Print panel statistics to standard output
    #[arg(long)]
    pub stats: bool,

    // ============ Inputs ============
    /// Ingest a MaCS-style text stream ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    pub macs: Option<String>,

    /// Read a binary panel file ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    pub read: Option<String>,

    /// Read site coordinates, one per line ("-" for stdin)
    #[arg(long = "readSites", value_name = "FILE")]
    pub read_sites: Option<String>,

    /// Rotating snapshot every N sites during ingestion (0 disables)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub checkpoint: usize,

    // ============ Derivations ============
    /// Keep haplotypes [START, START+N) in a fresh panel
    #[arg(long, num_args = 2, value_names = ["START", "N"])]
    pub subsample: Option<Vec<usize>>,

    /// Keep sites with 1-frequency above FMIN, thinned to a fraction FRAC
    #[arg(long, num_args = 2, value_names = ["FMIN", "FRAC"])]
    pub subsites: Option<Vec<f64>>,

    // ============ Outputs ============
    /// Write the panel as a binary file ("-" for stdout)
    #[arg(long, value_name = "FILE")]
    pub write: Option<String>,

    /// Write site coordinates, one per line ("-" for stdout)
    #[arg(long = "writeSites", value_name = "FILE")]
    pub write_sites: Option<String>,

    /// Write the haplotype matrix as text, one line per site
    #[arg(long, value_name = "FILE")]
    pub haps: Option<String>,

    // ============ Matching ============
    /// Report matches of at least L sites within the panel
    #[arg(long = "longWithin", value_name = "L")]
    pub long_within: Option<usize>,

    /// Report set-maximal matches within the panel
    #[arg(long = "maximalWithin")]
    pub maximal_within: bool,

    /// Match every haplotype of a second panel file against the panel
    #[arg(long, value_name = "FILE")]
    pub test: Option<String>,
}

impl Config {
    /// Validate argument combinations and ranges
    pub fn validate(&self) -> Result<()> {
        match (&self.macs, &self.read) {
            (Some(_), Some(_)) => {
                return Err(PbwtError::config("choose one of --macs and --read"));
            }
            (None, None) => {
                return Err(PbwtError::config("no input panel: pass --macs or --read"));
            }
            _ => {}
        }

        for spec in [&self.macs, &self.read, &self.read_sites, &self.test]
            .into_iter()
            .flatten()
        {
            if spec.as_str() != "-" && !Path::new(spec).exists() {
                return Err(PbwtError::config(format!("input file not found: {spec}")));
            }
        }

        if let Some(args) = &self.subsample {
            if args[1] < 2 {
                return Err(PbwtError::config(
                    "subsample must keep at least 2 haplotypes",
                ));
            }
        }
        if let Some(args) = &self.subsites {
            if !(0.0..=1.0).contains(&args[0]) {
                return Err(PbwtError::config("subsites FMIN must be in [0, 1]"));
            }
            if !(args[1] > 0.0 && args[1] <= 1.0) {
                return Err(PbwtError::config("subsites FRAC must be in (0, 1]"));
            }
        }
        if self.long_within == Some(0) {
            return Err(PbwtError::config("longWithin threshold must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config::parse_from(["pbwt", "--read", "-"])
    }

    #[test]
    fn test_requires_one_input() {
        assert!(Config::parse_from(["pbwt"]).validate().is_err());
        assert!(base().validate().is_ok());
        assert!(Config::parse_from(["pbwt", "--read", "-", "--macs", "-"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_range_checks() {
        let mut config = base();
        config.subsample = Some(vec![0, 1]);
        assert!(config.validate().is_err());

        let mut config = base();
        config.subsites = Some(vec![0.5, 0.0]);
        assert!(config.validate().is_err());
        config.subsites = Some(vec![1.5, 1.0]);
        assert!(config.validate().is_err());
        config.subsites = Some(vec![0.5, 1.0]);
        assert!(config.validate().is_ok());

        let mut config = base();
        config.long_within = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_original_flag_spellings() {
        let config = Config::parse_from([
            "pbwt",
            "--read",
            "-",
            "--readSites",
            "-",
            "--longWithin",
            "7",
            "--maximalWithin",
        ]);
        assert_eq!(config.read_sites.as_deref(), Some("-"));
        assert_eq!(config.long_within, Some(7));
        assert!(config.maximal_within);
    }
}
