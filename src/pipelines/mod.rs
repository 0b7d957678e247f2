//! # Pipeline Driver
//!
//! Executes the operations requested on the command line over one working
//! panel. The original tool interpreted its argument list positionally; a
//! derive-based CLI fixes the order instead:
//!
//! 1. ingest (`--macs`) or read (`--read`), then `--readSites`
//! 2. `--subsample`, then `--subsites` (each replaces the working panel)
//! 3. `--write`, `--writeSites`, `--haps`
//! 4. `--longWithin`, `--maximalWithin`
//! 5. `--test`
//!
//! Diagnostics go to standard error through `tracing`; match records and
//! statistics go to standard output.

use std::io::{BufWriter, Write};

use tracing::info;

use crate::config::Config;
use crate::data::haplotype::HapMatrix;
use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};
use crate::io::{self, Checkpointer};
use crate::model::matches::{long_matches, maximal_matches, MatchRecord};
use crate::model::query::PanelIndex;

/// Run the configured operations to completion
pub fn run(config: &Config) -> Result<()> {
    config.validate()?;

    let mut panel = if let Some(spec) = &config.macs {
        let mut checkpoint = Checkpointer::new(config.checkpoint);
        io::read_macs(io::open_input(spec)?, &mut checkpoint)?
    } else if let Some(spec) = &config.read {
        io::read_panel(spec)?
    } else {
        unreachable!("validate requires an input")
    };

    if let Some(spec) = &config.read_sites {
        let coords = io::read_sites(io::open_input(spec)?)?;
        io::apply_sites(&mut panel, &coords);
    }

    if let Some(args) = &config.subsample {
        panel = panel.subsample(args[0], args[1])?;
        info!(m = panel.m(), "haplotypes subsampled");
    }
    if let Some(args) = &config.subsites {
        panel = panel.subsites(args[0], args[1])?;
        info!(n = panel.n_sites(), "sites subsampled");
    }

    if config.check {
        panel.verify()?;
        info!("panel invariants verified");
    }
    if config.stats {
        println!("{}", panel.stats()?);
    }

    if let Some(spec) = &config.write {
        let mut out = io::open_output(spec)?;
        io::write_panel(&panel, &mut out)?;
        out.flush()?;
        info!(to = spec.as_str(), "panel written");
    }
    if let Some(spec) = &config.write_sites {
        let mut out = io::open_output(spec)?;
        io::write_sites(&panel, &mut out)?;
        out.flush()?;
    }
    if let Some(spec) = &config.haps {
        let mut out = io::open_output(spec)?;
        io::write_haps(&panel, &mut out)?;
        out.flush()?;
    }

    if config.long_within.is_some() || config.maximal_within {
        let matrix = if config.check {
            Some(panel.haplotypes()?)
        } else {
            None
        };
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        if let Some(min_len) = config.long_within {
            let count = report_matches(&panel, matrix.as_ref(), &mut out, |panel, sink| {
                long_matches(panel, min_len, sink)
            })?;
            info!(count, min_len, "long matches reported");
        }
        if config.maximal_within {
            let count = report_matches(&panel, matrix.as_ref(), &mut out, |panel, sink| {
                maximal_matches(panel, sink)
            })?;
            info!(count, "maximal matches reported");
        }
        out.flush()?;
    }

    if let Some(spec) = &config.test {
        run_query_panel(&panel, spec, config.check)?;
    }

    Ok(())
}

/// Drive a reporter over the panel, printing one `MATCH` line per record
/// and verifying each against the haplotype matrix when one is supplied.
fn report_matches<W, R>(
    panel: &Panel,
    matrix: Option<&HapMatrix>,
    out: &mut W,
    reporter: R,
) -> Result<usize>
where
    W: Write,
    R: FnOnce(&Panel, &mut dyn FnMut(MatchRecord)) -> Result<()>,
{
    let mut count = 0;
    let mut violation = None;
    let mut write_err = None;
    reporter(panel, &mut |rec| {
        count += 1;
        if let Some(matrix) = matrix {
            if violation.is_none() {
                violation = verify_match(matrix, &rec);
            }
        }
        if write_err.is_none() {
            if let Err(e) = writeln!(
                out,
                "MATCH\t{}\t{}\t{}\t{}\t{}",
                rec.g1,
                rec.g2,
                rec.start,
                rec.end,
                rec.len()
            ) {
                write_err = Some(e);
            }
        }
    })?;
    if let Some(e) = write_err {
        return Err(e.into());
    }
    if let Some(message) = violation {
        return Err(PbwtError::invariant(message));
    }
    Ok(count)
}

/// Check one reported match against the haplotype matrix
fn verify_match(matrix: &HapMatrix, rec: &MatchRecord) -> Option<String> {
    if rec.g1 == rec.g2 {
        return Some(format!("self match reported: {rec:?}"));
    }
    if rec.start >= rec.end {
        return Some(format!("empty match reported: {rec:?}"));
    }
    if !matrix.agree_on(rec.g1, rec.g2, rec.start, rec.end) {
        return Some(format!("haplotypes disagree inside match: {rec:?}"));
    }
    if rec.start > 0 && matrix.get(rec.g1, rec.start - 1) == matrix.get(rec.g2, rec.start - 1) {
        return Some(format!("match extends left: {rec:?}"));
    }
    if rec.end < matrix.n() && matrix.get(rec.g1, rec.end) == matrix.get(rec.g2, rec.end) {
        return Some(format!("match extends right: {rec:?}"));
    }
    None
}

/// Match every haplotype of a second panel file against the panel
fn run_query_panel(panel: &Panel, spec: &str, check: bool) -> Result<()> {
    let queries = io::read_panel(spec)?;
    if queries.n_sites() != panel.n_sites() {
        return Err(PbwtError::shape(format!(
            "query panel has {} sites, panel has {}",
            queries.n_sites(),
            panel.n_sites()
        )));
    }
    let index = PanelIndex::build(panel)?;
    let query_matrix = queries.haplotypes()?;
    let panel_matrix = if check {
        Some(panel.haplotypes()?)
    } else {
        None
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut total = 0;
    for q in 0..queries.m() as u32 {
        let z = query_matrix.row(q);
        let mut violation = None;
        let mut write_err = None;
        index.match_query(q, &z, |rec| {
            total += 1;
            if let Some(matrix) = &panel_matrix {
                if violation.is_none()
                    && !(rec.start..rec.end).all(|k| z[k] == matrix.get(rec.g2, k))
                {
                    violation = Some(format!("query disagrees inside match: {rec:?}"));
                }
            }
            if write_err.is_none() {
                if let Err(e) = writeln!(
                    out,
                    "MATCH-QUERY\t{}\t{}\t{}\t{}\t{}",
                    rec.g1,
                    rec.g2,
                    rec.start,
                    rec.end,
                    rec.len()
                ) {
                    write_err = Some(e);
                }
            }
        })?;
        if let Some(e) = write_err {
            return Err(e.into());
        }
        if let Some(message) = violation {
            return Err(PbwtError::invariant(message));
        }
    }
    out.flush()?;
    info!(queries = queries.m(), total, "query matching complete");
    Ok(())
}
