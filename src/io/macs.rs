//! # MaCS Ingestion
//!
//! Builds a panel from a MaCS-style simulator stream:
//!
//! ```text
//! COMMAND: <cmd> <M> <L> ...
//! SEED: ...
//! SITE: <num> <p> <time> <M chars in {'0','1'}>
//! ```
//!
//! Site positions `p` in `[0, 1)` are scaled to integer coordinates by
//! `floor(L * p)`. Lines other than `SITE:` records are skipped; end of
//! file after a complete line ends ingestion.

use std::io::BufRead;

use tracing::info;

use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};
use crate::io::panel::Checkpointer;

/// ASCII digit to allele; 0xFF marks a non-binary character
static ALLELE_FROM_ASCII: [u8; 256] = allele_table();

const fn allele_table() -> [u8; 256] {
    let mut table = [0xFF; 256];
    table[b'0' as usize] = 0;
    table[b'1' as usize] = 1;
    table
}

/// Ingest a MaCS stream into a fresh panel, writing rotating snapshots
/// through `checkpoint` as sites accumulate.
pub fn read_macs<R: BufRead>(reader: R, checkpoint: &mut Checkpointer) -> Result<Panel> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| PbwtError::format("empty MaCS stream"))??;
    let (m, scale) = parse_header(&header)?;

    let mut panel = Panel::new(m)?;
    let mut column = vec![0u8; m];
    for (idx, line) in lines.enumerate() {
        let lineno = idx + 2;
        let line = line?;
        if !line.starts_with("SITE:") {
            continue;
        }
        let mut parts = line.split_whitespace();
        let _tag = parts.next();
        let _num = parts
            .next()
            .ok_or_else(|| PbwtError::parse(lineno, "missing site number"))?;
        let p: f64 = parts
            .next()
            .ok_or_else(|| PbwtError::parse(lineno, "missing site position"))?
            .parse()
            .map_err(|_| PbwtError::parse(lineno, "invalid site position"))?;
        let _time = parts
            .next()
            .ok_or_else(|| PbwtError::parse(lineno, "missing site time"))?;
        let alleles = parts
            .next()
            .ok_or_else(|| PbwtError::parse(lineno, "missing alleles"))?;
        if alleles.len() != m {
            return Err(PbwtError::shape(format!(
                "line {lineno}: {} alleles for {m} haplotypes",
                alleles.len()
            )));
        }
        for (j, b) in alleles.bytes().enumerate() {
            let v = ALLELE_FROM_ASCII[b as usize];
            if v == 0xFF {
                return Err(PbwtError::parse(
                    lineno,
                    format!("non-binary allele character {:?}", b as char),
                ));
            }
            column[j] = v;
        }
        panel.append_column(&column)?;
        panel.set_site_pos(panel.n_sites() - 1, (scale * p) as u32);
        checkpoint.maybe_write(&panel)?;
    }
    info!(m, n = panel.n_sites(), "MaCS ingestion complete");
    Ok(panel)
}

fn parse_header(line: &str) -> Result<(usize, f64)> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("COMMAND:") {
        return Err(PbwtError::format("MaCS stream does not start with COMMAND:"));
    }
    let _cmd = parts
        .next()
        .ok_or_else(|| PbwtError::parse(1, "missing command name"))?;
    let m = parts
        .next()
        .ok_or_else(|| PbwtError::parse(1, "missing haplotype count"))?
        .parse()
        .map_err(|_| PbwtError::parse(1, "invalid haplotype count"))?;
    let scale = parts
        .next()
        .ok_or_else(|| PbwtError::parse(1, "missing region length"))?
        .parse()
        .map_err(|_| PbwtError::parse(1, "invalid region length"))?;
    Ok((m, scale))
}
