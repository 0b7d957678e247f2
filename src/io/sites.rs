//! # Sites File I/O
//!
//! Plain text, one decimal genomic coordinate per line, N lines.

use std::io::{BufRead, Write};

use tracing::warn;

use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};

/// Parse a sites file. Blank lines and surrounding whitespace are
/// tolerated.
pub fn read_sites<R: BufRead>(reader: R) -> Result<Vec<u32>> {
    let mut coords = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let pos = text.parse().map_err(|_| {
            PbwtError::parse(idx + 1, format!("invalid site coordinate {text:?}"))
        })?;
        coords.push(pos);
    }
    Ok(coords)
}

/// Attach coordinates to a panel's sites.
///
/// A count mismatch drops the coordinates and keeps the panel, per the
/// shape-error policy; returns whether they were applied.
pub fn apply_sites(panel: &mut Panel, coords: &[u32]) -> bool {
    if coords.len() != panel.n_sites() {
        warn!(
            coords = coords.len(),
            sites = panel.n_sites(),
            "sites file length mismatch, coordinates dropped"
        );
        return false;
    }
    for (k, &pos) in coords.iter().enumerate() {
        panel.set_site_pos(k, pos);
    }
    true
}

/// Write the panel's coordinates, one per line
pub fn write_sites<W: Write>(panel: &Panel, writer: &mut W) -> Result<()> {
    for site in panel.sites() {
        writeln!(writer, "{}", site.pos)?;
    }
    Ok(())
}
