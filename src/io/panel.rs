//! # Binary Panel I/O
//!
//! Framing:
//! - 4 bytes ASCII tag `"PBWT"` (the legacy `"GBWT"` tag is accepted on read)
//! - int32 `M`, int32 `N`, int32 `n` (stream byte length), little-endian
//! - `n` bytes of column stream
//!
//! Files are read through a memory map; `-` reads standard input into a
//! buffer instead. Both paths share one slice-based parser.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use memmap2::Mmap;
use tracing::info;

use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};
use crate::io::sites::write_sites;

/// File tag written by this crate
pub const TAG: &[u8; 4] = b"PBWT";
/// Historic tag still accepted on read
pub const LEGACY_TAG: &[u8; 4] = b"GBWT";

/// Size of the fixed header
const SIZE_HEADER: usize = 16;

/// Write the panel in binary framing
pub fn write_panel<W: Write>(panel: &Panel, writer: &mut W) -> Result<()> {
    let stream = panel.stream();
    if stream.len() > i32::MAX as usize {
        return Err(PbwtError::shape(format!(
            "stream of {} bytes exceeds the int32 framing",
            stream.len()
        )));
    }
    writer.write_all(TAG)?;
    writer.write_all(&(panel.m() as i32).to_le_bytes())?;
    writer.write_all(&(panel.n_sites() as i32).to_le_bytes())?;
    writer.write_all(&(stream.len() as i32).to_le_bytes())?;
    writer.write_all(stream)?;
    Ok(())
}

/// Parse a panel from a complete file image
pub fn read_panel_bytes(bytes: &[u8]) -> Result<Panel> {
    if bytes.len() < SIZE_HEADER {
        return Err(PbwtError::format(format!(
            "panel file of {} bytes is shorter than the {SIZE_HEADER}-byte header",
            bytes.len()
        )));
    }
    let tag = &bytes[0..4];
    if tag != TAG && tag != LEGACY_TAG {
        return Err(PbwtError::format(format!(
            "bad file tag {:02x?}, expected \"PBWT\"",
            tag
        )));
    }
    let m = read_i32(bytes, 4);
    let n = read_i32(bytes, 8);
    let nbytes = read_i32(bytes, 12);
    if m < 2 || n < 0 || nbytes < 0 {
        return Err(PbwtError::shape(format!(
            "implausible header: M {m} N {n} stream {nbytes}"
        )));
    }
    let body = &bytes[SIZE_HEADER..];
    if body.len() != nbytes as usize {
        return Err(PbwtError::format(format!(
            "header declares {nbytes} stream bytes, file carries {}",
            body.len()
        )));
    }
    Panel::from_parts(m as usize, n as usize, body.to_vec())
}

fn read_i32(bytes: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

/// Read a panel from a path, or from standard input for `-`
pub fn read_panel(spec: &str) -> Result<Panel> {
    let panel = if spec == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().lock().read_to_end(&mut bytes)?;
        read_panel_bytes(&bytes)?
    } else {
        let file = File::open(spec)?;
        let mmap = unsafe { Mmap::map(&file)? };
        read_panel_bytes(&mmap)?
    };
    info!(m = panel.m(), n = panel.n_sites(), from = spec, "panel read");
    Ok(panel)
}

/// Rotating snapshot writer used during ingestion.
///
/// Alternates between the `check_A` and `check_B` file pairs so that at
/// least one complete snapshot survives a crash mid-write.
#[derive(Debug)]
pub struct Checkpointer {
    every: usize,
    dir: PathBuf,
    flip: bool,
}

impl Checkpointer {
    /// Snapshot every `every` sites into the working directory; 0 disables
    pub fn new(every: usize) -> Self {
        Self::in_dir(every, ".")
    }

    /// Snapshot every `every` sites into `dir`
    pub fn in_dir(every: usize, dir: impl Into<PathBuf>) -> Self {
        Self {
            every,
            dir: dir.into(),
            flip: false,
        }
    }

    /// Write a snapshot if the panel just crossed the interval
    pub fn maybe_write(&mut self, panel: &Panel) -> Result<()> {
        if self.every == 0 || panel.n_sites() == 0 || panel.n_sites() % self.every != 0 {
            return Ok(());
        }
        let stem = if self.flip { "check_B" } else { "check_A" };
        self.flip = !self.flip;

        let mut out = BufWriter::new(File::create(self.dir.join(format!("{stem}.pbwt")))?);
        write_panel(panel, &mut out)?;
        out.flush()?;
        let mut sites = BufWriter::new(File::create(self.dir.join(format!("{stem}.sites")))?);
        write_sites(panel, &mut sites)?;
        sites.flush()?;
        info!(stem, n = panel.n_sites(), "checkpoint written");
        Ok(())
    }
}
