//! # I/O Module
//!
//! File boundaries: binary panel framing, sites text files, haplotype
//! export, and MaCS ingestion. `<file|->` arguments accept `-` for the
//! standard streams.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use crate::error::Result;

pub mod haps;
pub mod macs;
pub mod panel;
pub mod sites;

pub use haps::write_haps;
pub use macs::read_macs;
pub use panel::{read_panel, write_panel, Checkpointer};
pub use sites::{apply_sites, read_sites, write_sites};

/// Open a text or binary input, `-` meaning standard input
pub fn open_input(spec: &str) -> Result<Box<dyn BufRead>> {
    Ok(if spec == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(spec)?))
    })
}

/// Open an output, `-` meaning standard output
pub fn open_output(spec: &str) -> Result<Box<dyn Write>> {
    Ok(if spec == "-" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(spec)?))
    })
}
