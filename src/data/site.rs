//! # Site Records
//!
//! Per-column metadata: a genomic coordinate and the 1-allele count.

/// One panel site
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Site {
    /// Genomic coordinate. Zero until loaded from a sites file or set
    /// by an ingestion adapter; the core never orders by it.
    pub pos: u32,
    /// Number of 1-alleles at this site
    pub ones: u32,
}

impl Site {
    /// 1-allele frequency given the panel depth
    pub fn frequency(&self, m: usize) -> f64 {
        self.ones as f64 / m as f64
    }
}
