//! # Panel Container
//!
//! Owns the dimensions, the run-length-coded column stream, the site
//! metadata, and the construction cursor (prefix array, divergence array,
//! working column). Construction appends one site at a time, strictly in
//! site order; queries replay the stream through a fresh cursor.

use tracing::debug;

use crate::data::haplotype::HapMatrix;
use crate::data::site::Site;
use crate::data::storage::rle::{self, Y_SENTINEL};
use crate::error::{PbwtError, Result};
use crate::model::updater::{PbwtDivUpdater, PbwtUpdater};

/// A panel of M bi-allelic haplotypes over N ordered sites
#[derive(Debug)]
pub struct Panel {
    /// Number of haplotypes
    m: usize,
    /// Per-site metadata, one record per appended column
    sites: Vec<Site>,
    /// Concatenated run-length-coded columns in site order
    stream: Vec<u8>,
    /// Prefix array after the last appended site
    a: Vec<u32>,
    /// Divergence array after the last appended site
    d: Vec<u32>,
    /// Working column, sentinel-terminated at index `m`
    y: Vec<u8>,
    updater: PbwtDivUpdater,
}

impl Panel {
    /// Create an empty panel for `m` haplotypes
    pub fn new(m: usize) -> Result<Self> {
        if m < 2 {
            return Err(PbwtError::shape(format!(
                "a panel needs at least 2 haplotypes, got {m}"
            )));
        }
        let mut y = vec![0u8; m + 1];
        y[m] = Y_SENTINEL;
        Ok(Self {
            m,
            sites: Vec::new(),
            stream: Vec::new(),
            a: (0..m as u32).collect(),
            d: vec![0; m + 1],
            y,
            updater: PbwtDivUpdater::new(m),
        })
    }

    /// Rebuild a panel from the dimensions and raw column stream of a
    /// panel file. The stream is decoded once to validate it and to
    /// recover the per-site allele counts.
    pub fn from_parts(m: usize, n: usize, stream: Vec<u8>) -> Result<Self> {
        let mut panel = Self::new(m)?;
        let mut off = 0;
        for k in 0..n {
            let (used, ones) = rle::decode(&stream[off..], m, &mut panel.y)
                .map_err(|e| PbwtError::format(format!("site {k} at stream offset {off}: {e}")))?;
            off += used;
            panel
                .updater
                .update(&panel.y, k, &mut panel.a, &mut panel.d);
            panel.sites.push(Site {
                pos: 0,
                ones: ones as u32,
            });
        }
        if off != stream.len() {
            return Err(PbwtError::format(format!(
                "{} trailing bytes after {n} columns",
                stream.len() - off
            )));
        }
        panel.stream = stream;
        Ok(panel)
    }

    /// Number of haplotypes
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of sites
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    /// Site metadata in site order
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Raw column stream
    pub fn stream(&self) -> &[u8] {
        &self.stream
    }

    /// Set the genomic coordinate of site `k`
    pub(crate) fn set_site_pos(&mut self, k: usize, pos: u32) {
        self.sites[k].pos = pos;
    }

    /// Append the next site's column, given in haplotype order.
    ///
    /// Permutes the column into the current sort order, encodes it onto
    /// the stream, and advances the prefix and divergence arrays.
    pub fn append_column(&mut self, x: &[u8]) -> Result<()> {
        let k = self.sites.len();
        if x.len() != self.m {
            return Err(PbwtError::shape(format!(
                "site {k}: column has {} alleles, panel has {}",
                x.len(),
                self.m
            )));
        }
        let mut ones = 0u32;
        for (j, &v) in x.iter().enumerate() {
            if v > 1 {
                return Err(PbwtError::format(format!(
                    "site {k}: non-binary allele {v} for haplotype {j}"
                )));
            }
            ones += v as u32;
        }
        for i in 0..self.m {
            self.y[i] = x[self.a[i] as usize];
        }
        rle::encode(&self.y, self.m, &mut self.stream);
        self.updater.update(&self.y, k, &mut self.a, &mut self.d);
        self.sites.push(Site { pos: 0, ones });
        Ok(())
    }

    /// Stream the decoded columns through `visit` in site order.
    ///
    /// For each site `k` the visitor receives the sorted column `y`, and
    /// the prefix and divergence arrays as they stand *entering* the
    /// column (the sort over sites `0..k`). Returns the arrays after the
    /// final site for callers that need the terminal state.
    pub fn for_each_column<F>(&self, mut visit: F) -> Result<(Vec<u32>, Vec<u32>)>
    where
        F: FnMut(usize, &[u8], &[u32], &[u32]) -> Result<()>,
    {
        let m = self.m;
        let mut a: Vec<u32> = (0..m as u32).collect();
        let mut d = vec![0u32; m + 1];
        let mut y = vec![0u8; m + 1];
        y[m] = Y_SENTINEL;
        let mut updater = PbwtDivUpdater::new(m);
        let mut off = 0;
        for k in 0..self.sites.len() {
            let (used, _) = rle::decode(&self.stream[off..], m, &mut y)
                .map_err(|e| PbwtError::format(format!("site {k} at stream offset {off}: {e}")))?;
            off += used;
            visit(k, &y[..m], &a, &d)?;
            updater.update(&y, k, &mut a, &mut d);
        }
        Ok((a, d))
    }

    /// Reconstruct the full haplotype matrix by inverting the sort at
    /// every site. Divergences are not needed here, so the scan runs the
    /// plain prefix updater.
    pub fn haplotypes(&self) -> Result<HapMatrix> {
        let m = self.m;
        let mut mat = HapMatrix::zeros(m, self.sites.len());
        let mut a: Vec<u32> = (0..m as u32).collect();
        let mut y = vec![0u8; m + 1];
        y[m] = Y_SENTINEL;
        let mut updater = PbwtUpdater::new(m);
        let mut off = 0;
        for k in 0..self.sites.len() {
            let (used, _) = rle::decode(&self.stream[off..], m, &mut y)
                .map_err(|e| PbwtError::format(format!("site {k} at stream offset {off}: {e}")))?;
            off += used;
            for i in 0..m {
                if y[i] == 1 {
                    mat.set(a[i], k, 1);
                }
            }
            updater.update(&y, &mut a);
        }
        Ok(mat)
    }

    /// Check-mode validation: every column must re-encode to its source
    /// bytes, the prefix array must stay a permutation, and the stored
    /// allele counts must match the stream.
    pub fn verify(&self) -> Result<()> {
        let m = self.m;
        let mut a: Vec<u32> = (0..m as u32).collect();
        let mut d = vec![0u32; m + 1];
        let mut y = vec![0u8; m + 1];
        y[m] = Y_SENTINEL;
        let mut updater = PbwtDivUpdater::new(m);
        let mut seen = vec![false; m];
        let mut reenc = Vec::new();
        let mut off = 0;
        for (k, site) in self.sites.iter().enumerate() {
            let (used, ones) = rle::decode(&self.stream[off..], m, &mut y)
                .map_err(|e| PbwtError::format(format!("site {k} at stream offset {off}: {e}")))?;
            reenc.clear();
            rle::encode(&y, m, &mut reenc);
            if reenc != self.stream[off..off + used] {
                return Err(PbwtError::invariant(format!(
                    "site {k}: column at stream offset {off} does not re-encode to its source"
                )));
            }
            if ones as u32 != site.ones {
                return Err(PbwtError::invariant(format!(
                    "site {k}: stream holds {ones} 1-alleles, metadata says {}",
                    site.ones
                )));
            }
            off += used;
            updater.update(&y, k, &mut a, &mut d);
            seen.fill(false);
            for &h in &a {
                if seen[h as usize] {
                    return Err(PbwtError::invariant(format!(
                        "site {k}: haplotype {h} appears twice in the prefix array"
                    )));
                }
                seen[h as usize] = true;
            }
            let sentinel = (k + 2) as u32;
            if d[0] != sentinel || d[m] != sentinel {
                return Err(PbwtError::invariant(format!(
                    "site {k}: divergence sentinels {}/{} differ from {sentinel}",
                    d[0], d[m]
                )));
            }
        }
        debug!(m, n = self.sites.len(), "panel verified");
        Ok(())
    }

    /// Extract haplotypes `[start, start + n)` into a fresh panel,
    /// consuming this one. Site coordinates carry over; allele counts are
    /// recomputed from the surviving haplotypes.
    pub fn subsample(self, start: usize, n: usize) -> Result<Panel> {
        if n < 2 || start.saturating_add(n) > self.m {
            return Err(PbwtError::shape(format!(
                "subsample [{start}, {}) out of range for {} haplotypes",
                start + n,
                self.m
            )));
        }
        let mut out = Panel::new(n)?;
        let mut x = vec![0u8; self.m];
        self.for_each_column(|k, y, a, _| {
            for i in 0..y.len() {
                x[a[i] as usize] = y[i];
            }
            out.append_column(&x[start..start + n])?;
            out.set_site_pos(k, self.sites[k].pos);
            Ok(())
        })?;
        Ok(out)
    }

    /// Keep the sites whose 1-allele count exceeds `fmin * M`, thinned to
    /// a fraction `frac` of the qualifiers, in a fresh panel. Consumes
    /// this panel.
    pub fn subsites(self, fmin: f64, frac: f64) -> Result<Panel> {
        let mut out = Panel::new(self.m)?;
        let mut x = vec![0u8; self.m];
        let mut acc = 0.0;
        let threshold = fmin * self.m as f64;
        self.for_each_column(|k, y, a, _| {
            let ones = y.iter().filter(|&&v| v == 1).count();
            if ones as f64 <= threshold {
                return Ok(());
            }
            acc += frac;
            if acc < 1.0 {
                return Ok(());
            }
            acc -= 1.0;
            for i in 0..y.len() {
                x[a[i] as usize] = y[i];
            }
            out.append_column(&x)?;
            out.set_site_pos(out.n_sites() - 1, self.sites[k].pos);
            Ok(())
        })?;
        debug!(kept = out.n_sites(), from = self.sites.len(), "subsites");
        Ok(out)
    }

    /// Summary statistics for `-stats`
    pub fn stats(&self) -> Result<PanelStats> {
        let mut runs = 0usize;
        let mut ones_total = 0u64;
        self.for_each_column(|_, y, _, _| {
            runs += 1 + y.windows(2).filter(|w| w[0] != w[1]).count();
            ones_total += y.iter().filter(|&&v| v == 1).count() as u64;
            Ok(())
        })?;
        let n = self.sites.len();
        Ok(PanelStats {
            m: self.m,
            n,
            stream_bytes: self.stream.len(),
            runs,
            mean_frequency: if n == 0 {
                0.0
            } else {
                ones_total as f64 / (n as f64 * self.m as f64)
            },
        })
    }
}

/// Panel summary printed by the driver
#[derive(Debug, Clone, Copy)]
pub struct PanelStats {
    pub m: usize,
    pub n: usize,
    pub stream_bytes: usize,
    pub runs: usize,
    pub mean_frequency: f64,
}

impl std::fmt::Display for PanelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "M {} N {} bytes {} runs {} mean_freq {:.4}",
            self.m, self.n, self.stream_bytes, self.runs, self.mean_frequency
        )
    }
}
