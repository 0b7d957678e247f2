//! # External Query Matching
//!
//! Matches haplotypes that are not part of a panel against it, after
//! Algorithm 5 of Durbin (2014). A single panel scan materializes the
//! per-site prefix, divergence, and rank arrays; each query then runs in
//! one forward pass, tracking the sorted interval `[f, g)` of panel
//! haplotypes sharing its current suffix.
//!
//! The published recovery step after an interval collapse is incomplete;
//! here the new match start is recomputed by comparing the query backwards
//! against the two sort neighbors of its insertion point, then the
//! interval is re-grown over every haplotype whose divergence stays within
//! the recovered start.

use tracing::debug;

use crate::data::haplotype::HapMatrix;
use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};
use crate::model::matches::MatchRecord;

/// Per-site arrays supporting external queries.
///
/// Storage is `O(N * M)` integers, acceptable for modest panels only.
#[derive(Debug)]
pub struct PanelIndex {
    m: usize,
    n: usize,
    /// Prefix arrays `a_k` for `k` in `0..=N`
    a: Vec<Vec<u32>>,
    /// Divergence arrays `d_k` for `k` in `0..=N`
    d: Vec<Vec<u32>>,
    /// Rank arrays: `u[k][i]` zeros among the first `i` sorted alleles
    u: Vec<Vec<u32>>,
    /// Total zeros per site
    c: Vec<u32>,
    haps: HapMatrix,
}

impl PanelIndex {
    /// Build the index with one scan of the panel
    pub fn build(panel: &Panel) -> Result<Self> {
        let m = panel.m();
        let n = panel.n_sites();
        let mut a = Vec::with_capacity(n + 1);
        let mut d = Vec::with_capacity(n + 1);
        let mut u = Vec::with_capacity(n);
        let mut c = Vec::with_capacity(n);
        let mut haps = HapMatrix::zeros(m, n);
        let (fa, fd) = panel.for_each_column(|k, y, ak, dk| {
            a.push(ak.to_vec());
            d.push(dk.to_vec());
            let mut ranks = Vec::with_capacity(m + 1);
            let mut zeros = 0u32;
            for i in 0..m {
                ranks.push(zeros);
                if y[i] == 0 {
                    zeros += 1;
                } else {
                    haps.set(ak[i], k, 1);
                }
            }
            ranks.push(zeros);
            u.push(ranks);
            c.push(zeros);
            Ok(())
        })?;
        a.push(fa);
        d.push(fd);
        debug!(m, n, "panel index built");
        Ok(Self {
            m,
            n,
            a,
            d,
            u,
            c,
            haps,
        })
    }

    /// Number of panel haplotypes
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of sites
    pub fn n(&self) -> usize {
        self.n
    }

    /// Map a sorted position through site `k` for a given query allele
    fn rank(&self, k: usize, i: usize, allele: u8) -> usize {
        let u = self.u[k][i] as usize;
        if allele == 0 {
            u
        } else {
            self.c[k] as usize + i - u
        }
    }

    /// First site of the longest suffix of `z[..end]` shared with
    /// panel haplotype `hap`
    fn match_start(&self, z: &[u8], hap: u32, end: usize) -> usize {
        let mut s = end;
        while s > 0 && z[s - 1] == self.haps.get(hap, s - 1) {
            s -= 1;
        }
        s
    }

    /// Match the query `z` against the panel, reporting each longest
    /// shared suffix at the site where it ends. `qid` labels the query in
    /// the emitted records (`g1`); `g2` is the panel haplotype.
    pub fn match_query<F>(&self, qid: u32, z: &[u8], mut sink: F) -> Result<()>
    where
        F: FnMut(MatchRecord),
    {
        if z.len() != self.n {
            return Err(PbwtError::shape(format!(
                "query has {} sites, panel has {}",
                z.len(),
                self.n
            )));
        }
        for (k, &v) in z.iter().enumerate() {
            if v > 1 {
                return Err(PbwtError::format(format!(
                    "query site {k}: non-binary allele {v}"
                )));
            }
        }

        let mut e = 0;
        let mut f = 0;
        let mut g = self.m;
        for k in 0..self.n {
            let f1 = self.rank(k, f, z[k]);
            let g1 = self.rank(k, g, z[k]);
            if f1 < g1 {
                f = f1;
                g = g1;
                continue;
            }

            // The interval collapsed: every tracked match ends at k.
            if k > e {
                for i in f..g {
                    sink(MatchRecord {
                        g1: qid,
                        g2: self.a[k][i],
                        start: e,
                        end: k,
                    });
                }
            }

            // Recover from the insertion point in the next sort order.
            let t = f1;
            let dk1 = &self.d[k + 1];
            let ak1 = &self.a[k + 1];
            let below = (t > 0).then(|| self.match_start(z, ak1[t - 1], k + 1));
            let above = (t < self.m).then(|| self.match_start(z, ak1[t], k + 1));
            e = below.into_iter().chain(above).min().unwrap_or(k + 1);
            f = t;
            g = t;
            if e <= k {
                if below == Some(e) {
                    f = t - 1;
                    while f > 0 && dk1[f] as usize <= e {
                        f -= 1;
                    }
                }
                if above == Some(e) {
                    g = t + 1;
                    while g < self.m && dk1[g] as usize <= e {
                        g += 1;
                    }
                }
            }
        }

        if self.n > e {
            for i in f..g {
                sink(MatchRecord {
                    g1: qid,
                    g2: self.a[self.n][i],
                    start: e,
                    end: self.n,
                });
            }
        }
        Ok(())
    }
}
