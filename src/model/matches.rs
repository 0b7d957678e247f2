//! # Match Reporters
//!
//! Enumeration of shared substrings within a panel, after Algorithms 3
//! and 4 of Durbin (2014). Both reporters replay the column stream once,
//! visiting each site's sorted column together with the prefix and
//! divergence arrays entering that site, and finish with a terminal pass
//! at `k = N` where the "will extend" test is suppressed so matches that
//! reach the end of the panel are flushed.
//!
//! Reporters push records into a caller-supplied sink so callers can
//! count, filter, verify, or serialize without any I/O coupling.

use crate::data::panel::Panel;
use crate::error::{PbwtError, Result};

/// One reported match: haplotypes `g1` and `g2` agree on `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatchRecord {
    /// Haplotype the match was asserted from
    pub g1: u32,
    /// Partner haplotype
    pub g2: u32,
    /// First site of the match
    pub start: usize,
    /// One past the last site of the match
    pub end: usize,
}

impl MatchRecord {
    /// Number of matching sites
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Report every pair of haplotypes sharing at least `min_len` consecutive
/// sites, at the column where the shared run ends.
///
/// Each pair/interval is reported exactly once, with the endpoints in
/// sort order at the ending column.
pub fn long_matches<F>(panel: &Panel, min_len: usize, mut sink: F) -> Result<()>
where
    F: FnMut(MatchRecord),
{
    if min_len == 0 {
        return Err(PbwtError::config("long match threshold must be at least 1"));
    }
    let n = panel.n_sites();
    let (fa, fd) = panel.for_each_column(|k, y, a, d| {
        long_column(k, Some(y), a, d, min_len, &mut sink);
        Ok(())
    })?;
    long_column(n, None, &fa, &fd, min_len, &mut sink);
    Ok(())
}

/// One column of the long-match scan.
///
/// Positions are split into maximal runs with no divergence break
/// (`d[i] <= k - min_len`); within a run, a pair matches over at least
/// `min_len` sites and the match ends here exactly when the current
/// alleles differ. At the terminal column every pair in a run is flushed.
fn long_column<F>(k: usize, y: Option<&[u8]>, a: &[u32], d: &[u32], min_len: usize, sink: &mut F)
where
    F: FnMut(MatchRecord),
{
    let m = a.len();
    let limit = k as i64 - min_len as i64;
    let mut block = 0;
    for i in 0..=m {
        if i < m && (d[i] as i64) <= limit {
            continue;
        }
        // Divergence break (or the end of the column): flush [block, i).
        for p in block..i {
            let mut dmax = 0;
            for q in p + 1..i {
                if d[q] > dmax {
                    dmax = d[q];
                }
                if let Some(y) = y {
                    if y[p] == y[q] {
                        // The pair still agrees; a later column reports it.
                        continue;
                    }
                }
                sink(MatchRecord {
                    g1: a[p],
                    g2: a[q],
                    start: dmax as usize,
                    end: k,
                });
            }
        }
        block = i;
    }
}

/// Report every set-maximal match: for each haplotype, the longest
/// matches it has in the panel, at the column where they end.
///
/// Records are oriented (`g1` is the asserting haplotype), so a mutually
/// longest pair is reported once from each side.
pub fn maximal_matches<F>(panel: &Panel, mut sink: F) -> Result<()>
where
    F: FnMut(MatchRecord),
{
    let n = panel.n_sites();
    let (fa, fd) = panel.for_each_column(|k, y, a, d| {
        maximal_column(k, Some(y), a, d, &mut sink);
        Ok(())
    })?;
    maximal_column(n, None, &fa, &fd, &mut sink);
    Ok(())
}

/// One column of the set-maximal scan.
///
/// From each sort position `i`, neighbors are scanned downward while they
/// match at least as far back as `d[i]` and upward while at least as far
/// back as `d[i+1]`. Meeting the current allele of `i` during either scan
/// means the candidate match extends past this column and `i` yields
/// nothing here; otherwise the scanned neighbors are exactly the longest
/// matches ending at `k`.
fn maximal_column<F>(k: usize, y: Option<&[u8]>, a: &[u32], d: &[u32], sink: &mut F)
where
    F: FnMut(MatchRecord),
{
    let m = a.len();
    'position: for i in 0..m {
        let di = d[i];
        let di1 = d[i + 1];
        let mut lo = i as i64 - 1;
        let mut hi = i + 1;
        if di <= di1 {
            while lo >= 0 && d[(lo + 1) as usize] <= di {
                if let Some(y) = y {
                    if y[lo as usize] == y[i] {
                        continue 'position;
                    }
                }
                lo -= 1;
            }
        }
        if di >= di1 {
            while hi < m && d[hi] <= di1 {
                if let Some(y) = y {
                    if y[hi] == y[i] {
                        continue 'position;
                    }
                }
                hi += 1;
            }
        }
        if (di as usize) < k {
            for j in (lo + 1) as usize..i {
                sink(MatchRecord {
                    g1: a[i],
                    g2: a[j],
                    start: di as usize,
                    end: k,
                });
            }
        }
        if (di1 as usize) < k {
            for j in i + 1..hi {
                sink(MatchRecord {
                    g1: a[i],
                    g2: a[j],
                    start: di1 as usize,
                    end: k,
                });
            }
        }
    }
}
