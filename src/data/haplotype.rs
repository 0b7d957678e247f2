//! # Haplotype Matrix
//!
//! Bit-packed `M x N` allele matrix reconstructed from a panel's column
//! stream. Built on demand for check mode, haplotype export, and external
//! matching; owned by the caller, never by the panel.

use bitvec::prelude::*;

/// Dense bi-allelic haplotype matrix, one bit per allele
#[derive(Clone, Debug)]
pub struct HapMatrix {
    m: usize,
    n: usize,
    bits: BitVec,
}

impl HapMatrix {
    /// Create an all-zero matrix for `m` haplotypes over `n` sites
    pub fn zeros(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            bits: bitvec![0; m * n],
        }
    }

    /// Number of haplotypes
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of sites
    pub fn n(&self) -> usize {
        self.n
    }

    /// Allele of haplotype `hap` at site `k`
    #[inline]
    pub fn get(&self, hap: u32, k: usize) -> u8 {
        self.bits[hap as usize * self.n + k] as u8
    }

    /// Set the allele of haplotype `hap` at site `k`
    #[inline]
    pub fn set(&mut self, hap: u32, k: usize, allele: u8) {
        self.bits.set(hap as usize * self.n + k, allele != 0);
    }

    /// Copy one haplotype row into a byte vector
    pub fn row(&self, hap: u32) -> Vec<u8> {
        (0..self.n).map(|k| self.get(hap, k)).collect()
    }

    /// True if haplotypes `g1` and `g2` agree on every site of `[start, end)`
    pub fn agree_on(&self, g1: u32, g2: u32, start: usize, end: usize) -> bool {
        (start..end).all(|k| self.get(g1, k) == self.get(g2, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut mat = HapMatrix::zeros(3, 4);
        mat.set(1, 2, 1);
        mat.set(2, 0, 1);
        assert_eq!(mat.get(1, 2), 1);
        assert_eq!(mat.get(1, 3), 0);
        assert_eq!(mat.row(2), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_agree_on() {
        let mut mat = HapMatrix::zeros(2, 4);
        mat.set(0, 3, 1);
        assert!(mat.agree_on(0, 1, 0, 3));
        assert!(!mat.agree_on(0, 1, 0, 4));
    }
}
