//! # Haplotype Text Export
//!
//! Emits the haplotype matrix as text: one line per site, one `'0'`/`'1'`
//! character per haplotype, recovered by inverting the sort at each column.

use std::io::Write;

use crate::data::panel::Panel;
use crate::error::Result;

/// Write the haplotype matrix (rows = sites, columns = haplotypes)
pub fn write_haps<W: Write>(panel: &Panel, writer: &mut W) -> Result<()> {
    let m = panel.m();
    let mut x = vec![0u8; m];
    let mut line = vec![0u8; m + 1];
    line[m] = b'\n';
    panel.for_each_column(|_, y, a, _| {
        for i in 0..m {
            x[a[i] as usize] = y[i];
        }
        for j in 0..m {
            line[j] = b'0' + x[j];
        }
        writer.write_all(&line)?;
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::panel::tests::build_panel;

    #[test]
    fn test_haps_rows_are_sites() {
        let haps = vec![vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 1]];
        let panel = build_panel(&haps);
        let mut out = Vec::new();
        write_haps(&panel, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "010\n110\n101\n");
    }
}
