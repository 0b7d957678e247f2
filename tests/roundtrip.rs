//! End-to-end tests through the public API: construction, file round
//! trips, panel derivation, and query matching.

use std::fs;
use std::io::BufReader;

use tempfile::tempdir;

use pbwt::io::{self, Checkpointer};
use pbwt::{MatchRecord, Panel, PanelIndex};

fn build_panel(haps: &[Vec<u8>]) -> Panel {
    let m = haps.len();
    let n = haps[0].len();
    let mut panel = Panel::new(m).unwrap();
    let mut column = vec![0u8; m];
    for k in 0..n {
        for j in 0..m {
            column[j] = haps[j][k];
        }
        panel.append_column(&column).unwrap();
    }
    panel
}

fn xorshift_haps(m: usize, n: usize, mut seed: u64) -> Vec<Vec<u8>> {
    (0..m)
        .map(|_| {
            (0..n)
                .map(|_| {
                    seed ^= seed << 13;
                    seed ^= seed >> 7;
                    seed ^= seed << 17;
                    (seed & 1) as u8
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_file_roundtrip_is_byte_identical() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("panel.pbwt");
    let second = dir.path().join("again.pbwt");

    let panel = build_panel(&xorshift_haps(6, 50, 0xabcdef));
    let mut out = fs::File::create(&first).unwrap();
    io::write_panel(&panel, &mut out).unwrap();

    let back = io::read_panel(first.to_str().unwrap()).unwrap();
    back.verify().unwrap();
    let mut out = fs::File::create(&second).unwrap();
    io::write_panel(&back, &mut out).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_sites_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.sites");

    let mut panel = build_panel(&xorshift_haps(4, 5, 7));
    assert!(io::apply_sites(&mut panel, &[5, 17, 102, 103, 999]));
    let mut out = fs::File::create(&path).unwrap();
    io::write_sites(&panel, &mut out).unwrap();

    let coords = io::read_sites(BufReader::new(fs::File::open(&path).unwrap())).unwrap();
    assert_eq!(coords, vec![5, 17, 102, 103, 999]);
}

#[test]
fn test_subsample_preserves_haplotypes_through_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sub.pbwt");

    let haps = xorshift_haps(8, 30, 0x1111);
    let sub = build_panel(&haps).subsample(3, 4).unwrap();
    let mut out = fs::File::create(&path).unwrap();
    io::write_panel(&sub, &mut out).unwrap();

    let matrix = io::read_panel(path.to_str().unwrap())
        .unwrap()
        .haplotypes()
        .unwrap();
    for j in 0..4 {
        assert_eq!(matrix.row(j as u32), haps[j + 3], "haplotype {j}");
    }
}

#[test]
fn test_checkpoint_rotation_leaves_readable_snapshots() {
    let dir = tempdir().unwrap();

    let text = "COMMAND: macs 4 1000\n\
                SEED: 1\n\
                SITE: 0 0.1 0.0 0011\n\
                SITE: 1 0.2 0.0 0011\n\
                SITE: 2 0.5 0.0 0101\n\
                SITE: 3 0.9 0.0 0011\n";
    let mut checkpoint = Checkpointer::in_dir(2, dir.path());
    let panel = io::read_macs(text.as_bytes(), &mut checkpoint).unwrap();
    assert_eq!(panel.n_sites(), 4);

    // Two snapshots: check_A after 2 sites, check_B after 4.
    let a = io::read_panel(dir.path().join("check_A.pbwt").to_str().unwrap()).unwrap();
    assert_eq!(a.n_sites(), 2);
    let b = io::read_panel(dir.path().join("check_B.pbwt").to_str().unwrap()).unwrap();
    assert_eq!(b.n_sites(), 4);
    let sites_file = fs::File::open(dir.path().join("check_B.sites")).unwrap();
    assert_eq!(
        io::read_sites(BufReader::new(sites_file)).unwrap(),
        vec![100, 200, 500, 900]
    );
}

#[test]
fn test_query_panel_verbatim_matches() {
    let haps = xorshift_haps(5, 40, 0x9e3779b9);
    let panel = build_panel(&haps);
    let index = PanelIndex::build(&panel).unwrap();

    for (h, hap) in haps.iter().enumerate() {
        let mut got: Vec<MatchRecord> = Vec::new();
        index.match_query(h as u32, hap, |rec| got.push(rec)).unwrap();
        assert!(
            got.contains(&MatchRecord {
                g1: h as u32,
                g2: h as u32,
                start: 0,
                end: 40
            }),
            "haplotype {h} did not match itself full length"
        );
        assert!(got.iter().all(|rec| rec.start < rec.end));
    }
}
