//! # Model Module
//!
//! The PBWT algorithms proper.
//!
//! ## Sub-modules
//! - `updater`: per-site prefix-sort and divergence maintenance
//! - `matches`: long and set-maximal match enumeration within a panel
//! - `query`: matching external haplotypes against a panel

pub mod matches;
pub mod query;
pub mod updater;

pub use matches::{long_matches, maximal_matches, MatchRecord};
pub use query::PanelIndex;
pub use updater::{PbwtDivUpdater, PbwtUpdater};
