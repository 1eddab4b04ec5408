//! Export of stored history for review by a care team.

mod report;

pub use report::*;
