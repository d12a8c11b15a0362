//! Report ordering: severity rank, product, component, newest bug first.

use crate::models::{Bug, TriagedBug};
use std::cmp::Reverse;

/// Stable sort by `(rank, product, component, Reverse(id))`.
pub fn sort_bugs(rows: &mut [TriagedBug]) {
    rows.sort_by(|a, b| {
        let ka = (a.severity.rank(), &a.bug.product, &a.bug.component, Reverse(a.bug.id));
        let kb = (b.severity.rank(), &b.bug.product, &b.bug.component, Reverse(b.bug.id));
        ka.cmp(&kb)
    });
}

/// Ascending by id.
pub fn sort_by_id(bugs: &mut [Bug]) {
    bugs.sort_by_key(|b| b.id);
}
