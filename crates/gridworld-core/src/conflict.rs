//! Spatial Conflict Grouper.
//!
//! Proposals are bucketed by the cells they write. A cell written by exactly
//! one proposal accepts that proposal; a cell written by two or more makes
//! those proposals a conflict group for adjudication.
//!
//! Under [`GroupingStrategy::PerCell`] each contested cell is its own group,
//! so a proposal touching two contested cells sits in two groups, and a
//! proposal touching one contested and one free cell is also accepted. Under
//! [`GroupingStrategy::Merged`] groups sharing a proposal are merged, and a
//! proposal in any group is never accepted directly.

use std::collections::{BTreeMap, BTreeSet};

use gridworld_types::ProposalResult;
use serde::Deserialize;

/// How contested cells become conflict groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// One group per contested cell.
    #[default]
    PerCell,
    /// Groups that share a proposal are merged.
    Merged,
}

/// A set of proposals contending for at least one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictGroup {
    /// The contested cells, ascending.
    pub cells: Vec<(i32, i32)>,
    /// Indices into the proposal list, ascending.
    pub members: Vec<usize>,
}

/// The grouper's output, as indices into the proposal list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    /// Conflict-free proposals, each once, in proposal order.
    pub accepted: Vec<usize>,
    /// Conflict groups, ordered by their first contested cell.
    pub groups: Vec<ConflictGroup>,
}

impl Grouping {
    /// The accepted proposals themselves.
    pub fn accepted_proposals<'a>(&self, proposals: &'a [ProposalResult]) -> Vec<&'a ProposalResult> {
        self.accepted
            .iter()
            .filter_map(|&i| proposals.get(i))
            .collect()
    }

    /// Whether anything needs adjudication.
    pub fn has_conflicts(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Map each written cell to the proposals writing it.
///
/// A proposal writing the same cell twice is listed once for that cell.
pub fn cell_buckets(proposals: &[ProposalResult]) -> BTreeMap<(i32, i32), Vec<usize>> {
    let mut buckets: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
    for (index, proposal) in proposals.iter().enumerate() {
        for target in proposal.targets() {
            let bucket = buckets.entry(target).or_default();
            if bucket.last() != Some(&index) {
                bucket.push(index);
            }
        }
    }
    buckets
}

/// Partition `proposals` into accepted proposals and conflict groups.
pub fn group_proposals(proposals: &[ProposalResult], strategy: GroupingStrategy) -> Grouping {
    let buckets = cell_buckets(proposals);

    let mut accepted: BTreeSet<usize> = BTreeSet::new();
    let mut per_cell: Vec<ConflictGroup> = Vec::new();
    for (cell, members) in buckets {
        match members.as_slice() {
            [only] => {
                accepted.insert(*only);
            }
            _ => per_cell.push(ConflictGroup {
                cells: vec![cell],
                members,
            }),
        }
    }

    let groups = match strategy {
        GroupingStrategy::PerCell => per_cell,
        GroupingStrategy::Merged => {
            let merged = merge_overlapping(per_cell);
            for group in &merged {
                for member in &group.members {
                    accepted.remove(member);
                }
            }
            merged
        }
    };

    Grouping {
        accepted: accepted.into_iter().collect(),
        groups,
    }
}

/// Union groups that share any member until no two groups overlap.
fn merge_overlapping(groups: Vec<ConflictGroup>) -> Vec<ConflictGroup> {
    let mut merged: Vec<(BTreeSet<(i32, i32)>, BTreeSet<usize>)> = Vec::new();
    for group in groups {
        let mut cells: BTreeSet<(i32, i32)> = group.cells.into_iter().collect();
        let mut members: BTreeSet<usize> = group.members.into_iter().collect();
        let (overlapping, rest): (Vec<_>, Vec<_>) = merged
            .into_iter()
            .partition(|(_, m)| !m.is_disjoint(&members));
        for (c, m) in overlapping {
            cells.extend(c);
            members.extend(m);
        }
        merged = rest;
        merged.push((cells, members));
    }
    let mut out: Vec<ConflictGroup> = merged
        .into_iter()
        .map(|(cells, members)| ConflictGroup {
            cells: cells.into_iter().collect(),
            members: members.into_iter().collect(),
        })
        .collect();
    out.sort_by(|a, b| a.cells.first().cmp(&b.cells.first()));
    out
}
