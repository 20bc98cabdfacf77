//! FILENAME: core/drill-engine/src/ordering.rs
//! Category Ordering - Top-N limiting followed by an optional display sort.
//!
//! Limiting always ranks by descending value, whatever display direction is
//! requested, so the sort direction never changes which categories survive.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::LevelResult;
use crate::definition::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryOrdering {
    pub limit: Option<usize>,
    pub sort: Option<SortDirection>,
}

fn by_value(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl CategoryOrdering {
    /// Final display order as indices into `ranking`.
    pub fn permutation(&self, ranking: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..ranking.len()).collect();

        // Step 1: keep the top N, then restore their first-seen order.
        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            if order.len() > limit {
                order.sort_by(|&a, &b| by_value(ranking[b], ranking[a]));
                order.truncate(limit);
                order.sort_unstable();
            }
        }

        // Step 2: stable display sort.
        match self.sort {
            Some(SortDirection::Ascending) => {
                order.sort_by(|&a, &b| by_value(ranking[a], ranking[b]));
            }
            Some(SortDirection::Descending) => {
                order.sort_by(|&a, &b| by_value(ranking[b], ranking[a]));
            }
            None => {}
        }

        order
    }

    /// Applies the policy, returning the reordered result and the permutation
    /// used (index `i` of the output came from `permutation[i]` of the input).
    pub fn apply(&self, level: &LevelResult) -> (LevelResult, Vec<usize>) {
        let permutation = self.permutation(&level.ranking);
        let ordered = level.permuted(&permutation);

        log::debug!(
            "ordering applied: limit={:?} sort={:?} categories {} -> {}",
            self.limit,
            self.sort,
            level.len(),
            ordered.len()
        );

        (ordered, permutation)
    }
}
