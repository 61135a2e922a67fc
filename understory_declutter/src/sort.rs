// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate ordering.
//!
//! The sorter visits candidates in this order and accepts greedily, so earlier
//! items win contested screen space.

use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};

use hashbrown::HashMap;

use crate::types::{GroupId, RenderItem};

/// Strategy deciding which of two candidates is tested first.
///
/// `Less` means `a` is tested before `b`. The comparator must be a total
/// order: the standard sort may panic otherwise. Compare floats with
/// `total_cmp`, not `partial_cmp(..).unwrap_or(Equal)`, when keys can be NaN.
pub type Comparator = fn(&RenderItem, &RenderItem) -> Ordering;

/// Front to back: depth, then traversal order, then sibling order.
pub fn by_depth(a: &RenderItem, b: &RenderItem) -> Ordering {
    a.depth
        .total_cmp(&b.depth)
        .then(a.traversal.cmp(&b.traversal))
        .then(a.sibling.cmp(&b.sibling))
}

/// Highest priority first, then [`by_depth`].
pub fn by_priority(a: &RenderItem, b: &RenderItem) -> Ordering {
    b.priority
        .total_cmp(&a.priority)
        .then_with(|| by_depth(a, b))
}

/// Fill `order` with indices into `items` in test order.
///
/// With `gather_groups`, members of one present group are moved next to the
/// group's first member, later siblings first, so a feature's facets are
/// tested together.
pub(crate) fn sort_indices(
    items: &[RenderItem],
    cmp: Comparator,
    gather_groups: bool,
    order: &mut Vec<usize>,
) {
    order.clear();
    order.extend(0..items.len());
    order.sort_by(|&a, &b| cmp(&items[a], &items[b]));
    if !gather_groups {
        return;
    }

    let mut first: HashMap<GroupId, usize> = HashMap::new();
    for (rank, &i) in order.iter().enumerate() {
        if let Some(g) = items[i].group_id() {
            first.entry(g).or_insert(rank);
        }
    }
    if first.is_empty() {
        return;
    }
    let mut keyed: Vec<((usize, Reverse<u32>), usize)> = order
        .iter()
        .enumerate()
        .map(|(rank, &i)| {
            let item = &items[i];
            let key = match item.group_id().and_then(|g| first.get(&g)) {
                Some(&head) => (head, Reverse(item.sibling)),
                None => (rank, Reverse(0)),
            };
            (key, i)
        })
        .collect();
    keyed.sort_by_key(|&(key, _)| key);
    order.clear();
    order.extend(keyed.into_iter().map(|(_, i)| i));
}
