//! Builds per-year budget trees from parent-referencing records.
//!
//! Records are processed level by level (款 → 項 → 目 → 節) and, within a
//! level, in input order. A record whose parent id does not resolve to an
//! already-processed record is promoted to a root instead of being dropped.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{BudgetLevel, BudgetNode, BudgetRecord, BudgetTree};

struct Slot<'a> {
    record: &'a BudgetRecord,
    children: Vec<usize>,
}

pub fn build(records: &[BudgetRecord]) -> BudgetTree {
    let mut by_level: Vec<Vec<&BudgetRecord>> = vec![Vec::new(); BudgetLevel::ALL.len()];
    for record in records {
        by_level[record.level.rank()].push(record);
    }

    let mut arena: Vec<Slot> = Vec::with_capacity(records.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut roots: Vec<usize> = Vec::new();
    let mut dangling = 0usize;

    for record in by_level.into_iter().flatten() {
        let slot = arena.len();
        // Resolve before registering so a record cannot become its own parent.
        let parent = record
            .parent_id
            .as_deref()
            .and_then(|pid| index.get(pid).copied());

        match (parent, record.parent_id.as_deref()) {
            (Some(parent), _) => arena[parent].children.push(slot),
            (None, Some(pid)) => {
                debug!(
                    id = %record.id,
                    name = %record.name,
                    parent_id = pid,
                    "Unresolved parent, promoting record to root"
                );
                dangling += 1;
                roots.push(slot);
            }
            (None, None) => roots.push(slot),
        }

        arena.push(Slot {
            record,
            children: Vec::new(),
        });
        index.insert(record.id.as_str(), slot);
    }

    if dangling > 0 {
        warn!(
            dangling,
            record_count = records.len(),
            "Budget records with unresolved parents were promoted to roots"
        );
    }

    BudgetTree::from_roots(materialize(arena, &roots))
}

/// Turn the index arena into owned nodes.
///
/// A child is always registered after its parent, so walking the arena
/// backwards finishes every subtree before its parent needs it.
fn materialize(arena: Vec<Slot>, roots: &[usize]) -> Vec<BudgetNode> {
    let mut built: Vec<Option<BudgetNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for (i, slot) in arena.iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(BudgetNode::with_children(
            slot.record.name.clone(),
            slot.record.amount,
            children,
        ));
    }

    roots.iter().filter_map(|&r| built[r].take()).collect()
}
