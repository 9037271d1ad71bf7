//! Least-common-type computation over candidate types.
//!
//! Used for compound-select columns, `CASE` arms, and function argument
//! families. The result kind is the first preference-order entry whose
//! affinity covers every candidate; among candidates already of that
//! affinity, the one with the most general native representation wins.

use super::ansi::AnsiType;
use super::dialect_type::TypeRef;
use super::intermediate::IntermediateType;

/// Unifies `candidates` into one type.
///
/// The result is nullable when any candidate is, or when `force_nullable`
/// is set (aggregates and windows over possibly-empty row sets).
#[must_use]
pub fn encapsulate(
    candidates: &[IntermediateType],
    order: &[TypeRef],
    force_nullable: bool,
) -> IntermediateType {
    let nullable = force_nullable || candidates.iter().any(IntermediateType::is_nullable);
    unify(candidates, order).with_nullable(nullable)
}

/// Unifies `candidates` the way `COALESCE` does: the result is only
/// nullable when every candidate is.
#[must_use]
pub fn encapsulate_coalesced(candidates: &[IntermediateType], order: &[TypeRef]) -> IntermediateType {
    let nullable = candidates.iter().all(IntermediateType::is_nullable);
    unify(candidates, order).with_nullable(nullable)
}

fn unify(candidates: &[IntermediateType], order: &[TypeRef]) -> IntermediateType {
    let Some(&last) = order.last() else {
        return candidates
            .first()
            .map_or_else(IntermediateType::argument, |c| IntermediateType::new(c.kind()));
    };
    if candidates.is_empty() {
        return IntermediateType::new(order[0]);
    }

    let typed: Vec<&IntermediateType> = candidates
        .iter()
        .filter(|c| c.affinity().is_some())
        .collect();
    if typed.is_empty() {
        return if candidates.iter().any(|c| c.is(AnsiType::Null)) {
            IntermediateType::null()
        } else {
            IntermediateType::argument()
        };
    }

    let covered = typed
        .iter()
        .all(|c| order.iter().any(|entry| entry.affinity() == c.affinity()));
    let widest = typed.iter().filter_map(|c| c.affinity()).max();
    let entry = if covered {
        order
            .iter()
            .copied()
            .find(|entry| entry.affinity() >= widest)
            .unwrap_or(last)
    } else {
        last
    };

    IntermediateType::new(richest_of_affinity(&typed, entry).unwrap_or(entry))
}

/// Picks the candidate kind with the most general native representation
/// when every candidate shares `entry`'s affinity. A candidate of another
/// affinity, or distinct kinds tied at the top, yield `None` so the caller
/// falls back to the entry itself: a dialect variant never has to hold a
/// value converted from a different affinity.
fn richest_of_affinity(typed: &[&IntermediateType], entry: TypeRef) -> Option<TypeRef> {
    if typed.iter().any(|c| c.affinity() != entry.affinity()) {
        return None;
    }
    let rank = |kind: TypeRef| kind.native().map_or(0, |n| n.generality());
    let same: Vec<TypeRef> = typed.iter().map(|c| c.kind()).collect();
    let top = same.iter().map(|kind| rank(*kind)).max()?;
    let mut winners = same.into_iter().filter(|kind| rank(*kind) == top);
    let first = winners.next()?;
    if winners.all(|kind| kind == first) {
        Some(first)
    } else {
        None
    }
}
