//! # Hypothetical Amnesia Machine (HAM)
//!
//! Field-level last-write-wins merge. Every field carries the state
//! (millisecond timestamp) at which it was written:
//!
//! | Incoming state vs current | Decision |
//! |---------------------------|----------|
//! | beyond the drift limit    | deferred, retried when re-gossiped |
//! | lower                     | historical, ignored |
//! | higher                    | accepted |
//! | equal, same value         | no change |
//! | equal, different value    | lexically greater JSON wins |
//!
//! The soft-delete flag (`isDeleted`) is the one exception: `true` absorbs
//! `false` at any state, and the flag keeps the highest state either side
//! has seen. A delete racing a newer edit therefore stays deleted on every
//! replica while the edit's other fields still merge.
//!
//! A soul-level tombstone at state `t` erases every field with state `<= t`
//! and blocks any later arrival of such a field. The merge is commutative,
//! associative and idempotent, so replicas converge regardless of delivery
//! order.

use shared_types::{fields, FieldMap, FieldValue, GraphPut, Node, StateMap, Timestamp};

/// What to do with one incoming field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDecision {
    /// Overwrite the current value.
    Accept,
    /// Older than what we hold.
    Historical,
    /// Identical to what we hold.
    Current,
    /// Written too far in the future to trust yet.
    Deferred,
}

/// Decide one field.
///
/// `limit` is the highest state accepted right now (local clock plus drift).
pub fn ham(
    limit: Timestamp,
    incoming_state: Timestamp,
    current_state: Option<Timestamp>,
    incoming: &FieldValue,
    current: Option<&FieldValue>,
) -> FieldDecision {
    if incoming_state > limit {
        return FieldDecision::Deferred;
    }
    let (Some(current_state), Some(current)) = (current_state, current) else {
        return FieldDecision::Accept;
    };
    if incoming_state < current_state {
        return FieldDecision::Historical;
    }
    if incoming_state > current_state {
        return FieldDecision::Accept;
    }
    if incoming == current {
        return FieldDecision::Current;
    }
    if incoming.lexical() > current.lexical() {
        FieldDecision::Accept
    } else {
        FieldDecision::Historical
    }
}

/// Merge two soft-delete flags: logical or of the values, max of the states.
///
/// Returns the new `(value, state)` when it differs from the current one.
pub fn merge_flag(
    incoming: bool,
    incoming_state: Timestamp,
    current: bool,
    current_state: Timestamp,
) -> Option<(bool, Timestamp)> {
    let merged = (incoming || current, incoming_state.max(current_state));
    (merged != (current, current_state)).then_some(merged)
}

fn as_flag(key: &str, value: Option<&FieldValue>) -> Option<bool> {
    if key != fields::IS_DELETED {
        return None;
    }
    match value {
        Some(FieldValue::Bool(flag)) => Some(*flag),
        _ => None,
    }
}

/// Outcome of merging one put into one node.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// The node after the merge.
    pub node: Node,
    /// What actually changed, with states. `None` when nothing did.
    pub diff: Option<GraphPut>,
    /// Fields (and tombstones) held back for being too far ahead.
    pub deferred: usize,
}

/// Merge a stamped put into the current node.
///
/// Fields without a state are treated as written at state zero, so callers
/// stamp puts before merging.
pub fn merge(current: Option<&Node>, put: &GraphPut, limit: Timestamp) -> MergeResult {
    let mut node = current
        .cloned()
        .unwrap_or_else(|| Node::new(put.soul.clone()));
    let mut diff_fields = FieldMap::new();
    let mut diff_states = StateMap::new();
    let mut diff_tombstone = None;
    let mut deferred = 0;

    if let Some(tombstone) = put.tombstone {
        if tombstone > limit {
            deferred += 1;
        } else if node.tombstone.map_or(true, |held| tombstone > held) {
            node.tombstone = Some(tombstone);
            let erased: Vec<String> = node
                .states
                .iter()
                .filter(|(_, &state)| state <= tombstone)
                .map(|(key, _)| key.clone())
                .collect();
            for key in erased {
                node.fields.remove(&key);
                node.states.remove(&key);
            }
            diff_tombstone = Some(tombstone);
        }
    }

    if let Some(data) = &put.data {
        for (key, value) in data {
            let state = put.states.get(key).copied().unwrap_or_default();
            if node.tombstone.is_some_and(|t| state <= t) {
                continue;
            }
            if state > limit {
                deferred += 1;
                continue;
            }
            if let (Some(incoming), Some(current), Some(current_state)) = (
                as_flag(key, Some(value)),
                as_flag(key, node.get(key)),
                node.state_of(key),
            ) {
                if let Some((flag, flag_state)) =
                    merge_flag(incoming, state, current, current_state)
                {
                    node.fields.insert(key.clone(), flag.into());
                    node.states.insert(key.clone(), flag_state);
                    diff_fields.insert(key.clone(), flag.into());
                    diff_states.insert(key.clone(), flag_state);
                }
                continue;
            }
            match ham(limit, state, node.state_of(key), value, node.get(key)) {
                FieldDecision::Accept => {
                    node.fields.insert(key.clone(), value.clone());
                    node.states.insert(key.clone(), state);
                    diff_fields.insert(key.clone(), value.clone());
                    diff_states.insert(key.clone(), state);
                }
                FieldDecision::Deferred => deferred += 1,
                FieldDecision::Historical | FieldDecision::Current => {}
            }
        }
    }

    let diff = if diff_fields.is_empty() && diff_tombstone.is_none() {
        None
    } else {
        Some(GraphPut {
            soul: put.soul.clone(),
            data: if diff_fields.is_empty() {
                None
            } else {
                Some(diff_fields)
            },
            states: diff_states,
            tombstone: diff_tombstone,
        })
    };

    MergeResult {
        node,
        diff,
        deferred,
    }
}
