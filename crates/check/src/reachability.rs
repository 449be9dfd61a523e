//! Reachability of declared workflow states.
//!
//! Walks the transition relation from the deposit entry state, the first
//! critical-path slot, and reports declared states no transition path can
//! reach. Dead states are survivable: reconciliation can still enter them
//! through an explicit tracker mapping, so they surface as warnings.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::Serialize;
use signalbox_engine::types::Workflow;

/// Reachability result for one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct ReachabilityResult {
    /// First critical-path slot; `None` when the document declares none,
    /// in which case the walk is skipped entirely.
    pub entry_state: Option<String>,
    pub reachable_states: BTreeSet<String>,
    pub unreachable_states: BTreeSet<String>,
}

/// Derive the set of states reachable from the entry state via BFS over
/// the declared transitions.
pub fn check_reachability(workflow: &Workflow) -> ReachabilityResult {
    let Some(entry) = workflow.critical_path().first() else {
        return ReachabilityResult {
            entry_state: None,
            reachable_states: BTreeSet::new(),
            unreachable_states: BTreeSet::new(),
        };
    };

    // Adjacency list: source -> [targets]
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for transition in workflow.transitions() {
        adjacency
            .entry(transition.source.as_str())
            .or_default()
            .push(transition.target.as_str());
    }

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();

    visited.insert(entry.clone());
    queue.push_back(entry.as_str());

    while let Some(state) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(state) {
            for &next in neighbors {
                if visited.insert(next.to_string()) {
                    queue.push_back(next);
                }
            }
        }
    }

    let declared: BTreeSet<String> = workflow.states().keys().cloned().collect();
    let unreachable: BTreeSet<String> = declared.difference(&visited).cloned().collect();

    ReachabilityResult {
        entry_state: Some(entry.clone()),
        reachable_states: visited,
        unreachable_states: unreachable,
    }
}
