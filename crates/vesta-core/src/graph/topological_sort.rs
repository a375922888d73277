// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declaration-stable implementation of Kahn's algorithm for topological sorting.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
///
/// Carries the nodes that could not be scheduled, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// Nodes left with unresolved incoming edges.
    pub unscheduled: Vec<T>,
}

/// Performs a topological sort on a generic directed graph.
///
/// The graph is defined by a collection of nodes and a set of directed edges
/// representing dependencies (from parent to child). Whenever several nodes are
/// ready at the same time, the one that appears first in `nodes` is emitted
/// first, so the result only depends on the declaration order.
///
/// Edges that reference a node absent from `nodes` are ignored.
///
/// # Type Parameters
///
/// * `T`: The type of the nodes in the graph. It must be hashable and equatable
///   to be used in internal maps.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: A vector of nodes in a valid topological order.
/// * `Err(CycleError)`: If the graph contains one or more cycles.
pub fn topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError<T>>
where
    T: Copy + Eq + Hash,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }

    let position: HashMap<T, usize> = node_list
        .iter()
        .enumerate()
        .map(|(index, node)| (*node, index))
        .collect();

    let mut adjacency_list: Vec<Vec<usize>> = vec![Vec::new(); node_list.len()];
    let mut in_degree: Vec<usize> = vec![0; node_list.len()];

    // 1. Build adjacency list and in-degree counts from edges.
    for (parent, child) in edges {
        if let (Some(&p), Some(&c)) = (position.get(&parent), position.get(&child)) {
            adjacency_list[p].push(c);
            in_degree[c] += 1;
        }
    }

    // 2. Seed the ready queue with all root nodes (in-degree of 0).
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    // 3. Always pop the earliest declared ready node.
    let mut sorted_list = Vec::with_capacity(node_list.len());
    let mut emitted = vec![false; node_list.len()];
    while let Some(Reverse(parent)) = ready.pop() {
        sorted_list.push(node_list[parent]);
        emitted[parent] = true;
        for &child in &adjacency_list[parent] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    // 4. Check for cycles.
    if sorted_list.len() != node_list.len() {
        Err(CycleError {
            unscheduled: node_list
                .iter()
                .zip(emitted)
                .filter(|(_, done)| !done)
                .map(|(node, _)| *node)
                .collect(),
        })
    } else {
        Ok(sorted_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_sorts_to_empty() {
        let sorted = topological_sort(Vec::<u32>::new(), Vec::new()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn independent_nodes_keep_declaration_order() {
        let sorted = topological_sort([3, 1, 2], []).unwrap();
        assert_eq!(sorted, vec![3, 1, 2]);
    }

    #[test]
    fn ready_nodes_are_picked_by_declaration_order() {
        // 0 -> 2, 1 free. After 0 is emitted both 1 and 2 are ready; 1 was declared first.
        let sorted = topological_sort([0, 1, 2], [(0, 2)]).unwrap();
        assert_eq!(sorted, vec![0, 1, 2]);

        // Child declared before its parent must wait.
        let sorted = topological_sort(["b", "a", "c"], [("a", "b")]).unwrap();
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_respects_every_edge() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let sorted = topological_sort([3, 2, 1, 0], edges).unwrap();
        assert_eq!(sorted, vec![0, 2, 1, 3]);
    }

    #[test]
    fn cycle_reports_unscheduled_nodes() {
        let err = topological_sort([0, 1, 2, 3], [(1, 2), (2, 1), (0, 3)]).unwrap_err();
        assert_eq!(err.unscheduled, vec![1, 2]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let err = topological_sort([7], [(7, 7)]).unwrap_err();
        assert_eq!(err.unscheduled, vec![7]);
    }

    #[test]
    fn edges_to_unknown_nodes_are_ignored() {
        let sorted = topological_sort([1, 2], [(1, 9), (9, 2)]).unwrap();
        assert_eq!(sorted, vec![1, 2]);
    }
}
