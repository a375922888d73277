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

//! Declarative frame graph: passes with explicit dependencies and resource
//! accesses, validated and ordered once, then executed every frame.

use std::collections::{HashMap, HashSet, VecDeque};

use vesta_core::graph::topological_sort;
use vesta_core::renderer::FrameGraphError;

/// The work a pass performs when the graph executes.
pub type PassAction<C> = Box<dyn FnMut(&mut C) + Send>;

/// The data part of a pass: everything except its action.
///
/// Two declarations compare equal when the id, dependencies and resource
/// accesses match in order. Callers keep the declarations of the graph they
/// built to decide whether a rebuild is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PassDeclaration {
    /// The unique pass id.
    pub id: String,
    /// Ids of the passes that must run before this one.
    pub depends_on: Vec<String>,
    /// Resource keys read by the pass.
    pub reads: Vec<String>,
    /// Resource keys written by the pass.
    pub writes: Vec<String>,
}

impl PassDeclaration {
    fn accesses(&self, resource: &str) -> bool {
        self.reads.iter().any(|r| r == resource) || self.writes.iter().any(|w| w == resource)
    }

    fn writes_to(&self, resource: &str) -> bool {
        self.writes.iter().any(|w| w == resource)
    }
}

/// A single render pass: its declaration plus the action to run.
pub struct Pass<C> {
    declaration: PassDeclaration,
    action: PassAction<C>,
}

impl<C> Pass<C> {
    /// Creates a pass with no dependencies and no resource accesses.
    pub fn new(id: impl Into<String>, action: impl FnMut(&mut C) + Send + 'static) -> Self {
        Self {
            declaration: PassDeclaration {
                id: id.into(),
                ..Default::default()
            },
            action: Box::new(action),
        }
    }

    /// Adds explicit dependencies.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration
            .depends_on
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds read accesses.
    pub fn reads<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration.reads.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds write accesses.
    pub fn writes<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration
            .writes
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// The pass id.
    pub fn id(&self) -> &str {
        &self.declaration.id
    }

    /// The declaration of the pass.
    pub fn declaration(&self) -> &PassDeclaration {
        &self.declaration
    }
}

impl<C> std::fmt::Debug for Pass<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass")
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

/// Collects passes and validates them into a [`FrameGraph`].
pub struct FrameGraphBuilder<C> {
    passes: Vec<Pass<C>>,
}

impl<C> Default for FrameGraphBuilder<C> {
    fn default() -> Self {
        Self { passes: Vec::new() }
    }
}

impl<C> FromIterator<Pass<C>> for FrameGraphBuilder<C> {
    fn from_iter<T: IntoIterator<Item = Pass<C>>>(iter: T) -> Self {
        Self {
            passes: iter.into_iter().collect(),
        }
    }
}

impl<C> FrameGraphBuilder<C> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pass. Declaration order is the tie-breaker for scheduling.
    pub fn add_pass(&mut self, pass: Pass<C>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    /// Appends a pass, consuming and returning the builder.
    pub fn with_pass(mut self, pass: Pass<C>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Validates the declarations and computes the execution order.
    ///
    /// Checks run in this order and the first failure is returned:
    /// duplicate ids, unknown dependencies, cycles, unordered resource hazards.
    pub fn build(self) -> Result<FrameGraph<C>, FrameGraphError> {
        let declarations: Vec<PassDeclaration> =
            self.passes.iter().map(|p| p.declaration.clone()).collect();

        // 1. Unique ids.
        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(declarations.len());
        for (index, decl) in declarations.iter().enumerate() {
            if index_of.insert(decl.id.as_str(), index).is_some() {
                return Err(FrameGraphError::DuplicatePass {
                    pass: decl.id.clone(),
                });
            }
        }

        // 2. Known dependencies.
        let mut edges = Vec::new();
        for (index, decl) in declarations.iter().enumerate() {
            for dependency in &decl.depends_on {
                match index_of.get(dependency.as_str()) {
                    Some(&parent) => edges.push((parent, index)),
                    None => {
                        return Err(FrameGraphError::MissingDependency {
                            pass: decl.id.clone(),
                            dependency: dependency.clone(),
                        })
                    }
                }
            }
        }

        // 3. Stable topological order.
        let order = topological_sort(0..declarations.len(), edges.iter().copied()).map_err(|cycle| {
            FrameGraphError::CyclicDependency {
                passes: cycle
                    .unscheduled
                    .into_iter()
                    .map(|index| declarations[index].id.clone())
                    .collect(),
            }
        })?;

        // 4. Every hazardous pair must be ordered by an explicit chain.
        let reachable = reachability(declarations.len(), &edges);
        for first in 0..declarations.len() {
            for second in (first + 1)..declarations.len() {
                if reachable[first][second] || reachable[second][first] {
                    continue;
                }
                if let Some(resource) =
                    shared_hazard(&declarations[first], &declarations[second])
                {
                    return Err(FrameGraphError::UnorderedHazard {
                        first: declarations[first].id.clone(),
                        second: declarations[second].id.clone(),
                        resource,
                    });
                }
            }
        }

        let mut slots: Vec<Option<Pass<C>>> = self.passes.into_iter().map(Some).collect();
        let passes: Vec<Pass<C>> = order
            .iter()
            .filter_map(|&index| slots[index].take())
            .collect();

        log::info!(
            "Frame graph built with {} passes: [{}]",
            passes.len(),
            passes.iter().map(|p| p.id()).collect::<Vec<_>>().join(" -> ")
        );

        Ok(FrameGraph {
            passes,
            declarations,
        })
    }
}

/// `reachable[a][b]` is true when `b` can be reached from `a` along dependency edges.
fn reachability(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for &(parent, child) in edges {
        adjacency[parent].push(child);
    }

    let mut reachable = vec![vec![false; node_count]; node_count];
    for start in 0..node_count {
        let mut queue: VecDeque<usize> = adjacency[start].iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            if reachable[start][node] {
                continue;
            }
            reachable[start][node] = true;
            queue.extend(adjacency[node].iter().copied());
        }
    }
    reachable
}

/// The first resource that makes the pair a hazard, if any.
fn shared_hazard(first: &PassDeclaration, second: &PassDeclaration) -> Option<String> {
    let mut seen = HashSet::new();
    first
        .writes
        .iter()
        .chain(first.reads.iter())
        .filter(|key| seen.insert(key.as_str()))
        .find(|key| {
            (first.writes_to(key) && second.accesses(key))
                || (second.writes_to(key) && first.accesses(key))
        })
        .cloned()
}

/// A validated frame graph with a fixed execution order.
pub struct FrameGraph<C> {
    passes: Vec<Pass<C>>,
    declarations: Vec<PassDeclaration>,
}

impl<C> FrameGraph<C> {
    /// Runs every pass action once, in order, on the calling thread.
    pub fn execute(&mut self, ctx: &mut C) {
        for pass in &mut self.passes {
            log::trace!("Executing pass '{}'", pass.declaration.id);
            (pass.action)(ctx);
        }
    }

    /// Pass ids in execution order.
    pub fn order(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.id()).collect()
    }

    /// Number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Returns `true` if the graph has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Position of a pass in the execution order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.id() == id)
    }

    /// The declarations the graph was built from, in declaration order.
    pub fn declarations(&self) -> &[PassDeclaration] {
        &self.declarations
    }

    /// Returns `true` if `declarations` are exactly the ones this graph was built from.
    pub fn declarations_match(&self, declarations: &[PassDeclaration]) -> bool {
        self.declarations == declarations
    }
}

impl<C> std::fmt::Debug for FrameGraph<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraph")
            .field("order", &self.order())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<&'static str>;

    fn pass(id: &'static str) -> Pass<Log> {
        Pass::new(id, move |log: &mut Log| log.push(id))
    }

    #[test]
    fn test_dependencies_are_respected() {
        let mut graph = FrameGraphBuilder::new()
            .with_pass(pass("post").depends_on(["lighting"]))
            .with_pass(pass("lighting").depends_on(["gbuffer", "shadows"]))
            .with_pass(pass("gbuffer"))
            .with_pass(pass("shadows"))
            .build()
            .unwrap();

        assert_eq!(graph.order(), vec!["gbuffer", "shadows", "lighting", "post"]);

        let mut log = Log::new();
        graph.execute(&mut log);
        graph.execute(&mut log);
        assert_eq!(
            log,
            vec!["gbuffer", "shadows", "lighting", "post", "gbuffer", "shadows", "lighting", "post"]
        );
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let graph = FrameGraphBuilder::new()
            .with_pass(pass("c"))
            .with_pass(pass("a"))
            .with_pass(pass("b"))
            .build()
            .unwrap();
        assert_eq!(graph.order(), vec!["c", "a", "b"]);
        assert_eq!(graph.position("b"), Some(2));
        assert_eq!(graph.position("z"), None);
    }

    #[test]
    fn test_duplicate_pass_is_rejected() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("a"))
            .with_pass(pass("a"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FrameGraphError::DuplicatePass {
                pass: "a".to_string()
            }
        );
    }

    #[test]
    fn test_missing_dependency_is_rejected() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("lighting").depends_on(["gbuffer"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FrameGraphError::MissingDependency {
                pass: "lighting".to_string(),
                dependency: "gbuffer".to_string(),
            }
        );
    }

    #[test]
    fn test_cycle_reports_unscheduled_passes() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("root"))
            .with_pass(pass("a").depends_on(["root", "b"]))
            .with_pass(pass("b").depends_on(["a"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FrameGraphError::CyclicDependency {
                passes: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("a").depends_on(["a"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, FrameGraphError::CyclicDependency { .. }));
    }

    #[test]
    fn test_unordered_write_read_is_a_hazard() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("shadows").writes(["shadow_atlas"]))
            .with_pass(pass("lighting").reads(["shadow_atlas"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FrameGraphError::UnorderedHazard {
                first: "shadows".to_string(),
                second: "lighting".to_string(),
                resource: "shadow_atlas".to_string(),
            }
        );

        let graph = FrameGraphBuilder::new()
            .with_pass(pass("shadows").writes(["shadow_atlas"]))
            .with_pass(
                pass("lighting")
                    .reads(["shadow_atlas"])
                    .depends_on(["shadows"]),
            )
            .build()
            .unwrap();
        assert_eq!(graph.order(), vec!["shadows", "lighting"]);
    }

    #[test]
    fn test_transitive_chain_orders_hazard() {
        let graph = FrameGraphBuilder::new()
            .with_pass(pass("post").reads(["hdr"]).depends_on(["bloom"]))
            .with_pass(pass("bloom").depends_on(["main"]))
            .with_pass(pass("main").writes(["hdr"]))
            .build()
            .unwrap();
        assert_eq!(graph.order(), vec!["main", "bloom", "post"]);
    }

    #[test]
    fn test_shared_reads_are_not_a_hazard() {
        let graph = FrameGraphBuilder::new()
            .with_pass(pass("a").reads(["depth"]))
            .with_pass(pass("b").reads(["depth"]))
            .build()
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_cycle_wins_over_unrelated_hazard() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("a").depends_on(["b"]))
            .with_pass(pass("b").depends_on(["a"]))
            .with_pass(pass("w").writes(["x"]))
            .with_pass(pass("r").reads(["x"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FrameGraphError::CyclicDependency {
                passes: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_dependency_wins_over_cycle() {
        let err = FrameGraphBuilder::new()
            .with_pass(pass("a").depends_on(["b"]))
            .with_pass(pass("b").depends_on(["a", "ghost"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, FrameGraphError::MissingDependency { .. }));
    }

    #[test]
    fn test_declarations_match() {
        let graph = FrameGraphBuilder::new()
            .with_pass(pass("a").writes(["color"]))
            .with_pass(pass("b").reads(["color"]).depends_on(["a"]))
            .build()
            .unwrap();
        let mut declarations = graph.declarations().to_vec();
        assert!(graph.declarations_match(&declarations));
        declarations[1].reads.push("depth".to_string());
        assert!(!graph.declarations_match(&declarations));
    }

    #[test]
    fn test_empty_graph() {
        let mut graph: FrameGraph<Log> = FrameGraphBuilder::new().build().unwrap();
        assert!(graph.is_empty());
        let mut log = Log::new();
        graph.execute(&mut log);
        assert!(log.is_empty());
    }
}
