//! Package cycle detection
//!
//! Go does not allow import cycles between packages, so any strongly
//! connected component of more than one package in the graph reachable from
//! the requested packages makes the generated code uncompilable. Components
//! are found with Tarjan's algorithm, run over an explicit frame stack; the
//! per-node index, low-link and on-stack state live in a side table owned by
//! the run.

use crate::error::WrapError;
use crate::unit::PackageGraph;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// Files behind one package-level edge of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleEdge {
    pub from: String,
    pub to: String,
    /// `(importing file, imported file)` pairs
    pub imports: Vec<(String, String)>,
}

/// One strongly connected component of more than one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cycle {
    /// Package keys, sorted
    pub packages: Vec<String>,
    pub edges: Vec<CycleEdge>,
}

/// Every cycle found, with the imports that cause it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycles: Vec<Cycle>,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycles found:")?;
        for cycle in &self.cycles {
            for edge in &cycle.edges {
                write!(f, "\n {} --> {}", edge.from, edge.to)?;
                for (file, dependency) in &edge.imports {
                    write!(f, "\n  {} imports {}", file, dependency)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeState {
    index: usize,
    low_link: usize,
    on_stack: bool,
}

struct Frame<'g> {
    key: &'g str,
    successors: &'g [String],
    next: usize,
}

struct Tarjan<'g> {
    graph: &'g PackageGraph,
    next_index: usize,
    states: HashMap<&'g str, NodeState>,
    stack: Vec<&'g str>,
    components: Vec<Vec<String>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g PackageGraph) -> Self {
        Self {
            graph,
            next_index: 1,
            states: HashMap::new(),
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn enter(&mut self, key: &'g str) -> Result<Frame<'g>, WrapError> {
        let package = self
            .graph
            .packages
            .get(key)
            .ok_or_else(|| WrapError::UnknownPackage(key.to_string()))?;
        self.states.insert(
            key,
            NodeState {
                index: self.next_index,
                low_link: self.next_index,
                on_stack: true,
            },
        );
        self.next_index += 1;
        self.stack.push(key);
        Ok(Frame {
            key,
            successors: &package.imports,
            next: 0,
        })
    }

    fn lower(&mut self, key: &str, value: usize) {
        if let Some(state) = self.states.get_mut(key) {
            state.low_link = state.low_link.min(value);
        }
    }

    fn visit(&mut self, root: &'g str) -> Result<(), WrapError> {
        let mut frames = vec![self.enter(root)?];

        while let Some(frame) = frames.last_mut() {
            let key = frame.key;
            let successors = frame.successors;
            if let Some(successor) = successors.get(frame.next) {
                frame.next += 1;
                match self.states.get(successor.as_str()).copied() {
                    None => {
                        let child = self.enter(successor)?;
                        frames.push(child);
                    }
                    Some(state) if state.on_stack => self.lower(key, state.index),
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            let state = self.states[key];
            if let Some(parent) = frames.last() {
                self.lower(parent.key, state.low_link);
            }
            if state.low_link == state.index {
                self.pop_component(key);
            }
        }
        Ok(())
    }

    fn pop_component(&mut self, root: &str) {
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            if let Some(state) = self.states.get_mut(member) {
                state.on_stack = false;
            }
            component.push(member.to_string());
            if member == root {
                break;
            }
        }
        self.components.push(component);
    }
}

/// Strongly connected components of the graph reachable from `roots`.
///
/// Roots are visited in sorted order so the result is the same from run to
/// run. Components are listed in the order Tarjan completes them, which is
/// reverse topological.
pub fn strongly_connected_components<S: AsRef<str>>(
    graph: &PackageGraph,
    roots: &[S],
) -> Result<Vec<Vec<String>>, WrapError> {
    let mut ordered: Vec<&str> = roots.iter().map(AsRef::as_ref).collect();
    ordered.sort_unstable();
    ordered.dedup();

    let mut tarjan = Tarjan::new(graph);
    for root in ordered {
        let key = graph
            .packages
            .get_key_value(root)
            .map(|(key, _)| key.as_str())
            .ok_or_else(|| WrapError::UnknownPackage(root.to_string()))?;
        if !tarjan.states.contains_key(key) {
            tarjan.visit(key)?;
        }
    }
    debug!(
        components = tarjan.components.len(),
        visited = tarjan.states.len(),
        "Computed strongly connected components"
    );
    Ok(tarjan.components)
}

/// Explain why the packages of a component import each other.
pub fn explain_component(graph: &PackageGraph, component: &[String]) -> Cycle {
    let members: BTreeSet<&str> = component.iter().map(String::as_str).collect();
    let mut edges = Vec::new();
    for from in &members {
        let Some(package) = graph.package(from) else {
            continue;
        };
        for to in package.imported_packages() {
            if !members.contains(to.as_str()) {
                continue;
            }
            let imports = graph
                .imports_between(from, to)
                .into_iter()
                .map(|(file, dependency)| (file.name().to_string(), dependency.name().to_string()))
                .collect();
            edges.push(CycleEdge {
                from: from.to_string(),
                to: to.clone(),
                imports,
            });
        }
    }
    Cycle {
        packages: members.into_iter().map(str::to_string).collect(),
        edges,
    }
}

/// Find every package cycle reachable from `needed`.
pub fn find_cycles<S: AsRef<str>>(
    graph: &PackageGraph,
    needed: &[S],
) -> Result<CycleReport, WrapError> {
    let cycles = strongly_connected_components(graph, needed)?
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| explain_component(graph, &component))
        .collect();
    Ok(CycleReport { cycles })
}

/// Fail with [`WrapError::Cycles`] if any package cycle is reachable from `needed`.
pub fn check_cycles<S: AsRef<str>>(graph: &PackageGraph, needed: &[S]) -> Result<(), WrapError> {
    let report = find_cycles(graph, needed)?;
    if report.is_empty() {
        Ok(())
    } else {
        Err(WrapError::Cycles(report))
    }
}
