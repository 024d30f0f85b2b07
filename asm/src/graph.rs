use crate::{
    scan,
    symbol::{Symbol, SymbolBehavior},
};
use indexmap::IndexMap;
use tracing::debug;

/// One symbol and the indices of the symbols whose value mentions it.
#[derive(Debug, Clone)]
pub struct SymbolNode {
    symbol: Symbol,
    index: usize,
    adjacent: Vec<usize>,
}

impl SymbolNode {
    fn new(symbol: Symbol, index: usize) -> Self {
        Self {
            symbol,
            index,
            adjacent: vec![],
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn adjacent(&self) -> &[usize] {
        &self.adjacent
    }

    /// Edge `self -> other` when `self` is static and `other` depends on it.
    fn check_adjacency(&mut self, other: &SymbolNode) {
        if self.symbol.behavior() == SymbolBehavior::Static
            && self.symbol.occurs_in(other.symbol.value().as_str())
        {
            self.adjacent.push(other.index);
        }
    }
}

/// Dependency graph over labels and constants.
#[derive(Debug, Clone, Default)]
pub struct SymbolGraph {
    nodes: Vec<SymbolNode>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, symbol: Symbol) {
        let mut node = SymbolNode::new(symbol, self.nodes.len());
        for other in self.nodes.iter_mut() {
            other.check_adjacency(&node);
            node.check_adjacency(other);
        }
        let this = node.clone();
        node.check_adjacency(&this);
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SymbolNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn evaluate(&self) -> SymbolGraphEvaluation {
        let duplicates = check_duplicates(&self.nodes);
        let invalid_names = check_names(&self.nodes);
        let (topologic_order, sample_cycle) = disconnected_dfs(&self.nodes);
        let symbols = prepare_symbols(&self.nodes, &topologic_order);
        let evaluation = SymbolGraphEvaluation {
            invalid_names,
            duplicates,
            sample_cycle,
            topologic_order,
            symbols,
        };
        debug!(
            symbols = self.nodes.len(),
            invalid = evaluation.invalid_names.len(),
            duplicates = evaluation.duplicates.len(),
            cycle = evaluation.sample_cycle.len(),
            "symbol graph evaluated"
        );
        evaluation
    }
}

// ----------------------------------------------------------------------------

fn check_duplicates(nodes: &[SymbolNode]) -> Vec<Vec<usize>> {
    let mut by_name: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for node in nodes {
        by_name
            .entry(node.symbol.name().as_str())
            .or_default()
            .push(node.index);
    }
    by_name.into_values().filter(|group| group.len() > 1).collect()
}

fn check_names(nodes: &[SymbolNode]) -> Vec<usize> {
    nodes
        .iter()
        .filter(|node| !node.symbol.name_valid())
        .map(|node| node.index)
        .collect()
}

/// Walk back the active path to the first occurrence of `start`.
fn decompose_cycle(start: usize, path: &[(usize, usize)]) -> Vec<usize> {
    let mut cycle = vec![start];
    for &(index, _) in path.iter().rev() {
        if index == start {
            break;
        }
        cycle.push(index);
    }
    cycle.push(start);
    cycle
}

/// Iterative DFS over one component. Pushes finished nodes onto `finished`
/// and returns a cycle if one is reachable from `start`.
fn connected_dfs(
    nodes: &[SymbolNode],
    finished: &mut Vec<usize>,
    visited: &mut [bool],
    start: usize,
) -> Vec<usize> {
    let mut to_visit = vec![start];
    // (node, size of `to_visit` when the node was entered)
    let mut path: Vec<(usize, usize)> = vec![];
    let mut on_path = vec![false; nodes.len()];

    while let Some(node) = to_visit.pop() {
        if !visited[node] {
            visited[node] = true;
            on_path[node] = true;
            path.push((node, to_visit.len()));
            to_visit.extend(nodes[node].adjacent.iter().copied());
        } else if on_path[node] {
            return decompose_cycle(node, &path);
        }

        while let Some(&(index, mark)) = path.last() {
            if mark != to_visit.len() {
                break;
            }
            path.pop();
            on_path[index] = false;
            finished.push(index);
        }
    }
    vec![]
}

/// Topological order, or a sample cycle when there is none.
fn disconnected_dfs(nodes: &[SymbolNode]) -> (Vec<usize>, Vec<usize>) {
    let mut visited = vec![false; nodes.len()];
    let mut finished = vec![];
    for node in 0..nodes.len() {
        if !visited[node] {
            let cycle = connected_dfs(nodes, &mut finished, &mut visited, node);
            if !cycle.is_empty() {
                return (vec![], cycle);
            }
        }
    }
    finished.reverse();
    (finished, vec![])
}

fn prepare_symbols(nodes: &[SymbolNode], order: &[usize]) -> Vec<Symbol> {
    let mut values: Vec<String> = nodes
        .iter()
        .map(|node| node.symbol.value().string.clone())
        .collect();

    for &index in order {
        let node = &nodes[index];
        let name = node.symbol.name().as_str();
        let value = values[index].clone();
        for &neighbor in &node.adjacent {
            if nodes[neighbor].symbol.behavior() == SymbolBehavior::Dynamic {
                continue;
            }
            values[neighbor] = scan::replace_words(&values[neighbor], |word| {
                (word == name).then(|| value.clone())
            });
        }
    }

    nodes
        .iter()
        .zip(values)
        .map(|(node, value)| node.symbol.with_value(value))
        .collect()
}

// ----------------------------------------------------------------------------

/// Result of [`SymbolGraph::evaluate`].
#[derive(Debug, Clone, Default)]
pub struct SymbolGraphEvaluation {
    invalid_names: Vec<usize>,
    duplicates: Vec<Vec<usize>>,
    sample_cycle: Vec<usize>,
    topologic_order: Vec<usize>,
    symbols: Vec<Symbol>,
}

impl SymbolGraphEvaluation {
    pub fn valid(&self) -> bool {
        self.invalid_names.is_empty() && self.duplicates.is_empty() && self.sample_cycle.is_empty()
    }

    pub fn invalid_names(&self) -> &[usize] {
        &self.invalid_names
    }

    pub fn duplicates(&self) -> &[Vec<usize>] {
        &self.duplicates
    }

    /// Closed walk: the first index is repeated at the end.
    pub fn sample_cycle(&self) -> &[usize] {
        &self.sample_cycle
    }

    /// Every dependency comes before its dependents. Empty if there is a
    /// cycle. This is the depth-first finish order reversed: edges run from
    /// a symbol to the symbols that name it, so dependents finish first.
    pub fn topologic_order(&self) -> &[usize] {
        &self.topologic_order
    }

    /// Symbols in insertion order with static values substituted.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}
