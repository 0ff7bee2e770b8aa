//! Flow ranks for one sibling set.
//!
//! Siblings are addressed by their declaration index. Ranks come from a Kahn
//! topological sort over the sibling graph. When the sort stalls on a cycle,
//! one sibling of an upstream cycle is forced through: every predecessor it
//! still waits on belongs to its own strongly connected component. Every
//! sibling always ends up with a rank or as [`Placement::Disconnected`].

use std::collections::VecDeque;

use log::trace;
use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

/// Where the compositor should put a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Column index along the flow axis.
    Ranked(usize),
    /// No edges inside the sibling set; placed by the grid fallback.
    Disconnected,
}

/// Placement of every sibling, indexed like the siblings themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    placements: Vec<Placement>,
    rank_count: usize,
}

impl Ranking {
    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.placements.get(index).copied()
    }

    pub fn rank(&self, index: usize) -> Option<usize> {
        match self.placement(index)? {
            Placement::Ranked(rank) => Some(rank),
            Placement::Disconnected => None,
        }
    }

    /// Number of distinct ranks.
    pub fn rank_count(&self) -> usize {
        self.rank_count
    }

    /// Sibling indices grouped by rank, each group in declaration order.
    pub fn columns(&self) -> Vec<Vec<usize>> {
        let mut columns = vec![Vec::new(); self.rank_count];
        for (index, placement) in self.placements.iter().enumerate() {
            if let Placement::Ranked(rank) = placement {
                columns[*rank].push(index);
            }
        }
        columns
    }

    /// Disconnected sibling indices in declaration order.
    pub fn disconnected(&self) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, placement)| **placement == Placement::Disconnected)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Builds the sibling graph. Self edges and out-of-range indices are ignored,
/// parallel edges collapse into one.
fn sibling_graph(count: usize, edges: &[(usize, usize)]) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::with_capacity(count, edges.len());
    for index in 0..count {
        graph.add_node(index);
    }
    for &(source, target) in edges {
        if source != target && source < count && target < count {
            graph.update_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }
    }
    graph
}

/// Assigns a flow rank to each of `count` siblings.
///
/// For every edge `a → b` whose ends are not on a common cycle,
/// `rank(b) > rank(a)`. Never fails.
pub fn assign_ranks(count: usize, edges: &[(usize, usize)]) -> Ranking {
    let graph = sibling_graph(count, edges);

    let connected: Vec<bool> = graph
        .node_indices()
        .map(|idx| graph.neighbors_undirected(idx).next().is_some())
        .collect();
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.neighbors_directed(idx, Direction::Incoming).count())
        .collect();

    let components = tarjan_scc(&graph);
    let mut component = vec![0usize; count];
    for (id, members) in components.iter().enumerate() {
        for member in members {
            component[member.index()] = id;
        }
    }

    // Rank candidate from predecessors processed so far.
    let mut floor = vec![0usize; count];
    let mut ranks: Vec<Option<usize>> = vec![None; count];
    let mut queue = VecDeque::new();

    for index in 0..count {
        if connected[index] && in_degree[index] == 0 {
            ranks[index] = Some(0);
            queue.push_back(index);
        }
    }

    let mut breaks = 0;
    loop {
        while let Some(index) = queue.pop_front() {
            let rank = ranks[index].unwrap_or_default();
            for next in graph.neighbors_directed(NodeIndex::new(index), Direction::Outgoing) {
                let next = next.index();
                if ranks[next].is_some() {
                    continue;
                }
                floor[next] = floor[next].max(rank + 1);
                in_degree[next] = in_degree[next].saturating_sub(1);
                if in_degree[next] == 0 {
                    ranks[next] = Some(floor[next]);
                    queue.push_back(next);
                }
            }
        }

        // Stalled on a cycle. Force through a sibling of a cycle that only
        // waits on itself, so nothing downstream jumps ahead.
        let Some(stuck) = (0..count).find(|&index| {
            connected[index]
                && ranks[index].is_none()
                && waits_only_on_itself(&graph, &components[component[index]], &component, &ranks)
        }) else {
            break;
        };
        breaks += 1;
        ranks[stuck] = Some(floor[stuck]);
        queue.push_back(stuck);
    }

    let ranking = compress(&connected, &ranks);
    trace!(siblings = count, ranks = ranking.rank_count, breaks; "Ranked sibling set");
    ranking
}

/// True when no member of `members` has an unranked predecessor outside the
/// component.
fn waits_only_on_itself(
    graph: &DiGraph<usize, ()>,
    members: &[NodeIndex],
    component: &[usize],
    ranks: &[Option<usize>],
) -> bool {
    members.iter().all(|&member| {
        graph
            .neighbors_directed(member, Direction::Incoming)
            .all(|prev| {
                ranks[prev.index()].is_some()
                    || component[prev.index()] == component[member.index()]
            })
    })
}

/// Maps raw ranks onto a dense `0..k` range.
fn compress(connected: &[bool], ranks: &[Option<usize>]) -> Ranking {
    let mut distinct: Vec<usize> = ranks.iter().flatten().copied().collect();
    distinct.sort_unstable();
    distinct.dedup();

    let placements = connected
        .iter()
        .zip(ranks)
        .map(|(&connected, rank)| match rank {
            Some(rank) if connected => {
                Placement::Ranked(distinct.binary_search(rank).unwrap_or_default())
            }
            _ => Placement::Disconnected,
        })
        .collect();

    Ranking {
        placements,
        rank_count: distinct.len(),
    }
}
