//! Compact adjacency snapshot used by the path and centrality algorithms.
//!
//! A [`StationGraph`] has holes in its index space once vertices are
//! removed. Algorithms run on a dense copy instead: vertices are numbered
//! `0..n` in ascending id order, parallel edges collapse to the lightest
//! one and self-loops are dropped (they never lie on a shortest path).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::StationGraph;

/// Dense adjacency lists over the current vertex set.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    ids: Vec<String>,
    /// Outgoing neighbours with the lightest edge weight.
    out: Vec<Vec<(usize, f64)>>,
    /// Incoming neighbours with the lightest edge weight.
    inc: Vec<Vec<(usize, f64)>>,
    /// Neighbours ignoring direction.
    both: Vec<Vec<(usize, f64)>>,
    directed: bool,
}

impl StationGraph {
    pub(crate) fn topology(&self) -> Topology {
        let mut ids = Vec::with_capacity(self.inner().node_count());
        let mut position = HashMap::with_capacity(self.inner().node_count());
        for (i, (id, idx)) in self.indexed().enumerate() {
            ids.push(id.to_string());
            position.insert(idx, i);
        }

        let n = ids.len();
        let mut out: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        let mut inc: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];

        for edge in self.inner().edge_references() {
            let (Some(&s), Some(&t)) = (position.get(&edge.source()), position.get(&edge.target()))
            else {
                continue;
            };
            if s == t {
                continue;
            }
            let w = edge.weight().weight;
            keep_lightest(&mut out[s], t, w);
            keep_lightest(&mut inc[t], s, w);
        }

        let mut both: Vec<HashMap<usize, f64>> = out.clone();
        for (t, sources) in inc.iter().enumerate() {
            for (&s, &w) in sources {
                keep_lightest(&mut both[t], s, w);
            }
        }

        Topology {
            ids,
            out: out.into_iter().map(sorted_adjacency).collect(),
            inc: inc.into_iter().map(sorted_adjacency).collect(),
            both: both.into_iter().map(sorted_adjacency).collect(),
            directed: self.is_directed(),
        }
    }
}

fn keep_lightest(map: &mut HashMap<usize, f64>, key: usize, weight: f64) {
    map.entry(key)
        .and_modify(|w| {
            if weight < *w {
                *w = weight;
            }
        })
        .or_insert(weight);
}

fn sorted_adjacency(map: HashMap<usize, f64>) -> Vec<(usize, f64)> {
    let mut list: Vec<(usize, f64)> = map.into_iter().collect();
    list.sort_unstable_by_key(|(v, _)| *v);
    list
}

impl Topology {
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn id(&self, v: usize) -> &str {
        &self.ids[v]
    }

    pub(crate) fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Successors of `v`. With `directed = false`, or on an undirected
    /// graph, every neighbour regardless of edge direction.
    pub(crate) fn neighbors(&self, v: usize, directed: bool) -> &[(usize, f64)] {
        if directed && self.directed {
            &self.out[v]
        } else {
            &self.both[v]
        }
    }

    /// Predecessors of `v` under the same convention as [`Self::neighbors`].
    pub(crate) fn predecessors(&self, v: usize, directed: bool) -> &[(usize, f64)] {
        if directed && self.directed {
            &self.inc[v]
        } else {
            &self.both[v]
        }
    }

    /// Whether any edge weight is unusable as a distance.
    pub(crate) fn has_invalid_weight(&self) -> bool {
        self.out
            .iter()
            .flatten()
            .any(|(_, w)| !w.is_finite() || *w < 0.0)
    }

    /// Shortest-path distances from `source` (`None` = unreachable).
    ///
    /// Unweighted traversals count hops with a BFS; weighted ones run
    /// Dijkstra over the edge weights.
    pub(crate) fn distances_from(
        &self,
        source: usize,
        directed: bool,
        weighted: bool,
    ) -> Vec<Option<f64>> {
        if weighted {
            self.dijkstra(source, directed)
        } else {
            self.bfs(source, directed)
        }
    }

    fn bfs(&self, source: usize, directed: bool) -> Vec<Option<f64>> {
        let mut dist: Vec<Option<f64>> = vec![None; self.len()];
        dist[source] = Some(0.0);
        let mut queue = VecDeque::from([source]);

        while let Some(v) = queue.pop_front() {
            let next = dist[v].map_or(0.0, |d| d + 1.0);
            for &(w, _) in self.neighbors(v, directed) {
                if dist[w].is_none() {
                    dist[w] = Some(next);
                    queue.push_back(w);
                }
            }
        }
        dist
    }

    fn dijkstra(&self, source: usize, directed: bool) -> Vec<Option<f64>> {
        let mut dist: Vec<Option<f64>> = vec![None; self.len()];
        let mut heap = BinaryHeap::new();
        dist[source] = Some(0.0);
        heap.push(Frontier {
            cost: 0.0,
            node: source,
        });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if dist[node].is_some_and(|d| cost > d) {
                continue;
            }
            for &(w, weight) in self.neighbors(node, directed) {
                let candidate = cost + weight;
                if dist[w].is_none_or(|d| candidate < d) {
                    dist[w] = Some(candidate);
                    heap.push(Frontier {
                        cost: candidate,
                        node: w,
                    });
                }
            }
        }
        dist
    }
}

/// Min-heap entry for Dijkstra.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the std max-heap pops the cheapest entry first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
