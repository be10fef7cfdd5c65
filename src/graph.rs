//! Route graph — static adjacency structure of token -> candidate swap edges.
//!
//! Built once at startup from the configured edge table and immutable
//! afterwards. Duplicate edges for the same pair (different protocol or fee
//! tier) represent alternative liquidity venues and are kept as-is.

use alloy_primitives::Address;
use std::collections::{HashMap, VecDeque};

use crate::types::{Edge, Protocol, Route};

/// Adjacency list over the token roster.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    adjacency: HashMap<Address, Vec<Edge>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directed edge. No dedup, no self-loop rejection — callers
    /// own the shape of the mesh.
    pub fn add_edge(&mut self, from: Address, to: Address, protocol: Protocol, fee: u32) {
        self.adjacency
            .entry(from)
            .or_default()
            .push(Edge { from, to, protocol, fee });
    }

    /// All edges leaving `token`, in insertion order. Order only matters for
    /// display — the decision loop evaluates every neighbor and keeps the
    /// first-seen maximum.
    pub fn neighbors(&self, token: Address) -> &[Edge] {
        self.adjacency.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Breadth-first enumeration of all routes from `start` of up to
    /// `max_hops` edges, including every shorter prefix as its own route.
    ///
    /// Cycle rules: a route may always close back into `start` (so two-hop
    /// round trips and triangular loops are enumerable), but may never
    /// revisit any other token already on the route, and an edge reversing
    /// straight back to the preceding non-start token is rejected.
    pub fn find_paths(&self, start: Address, max_hops: usize) -> Vec<Route> {
        let mut paths = Vec::new();
        let mut queue: VecDeque<(Address, Route)> = VecDeque::new();
        queue.push_back((start, Vec::new()));

        while let Some((token, path)) = queue.pop_front() {
            if path.len() >= max_hops {
                continue;
            }

            for edge in self.neighbors(token) {
                if edge.to == edge.from {
                    continue;
                }
                if edge.to != start {
                    // No reversing straight back where we came from.
                    if path.last().is_some_and(|prev| edge.to == prev.from) {
                        continue;
                    }
                    // No revisiting intermediate tokens.
                    if path.iter().any(|e| e.to == edge.to) {
                        continue;
                    }
                }

                let mut next = path.clone();
                next.push(*edge);
                queue.push_back((edge.to, next.clone()));
                paths.push(next);
            }
        }
        paths
    }

    /// Closed two-hop loops `start -> X -> start`, the only shape the guild
    /// variant evaluates.
    pub fn closed_loops(&self, start: Address) -> Vec<Route> {
        self.find_paths(start, 2)
            .into_iter()
            .filter(|p| p.len() == 2 && p[1].to == start)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
