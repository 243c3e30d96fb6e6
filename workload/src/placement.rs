// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Node placement: splitting the nodes of the network among applications.
//!
//! Every policy returns one [`NodeSet`] per application. The node-sets are
//! pairwise disjoint and together cover `0..nodes`.

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{Error, NodeId};

/// The policy used to assign nodes to applications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Draw nodes at random from the unassigned pool and hand them out
    /// round-robin.
    Random,
    /// Node `i` goes to application `i % apps`.
    Striped,
    /// Contiguous, near-equal blocks of nodes.
    Sequential,
}

impl Placement {
    pub const NAMES: [&'static str; 3] = ["random", "striped", "sequential"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Striped => "striped",
            Self::Sequential => "sequential",
        }
    }

    /// Whether the placement draws from the random source.
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Random)
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "striped" => Ok(Self::Striped),
            "sequential" => Ok(Self::Sequential),
            _ => Err(Error::UnknownPlacement(s.to_string())),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The nodes owned by one application, iterated in increasing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NodeSet {
    nodes: BTreeSet<NodeId>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
        self.nodes.iter().copied()
    }

    /// The largest node index in the set, if any.
    pub fn max(&self) -> Option<NodeId> {
        self.nodes.iter().next_back().copied()
    }

    fn insert(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.nodes.iter().join(", "))
    }
}

/// Split `0..nodes` into `apps` node-sets according to `placement`.
///
/// Only [`Placement::Random`] consumes `rng`. The caller is expected to have
/// checked `0 < apps < nodes`; if `apps > nodes` the surplus applications
/// get empty node-sets.
pub fn partition<R: Rng + ?Sized>(
    nodes: usize,
    apps: usize,
    placement: Placement,
    rng: &mut R,
) -> Vec<NodeSet> {
    if apps == 0 {
        return Vec::new();
    }
    let node_sets = match placement {
        Placement::Random => random_placement(nodes, apps, rng),
        Placement::Striped => striped_placement(nodes, apps),
        Placement::Sequential => sequential_placement(nodes, apps),
    };
    for (app, node_set) in node_sets.iter().enumerate() {
        log::debug!("{} placement: app={} size={}", placement, app, node_set.len());
    }
    node_sets
}

fn random_placement<R: Rng + ?Sized>(nodes: usize, apps: usize, rng: &mut R) -> Vec<NodeSet> {
    let mut node_sets = vec![NodeSet::new(); apps];
    let mut pool = (0..nodes).collect::<Vec<NodeId>>();
    let mut app = 0;
    while !pool.is_empty() {
        let k = rng.gen_range(0..pool.len());
        node_sets[app].insert(pool.swap_remove(k));
        app = (app + 1) % apps;
    }
    node_sets
}

fn striped_placement(nodes: usize, apps: usize) -> Vec<NodeSet> {
    let mut node_sets = vec![NodeSet::new(); apps];
    for node in 0..nodes {
        node_sets[node % apps].insert(node);
    }
    node_sets
}

fn sequential_placement(nodes: usize, apps: usize) -> Vec<NodeSet> {
    // the first `nodes % apps` apps take one extra node
    let quota = |app: usize| nodes / apps + usize::from(app < nodes % apps);
    let mut first = 0;
    (0..apps)
        .map(|app| {
            let last = first + quota(app);
            let node_set = (first..last).collect::<NodeSet>();
            first = last;
            node_set
        })
        .collect()
}
