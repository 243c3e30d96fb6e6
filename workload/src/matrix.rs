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

use crate::{Error, NodeId, NodeSet};

/// A dense `nodes x nodes` matrix of traffic weights. Row `src` holds the
/// relative amount of traffic `src` sends to each destination.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMatrix {
    nodes: usize,
    weights: Vec<f64>,
}

impl WeightMatrix {
    /// An all-zero matrix.
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            weights: vec![0.0; nodes * nodes],
        }
    }

    pub(crate) fn from_rows(nodes: usize, weights: Vec<f64>) -> Self {
        assert_eq!(weights.len(), nodes * nodes);
        Self { nodes, weights }
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn get(&self, src: NodeId, dst: NodeId) -> f64 {
        self.weights[src * self.nodes + dst]
    }

    pub fn row(&self, src: NodeId) -> &[f64] {
        &self.weights[src * self.nodes..(src + 1) * self.nodes]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.weights.chunks_exact(self.nodes.max(1))
    }

    pub fn row_sum(&self, src: NodeId) -> f64 {
        self.row(src).iter().sum()
    }

    pub fn column_sum(&self, dst: NodeId) -> f64 {
        (0..self.nodes).map(|src| self.get(src, dst)).sum()
    }

    /// The number of non-zero cells.
    pub fn populated(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }

    fn set(&mut self, src: NodeId, dst: NodeId, weight: f64) {
        self.weights[src * self.nodes + dst] = weight;
    }
}

/// Write access to the cells of a [`WeightMatrix`] whose source and
/// destination both belong to one node-set.
///
/// Pattern generators only ever receive a view, never the matrix.
pub struct MatrixView<'a> {
    matrix: &'a mut WeightMatrix,
    node_set: &'a NodeSet,
}

impl<'a> MatrixView<'a> {
    pub fn new(matrix: &'a mut WeightMatrix, node_set: &'a NodeSet) -> Result<Self, Error> {
        match node_set.max() {
            Some(node) if node >= matrix.nodes() => Err(Error::NodeOutOfRange {
                node,
                nodes: matrix.nodes(),
            }),
            _ => Ok(Self { matrix, node_set }),
        }
    }

    pub fn node_set(&self) -> &'a NodeSet {
        self.node_set
    }

    pub fn set(&mut self, src: NodeId, dst: NodeId, weight: f64) -> Result<(), Error> {
        if !self.node_set.contains(src) || !self.node_set.contains(dst) {
            return Err(Error::OutsideNodeSet { src, dst });
        }
        self.matrix.set(src, dst, weight);
        Ok(())
    }
}

/// Marks which nodes of the network inject traffic for one application.
#[derive(Clone, Debug, PartialEq)]
pub struct InjectionVector {
    members: Vec<bool>,
}

impl InjectionVector {
    pub fn new(nodes: usize, node_set: &NodeSet) -> Self {
        Self {
            members: (0..nodes).map(|node| node_set.contains(node)).collect(),
        }
    }

    pub(crate) fn from_members(members: Vec<bool>) -> Self {
        Self { members }
    }

    pub fn nodes(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, node: NodeId) -> bool {
        self.members[node]
    }

    /// The per-node rates, `1.0` for members and `0.0` otherwise.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.members.iter().map(|m| if *m { 1.0 } else { 0.0 })
    }

    pub fn node_set(&self) -> NodeSet {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(node, m)| m.then(|| node))
            .collect()
    }
}
