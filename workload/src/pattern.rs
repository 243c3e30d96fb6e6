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

//! Traffic patterns.
//!
//! A pattern fills the cells of an application's weight matrix whose source
//! and destination both belong to the application's node-set. Except for
//! the self-inclusive uniform pattern, every row a pattern populates sums to
//! `1.0`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, MatrixView, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Every node sends equally to every other node of its set.
    UniformRandom,
    /// Every node sends equally to every node of its set, itself included.
    UniformRandomSelf,
    /// Every node sends to exactly one node and receives from exactly one.
    RandomPermutation,
    /// The i-th smallest node pairs with the i-th largest.
    Complement,
}

impl Pattern {
    pub const NAMES: [&'static str; 4] = [
        "uniform_random",
        "uniform_random_self",
        "random_permutation",
        "complement",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::UniformRandom => "uniform_random",
            Self::UniformRandomSelf => "uniform_random_self",
            Self::RandomPermutation => "random_permutation",
            Self::Complement => "complement",
        }
    }

    /// Check that the pattern is defined for a node-set of `size` nodes.
    ///
    /// Empty node-sets are accepted by every pattern, they populate nothing.
    pub fn check(&self, size: usize) -> Result<(), Error> {
        match self {
            Self::UniformRandom if size == 1 => Err(Error::NodeSetTooSmall {
                pattern: *self,
                size,
                required: 2,
            }),
            _ => Ok(()),
        }
    }

    /// Populate `view` with this pattern.
    pub fn apply<R: Rng + ?Sized>(&self, view: &mut MatrixView, rng: &mut R) -> Result<(), Error> {
        self.check(view.node_set().len())?;
        match self {
            Self::UniformRandom => uniform_random(view, false),
            Self::UniformRandomSelf => uniform_random(view, true),
            Self::RandomPermutation => random_permutation(view, false, rng),
            Self::Complement => complement(view),
        }
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform_random" => Ok(Self::UniformRandom),
            "uniform_random_self" => Ok(Self::UniformRandomSelf),
            "random_permutation" => Ok(Self::RandomPermutation),
            "complement" => Ok(Self::Complement),
            _ => Err(Error::UnknownPattern(s.to_string())),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn uniform_random(view: &mut MatrixView, with_self: bool) -> Result<(), Error> {
    let node_set = view.node_set();
    if node_set.is_empty() {
        return Ok(());
    }
    let fan_out = if with_self {
        node_set.len()
    } else {
        node_set.len() - 1
    };
    let weight = 1.0 / fan_out as f64;
    for src in node_set.iter() {
        for dst in node_set.iter().filter(|dst| with_self || *dst != src) {
            view.set(src, dst, weight)?;
        }
    }
    Ok(())
}

/// Pair each node of the view's node-set with a distinct destination drawn
/// uniformly from the destinations not taken yet.
///
/// Sources are visited in increasing order. Unless `allow_self` is set, a
/// draw that picks the source itself is repeated, except when it is the only
/// destination left.
pub fn random_permutation<R: Rng + ?Sized>(
    view: &mut MatrixView,
    allow_self: bool,
    rng: &mut R,
) -> Result<(), Error> {
    let sources = view.node_set().iter().collect::<Vec<NodeId>>();
    let mut pool = sources.clone();
    for src in sources {
        let dst = loop {
            let k = rng.gen_range(0..pool.len());
            if allow_self || pool[k] != src || pool.len() == 1 {
                break pool.swap_remove(k);
            }
        };
        log::trace!("random_permutation: {} -> {}", src, dst);
        view.set(src, dst, 1.0)?;
    }
    Ok(())
}

fn complement(view: &mut MatrixView) -> Result<(), Error> {
    let nodes = view.node_set().iter().collect::<Vec<NodeId>>();
    let half = nodes.len() / 2;
    for (src, dst) in nodes.iter().zip(nodes.iter().rev()).take(half) {
        view.set(*src, *dst, 1.0)?;
        view.set(*dst, *src, 1.0)?;
    }
    if nodes.len() % 2 == 1 {
        let middle = nodes[half];
        view.set(middle, middle, 1.0)?;
    }
    Ok(())
}
