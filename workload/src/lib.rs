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

//! Synthetic workloads for interconnection network simulators.
//!
//! The nodes of a network are split among several applications
//! ([`partition`]), each application is given a traffic [`Pattern`] that
//! fills a [`WeightMatrix`] over its own nodes, and the matrices and
//! per-node [`InjectionVector`]s are written out as text files the simulator
//! reads.
//!
//! # Examples
//!
//! ```
//! use workload::{Pattern, Placement, Workload, WorkloadConfig};
//!
//! let config = WorkloadConfig::from_args(
//!     4,
//!     2,
//!     Placement::Striped,
//!     vec![Pattern::UniformRandom, Pattern::Complement],
//!     vec!["app0.mat".into(), "app1.mat".into()],
//!     vec![],
//!     Some(1),
//! )
//! .unwrap();
//! let workload = Workload::new(&config).unwrap();
//! let matrices = workload.matrices().unwrap();
//! assert_eq!(matrices[0].get(0, 2), 1.0);
//! assert_eq!(matrices[1].get(1, 3), 1.0);
//! ```

mod error;
mod matrix;
mod pattern;
mod placement;
mod reader;
mod workload;
mod writer;

/// Index of a node of the network.
pub type NodeId = usize;
/// Index of an application.
pub type AppId = usize;

pub use crate::error::Error;
pub use crate::matrix::{InjectionVector, MatrixView, WeightMatrix};
pub use crate::pattern::{random_permutation, Pattern};
pub use crate::placement::{partition, NodeSet, Placement};
pub use crate::reader::{parse_injection, parse_matrix, read_injection, read_matrix};
pub use crate::workload::{generate_matrix, run, AppConfig, Workload, WorkloadConfig};
pub use crate::writer::{
    format_value, injection_lines, matrix_lines, serialize_injection, serialize_matrix,
    write_injection, write_matrix,
};
