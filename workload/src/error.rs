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

use std::path::PathBuf;
use thiserror::Error;

use crate::{AppId, NodeId, Pattern};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid node count {0}: at least one node is required")]
    InvalidNodeCount(usize),
    #[error("invalid app count {apps} for {nodes} nodes: need 0 < apps < nodes")]
    InvalidAppCount { nodes: usize, apps: usize },
    #[error("expected {expected} {what} (one per app), got {actual}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("output file {} is used more than once", .0.display())]
    DuplicateOutput(PathBuf),
    #[error("pattern {pattern} needs at least {required} nodes, node set has {size}")]
    NodeSetTooSmall {
        pattern: Pattern,
        size: usize,
        required: usize,
    },
    #[error("app {app}: {reason}")]
    App { app: AppId, reason: Box<Error> },
    #[error("cell ({src}, {dst}) is outside the node set")]
    OutsideNodeSet { src: NodeId, dst: NodeId },
    #[error("node {node} is out of range for {nodes} nodes")]
    NodeOutOfRange { node: NodeId, nodes: usize },
    #[error("unknown placement policy '{0}'")]
    UnknownPlacement(String),
    #[error("unknown traffic pattern '{0}'")]
    UnknownPattern(String),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("invalid workload configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    /// Attach the index of the application whose data caused the error.
    pub fn in_app(self, app: AppId) -> Self {
        Self::App {
            app,
            reason: Box::new(self),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
