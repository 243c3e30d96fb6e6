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

//! Workload generation: partition the nodes, build one weight matrix per
//! application and write the matrices and injection vectors out.
//!
//! The random source is seeded once per run. The partition draws from it
//! first, then the applications draw in increasing index order, so a given
//! seed and configuration always produce the same files.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::placement::partition;
use crate::writer::{write_injection, write_matrix};
use crate::{AppId, Error, InjectionVector, MatrixView, NodeSet, Pattern, Placement, WeightMatrix};

/// Per application settings.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub pattern: Pattern,
    pub matrix_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_file: Option<PathBuf>,
}

/// Everything needed to generate a workload.
///
/// Constructed from command line arguments or read from a YAML file.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WorkloadConfig {
    pub nodes: usize,
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub apps: Vec<AppConfig>,
}

fn check_count(what: &'static str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::CountMismatch {
            what,
            expected,
            actual,
        })
    }
}

impl WorkloadConfig {
    /// Assemble a configuration from per-application lists, which must each
    /// hold one entry per application. `injection_files` may also be empty.
    pub fn from_args(
        nodes: usize,
        apps: usize,
        placement: Placement,
        patterns: Vec<Pattern>,
        matrix_files: Vec<PathBuf>,
        injection_files: Vec<PathBuf>,
        seed: Option<u64>,
    ) -> Result<Self, Error> {
        check_count("patterns", apps, patterns.len())?;
        check_count("matrix files", apps, matrix_files.len())?;
        if !injection_files.is_empty() {
            check_count("injection files", apps, injection_files.len())?;
        }
        let mut injection_files = injection_files.into_iter();
        let apps = patterns
            .into_iter()
            .zip(matrix_files)
            .map(|(pattern, matrix_file)| AppConfig {
                pattern,
                matrix_file,
                injection_file: injection_files.next(),
            })
            .collect();
        let config = Self {
            nodes,
            placement,
            seed,
            apps,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_str(config: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    /// Check the node and application counts and that no two outputs share
    /// a file.
    pub fn validate(&self) -> Result<(), Error> {
        if self.nodes == 0 {
            return Err(Error::InvalidNodeCount(self.nodes));
        }
        if self.apps.is_empty() || self.apps.len() >= self.nodes {
            return Err(Error::InvalidAppCount {
                nodes: self.nodes,
                apps: self.apps.len(),
            });
        }
        let mut outputs = HashSet::new();
        for app in &self.apps {
            for path in std::iter::once(&app.matrix_file).chain(app.injection_file.as_ref()) {
                if !outputs.insert(path) {
                    return Err(Error::DuplicateOutput(path.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Build the weight matrix of one application.
pub fn generate_matrix<R: Rng + ?Sized>(
    nodes: usize,
    node_set: &NodeSet,
    pattern: Pattern,
    rng: &mut R,
) -> Result<WeightMatrix, Error> {
    let mut matrix = WeightMatrix::new(nodes);
    let mut view = MatrixView::new(&mut matrix, node_set)?;
    pattern.apply(&mut view, rng)?;
    Ok(matrix)
}

/// A validated configuration together with its node placement.
///
/// Matrices are produced on demand, one application at a time, so only one
/// `nodes x nodes` matrix is alive at once.
#[derive(Clone, Debug)]
pub struct Workload {
    config: WorkloadConfig,
    seed: u64,
    node_sets: Vec<NodeSet>,
    // generator state right after placement
    rng: Pcg64,
}

impl Workload {
    /// Validate `config`, seed the random source and place the nodes.
    ///
    /// Fails before anything is generated if an application's pattern is
    /// not defined for the node-set it was given.
    pub fn new(config: &WorkloadConfig) -> Result<Self, Error> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        log::info!("seed={}", seed);
        let mut rng = Pcg64::seed_from_u64(seed);
        let node_sets = partition(config.nodes, config.app_count(), config.placement, &mut rng);
        for (app, node_set) in node_sets.iter().enumerate() {
            log::info!("app={} size={}: {}", app, node_set.len(), node_set);
        }
        for (app, (node_set, app_config)) in node_sets.iter().zip(&config.apps).enumerate() {
            app_config
                .pattern
                .check(node_set.len())
                .map_err(|e| e.in_app(app))?;
        }
        Ok(Self {
            config: config.clone(),
            seed,
            node_sets,
            rng,
        })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// The seed in use, drawn at random if the configuration had none.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configuration with the seed in use filled in.
    pub fn resolved_config(&self) -> WorkloadConfig {
        WorkloadConfig {
            seed: Some(self.seed),
            ..self.config.clone()
        }
    }

    pub fn node_sets(&self) -> &[NodeSet] {
        &self.node_sets
    }

    pub fn injection(&self, app: AppId) -> InjectionVector {
        InjectionVector::new(self.config.nodes, &self.node_sets[app])
    }

    /// Generate the matrices in application order, handing each to `f`.
    ///
    /// Every call replays the same random sequence.
    pub fn for_each_matrix<F>(&self, mut f: F) -> Result<(), Error>
    where
        F: FnMut(AppId, WeightMatrix) -> Result<(), Error>,
    {
        let mut rng = self.rng.clone();
        for (app, (node_set, app_config)) in self.node_sets.iter().zip(&self.config.apps).enumerate()
        {
            log::info!("creating app {} matrix ({})", app, app_config.pattern);
            let matrix = generate_matrix(self.config.nodes, node_set, app_config.pattern, &mut rng)
                .map_err(|e| e.in_app(app))?;
            log::debug!("app {}: {} populated cells", app, matrix.populated());
            f(app, matrix)?;
        }
        Ok(())
    }

    /// All matrices at once, in application order.
    pub fn matrices(&self) -> Result<Vec<WeightMatrix>, Error> {
        let mut matrices = Vec::with_capacity(self.config.app_count());
        self.for_each_matrix(|_, matrix| {
            matrices.push(matrix);
            Ok(())
        })?;
        Ok(matrices)
    }

    /// Write every matrix file, then every requested injection file.
    pub fn write(&self) -> Result<(), Error> {
        self.for_each_matrix(|app, matrix| {
            let path = &self.config.apps[app].matrix_file;
            log::info!("writing app {} matrix file {}", app, path.display());
            write_matrix(&matrix, path)
        })?;
        for (app, app_config) in self.config.apps.iter().enumerate() {
            if let Some(path) = &app_config.injection_file {
                log::info!("writing app {} injection file {}", app, path.display());
                write_injection(&self.injection(app), path)?;
            }
        }
        Ok(())
    }
}

/// Generate and write the workload described by `config`.
pub fn run(config: &WorkloadConfig) -> Result<Workload, Error> {
    let workload = Workload::new(config)?;
    if !config.placement.is_random() {
        log::debug!("{} placement does not use the seed", config.placement);
    }
    workload.write()?;
    Ok(workload)
}
