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

use approx::assert_abs_diff_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use workload::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn files(dir: &Path, stem: &str, suffix: &str, apps: usize) -> Vec<PathBuf> {
    (0..apps)
        .map(|app| dir.join(format!("{}{}{}", stem, app, suffix)))
        .collect()
}

fn workload_config(
    dir: &Path,
    nodes: usize,
    placement: Placement,
    patterns: Vec<Pattern>,
    suffix: &str,
    seed: u64,
) -> WorkloadConfig {
    let apps = patterns.len();
    WorkloadConfig::from_args(
        nodes,
        apps,
        placement,
        patterns,
        files(dir, "matrix", suffix, apps),
        files(dir, "injection", suffix, apps),
        Some(seed),
    )
    .expect("valid configuration")
}

#[test]
fn striped_uniform_files() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let config = workload_config(
        dir.path(),
        4,
        Placement::Striped,
        vec![Pattern::UniformRandom; 2],
        ".txt",
        0,
    );
    run(&config)?;

    assert_eq!(
        fs::read_to_string(&config.apps[0].matrix_file)?,
        "0.0,0.0,1.0,0.0,\n0.0,0.0,0.0,0.0,\n1.0,0.0,0.0,0.0,\n0.0,0.0,0.0,0.0,\n"
    );
    assert_eq!(
        fs::read_to_string(&config.apps[1].matrix_file)?,
        "0.0,0.0,0.0,0.0,\n0.0,0.0,0.0,1.0,\n0.0,0.0,0.0,0.0,\n0.0,1.0,0.0,0.0,\n"
    );
    let injection = config.apps[0].injection_file.as_ref().unwrap();
    assert_eq!(fs::read_to_string(injection)?, "1.0,\n0.0,\n1.0,\n0.0,\n");
    let injection = config.apps[1].injection_file.as_ref().unwrap();
    assert_eq!(fs::read_to_string(injection)?, "0.0,\n1.0,\n0.0,\n1.0,\n");
    Ok(())
}

#[test]
fn files_read_back_exactly() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    for suffix in [".mat", ".mat.gz"] {
        let config = workload_config(
            dir.path(),
            13,
            Placement::Random,
            vec![
                Pattern::UniformRandom,
                Pattern::UniformRandomSelf,
                Pattern::RandomPermutation,
            ],
            suffix,
            2023,
        );
        let workload = run(&config)?;
        let matrices = workload.matrices()?;
        for (app, app_config) in config.apps.iter().enumerate() {
            let matrix = read_matrix(&app_config.matrix_file)?;
            assert_eq!(matrix, matrices[app]);
            let injection = read_injection(app_config.injection_file.as_ref().unwrap())?;
            assert_eq!(&injection.node_set(), &workload.node_sets()[app]);
            for src in workload.node_sets()[app].iter() {
                assert_abs_diff_eq!(matrix.row_sum(src), 1.0, epsilon = 1e-12);
            }
        }
    }
    Ok(())
}

#[test]
fn same_seed_same_bytes() -> anyhow::Result<()> {
    init_logger();
    let patterns = vec![
        Pattern::RandomPermutation,
        Pattern::Complement,
        Pattern::UniformRandom,
        Pattern::RandomPermutation,
    ];
    for suffix in [".csv", ".csv.gz"] {
        let first = TempDir::new()?;
        let second = TempDir::new()?;
        let a = workload_config(first.path(), 37, Placement::Random, patterns.clone(), suffix, 5);
        let b = workload_config(second.path(), 37, Placement::Random, patterns.clone(), suffix, 5);
        run(&a)?;
        run(&b)?;
        for (x, y) in a.apps.iter().zip(&b.apps) {
            assert_eq!(fs::read(&x.matrix_file)?, fs::read(&y.matrix_file)?);
            assert_eq!(
                fs::read(x.injection_file.as_ref().unwrap())?,
                fs::read(y.injection_file.as_ref().unwrap())?
            );
        }
    }
    Ok(())
}

#[test]
fn different_seeds_place_differently() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let patterns = vec![Pattern::Complement; 2];
    let place = |seed| {
        let config = workload_config(dir.path(), 64, Placement::Random, patterns.clone(), "", seed);
        Workload::new(&config)
    };
    let (a, b) = (place(1)?, place(2)?);
    assert_ne!(a.node_sets(), b.node_sets());
    Ok(())
}

#[test]
fn precondition_failures_write_nothing() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    // sequential placement of 3 nodes over 2 apps leaves app 1 a single node
    let config = workload_config(
        dir.path(),
        3,
        Placement::Sequential,
        vec![Pattern::Complement, Pattern::UniformRandom],
        ".mat",
        0,
    );
    match run(&config) {
        Err(Error::App { app: 1, reason }) => {
            assert!(matches!(*reason, Error::NodeSetTooSmall { size: 1, .. }))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn yaml_workload() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let yaml = format!(
        "---
nodes: 6
placement: sequential
apps:
  - pattern: complement
    matrix_file: {dir}/a.mat
  - pattern: uniform_random_self
    matrix_file: {dir}/b.mat
    injection_file: {dir}/b.inj
",
        dir = dir.path().display()
    );
    let path = dir.path().join("workload.yaml");
    fs::write(&path, yaml)?;
    let config = WorkloadConfig::from_file(&path)?;
    let workload = run(&config)?;
    assert!(config.seed.is_none());
    assert_eq!(workload.resolved_config().seed, Some(workload.seed()));

    let a = read_matrix(&dir.path().join("a.mat"))?;
    for (src, dst) in [(0, 2), (1, 1), (2, 0)] {
        assert_eq!(a.get(src, dst), 1.0);
    }
    assert_eq!(a.populated(), 3);
    let b = read_matrix(&dir.path().join("b.mat"))?;
    assert_abs_diff_eq!(b.get(4, 4), 1.0 / 3.0);
    assert_eq!(b.populated(), 9);
    assert!(!dir.path().join("a.inj").exists());
    assert_eq!(
        read_injection(&dir.path().join("b.inj"))?.node_set(),
        (3..6).collect::<NodeSet>()
    );
    Ok(())
}
