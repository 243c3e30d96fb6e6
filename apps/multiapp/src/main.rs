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

//! Traffic matrices for several applications sharing one network.
use anyhow::Context;
use env_logger::Target;
use std::path::PathBuf;
use structopt::StructOpt;

use workload::{Pattern, Placement, Workload, WorkloadConfig};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "multiapp",
    about = "Generates traffic matrices for applications sharing a network"
)]
struct Arguments {
    /// number of nodes
    #[structopt(required_unless = "config")]
    nodes: Option<usize>,
    /// number of apps
    #[structopt(required_unless = "config")]
    apps: Option<usize>,
    /// node placement policy for apps
    #[structopt(required_unless = "config", possible_values = &Placement::NAMES)]
    placement: Option<Placement>,
    /// app traffic pattern, one per app
    #[structopt(short, long, possible_values = &Pattern::NAMES)]
    pattern: Vec<Pattern>,
    /// seed for randomness (if used)
    #[structopt(short, long)]
    seed: Option<u64>,
    /// output matrix file, one per app
    #[structopt(short, long, parse(from_os_str))]
    mfile: Vec<PathBuf>,
    /// output injection file, one per app
    #[structopt(short, long, parse(from_os_str))]
    ifile: Vec<PathBuf>,
    /// read the workload from a YAML file instead of the arguments above
    #[structopt(
        short,
        long,
        parse(from_os_str),
        conflicts_with_all = &["nodes", "apps", "placement", "pattern", "mfile", "ifile"]
    )]
    config: Option<PathBuf>,
    /// write the workload, with the seed in use, to a YAML file
    #[structopt(long, parse(from_os_str))]
    dump_config: Option<PathBuf>,
    /// print various info as the program runs
    #[structopt(short, long)]
    verbose: bool,
}

impl Arguments {
    fn workload_config(&self) -> anyhow::Result<WorkloadConfig> {
        if let Some(path) = &self.config {
            let mut config = WorkloadConfig::from_file(path)
                .with_context(|| format!("Failed to load workload {}", path.display()))?;
            if self.seed.is_some() {
                config.seed = self.seed;
            }
            return Ok(config);
        }
        let (nodes, apps, placement) = match (self.nodes, self.apps, self.placement) {
            (Some(nodes), Some(apps), Some(placement)) => (nodes, apps, placement),
            _ => anyhow::bail!("nodes, apps and placement are required without --config"),
        };
        Ok(WorkloadConfig::from_args(
            nodes,
            apps,
            placement,
            self.pattern.clone(),
            self.mfile.clone(),
            self.ifile.clone(),
            self.seed,
        )?)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::from_args();

    let level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _logger = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .init();
    log::info!("Args={:?}", args);

    let config = args.workload_config()?;
    let workload = Workload::new(&config)?;
    workload.write()?;
    if let Some(path) = &args.dump_config {
        std::fs::write(path, workload.resolved_config().to_yaml()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(args: &[&str]) -> Result<Arguments, structopt::clap::Error> {
        Arguments::from_iter_safe(std::iter::once("multiapp").chain(args.iter().copied()))
    }

    #[test]
    fn positional_arguments() {
        let args = parse(&[
            "8",
            "2",
            "striped",
            "-p",
            "uniform_random",
            "complement",
            "-m",
            "a.mat",
            "b.mat.gz",
            "-i",
            "a.inj",
            "b.inj",
            "-s",
            "17",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        let config = args.workload_config().unwrap();
        assert_eq!(config.nodes, 8);
        assert_eq!(config.placement, Placement::Striped);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.apps.len(), 2);
        assert_eq!(config.apps[1].pattern, Pattern::Complement);
        assert_eq!(config.apps[1].matrix_file, PathBuf::from("b.mat.gz"));
        assert_eq!(config.apps[0].injection_file, Some(PathBuf::from("a.inj")));
    }

    #[test]
    fn repeated_options() {
        let args = parse(&[
            "6", "2", "random", "-p", "complement", "-p", "complement", "-m", "a", "-m", "b",
        ])
        .unwrap();
        let config = args.workload_config().unwrap();
        assert_eq!(config.apps.len(), 2);
        assert!(config.apps.iter().all(|app| app.injection_file.is_none()));
    }

    #[test]
    fn bad_names_are_rejected_by_the_parser() {
        assert!(parse(&["8", "2", "diagonal", "-p", "complement", "complement"]).is_err());
        assert!(parse(&["8", "2", "random", "-p", "tornado", "complement"]).is_err());
        assert!(parse(&["8", "2"]).is_err());
    }

    #[test]
    fn counts_are_checked() {
        let args = parse(&["8", "2", "random", "-p", "complement", "-m", "a", "b"]).unwrap();
        let err = args.workload_config().unwrap_err();
        assert!(err.to_string().contains("patterns"), "{}", err);

        let args = parse(&["2", "2", "random", "-p", "complement", "complement", "-m", "a", "b"])
            .unwrap();
        assert!(args.workload_config().is_err());
    }

    #[test]
    fn config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workload.yaml");
        fs::write(
            &path,
            "nodes: 4\nplacement: striped\napps:\n  - pattern: complement\n    matrix_file: a.mat\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let args = parse(&["-c", path, "-s", "3"]).unwrap();
        let config = args.workload_config().unwrap();
        assert_eq!(config.nodes, 4);
        assert_eq!(config.seed, Some(3));

        assert!(parse(&["4", "1", "striped", "-c", path]).is_err());
    }
}
