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

//! A random permutation traffic matrix spanning the whole network.
use anyhow::Context;
use env_logger::Target;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::path::PathBuf;
use structopt::StructOpt;

use workload::{MatrixView, NodeSet, WeightMatrix};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "permutation",
    about = "Generates a random permutation traffic matrix"
)]
struct Arguments {
    /// number of nodes
    nodes: usize,
    /// output file, gzip compressed if it ends in .gz
    #[structopt(parse(from_os_str))]
    ofile: PathBuf,
    /// allow sending to self
    #[structopt(long = "self")]
    allow_self: bool,
    /// seed for randomness
    #[structopt(short, long)]
    seed: Option<u64>,
    #[structopt(short, long)]
    verbose: bool,
}

fn permutation_matrix<R: Rng + ?Sized>(
    nodes: usize,
    allow_self: bool,
    rng: &mut R,
) -> Result<WeightMatrix, workload::Error> {
    let node_set = (0..nodes).collect::<NodeSet>();
    let mut matrix = WeightMatrix::new(nodes);
    let mut view = MatrixView::new(&mut matrix, &node_set)?;
    workload::random_permutation(&mut view, allow_self, rng)?;
    Ok(matrix)
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

    anyhow::ensure!(args.nodes > 0, "at least one node is required");
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("seed={}", seed);
    let mut rng = Pcg64::seed_from_u64(seed);
    let matrix = permutation_matrix(args.nodes, args.allow_self, &mut rng)?;
    workload::write_matrix(&matrix, &args.ofile)
        .with_context(|| format!("Failed to write permutation of {} nodes", args.nodes))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_permutation(matrix: &WeightMatrix) {
        for node in 0..matrix.nodes() {
            assert_eq!(matrix.row_sum(node), 1.0);
            assert_eq!(matrix.column_sum(node), 1.0);
        }
        assert_eq!(matrix.populated(), matrix.nodes());
    }

    #[test]
    fn permutations() {
        for nodes in 1..20 {
            for allow_self in [false, true] {
                let mut rng = Pcg64::seed_from_u64(nodes as u64);
                assert_permutation(&permutation_matrix(nodes, allow_self, &mut rng).unwrap());
            }
        }
    }

    #[test]
    fn self_traffic_only_when_forced() {
        for seed in 0..16 {
            let matrix = permutation_matrix(9, false, &mut Pcg64::seed_from_u64(seed)).unwrap();
            assert!((0..8).all(|node| matrix.get(node, node) == 0.0));
        }
    }

    #[test]
    fn arguments() {
        let args = Arguments::from_iter_safe(&["permutation", "16", "out.mat.gz", "--self", "-s", "4"])
            .unwrap();
        assert_eq!(args.nodes, 16);
        assert_eq!(args.ofile, PathBuf::from("out.mat.gz"));
        assert!(args.allow_self);
        assert_eq!(args.seed, Some(4));
        assert!(Arguments::from_iter_safe(&["permutation", "16"]).is_err());
    }
}
