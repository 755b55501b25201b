use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use lloyd2d::{Dataset, EmptyClusterPolicy, KMeans, Point};

/// Cluster 2-D integer points, read one "x,y" pair per line, and print the
/// centroids in the same format sorted by x then y.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Number of clusters
    #[arg(short, long, default_value_t = 3)]
    k: usize,

    /// Give up if the centroids have not converged after this many iterations
    #[arg(short, long, default_value_t = 300)]
    max_iter: usize,

    /// What to do when a cluster receives no points: "retain" or "fail"
    #[arg(short, long, default_value_t = EmptyClusterPolicy::Retain)]
    empty_cluster: EmptyClusterPolicy,

    /// Input file; standard input when omitted or "-"
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "warn"));

    let opts = Opts::parse();
    let dataset = read_dataset(input_path(opts.input.as_deref()))?;

    let mut kmeans = KMeans::new(opts.k)
        .max_iter(opts.max_iter)
        .empty_cluster(opts.empty_cluster);
    kmeans.fit(&dataset).with_context(|| {
        format!(
            "failed to cluster {} points into {} clusters",
            dataset.n_samples(),
            opts.k
        )
    })?;
    let centers = kmeans
        .cluster_centers
        .as_deref()
        .context("fit produced no cluster centers")?;

    write_centroids(io::stdout().lock(), centers)?;
    Ok(())
}

/// `None` means standard input.
fn input_path(input: Option<&Path>) -> Option<&Path> {
    input.filter(|path| *path != Path::new("-"))
}

fn read_dataset(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Dataset::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to read points from {}", path.display()))
        }
        None => Dataset::from_reader(io::stdin().lock())
            .context("failed to read points from standard input"),
    }
}

/// One `x,y` line per centroid.
fn write_centroids<W: Write>(out: W, centroids: &[Point]) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    for centroid in centroids {
        writeln!(out, "{}", centroid)?;
    }
    out.flush()
}
