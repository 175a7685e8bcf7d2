//! ConfigBin discovery.
//!
//! Each kinematic bin is a directory named `config_config_<var>_<lo>_<hi>`
//! where the edges use `p` for the decimal point, e.g.
//! `config_config_Mh_0p6_0p68` covers `0.6 <= Mh < 0.68`.

use crate::config::LayoutConfig;
use crate::error::{AsymError, AsymResult};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};
use walkdir::WalkDir;

static BIN_EDGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config_config_[^_/\\]+_([^_/\\]+)_([^/\\]+)").expect("bin-edge pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinEdges {
    pub lower: f64,
    pub upper: f64,
}

impl BinEdges {
    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

fn parse_edge(token: &str) -> Option<f64> {
    token.replace('p', ".").parse().ok()
}

/// Parses the bin edges encoded in `path`, or `None` if it does not follow
/// the naming convention.
pub fn parse_bin_edges(path: &Path) -> Option<BinEdges> {
    let text = path.to_string_lossy();
    let caps = BIN_EDGES.captures(&text)?;
    Some(BinEdges {
        lower: parse_edge(&caps[1])?,
        upper: parse_edge(&caps[2])?,
    })
}

/// Sort key for a ConfigBin path. Paths that don't parse get
/// `(+inf, +inf)` so they land at the end instead of aborting enumeration.
pub fn resolve_bin_edge(path: &Path) -> (f64, f64) {
    match parse_bin_edges(path) {
        Some(edges) => (edges.lower, edges.upper),
        None => (f64::INFINITY, f64::INFINITY),
    }
}

/// Bin center for `path`. Unlike [`resolve_bin_edge`] this refuses paths
/// outside the naming convention.
pub fn bin_center(path: &Path) -> AsymResult<f64> {
    parse_bin_edges(path)
        .map(|edges| edges.center())
        .ok_or_else(|| AsymError::UnparseablePath(path.to_path_buf()))
}

/// One configuration directory that produced partial-wave results for the
/// requested pion pair and run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigBin {
    /// Directory name directly under the project root; also the `cfg` key
    /// of the reference collection.
    pub name: String,
    /// `<project>/<name>/<pair>/<run_version>`
    pub root: PathBuf,
    pub results_path: PathBuf,
}

impl ConfigBin {
    pub fn edges(&self) -> Option<BinEdges> {
        parse_bin_edges(Path::new(&self.name))
    }

    pub fn sort_key(&self) -> (f64, f64) {
        resolve_bin_edge(Path::new(&self.name))
    }

    pub fn center(&self) -> AsymResult<f64> {
        self.edges()
            .map(|edges| edges.center())
            .ok_or_else(|| AsymError::UnparseablePath(self.root.clone()))
    }

    pub fn injection_dir(&self, layout: &LayoutConfig) -> PathBuf {
        self.root.join(&layout.injection_dir)
    }
}

/// Finds every `<root>/*/<pair>/<run_version>/<results_dir>/<results_file>`
/// and returns the matching bins in ascending bin-edge order.
///
/// An empty match is an error: downstream aggregation needs at least one bin.
pub fn enumerate_config_bins(
    root: &Path,
    pion_pair: &str,
    run_version: &str,
    layout: &LayoutConfig,
) -> AsymResult<Vec<ConfigBin>> {
    let pattern = root
        .join("*")
        .join(pion_pair)
        .join(run_version)
        .join(&layout.results_dir)
        .join(&layout.results_file);

    if !root.is_dir() {
        return Err(AsymError::NoConfigBins {
            pattern: pattern.display().to_string(),
        });
    }

    let mut bins = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }

        let cfg_root = entry.path().join(pion_pair).join(run_version);
        let results_path = cfg_root.join(&layout.results_dir).join(&layout.results_file);
        if !results_path.is_file() {
            debug!("Skipping {:?}: no results for {}/{}", entry.path(), pion_pair, run_version);
            continue;
        }

        bins.push(ConfigBin {
            name,
            root: cfg_root,
            results_path,
        });
    }

    if bins.is_empty() {
        return Err(AsymError::NoConfigBins {
            pattern: pattern.display().to_string(),
        });
    }

    // Stable: bins with equal edges keep directory-name order.
    bins.sort_by(|a, b| {
        let (a_lo, a_hi) = a.sort_key();
        let (b_lo, b_hi) = b.sort_key();
        a_lo.total_cmp(&b_lo).then(a_hi.total_cmp(&b_hi))
    });

    info!(
        "📂 Found {} config bins for {}/{} under {:?}",
        bins.len(),
        pion_pair,
        run_version,
        root
    );
    Ok(bins)
}
