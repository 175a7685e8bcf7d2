//! Injection-test aggregation.
//!
//! Joins the shared reference collection with the per-bin injection trials
//! into one fixed-shape [`InjectionDataset`] per query. Nothing is cached:
//! every call re-reads the tree.

use crate::bins::{enumerate_config_bins, ConfigBin};
use crate::config::LayoutConfig;
use crate::error::AsymResult;
use crate::records::{RecordKey, ReferenceIndex, TrialFile};
use crate::waves::PartialWave;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Region the pipeline's injection fits report by default.
pub const DEFAULT_REGION: &str = "signal_purity_1_1";

static TRIAL_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\.(?:ya?ml|json)$").expect("trial-index pattern compiles")
});

/// Per-bin reference values and injected-trial values for one pion pair and
/// one partial wave. Bins are in ascending bin-edge order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjectionDataset {
    x_vals: Vec<f64>,
    reference_values: Vec<f64>,
    reference_errors: Vec<f64>,
    pion_pair: String,
    wave: PartialWave,
    trials: BTreeMap<u64, Vec<Option<f64>>>,
    config_paths: Vec<PathBuf>,
}

impl InjectionDataset {
    pub fn len(&self) -> usize {
        self.x_vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_vals.is_empty()
    }

    /// Bin centers.
    pub fn x_vals(&self) -> &[f64] {
        &self.x_vals
    }

    pub fn reference_values(&self) -> &[f64] {
        &self.reference_values
    }

    pub fn reference_errors(&self) -> &[f64] {
        &self.reference_errors
    }

    pub fn pion_pair(&self) -> &str {
        &self.pion_pair
    }

    pub fn wave(&self) -> PartialWave {
        self.wave
    }

    /// Trial id -> one slot per bin; `None` where that bin has no value for
    /// the trial.
    pub fn trials(&self) -> &BTreeMap<u64, Vec<Option<f64>>> {
        &self.trials
    }

    pub fn trial(&self, id: u64) -> Option<&[Option<f64>]> {
        self.trials.get(&id).map(Vec::as_slice)
    }

    /// Configuration roots, parallel to [`x_vals`](Self::x_vals).
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    pub fn to_json(&self) -> AsymResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Trial index encoded as the digits right before the extension,
/// e.g. `inject_0007.yaml` -> 7.
pub fn trial_index(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_string_lossy();
    let caps = TRIAL_INDEX.captures(&name)?;
    caps[1].parse().ok()
}

/// Record files directly inside `dir`, sorted by name. A missing directory
/// simply has no trials.
fn trial_files(dir: &Path) -> AsymResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_record = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "yaml" | "yml" | "json"));
        if is_record && path.is_file() {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// [`build_injection_dataset_with`] using the pipeline's default layout.
pub fn build_injection_dataset<P: AsRef<Path>>(
    root: P,
    pion_pair: &str,
    run_version: &str,
    region: &str,
    wave_index: i64,
) -> AsymResult<InjectionDataset> {
    build_injection_dataset_with(
        &LayoutConfig::default(),
        root,
        pion_pair,
        run_version,
        region,
        wave_index,
    )
}

/// Collects reference and injected values for one wave across every
/// ConfigBin of `pion_pair`/`run_version` under `root`.
///
/// Fails on an unknown wave index, when no bins exist, when a bin name has
/// no parseable edges, or when the reference collection lacks a row for any
/// bin. Trial files without an index, or without `region`/`b_<index>`, are
/// skipped.
pub fn build_injection_dataset_with<P: AsRef<Path>>(
    layout: &LayoutConfig,
    root: P,
    pion_pair: &str,
    run_version: &str,
    region: &str,
    wave_index: i64,
) -> AsymResult<InjectionDataset> {
    let root = root.as_ref();
    let wave = PartialWave::from_index(wave_index)?;

    let bins = enumerate_config_bins(root, pion_pair, run_version, layout)?;
    let n_bins = bins.len();
    let x_vals = bins
        .iter()
        .map(ConfigBin::center)
        .collect::<AsymResult<Vec<f64>>>()?;

    let references = ReferenceIndex::load(&root.join(&layout.reference_file))?;
    let mut reference_values = Vec::with_capacity(n_bins);
    let mut reference_errors = Vec::with_capacity(n_bins);
    for bin in &bins {
        let rec = references.require(&RecordKey::new(pion_pair, &bin.name, wave))?;
        reference_values.push(rec.reference_value()?);
        reference_errors.push(rec.total_error());
    }

    let key = wave.value_key();
    let mut trials: BTreeMap<u64, Vec<Option<f64>>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (slot, bin) in bins.iter().enumerate() {
        for path in trial_files(&bin.injection_dir(layout))? {
            let Some(id) = trial_index(&path) else {
                debug!("No trial index in {:?}", path);
                skipped += 1;
                continue;
            };

            let Some(value) = TrialFile::load(&path)?.value(region, &key) else {
                debug!("No '{}' for region '{}' in {:?}", key, region, path);
                skipped += 1;
                continue;
            };

            trials.entry(id).or_insert_with(|| vec![None; n_bins])[slot] = Some(value);
        }
    }

    info!(
        "📊 {} {}: {} bins, {} trials ({} trial files skipped)",
        pion_pair,
        wave,
        n_bins,
        trials.len(),
        skipped
    );

    Ok(InjectionDataset {
        x_vals,
        reference_values,
        reference_errors,
        pion_pair: pion_pair.to_string(),
        wave,
        trials,
        config_paths: bins.into_iter().map(|b| b.root).collect(),
    })
}
