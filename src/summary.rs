use crate::dataset::InjectionDataset;
use serde::Serialize;

/// Per-bin statistics over the injection trials that cover every bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub trial_ids: Vec<u64>,
    pub mean: Vec<f64>,
    /// Sample standard deviation (n - 1 denominator); 0 for a single trial.
    pub std_dev: Vec<f64>,
    /// Standard error of the mean, `std_dev / sqrt(n)`.
    pub sem: Vec<f64>,
}

impl EnsembleSummary {
    pub fn n_trials(&self) -> usize {
        self.trial_ids.len()
    }
}

/// Trials with a value in every bin, in ascending trial-id order.
pub fn complete_trials(dataset: &InjectionDataset) -> Vec<(u64, Vec<f64>)> {
    dataset
        .trials()
        .iter()
        .filter_map(|(&id, slots)| {
            slots
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
                .map(|vals| (id, vals))
        })
        .collect()
}

/// `None` when no trial is complete.
pub fn summarize_trials(dataset: &InjectionDataset) -> Option<EnsembleSummary> {
    let complete = complete_trials(dataset);
    if complete.is_empty() {
        return None;
    }

    let n = complete.len() as f64;
    let n_bins = dataset.len();
    let mut mean = vec![0.0; n_bins];
    let mut std_dev = vec![0.0; n_bins];

    for (_, vals) in &complete {
        for (acc, v) in mean.iter_mut().zip(vals) {
            *acc += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    if complete.len() > 1 {
        for (_, vals) in &complete {
            for ((acc, v), m) in std_dev.iter_mut().zip(vals).zip(&mean) {
                *acc += (v - m) * (v - m);
            }
        }
        for s in &mut std_dev {
            *s = (*s / (n - 1.0)).sqrt();
        }
    }

    let sem = std_dev.iter().map(|s| s / n.sqrt()).collect();

    Some(EnsembleSummary {
        trial_ids: complete.iter().map(|(id, _)| *id).collect(),
        mean,
        std_dev,
        sem,
    })
}
