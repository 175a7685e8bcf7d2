//! Per-pair asymmetry series read straight from the reference collection,
//! ordered along one kinematic bin variable.

use crate::error::{AsymError, AsymResult};
use crate::records::ReferenceRecord;
use crate::waves::PartialWave;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub value: f64,
    /// `hypot(sStat, sSys)`
    pub total_error: f64,
    pub sys_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsymmetrySeries {
    pub pion_pair: String,
    pub wave: PartialWave,
    pub bin_var: String,
    pub points: Vec<SeriesPoint>,
}

impl AsymmetrySeries {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }
}

/// Absolute systematic errors by source, parallel to `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystematicBreakdown {
    pub x: Vec<f64>,
    pub total_sys: Vec<f64>,
    /// In order of first appearance. `None` where a row lacks the source.
    pub sources: Vec<(String, Vec<Option<f64>>)>,
}

impl SystematicBreakdown {
    pub fn source(&self, name: &str) -> Option<&[Option<f64>]> {
        self.sources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, vals)| vals.as_slice())
    }
}

/// Rows for (pair, wave) paired with their `bin_var`, sorted by it.
fn select_sorted<'a>(
    records: &'a [ReferenceRecord],
    pion_pair: &str,
    wave: PartialWave,
    bin_var: &str,
) -> AsymResult<Vec<(f64, &'a ReferenceRecord)>> {
    let mut rows = Vec::new();
    for rec in records.iter().filter(|r| r.matches_wave(pion_pair, wave)) {
        let x = rec.kinematic(bin_var).ok_or_else(|| AsymError::MissingField {
            field: bin_var.to_string(),
            context: format!("pionPair={} cfg={}", rec.pion_pair, rec.cfg),
        })?;
        rows.push((x, rec));
    }

    if rows.is_empty() {
        let (twist, l, m) = wave.quantum_numbers();
        return Err(AsymError::NoRecords {
            pion_pair: pion_pair.to_string(),
            twist,
            l,
            m,
        });
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(rows)
}

pub fn collect_series(
    records: &[ReferenceRecord],
    pion_pair: &str,
    wave: PartialWave,
    bin_var: &str,
) -> AsymResult<AsymmetrySeries> {
    let points = select_sorted(records, pion_pair, wave, bin_var)?
        .into_iter()
        .map(|(x, rec)| {
            Ok(SeriesPoint {
                x,
                value: rec.asymmetry()?,
                total_error: rec.s_stat.hypot(rec.s_sys),
                sys_error: rec.s_sys,
            })
        })
        .collect::<AsymResult<Vec<_>>>()?;

    Ok(AsymmetrySeries {
        pion_pair: pion_pair.to_string(),
        wave,
        bin_var: bin_var.to_string(),
        points,
    })
}

pub fn collect_systematics(
    records: &[ReferenceRecord],
    pion_pair: &str,
    wave: PartialWave,
    bin_var: &str,
) -> AsymResult<SystematicBreakdown> {
    let rows = select_sorted(records, pion_pair, wave, bin_var)?;
    let n = rows.len();

    let mut x = Vec::with_capacity(n);
    let mut total_sys = Vec::with_capacity(n);
    let mut sources: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for (i, (xv, rec)) in rows.into_iter().enumerate() {
        x.push(xv);
        total_sys.push(rec.s_sys);

        for (name, abs) in rec.systematic_sources()? {
            let pos = match sources.iter().position(|(n, _)| *n == name) {
                Some(pos) => pos,
                None => {
                    sources.push((name, vec![None; n]));
                    sources.len() - 1
                }
            };
            sources[pos].1[i] = Some(abs);
        }
    }

    Ok(SystematicBreakdown {
        x,
        total_sys,
        sources,
    })
}

/// One series per partial wave of `twist`. Every wave must have records.
pub fn collect_wave_grid(
    records: &[ReferenceRecord],
    pion_pair: &str,
    twist: i32,
    bin_var: &str,
) -> AsymResult<BTreeMap<PartialWave, AsymmetrySeries>> {
    PartialWave::for_twist(twist)?
        .into_iter()
        .map(|wave| Ok((wave, collect_series(records, pion_pair, wave, bin_var)?)))
        .collect()
}
