//! On-disk record schema and loaders.
//!
//! Reference rows come from the project-wide result collection; trial rows
//! come from one file per injection trial. Both are self-describing key/value
//! documents, stored as YAML or JSON.

use crate::error::{AsymError, AsymResult};
use crate::waves::PartialWave;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Yaml,
    Json,
}

impl RecordFormat {
    /// `.json` is JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Reads every row of a record file.
///
/// YAML files may hold several documents; a document that is a list
/// contributes each element, a single mapping contributes itself, and empty
/// documents are skipped. JSON files hold one top-level array or object.
pub fn load_rows<T: DeserializeOwned>(path: &Path) -> AsymResult<Vec<T>> {
    let content = fs::read_to_string(path)?;

    let mut docs: Vec<Value> = Vec::new();
    match RecordFormat::from_path(path) {
        RecordFormat::Yaml => {
            for doc in serde_yaml::Deserializer::from_str(&content) {
                docs.push(Value::deserialize(doc)?);
            }
        }
        // Deserializing into a YAML value keeps mapping order for both formats.
        RecordFormat::Json => docs.push(serde_json::from_str(&content)?),
    }

    let mut rows = Vec::new();
    for doc in docs {
        match doc {
            Value::Null => continue,
            Value::Sequence(items) => {
                for item in items {
                    rows.push(serde_yaml::from_value(item)?);
                }
            }
            other => rows.push(serde_yaml::from_value(other)?),
        }
    }
    Ok(rows)
}

/// One row of the shared reference collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(rename = "pionPair")]
    pub pion_pair: String,
    pub cfg: String,
    pub twist: i32,
    #[serde(rename = "L")]
    pub l: i32,
    #[serde(rename = "M")]
    pub m: i32,
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(rename = "A_raw", default, skip_serializing_if = "Option::is_none")]
    pub a_raw: Option<f64>,
    #[serde(rename = "sStat")]
    pub s_stat: f64,
    #[serde(rename = "sSys")]
    pub s_sys: f64,
    /// Source name -> `[relative, absolute]`, or a group of such entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systematics: Option<serde_yaml::Mapping>,
    /// Kinematic bin variables (`Mh`, `x`, `Q2`, ...) and any other columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ReferenceRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            pion_pair: self.pion_pair.clone(),
            cfg: self.cfg.clone(),
            twist: self.twist,
            l: self.l,
            m: self.m,
        }
    }

    pub fn matches_wave(&self, pion_pair: &str, wave: PartialWave) -> bool {
        self.pion_pair == pion_pair && (self.twist, self.l, self.m) == wave.quantum_numbers()
    }

    /// The uncorrected asymmetry when recorded, otherwise the corrected one.
    pub fn reference_value(&self) -> AsymResult<f64> {
        self.a_raw
            .or(self.a)
            .ok_or_else(|| AsymError::MissingField {
                field: "A_raw".to_string(),
                context: self.describe(),
            })
    }

    pub fn asymmetry(&self) -> AsymResult<f64> {
        self.a.ok_or_else(|| AsymError::MissingField {
            field: "A".to_string(),
            context: self.describe(),
        })
    }

    /// Statistical and systematic uncertainty added in quadrature.
    pub fn total_error(&self) -> f64 {
        (self.s_stat * self.s_stat + self.s_sys * self.s_sys).sqrt()
    }

    pub fn kinematic(&self, var: &str) -> Option<f64> {
        self.extra.get(var).and_then(Value::as_f64)
    }

    /// Flattens `systematics` to `(source, absolute error)` in file order.
    /// Grouped sources contribute their sub-sources.
    pub fn systematic_sources(&self) -> AsymResult<Vec<(String, f64)>> {
        let mut out = Vec::new();
        let Some(systematics) = &self.systematics else {
            return Ok(out);
        };

        for (name, item) in systematics {
            let name = yaml_key(name)?;
            match item {
                Value::Sequence(_) => out.push((name.clone(), absolute_error(&name, item)?)),
                Value::Mapping(group) => {
                    for (sub_name, sub_item) in group {
                        let sub_name = yaml_key(sub_name)?;
                        let abs = absolute_error(&sub_name, sub_item)?;
                        out.push((sub_name, abs));
                    }
                }
                _ => {
                    return Err(AsymError::Malformed(format!(
                        "unexpected format for systematic '{}' in {}",
                        name,
                        self.describe()
                    )))
                }
            }
        }
        Ok(out)
    }

    fn describe(&self) -> String {
        format!(
            "pionPair={} cfg={} twist={} L={} M={}",
            self.pion_pair, self.cfg, self.twist, self.l, self.m
        )
    }
}

fn yaml_key(key: &Value) -> AsymResult<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        other => Err(AsymError::Malformed(format!(
            "systematic source name must be a string, got {:?}",
            other
        ))),
    }
}

fn absolute_error(source: &str, item: &Value) -> AsymResult<f64> {
    match item {
        Value::Sequence(pair) if pair.len() == 2 => pair[1].as_f64().ok_or_else(|| {
            AsymError::Malformed(format!("systematic '{}' is not numeric", source))
        }),
        _ => Err(AsymError::Malformed(format!(
            "systematic '{}' must be [relative, absolute]",
            source
        ))),
    }
}

pub fn load_reference_records(path: &Path) -> AsymResult<Vec<ReferenceRecord>> {
    let records: Vec<ReferenceRecord> = load_rows(path)?;
    info!(
        "📚 Loaded {} reference records from {:?}",
        records.len(),
        path
    );
    Ok(records)
}

/// Composite join key between the reference collection and ConfigBins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub pion_pair: String,
    pub cfg: String,
    pub twist: i32,
    pub l: i32,
    pub m: i32,
}

impl RecordKey {
    pub fn new(pion_pair: &str, cfg: &str, wave: PartialWave) -> Self {
        let (twist, l, m) = wave.quantum_numbers();
        Self {
            pion_pair: pion_pair.to_string(),
            cfg: cfg.to_string(),
            twist,
            l,
            m,
        }
    }
}

/// Reference rows indexed by their composite key.
///
/// Rows are kept as raw documents and only deserialized into a
/// [`ReferenceRecord`] when a query requires them, so a broken row for some
/// other pair or wave never fails the lookup. Rows without a complete key
/// (`pionPair`, `cfg`, `twist`, `L`, `M`) cannot be joined and are skipped.
/// The first row seen for a key wins; later duplicates are dropped with a
/// warning.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    rows: HashMap<RecordKey, Value>,
}

fn raw_key(row: &Value) -> Option<RecordKey> {
    let int = |field: &str| row.get(field)?.as_i64().and_then(|v| i32::try_from(v).ok());
    Some(RecordKey {
        pion_pair: row.get("pionPair")?.as_str()?.to_string(),
        cfg: row.get("cfg")?.as_str()?.to_string(),
        twist: int("twist")?,
        l: int("L")?,
        m: int("M")?,
    })
}

impl ReferenceIndex {
    pub fn build(rows: Vec<Value>) -> Self {
        let mut indexed = HashMap::with_capacity(rows.len());
        let mut duplicates = 0usize;
        let mut unkeyed = 0usize;

        for row in rows {
            let Some(key) = raw_key(&row) else {
                unkeyed += 1;
                continue;
            };
            match indexed.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(slot) => {
                    duplicates += 1;
                    debug!("Duplicate reference key {:?}", slot.key());
                }
            }
        }

        if unkeyed > 0 {
            debug!("Skipped {} reference rows without a complete key.", unkeyed);
        }
        if duplicates > 0 {
            warn!(
                "⚠️  Ignored {} duplicate reference records (first occurrence kept).",
                duplicates
            );
        }

        Self { rows: indexed }
    }

    pub fn load(path: &Path) -> AsymResult<Self> {
        let index = Self::build(load_rows(path)?);
        info!("📚 Indexed {} reference records from {:?}", index.len(), path);
        Ok(index)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.rows.contains_key(key)
    }

    /// The row for `key`. A missing row is an error, and so is a row that
    /// does not deserialize into a full record.
    pub fn require(&self, key: &RecordKey) -> AsymResult<ReferenceRecord> {
        let row = self.rows.get(key).ok_or_else(|| AsymError::MissingRecord {
            pion_pair: key.pion_pair.clone(),
            cfg: key.cfg.clone(),
            twist: key.twist,
            l: key.l,
            m: key.m,
        })?;
        Ok(serde_yaml::from_value(row.clone())?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One injection-trial result file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrialFile {
    #[serde(default)]
    pub results: Vec<TrialRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrialRow {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl TrialFile {
    pub fn load(path: &Path) -> AsymResult<Self> {
        let content = fs::read_to_string(path)?;
        let file = match RecordFormat::from_path(path) {
            RecordFormat::Json => serde_json::from_str(&content)?,
            RecordFormat::Yaml => match serde_yaml::from_str::<Option<TrialFile>>(&content)? {
                Some(file) => file,
                None => TrialFile::default(),
            },
        };
        Ok(file)
    }

    /// Value of `key` in the first row for `region`, if both exist and the
    /// value is a finite number. NaN and infinities count as absent.
    pub fn value(&self, region: &str, key: &str) -> Option<f64> {
        let row = self
            .results
            .iter()
            .find(|r| r.region.as_deref() == Some(region))?;
        row.values
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }
}
