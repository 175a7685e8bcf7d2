#![allow(dead_code)]

use asymdata::config::LayoutConfig;
use asymdata::waves::PartialWave;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PAIR: &str = "piplus_pi0";
pub const RUN: &str = "v1";
pub const REGION: &str = asymdata::dataset::DEFAULT_REGION;

pub const BIN_A: &str = "config_config_Mh_0p6_0p68";
pub const BIN_B: &str = "config_config_Mh_0p68_0p76";
pub const BIN_C: &str = "config_config_Mh_0p76_0p84";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// One row of the reference collection.
pub struct RefRow {
    pub pair: String,
    pub cfg: String,
    pub wave: PartialWave,
    pub a: f64,
    pub a_raw: Option<f64>,
    pub s_stat: f64,
    pub s_sys: f64,
    pub mh: Option<f64>,
    pub systematics: Option<String>,
}

impl RefRow {
    pub fn new(cfg: &str, wave: PartialWave, a: f64) -> Self {
        Self {
            pair: PAIR.to_string(),
            cfg: cfg.to_string(),
            wave,
            a,
            a_raw: None,
            s_stat: 0.003,
            s_sys: 0.004,
            mh: None,
            systematics: None,
        }
    }

    pub fn pair(mut self, pair: &str) -> Self {
        self.pair = pair.to_string();
        self
    }

    pub fn raw(mut self, a_raw: f64) -> Self {
        self.a_raw = Some(a_raw);
        self
    }

    pub fn errors(mut self, s_stat: f64, s_sys: f64) -> Self {
        self.s_stat = s_stat;
        self.s_sys = s_sys;
        self
    }

    pub fn mh(mut self, mh: f64) -> Self {
        self.mh = Some(mh);
        self
    }

    /// Indented YAML mapping body, e.g. `"binMigration: [0.1, 0.002]"`.
    pub fn systematics(mut self, yaml: &str) -> Self {
        self.systematics = Some(yaml.to_string());
        self
    }

    pub fn to_yaml(&self) -> String {
        let (twist, l, m) = self.wave.quantum_numbers();
        let mut s = String::new();
        writeln!(s, "- pionPair: {}", self.pair).unwrap();
        writeln!(s, "  cfg: {}", self.cfg).unwrap();
        writeln!(s, "  twist: {}", twist).unwrap();
        writeln!(s, "  L: {}", l).unwrap();
        writeln!(s, "  M: {}", m).unwrap();
        writeln!(s, "  A: {:?}", self.a).unwrap();
        if let Some(raw) = self.a_raw {
            writeln!(s, "  A_raw: {:?}", raw).unwrap();
        }
        writeln!(s, "  sStat: {:?}", self.s_stat).unwrap();
        writeln!(s, "  sSys: {:?}", self.s_sys).unwrap();
        if let Some(mh) = self.mh {
            writeln!(s, "  Mh: {:?}", mh).unwrap();
        }
        if let Some(sys) = &self.systematics {
            writeln!(s, "  systematics:").unwrap();
            for line in sys.lines() {
                writeln!(s, "    {}", line).unwrap();
            }
        }
        s
    }
}

/// Writes a throwaway project tree in the pipeline's output layout.
pub struct ProjectBuilder {
    dir: TempDir,
    layout: LayoutConfig,
    references: Vec<RefRow>,
    raw_references: Vec<String>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            layout: LayoutConfig::default(),
            references: Vec::new(),
            raw_references: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn cfg_root(&self, cfg: &str) -> PathBuf {
        self.root().join(cfg).join(PAIR).join(RUN)
    }

    /// Creates a ConfigBin for the default pair/run.
    pub fn config_bin(self, cfg: &str) -> Self {
        let dir = self.cfg_root(cfg).join(&self.layout.results_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(&self.layout.results_file),
            format!("results:\n- region: {}\n  b_0: 0.0\n", REGION),
        )
        .unwrap();
        self
    }

    pub fn reference(mut self, row: RefRow) -> Self {
        self.references.push(row);
        self
    }

    /// A verbatim list item appended to the collection after the built rows.
    pub fn raw_reference(mut self, item: &str) -> Self {
        self.raw_references.push(item.to_string());
        self
    }

    /// Reference rows with `A_raw` for every bin in `cfgs`.
    pub fn references_for(mut self, cfgs: &[&str], wave: PartialWave) -> Self {
        for (i, cfg) in cfgs.iter().enumerate() {
            let v = 0.01 * (i as f64 + 1.0);
            self.references
                .push(RefRow::new(cfg, wave, v).raw(v + 0.001).errors(0.003, 0.004));
        }
        self
    }

    /// Writes one trial file with a single row for `region`.
    pub fn trial(self, cfg: &str, file_name: &str, region: &str, values: &[(usize, f64)]) -> Self {
        let mut body = format!("results:\n- region: {}\n", region);
        for (b, v) in values {
            writeln!(body, "  b_{}: {:?}", b, v).unwrap();
        }
        self.raw_trial(cfg, file_name, &body)
    }

    pub fn raw_trial(self, cfg: &str, file_name: &str, body: &str) -> Self {
        let dir = self.cfg_root(cfg).join(&self.layout.injection_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file_name), body).unwrap();
        self
    }

    pub fn build(self) -> TestProject {
        let mut yaml = String::new();
        for row in &self.references {
            yaml.push_str(&row.to_yaml());
        }
        for item in &self.raw_references {
            yaml.push_str(item);
            yaml.push('\n');
        }
        fs::write(self.root().join(&self.layout.reference_file), yaml).unwrap();
        TestProject { dir: self.dir }
    }
}

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
