//! Read-only library of ready-made plotting snippets, `<root>/<category>/<name>.py`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::Config;

pub const CATEGORIES: &[(&str, &str)] = &[
    ("line_plots", "Line Plots"),
    ("scatter_plots", "Scatter Plots"),
    ("bar_charts", "Bar Charts"),
    ("statistical", "Statistical Plots"),
    ("scientific", "Scientific Plots"),
    ("time_series", "Time Series"),
    ("publication", "Publication Ready"),
];

pub fn category_display_name(key: &str) -> Option<&'static str> {
    CATEGORIES.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

#[derive(Debug, Clone)]
pub struct BankCategory {
    pub key: String,
    pub display_name: String,
    pub scripts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScriptBank {
    root: PathBuf,
}

impl ScriptBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.script_bank_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn script_path(&self, category: &str, name: &str) -> PathBuf {
        self.root.join(category).join(format!("{}.py", name))
    }

    /// Categories on disk, known ones first in their fixed order, then any
    /// extra directories alphabetically.
    pub fn list(&self) -> Result<Vec<BankCategory>> {
        let mut extra: Vec<String> = Vec::new();
        let rd = fs::read_dir(&self.root)
            .with_context(|| format!("reading script bank: {}", self.root.display()))?;
        for e in rd.filter_map(|e| e.ok()) {
            if !e.path().is_dir() {
                continue;
            }
            let key = e.file_name().to_string_lossy().into_owned();
            if category_display_name(&key).is_none() {
                extra.push(key);
            }
        }
        extra.sort();

        let mut out = Vec::new();
        let known = CATEGORIES.iter().map(|(k, _)| k.to_string());
        for key in known.chain(extra) {
            let dir = self.root.join(&key);
            if !dir.is_dir() {
                continue;
            }
            let display_name = category_display_name(&key)
                .map(str::to_string)
                .unwrap_or_else(|| key.clone());
            out.push(BankCategory { scripts: scripts_in(&dir), key, display_name });
        }
        Ok(out)
    }
}

fn scripts_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("py"))
                .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
