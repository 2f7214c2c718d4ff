use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

/// Extension-level configuration: built-in defaults, overlaid by the
/// `.plt_inkrc` file, overlaid by environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Environment takes precedence over the rc file
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path: config_path.to_path_buf() }
    }

    /// Defaults only; no file, no environment.
    pub fn defaults() -> Self {
        Self { inner: default_map(), config_path: default_config_path() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn log_file(&self) -> PathBuf {
        self.get_path("PLT_INK_LOG_FILE")
            .unwrap_or_else(|| env::temp_dir().join("matplotlib_inkscape_debug.log"))
    }

    pub fn log_level(&self) -> String {
        self.get("PLT_INK_LOG_LEVEL").unwrap_or_else(|| "debug".into())
    }

    pub fn logging_enabled(&self) -> bool {
        self.get_bool("PLT_INK_DEBUG")
    }

    pub fn script_bank_path(&self) -> PathBuf {
        self.get_path("PLT_INK_SCRIPT_BANK")
            .unwrap_or_else(default_script_bank)
    }

    pub fn python(&self) -> String {
        self.get("PLT_INK_PYTHON").unwrap_or_else(|| "python".into())
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("PLT_INK_EXEC_TIMEOUT").unwrap_or(60))
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("PLT_INK_CHECK_TIMEOUT").unwrap_or(5))
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PLT_INK_LOG_FILE",
        "PLT_INK_LOG_LEVEL",
        "PLT_INK_DEBUG",
        "PLT_INK_SCRIPT_BANK",
        "PLT_INK_EXEC_TIMEOUT",
        "PLT_INK_CHECK_TIMEOUT",
        "PLT_INK_PYTHON",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("plt_ink").join(".plt_inkrc")
}

/// The bank ships next to the executable, the way Inkscape installs extensions.
fn default_script_bank() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plt_ink_scripts")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Paths
    m.insert(
        "PLT_INK_LOG_FILE".into(),
        env::temp_dir()
            .join("matplotlib_inkscape_debug.log")
            .to_string_lossy()
            .into_owned(),
    );
    m.insert(
        "PLT_INK_SCRIPT_BANK".into(),
        default_script_bank().to_string_lossy().into_owned(),
    );

    // Numbers
    m.insert("PLT_INK_EXEC_TIMEOUT".into(), "60".into());
    m.insert("PLT_INK_CHECK_TIMEOUT".into(), "5".into());

    // Strings
    m.insert("PLT_INK_LOG_LEVEL".into(), "debug".into());
    m.insert("PLT_INK_PYTHON".into(), "python".into());

    // Bools as strings
    m.insert("PLT_INK_DEBUG".into(), "true".into());

    m
}
