//! Application configuration
//!
//! An INI file whose `[Paths]` entries are resolved relative to the file itself:
//!
//! ```ini
//! [Paths]
//! template_files = templates
//! config_files = config
//! history_files = history
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use serde_json::Value;

use crate::constants::CONFIG_SECTION_PATHS;
use crate::error::{Error, Result};

/// Application config loaded from one INI file
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    ini:  Ini,
}

impl Config {
    /// Read and parse the INI file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => Error::from_io("read config", path, source),
            other => Error::Config(format!("{}: {other}", path.display())),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            ini,
        })
    }

    /// File the config was loaded from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of `[section] key`
    pub fn get_value(&self, section: &str, key: &str) -> Result<String> {
        self.ini
            .section(Some(section))
            .and_then(|properties| properties.get(key))
            .map(String::from)
            .ok_or_else(|| {
                Error::Config(format!(
                    "missing [{section}] {key} in {}",
                    self.path.display()
                ))
            })
    }

    /// Value of `[section] key`, or `default` when absent
    #[must_use]
    pub fn get_value_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_value(section, key)
            .unwrap_or_else(|_| default.to_string())
    }

    /// `[Paths] key`, resolved against the config file's directory
    pub fn get_path(&self, key: &str) -> Result<PathBuf> {
        let relative = self.get_value(CONFIG_SECTION_PATHS, key)?;
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        std::path::absolute(base.join(relative))
            .map_err(|e| Error::from_io("resolve", &self.path, e))
    }

    /// `file_name` inside the `[Paths] key` directory
    pub fn get_file_path(&self, key: &str, file_name: &str) -> Result<PathBuf> {
        Ok(self.get_path(key)?.join(file_name))
    }

    /// Parse `file_name` inside the `[Paths] key` directory as JSON
    pub fn get_json_file(&self, key: &str, file_name: &str) -> Result<Value> {
        let path = self.get_file_path(key, file_name)?;
        let content = fs::read_to_string(&path).map_err(|e| Error::from_io("read", &path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{} is not valid JSON: {e}", path.display())))
    }
}
