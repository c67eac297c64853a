//! Discovery of check suite files.
//!
//! Suites are files named `<name>.checks.json`, `<name>.checks.yaml` or
//! `<name>.checks.yml`. Discovery walks a directory tree, skipping excluded
//! directories, and collects every suite file it finds in a stable order.
//!
//! # Example
//!
//! ```rust,ignore
//! use tfluent_test::discovery::SuiteDiscovery;
//!
//! let found = SuiteDiscovery::new().discover("checks/")?;
//!
//! for suite in found.suites() {
//!     println!("Found suite: {}", suite.name);
//! }
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TestError};
use crate::fixtures::CheckSuite;

/// Infix marking a file as a check suite.
const SUITE_MARKER: &str = ".checks";

/// Configuration for suite discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to search recursively.
    pub recursive: bool,
    /// Directories to exclude from discovery.
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            exclude_dirs: vec![
                ".git".to_string(),
                ".terraform".to_string(),
                "target".to_string(),
            ],
        }
    }
}

impl DiscoveryConfig {
    /// Creates a new discovery configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to search recursively.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Adds a directory to exclude.
    #[must_use]
    pub fn exclude_dir(mut self, dir: impl Into<String>) -> Self {
        self.exclude_dirs.push(dir.into());
        self
    }
}

/// Format of a suite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl FixtureFormat {
    /// Determines the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(OsStr::to_str)?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}

/// A discovered suite file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSuite {
    /// Path to the suite file.
    pub file: PathBuf,
    /// Suite name derived from the file name.
    pub name: String,
    /// Format of the file.
    pub format: FixtureFormat,
}

impl DiscoveredSuite {
    /// Loads the suite, naming it after the file when it has no name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<CheckSuite> {
        let mut suite = CheckSuite::from_file(&self.file)?;
        if suite.name.is_none() {
            suite.name = Some(self.name.clone());
        }
        Ok(suite)
    }
}

/// The suite files found under a root directory.
#[derive(Debug, Default)]
pub struct DiscoveredSuites {
    suites: Vec<DiscoveredSuite>,
    root: PathBuf,
}

impl DiscoveredSuites {
    /// Creates an empty result rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            suites: Vec::new(),
            root: root.into(),
        }
    }

    /// Returns the discovered suites, ordered by path.
    #[must_use]
    pub fn suites(&self) -> &[DiscoveredSuite] {
        &self.suites
    }

    /// Returns the number of suites.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.suites.len()
    }

    /// Returns true if no suites were found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adds a suite.
    pub fn add_suite(&mut self, suite: DiscoveredSuite) {
        self.suites.push(suite);
    }
}

/// Suite discovery engine.
#[derive(Debug, Default)]
pub struct SuiteDiscovery {
    config: DiscoveryConfig,
}

impl SuiteDiscovery {
    /// Creates a new discovery instance with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a discovery instance with custom configuration.
    #[must_use]
    pub const fn with_config(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Discovers suite files in a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a readable directory.
    pub fn discover(&self, path: impl AsRef<Path>) -> Result<DiscoveredSuites> {
        let root = path.as_ref();

        if !root.exists() {
            return Err(TestError::Discovery(format!(
                "Directory does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(TestError::Discovery(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        info!(path = %root.display(), "Starting suite discovery");

        let mut found = DiscoveredSuites::new(root);
        self.scan_directory(root, &mut found)?;
        found.suites.sort_by(|a, b| a.file.cmp(&b.file));

        info!(suites = found.len(), "Discovery complete");

        Ok(found)
    }

    fn scan_directory(&self, dir: &Path, found: &mut DiscoveredSuites) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| TestError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| TestError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;

            let path = entry.path();

            if path.is_dir() {
                let dir_name = path.file_name().and_then(OsStr::to_str).unwrap_or("");

                if self.config.exclude_dirs.iter().any(|d| d == dir_name) {
                    debug!(dir = %path.display(), "Skipping excluded directory");
                    continue;
                }

                if self.config.recursive {
                    self.scan_directory(&path, found)?;
                }
            } else if path.is_file() {
                if let Some(suite) = suite_file(&path) {
                    debug!(file = %path.display(), "Found suite file");
                    found.add_suite(suite);
                }
            }
        }

        Ok(())
    }
}

/// Recognises `<name>.checks.<json|yaml|yml>` files.
fn suite_file(path: &Path) -> Option<DiscoveredSuite> {
    let format = FixtureFormat::from_path(path)?;
    let stem = path.file_stem().and_then(OsStr::to_str)?;
    let name = stem.strip_suffix(SUITE_MARKER)?;
    if name.is_empty() {
        return None;
    }

    Some(DiscoveredSuite {
        file: path.to_path_buf(),
        name: name.to_string(),
        format,
    })
}
