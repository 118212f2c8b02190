// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{BenchmarkConfig, RawConfigFile};
use crate::config::validate::validate_config;
use crate::errors::{ProboError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** check files or
/// problem identifiers. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    if !fs.is_file(path) {
        return Err(ProboError::MissingFile(path.to_path_buf()));
    }
    let contents = fs.read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from disk and validate it into a registry.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Parses problem identifiers, discovers instance files and checks that
///   the TGF and APX lists line up.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BenchmarkConfig> {
    load_and_validate_with(&RealFileSystem, path)
}

/// Same as [`load_and_validate`] against an arbitrary filesystem.
pub fn load_and_validate_with(
    fs: &dyn FileSystem,
    path: impl AsRef<Path>,
) -> Result<BenchmarkConfig> {
    let raw_config = load_from_path(fs, &path)?;
    validate_config(raw_config, fs)
}

/// Default config path: `Probo.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Probo.toml")
}
