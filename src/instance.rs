// src/instance.rs

//! Benchmark instances.
//!
//! An instance is one argumentation graph available in two serializations
//! (TGF and APX) that share a stable index. Only argument names are read
//! here; attacks are the solvers' business.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::fs::FileSystem;
use crate::types::Format;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub index: usize,
    pub tgf: PathBuf,
    pub apx: PathBuf,
}

impl Instance {
    pub fn new(index: usize, tgf: impl Into<PathBuf>, apx: impl Into<PathBuf>) -> Self {
        Self {
            index,
            tgf: tgf.into(),
            apx: apx.into(),
        }
    }

    /// File to hand to a solver that reads `format`.
    pub fn file_for(&self, format: Format) -> Option<&Path> {
        match format {
            Format::Tgf => Some(&self.tgf),
            Format::Apx => Some(&self.apx),
            Format::Cnf => None,
        }
    }

    /// Name used to look up ground-truth answers (file stem of the TGF file).
    pub fn stem(&self) -> String {
        self.tgf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Argument names of this instance, in file order, without duplicates.
    pub fn read_arguments(&self, fs: &dyn FileSystem) -> Result<Vec<String>> {
        if fs.is_file(&self.tgf) {
            return Ok(parse_tgf_arguments(&fs.read_to_string(&self.tgf)?));
        }
        if fs.is_file(&self.apx) {
            return parse_apx_arguments(&fs.read_to_string(&self.apx)?);
        }
        bail!("instance #{} has no readable file ({:?}, {:?})", self.index, self.tgf, self.apx)
    }
}

/// Argument names from TGF text: one name per line up to the `#` separator.
pub fn parse_tgf_arguments(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            break;
        }
        if let Some(name) = line.split_whitespace().next() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Argument names from APX text: the `arg(name).` facts.
pub fn parse_apx_arguments(text: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for statement in text.split('.') {
        let statement = statement.trim();
        let Some(rest) = statement.strip_prefix("arg(") else {
            continue;
        };
        let Some(name) = rest.strip_suffix(')') else {
            bail!("malformed apx statement: {statement}");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("empty argument name in apx statement: {statement}");
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
