// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::sheet::SheetSpec;

/// Everything a run needs: where to fetch from, which sheets, where to write.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    /// A1 range requested from every sheet.
    pub range: String,
    pub sheets: Vec<SheetSpec>,
    /// Catalog name of the sheet whose first row defines weighted columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighting_sheet: Option<String>,
    pub output_dir: PathBuf,
    /// First entry is the primary cache file; the rest get identical copies.
    pub output_files: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1LutC2VxesrS-5Ym8VydVvgLh8stH66vY_Bor1g7lY2A".to_string(),
            range: "A1:BH1048576".to_string(),
            sheets: vec![
                SheetSpec::gid("overview", "109336614"),
                SheetSpec::gid("yearly", "1515439227"),
                SheetSpec::gid("quarterly", "966294539"),
                SheetSpec::gid("enterpriseValue", "350477002"),
                SheetSpec::gid("regional", "840041598"),
            ],
            weighting_sheet: None,
            output_dir: PathBuf::from("public").join("cached-data"),
            output_files: vec!["sectors-cache.json".to_string()],
            request_timeout_secs: 30,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Read a YAML config; any field left out keeps its default.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("validating config {:?}", path))?;
        debug!(sheets = config.sheets.len(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            bail!("spreadsheet_id is empty");
        }
        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            if sheet.name.trim().is_empty() {
                bail!("sheet with locator {} has no name", sheet.locator);
            }
            if !seen.insert(sheet.name.as_str()) {
                bail!("duplicate sheet name {:?}", sheet.name);
            }
        }
        if let Some(w) = &self.weighting_sheet {
            if !seen.contains(w.as_str()) {
                bail!("weighting_sheet {:?} is not in the sheet list", w);
            }
        }
        if self.output_files.is_empty() {
            bail!("output_files is empty");
        }
        for name in &self.output_files {
            let p = Path::new(name);
            if p.file_name().map(|f| f != p.as_os_str()).unwrap_or(true) {
                bail!("output file {:?} must be a bare file name", name);
            }
        }
        Ok(())
    }

    /// Full paths of every output file, primary first.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.output_files
            .iter()
            .map(|f| self.output_dir.join(f))
            .collect()
    }

    pub fn is_weighting(&self, sheet_name: &str) -> bool {
        self.weighting_sheet.as_deref() == Some(sheet_name)
    }
}
