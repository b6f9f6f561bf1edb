use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::filter::Correlation;
use crate::data::loader::LoadOptions;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Default)]
#[command(version, about = "Filter and plot the white wine quality dataset")]
pub struct Cli {
    /// Dataset to load (.csv, .tsv, .json, .parquet). Opens a file picker when omitted.
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// JSON file providing defaults for every option below.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Column holding the quality labels.
    #[arg(long)]
    pub category_column: Option<String>,

    /// Column filtered by the range slider and plotted on x.
    #[arg(long)]
    pub numeric_column: Option<String>,

    /// Column plotted on y.
    #[arg(long)]
    pub y_column: Option<String>,

    /// Field delimiter for .csv/.txt files.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// How lassoed points map back to rows.
    #[arg(long, value_enum)]
    pub correlation: Option<Correlation>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: Option<PathBuf>,
    pub title: String,
    pub category_column: String,
    pub numeric_column: String,
    pub y_column: String,
    pub delimiter: char,
    pub correlation: Correlation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            title: "White Wine Quality".to_string(),
            category_column: "quality".to_string(),
            numeric_column: "fixed acidity".to_string(),
            y_column: "volatile acidity".to_string(),
            delimiter: ',',
            correlation: Correlation::RowId,
        }
    }
}

impl Config {
    /// Defaults, then the `--config` file, then explicit flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let base = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.overlay(cli);
        config.load_options()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn overlay(mut self, cli: &Cli) -> Self {
        if let Some(v) = &cli.data {
            self.data = Some(v.clone());
        }
        if let Some(v) = &cli.category_column {
            self.category_column = v.clone();
        }
        if let Some(v) = &cli.numeric_column {
            self.numeric_column = v.clone();
        }
        if let Some(v) = &cli.y_column {
            self.y_column = v.clone();
        }
        if let Some(v) = cli.delimiter {
            self.delimiter = v;
        }
        if let Some(v) = cli.correlation {
            self.correlation = v;
        }
        self
    }

    /// Schema expectations handed to the loader.
    pub fn load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter {:?} is not a single-byte character", self.delimiter);
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            required: vec![self.category_column.clone()],
            numeric: vec![self.numeric_column.clone(), self.y_column.clone()],
        })
    }
}
