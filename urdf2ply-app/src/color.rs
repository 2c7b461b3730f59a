//! Per-link color assignment.

use crate::config::{ColorMode, ConvertConfig};
use crate::errors::ColorTableError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};
use urdf2ply_data::Rgb;

/// Picks the color of every point sampled from a link.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    mode: ColorMode,
    custom: BTreeMap<String, Rgb>,
    csv: HashMap<String, Rgb>,
}

impl ColorAssigner {
    pub fn new(mode: ColorMode, custom: BTreeMap<String, Rgb>, csv: HashMap<String, Rgb>) -> Self {
        Self { mode, custom, csv }
    }

    /// Build the assigner for a run, loading any tables the mode needs.
    ///
    /// Table load failures are logged and leave that table empty (CSV) or at
    /// its configured contents (JSON custom colors).
    pub fn from_config(config: &ConvertConfig) -> Self {
        let mut custom = config.custom_colors.clone();
        if let Some(path) = &config.custom_colors_path {
            match load_custom_colors(path) {
                Ok(table) => {
                    info!("Loaded {} custom colors from {}", table.len(), path.display());
                    custom = table;
                }
                Err(e) => warn!(
                    "Failed to load custom colors from {}: {}; keeping built-in table",
                    path.display(),
                    e
                ),
            }
        }

        let csv = match (config.color_mode, &config.csv_path) {
            (ColorMode::Csv, Some(path)) => {
                info!("Loading colors from CSV: {}", path.display());
                let table = load_csv_colors_or_empty(path);
                let mut names: Vec<&String> = table.keys().collect();
                names.sort();
                info!("Loaded colors for: {:?}", names);
                table
            }
            (ColorMode::Csv, None) => {
                warn!("Color mode is csv but no CSV path was given; all links will be gray");
                HashMap::new()
            }
            _ => HashMap::new(),
        };

        Self::new(config.color_mode, custom, csv)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Color for `link` under the active mode.
    pub fn color_for(&self, link: &str) -> Rgb {
        match self.mode {
            ColorMode::Custom => self.custom.get(link).copied().unwrap_or(Rgb::GRAY),
            ColorMode::Csv => self.csv.get(link).copied().unwrap_or(Rgb::GRAY),
            ColorMode::Random => random_color(link),
            ColorMode::Fallback => Rgb::SILVER,
        }
    }
}

/// Stable 64-bit FNV-1a hash of a link name.
pub fn name_seed(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    name.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// Color derived only from `name`: each channel uniform in `50..=255`.
pub fn random_color(name: &str) -> Rgb {
    let mut rng = StdRng::seed_from_u64(name_seed(name));
    Rgb::new(
        rng.gen_range(50..=255),
        rng.gen_range(50..=255),
        rng.gen_range(50..=255),
    )
}

#[derive(Debug, Deserialize)]
struct CsvColorRow {
    #[serde(rename = "Link Name")]
    link_name: String,
    #[serde(rename = "Color Red")]
    red: f64,
    #[serde(rename = "Color Green")]
    green: f64,
    #[serde(rename = "Color Blue")]
    blue: f64,
}

/// Read a link color table from CSV.
///
/// Needs the columns `Link Name`, `Color Red`, `Color Green` and
/// `Color Blue`; channels are normalized floats. Other columns are ignored.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_csv_colors(path: impl AsRef<Path>) -> Result<HashMap<String, Rgb>, ColorTableError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut colors = HashMap::new();
    for row in reader.deserialize() {
        let row: CsvColorRow = row?;
        let color = Rgb::from_unit(row.red, row.green, row.blue);
        debug!("{}: {}", row.link_name, color);
        colors.insert(row.link_name, color);
    }
    Ok(colors)
}

/// [`load_csv_colors`], logging failures and returning an empty table.
pub fn load_csv_colors_or_empty(path: impl AsRef<Path>) -> HashMap<String, Rgb> {
    load_csv_colors(path.as_ref()).unwrap_or_else(|e| {
        warn!(
            "Failed to load CSV colors from {}: {}",
            path.as_ref().display(),
            e
        );
        HashMap::new()
    })
}

/// Read a `{"link": [r, g, b]}` JSON color table.
pub fn load_custom_colors(path: impl AsRef<Path>) -> Result<BTreeMap<String, Rgb>, ColorTableError> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
