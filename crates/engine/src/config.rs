use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::MergeError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MergeConfig {
    pub name: String,
    pub checklist: ChecklistConfig,
    pub indicators: IndicatorConfig,
    pub traits: TraitConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Checklist binomial → trait database's accepted name. Consulted only
    /// when the direct and binomial passes both fail.
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
    #[serde(default)]
    pub trait_definitions: Option<TraitDefConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistConfig {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub columns: ChecklistColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistColumns {
    pub taxon_id: String,
    pub name: String,
    pub occurrences: String,
    #[serde(default)]
    pub lft: Option<String>,
    #[serde(default)]
    pub rgt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub columns: IndicatorColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorColumns {
    pub taxon: String,
    pub light: String,
    pub moisture: String,
    pub nutrient: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitConfig {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub columns: TraitColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitColumns {
    pub species_id: String,
    pub species_name: String,
}

/// Trait-definition list for the keyword report. Exports of this list often
/// lead with free-text metadata lines, hence `skip_lines`.
#[derive(Debug, Clone, Deserialize)]
pub struct TraitDefConfig {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub skip_lines: usize,
    pub columns: TraitDefColumns,
    /// Case-insensitive regex fragments; a trait is selected when its
    /// description matches any of them.
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitDefColumns {
    pub trait_id: String,
    pub name: String,
}

fn default_delimiter() -> String {
    ",".into()
}

/// The configured delimiter as the single byte the CSV reader wants.
pub fn delimiter_byte(delimiter: &str, table: &str) -> Result<u8, MergeError> {
    let bytes = delimiter.as_bytes();
    if bytes.len() != 1 {
        return Err(MergeError::ConfigValidation(format!(
            "table '{table}': delimiter must be a single byte, got {delimiter:?}"
        )));
    }
    Ok(bytes[0])
}

// ---------------------------------------------------------------------------
// Thresholds + Output + Report
// ---------------------------------------------------------------------------

/// Indicator retention thresholds: light ≥ light_min, moisture ≤
/// moisture_max, nutrient ≤ nutrient_max. A missing score never satisfies
/// its threshold.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_light_min")]
    pub light_min: i64,
    #[serde(default = "default_moisture_max")]
    pub moisture_max: i64,
    #[serde(default = "default_nutrient_max")]
    pub nutrient_max: i64,
}

fn default_light_min() -> i64 {
    7
}
fn default_moisture_max() -> i64 {
    4
}
fn default_nutrient_max() -> i64 {
    3
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            light_min: default_light_min(),
            moisture_max: default_moisture_max(),
            nutrient_max: default_nutrient_max(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportConfig {
    /// Restrict the species-ID list to rows with at least this many
    /// occurrences. The unrestricted list is always reported too.
    #[serde(default)]
    pub min_occurrences: Option<u64>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        delimiter_byte(&self.checklist.delimiter, "checklist")?;
        delimiter_byte(&self.indicators.delimiter, "indicators")?;
        delimiter_byte(&self.traits.delimiter, "traits")?;

        let th = &self.thresholds;
        for (label, value) in [
            ("light_min", th.light_min),
            ("moisture_max", th.moisture_max),
            ("nutrient_max", th.nutrient_max),
        ] {
            if !(1..=9).contains(&value) {
                return Err(MergeError::ConfigValidation(format!(
                    "threshold {label} must be in 1..=9, got {value}"
                )));
            }
        }

        for (from, to) in &self.synonyms {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(MergeError::ConfigValidation(format!(
                    "synonym entry '{from}' -> '{to}' has an empty side"
                )));
            }
        }

        if let Some(ref defs) = self.trait_definitions {
            delimiter_byte(&defs.delimiter, "trait_definitions")?;
            if defs.keywords.is_empty() {
                return Err(MergeError::ConfigValidation(
                    "trait_definitions requires at least one keyword".into(),
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
