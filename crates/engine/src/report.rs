//! Projections over the merged output: species-ID lists for the trait
//! database's data-request form, and keyword selection of trait IDs. No
//! matching logic lives here.

use regex::RegexBuilder;

use crate::error::MergeError;
use crate::model::{MergedRecord, TraitDefRecord};

/// Distinct trait species IDs from the merged records, in first-appearance
/// order. Rows without a trait match contribute nothing. With
/// `min_occurrences`, rows below the threshold (or with an unknown count)
/// are skipped.
pub fn species_id_list(records: &[MergedRecord], min_occurrences: Option<u64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    let mut ids = Vec::new();
    for record in records {
        if let Some(min) = min_occurrences {
            match record.occurrences {
                Some(n) if n >= min => {}
                _ => continue,
            }
        }
        if let Some(id) = record.trait_species_id {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Trait IDs whose description matches any keyword, case-insensitively.
/// Keywords are regex fragments combined into one alternation. Distinct,
/// first-appearance order; rows without a parseable ID are skipped.
pub fn select_trait_ids(
    definitions: &[TraitDefRecord],
    keywords: &[String],
) -> Result<Vec<i64>, MergeError> {
    let pattern = keywords.join("|");
    let matcher = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| MergeError::ConfigValidation(format!("bad keyword pattern: {e}")))?;

    let mut seen = std::collections::HashSet::new();
    let mut ids = Vec::new();
    for def in definitions {
        if !matcher.is_match(&def.name) {
            continue;
        }
        if let Some(id) = def.trait_id {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

pub fn format_id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
