use std::collections::HashSet;

use crate::binomial::binomial;
use crate::cascade::{run_cascade, Strategy};
use crate::config::{MergeConfig, Thresholds};
use crate::error::MergeError;
use crate::model::{
    IndicatorRecord, MatchPass, MergeInput, MergeMeta, MergeResult, MergedRecord, TaxonRecord,
    TraitSpeciesRecord,
};
use crate::summary::compute_summary;
use crate::synonym::SynonymTable;

/// A checklist row paired with its indicator match; the left side of the
/// trait join.
#[derive(Debug)]
struct JoinedRow<'a> {
    taxon: &'a TaxonRecord,
    indicator: &'a IndicatorRecord,
}

/// Run the full reconciliation: indicator join (inner, two passes),
/// threshold filter, trait join (left outer, direct + binomial + synonym
/// passes), then one merged record per surviving row.
pub fn run(config: &MergeConfig, input: &MergeInput) -> Result<MergeResult, MergeError> {
    check_unique_ids(&input.taxa)?;

    // Indicator join. Pass 1 matches the checklist binomial against the
    // indicator table's raw name, pass 2 against its binomial. Inner
    // semantics: the residue is dropped here, not emitted.
    let indicator_strategies = [
        Strategy::new(
            MatchPass::ExactName,
            |t: &TaxonRecord| binomial(&t.name),
            |i: &IndicatorRecord| i.taxon.trim().to_string(),
        ),
        Strategy::new(
            MatchPass::Binomial,
            |t: &TaxonRecord| binomial(&t.name),
            |i: &IndicatorRecord| binomial(&i.taxon),
        ),
    ];
    let indicator_outcome = run_cascade(&input.taxa, &input.indicators, &indicator_strategies);
    let indicator_stats = indicator_outcome.stats();

    let filtered: Vec<JoinedRow<'_>> = indicator_outcome
        .matched
        .iter()
        .filter(|m| passes_thresholds(m.right, &config.thresholds))
        .map(|m| JoinedRow { taxon: m.left, indicator: m.right })
        .collect();
    let filtered_rows = filtered.len();

    // Trait join. The synonym passes key on the curated replacement name;
    // rows without a synonym entry produce an empty key and fall straight
    // through to the residue.
    let synonyms = SynonymTable::new(config.synonyms.clone());
    let trait_strategies = [
        Strategy::new(
            MatchPass::ExactName,
            |r: &JoinedRow<'_>| binomial(&r.taxon.name),
            |s: &TraitSpeciesRecord| s.species_name.trim().to_string(),
        ),
        Strategy::new(
            MatchPass::Binomial,
            |r: &JoinedRow<'_>| binomial(&r.taxon.name),
            |s: &TraitSpeciesRecord| binomial(&s.species_name),
        ),
        Strategy::new(
            MatchPass::SynonymExact,
            |r: &JoinedRow<'_>| synonym_key(&synonyms, r),
            |s: &TraitSpeciesRecord| s.species_name.trim().to_string(),
        ),
        Strategy::new(
            MatchPass::SynonymBinomial,
            |r: &JoinedRow<'_>| synonym_key(&synonyms, r),
            |s: &TraitSpeciesRecord| binomial(&s.species_name),
        ),
    ];
    let trait_outcome = run_cascade(&filtered, &input.trait_species, &trait_strategies);

    // Matched partitions in pass order, then the residue with null trait
    // fields. Left outer: no surviving row is ever dropped.
    let mut records = Vec::with_capacity(trait_outcome.matched.len() + trait_outcome.residue.len());
    for m in &trait_outcome.matched {
        records.push(merged_record(m.left, Some(m.right), m.pass));
    }
    for row in &trait_outcome.residue {
        records.push(merged_record(row, None, MatchPass::Unresolved));
    }

    let summary = compute_summary(
        (input.taxa.len(), input.indicators.len(), input.trait_species.len()),
        indicator_stats,
        filtered_rows,
        trait_outcome.stats(),
        input.parse_stats,
        records.len(),
    );

    Ok(MergeResult {
        meta: MergeMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
    })
}

fn check_unique_ids(taxa: &[TaxonRecord]) -> Result<(), MergeError> {
    let mut seen = HashSet::new();
    for taxon in taxa {
        if !seen.insert(taxon.taxon_id.as_str()) {
            return Err(MergeError::DuplicateTaxon { taxon_id: taxon.taxon_id.clone() });
        }
    }
    Ok(())
}

/// A None score never satisfies its threshold.
fn passes_thresholds(indicator: &IndicatorRecord, th: &Thresholds) -> bool {
    matches!(indicator.light, Some(l) if l >= th.light_min)
        && matches!(indicator.moisture, Some(m) if m <= th.moisture_max)
        && matches!(indicator.nutrient, Some(n) if n <= th.nutrient_max)
}

fn synonym_key(synonyms: &SynonymTable, row: &JoinedRow<'_>) -> String {
    synonyms
        .lookup(&binomial(&row.taxon.name))
        .unwrap_or_default()
        .to_string()
}

fn merged_record(
    row: &JoinedRow<'_>,
    species: Option<&TraitSpeciesRecord>,
    provenance: MatchPass,
) -> MergedRecord {
    MergedRecord {
        taxon_id: row.taxon.taxon_id.clone(),
        name: row.taxon.name.clone(),
        occurrences: row.taxon.occurrences,
        lft: row.taxon.lft,
        rgt: row.taxon.rgt,
        indicator_taxon: row.indicator.taxon.clone(),
        light: row.indicator.light,
        moisture: row.indicator.moisture,
        nutrient: row.indicator.nutrient,
        trait_species_id: species.and_then(|s| s.species_id),
        trait_species_name: species.map(|s| s.species_name.clone()),
        provenance,
    }
}
