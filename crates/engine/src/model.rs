use serde::Serialize;

use crate::summary::MergeSummary;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the regional taxon checklist (the left/anchor table).
#[derive(Debug, Clone)]
pub struct TaxonRecord {
    pub taxon_id: String,
    /// Full scientific name, possibly with authorship and rank qualifiers.
    pub name: String,
    pub occurrences: Option<u64>,
    /// Nested-set bounds from the upstream hierarchy query. Opaque here,
    /// carried through to the output unchanged.
    pub lft: Option<i64>,
    pub rgt: Option<i64>,
}

/// One row of the ecological-indicator-value table.
#[derive(Debug, Clone)]
pub struct IndicatorRecord {
    pub taxon: String,
    /// Ordinal indicator scores, conventionally 1-9. Absent or unparseable
    /// cells are None, never zero.
    pub light: Option<i64>,
    pub moisture: Option<i64>,
    pub nutrient: Option<i64>,
}

/// One row of the global trait database's accepted-species list.
#[derive(Debug, Clone)]
pub struct TraitSpeciesRecord {
    pub species_id: Option<i64>,
    pub species_name: String,
}

/// One row of the trait-definition list (used by the keyword report only).
#[derive(Debug, Clone)]
pub struct TraitDefRecord {
    pub trait_id: Option<i64>,
    pub name: String,
}

/// Cells that failed numeric coercion while loading, per table.
/// Coercion failures are not errors; they become None and are counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub checklist_unknown: usize,
    pub indicator_unknown: usize,
    pub trait_unknown: usize,
}

/// Pre-loaded source tables handed to the pipeline.
#[derive(Debug, Default)]
pub struct MergeInput {
    pub taxa: Vec<TaxonRecord>,
    pub indicators: Vec<IndicatorRecord>,
    pub trait_species: Vec<TraitSpeciesRecord>,
    pub parse_stats: ParseStats,
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Which cascade pass resolved a record's cross-reference, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    /// Checklist binomial equals the raw right-side name.
    ExactName,
    /// Both sides reduced to binomials.
    Binomial,
    /// Curated synonym string equals the raw right-side name.
    SynonymExact,
    /// Curated synonym string equals the right-side binomial.
    SynonymBinomial,
    /// No pass matched; right-side fields are null.
    Unresolved,
}

impl std::fmt::Display for MatchPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactName => write!(f, "exact_name"),
            Self::Binomial => write!(f, "binomial"),
            Self::SynonymExact => write!(f, "synonym_exact"),
            Self::SynonymBinomial => write!(f, "synonym_binomial"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One output row per checklist row that survived the indicator filter.
/// Created once per run, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRecord {
    pub taxon_id: String,
    pub name: String,
    pub occurrences: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lft: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgt: Option<i64>,
    /// The indicator table's own spelling of the name, kept for audit.
    pub indicator_taxon: String,
    pub light: Option<i64>,
    pub moisture: Option<i64>,
    pub nutrient: Option<i64>,
    pub trait_species_id: Option<i64>,
    pub trait_species_name: Option<String>,
    pub provenance: MatchPass,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Serialize)]
pub struct MergeResult {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    pub records: Vec<MergedRecord>,
}
