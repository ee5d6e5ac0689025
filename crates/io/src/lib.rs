//! `taxmerge-io` — delimited-text loading and output.
//!
//! Structural problems (a missing required column) abort before any matching
//! runs. Cell-level numeric coercion failures are recovered locally: the
//! cell becomes None and the failure is counted in `ParseStats`.

use std::path::Path;

use taxmerge_engine::config::{
    delimiter_byte, ChecklistConfig, IndicatorConfig, MergeConfig, TraitConfig, TraitDefConfig,
};
use taxmerge_engine::model::{
    IndicatorRecord, MergeInput, MergedRecord, ParseStats, TaxonRecord, TraitDefRecord,
    TraitSpeciesRecord,
};
use taxmerge_engine::MergeError;

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Header-position lookup for one table. Missing columns are fatal.
struct Header {
    table: String,
    names: Vec<String>,
}

impl Header {
    fn read(table: &str, reader: &mut csv::Reader<&[u8]>) -> Result<Self, MergeError> {
        let names = reader
            .headers()
            .map_err(|e| MergeError::Io(format!("table '{table}': {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self { table: table.into(), names })
    }

    fn index(&self, column: &str) -> Result<usize, MergeError> {
        self.names.iter().position(|h| h == column).ok_or_else(|| MergeError::MissingColumn {
            table: self.table.clone(),
            column: column.into(),
        })
    }
}

fn reader_for(data: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data.as_bytes())
}

fn cell<'r>(record: &'r csv::StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

/// Numeric coercion with unknown-cell counting: empty or unparseable cells
/// become None and bump the counter.
fn coerce<T: std::str::FromStr>(raw: &str, unknown: &mut usize) -> Option<T> {
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            *unknown += 1;
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Table loaders
// ---------------------------------------------------------------------------

pub fn load_checklist(
    data: &str,
    config: &ChecklistConfig,
) -> Result<(Vec<TaxonRecord>, usize), MergeError> {
    let mut reader = reader_for(data, delimiter_byte(&config.delimiter, "checklist")?);
    let header = Header::read("checklist", &mut reader)?;

    let col = &config.columns;
    let id_idx = header.index(&col.taxon_id)?;
    let name_idx = header.index(&col.name)?;
    let occ_idx = header.index(&col.occurrences)?;
    let lft_idx = col.lft.as_deref().map(|c| header.index(c)).transpose()?;
    let rgt_idx = col.rgt.as_deref().map(|c| header.index(c)).transpose()?;

    let mut rows = Vec::new();
    let mut unknown = 0;
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Io(format!("table 'checklist': {e}")))?;
        rows.push(TaxonRecord {
            taxon_id: cell(&record, id_idx).to_string(),
            name: cell(&record, name_idx).to_string(),
            occurrences: coerce(cell(&record, occ_idx), &mut unknown),
            lft: lft_idx.and_then(|i| coerce(cell(&record, i), &mut unknown)),
            rgt: rgt_idx.and_then(|i| coerce(cell(&record, i), &mut unknown)),
        });
    }
    Ok((rows, unknown))
}

pub fn load_indicators(
    data: &str,
    config: &IndicatorConfig,
) -> Result<(Vec<IndicatorRecord>, usize), MergeError> {
    let mut reader = reader_for(data, delimiter_byte(&config.delimiter, "indicators")?);
    let header = Header::read("indicators", &mut reader)?;

    let col = &config.columns;
    let taxon_idx = header.index(&col.taxon)?;
    let light_idx = header.index(&col.light)?;
    let moisture_idx = header.index(&col.moisture)?;
    let nutrient_idx = header.index(&col.nutrient)?;

    let mut rows = Vec::new();
    let mut unknown = 0;
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Io(format!("table 'indicators': {e}")))?;
        rows.push(IndicatorRecord {
            taxon: cell(&record, taxon_idx).to_string(),
            light: coerce(cell(&record, light_idx), &mut unknown),
            moisture: coerce(cell(&record, moisture_idx), &mut unknown),
            nutrient: coerce(cell(&record, nutrient_idx), &mut unknown),
        });
    }
    Ok((rows, unknown))
}

pub fn load_trait_species(
    data: &str,
    config: &TraitConfig,
) -> Result<(Vec<TraitSpeciesRecord>, usize), MergeError> {
    let mut reader = reader_for(data, delimiter_byte(&config.delimiter, "traits")?);
    let header = Header::read("traits", &mut reader)?;

    let col = &config.columns;
    let id_idx = header.index(&col.species_id)?;
    let name_idx = header.index(&col.species_name)?;

    let mut rows = Vec::new();
    let mut unknown = 0;
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Io(format!("table 'traits': {e}")))?;
        rows.push(TraitSpeciesRecord {
            species_id: coerce(cell(&record, id_idx), &mut unknown),
            species_name: cell(&record, name_idx).to_string(),
        });
    }
    Ok((rows, unknown))
}

/// Trait-definition list for the keyword report. `skip_lines` drops leading
/// metadata lines before the header row.
pub fn load_trait_definitions(
    data: &str,
    config: &TraitDefConfig,
) -> Result<Vec<TraitDefRecord>, MergeError> {
    let body = skip_lines(data, config.skip_lines);
    let mut reader = reader_for(body, delimiter_byte(&config.delimiter, "trait_definitions")?);
    let header = Header::read("trait_definitions", &mut reader)?;

    let col = &config.columns;
    let id_idx = header.index(&col.trait_id)?;
    let name_idx = header.index(&col.name)?;

    let mut rows = Vec::new();
    let mut unknown = 0;
    for record in reader.records() {
        let record =
            record.map_err(|e| MergeError::Io(format!("table 'trait_definitions': {e}")))?;
        rows.push(TraitDefRecord {
            trait_id: coerce(cell(&record, id_idx), &mut unknown),
            name: cell(&record, name_idx).to_string(),
        });
    }
    Ok(rows)
}

fn skip_lines(data: &str, n: usize) -> &str {
    let mut rest = data;
    for _ in 0..n {
        match rest.split_once('\n') {
            Some((_, tail)) => rest = tail,
            None => return "",
        }
    }
    rest
}

// ---------------------------------------------------------------------------
// File-level entry point
// ---------------------------------------------------------------------------

/// Read and parse the three source tables named by the config, resolving
/// paths relative to `base_dir`.
pub fn load_input(config: &MergeConfig, base_dir: &Path) -> Result<MergeInput, MergeError> {
    let read = |file: &str| -> Result<String, MergeError> {
        let path = base_dir.join(file);
        std::fs::read_to_string(&path)
            .map_err(|e| MergeError::Io(format!("cannot read {}: {e}", path.display())))
    };

    let (taxa, checklist_unknown) = load_checklist(&read(&config.checklist.file)?, &config.checklist)?;
    let (indicators, indicator_unknown) =
        load_indicators(&read(&config.indicators.file)?, &config.indicators)?;
    let (trait_species, trait_unknown) =
        load_trait_species(&read(&config.traits.file)?, &config.traits)?;

    Ok(MergeInput {
        taxa,
        indicators,
        trait_species,
        parse_stats: ParseStats { checklist_unknown, indicator_unknown, trait_unknown },
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

const OUTPUT_HEADER: [&str; 12] = [
    "taxon_id",
    "taxon",
    "cnt",
    "lft",
    "rgt",
    "indicator_taxon",
    "L",
    "F",
    "N",
    "trait_species_id",
    "trait_species_name",
    "provenance",
];

/// Write the merged records as CSV. Null cells are written empty.
pub fn write_merged_csv<W: std::io::Write>(
    records: &[MergedRecord],
    writer: W,
) -> Result<(), MergeError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(OUTPUT_HEADER)
        .map_err(|e| MergeError::Io(e.to_string()))?;

    fn opt<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    for r in records {
        out.write_record([
            r.taxon_id.clone(),
            r.name.clone(),
            opt(&r.occurrences),
            opt(&r.lft),
            opt(&r.rgt),
            r.indicator_taxon.clone(),
            opt(&r.light),
            opt(&r.moisture),
            opt(&r.nutrient),
            opt(&r.trait_species_id),
            r.trait_species_name.clone().unwrap_or_default(),
            r.provenance.to_string(),
        ])
        .map_err(|e| MergeError::Io(e.to_string()))?;
    }
    out.flush().map_err(|e| MergeError::Io(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
