use std::collections::HashSet;

use taxmerge_engine::config::MergeConfig;
use taxmerge_engine::model::{
    IndicatorRecord, MatchPass, MergeInput, ParseStats, TaxonRecord, TraitSpeciesRecord,
};
use taxmerge_engine::pipeline::run;
use taxmerge_engine::report::{format_id_list, species_id_list};

fn taxon(id: &str, name: &str, occurrences: u64) -> TaxonRecord {
    TaxonRecord {
        taxon_id: id.into(),
        name: name.into(),
        occurrences: Some(occurrences),
        lft: None,
        rgt: None,
    }
}

fn indicator(taxon: &str, light: i64, moisture: i64, nutrient: i64) -> IndicatorRecord {
    IndicatorRecord {
        taxon: taxon.into(),
        light: Some(light),
        moisture: Some(moisture),
        nutrient: Some(nutrient),
    }
}

fn species(id: i64, name: &str) -> TraitSpeciesRecord {
    TraitSpeciesRecord { species_id: Some(id), species_name: name.into() }
}

const CONFIG: &str = r#"
name = "Alpine dry-grassland crosswalk"

[checklist]
file = "taxonlist.csv"
[checklist.columns]
taxon_id    = "idtaxon"
name        = "taxon"
occurrences = "cnt"

[indicators]
file = "indicators.csv"
[indicators.columns]
taxon    = "Taxon"
light    = "L"
moisture = "F"
nutrient = "N"

[traits]
file = "species.txt"
delimiter = "\t"
[traits.columns]
species_id   = "AccSpeciesID"
species_name = "AccSpeciesName"

[synonyms]
"Betonica officinalis" = "Stachys officinalis"
"Festuca pumila"       = "Festuca quadriflora"
"Senecio jacobaea"     = "Jacobaea vulgaris"
"#;

// -------------------------------------------------------------------------
// End-to-end scenarios
// -------------------------------------------------------------------------

#[test]
fn festuca_pumila_resolves_via_synonym() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let input = MergeInput {
        taxa: vec![taxon("1", "Festuca pumila Chaix", 450)],
        indicators: vec![indicator("Festuca pumila", 8, 3, 2)],
        trait_species: vec![species(99, "Festuca quadriflora Honck.")],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    assert_eq!(result.records.len(), 1);
    let r = &result.records[0];
    assert_eq!(r.trait_species_id, Some(99));
    assert_eq!(r.trait_species_name.as_deref(), Some("Festuca quadriflora Honck."));
    assert_eq!(r.provenance, MatchPass::SynonymBinomial);
    assert_eq!(r.light, Some(8));
    assert_eq!(r.occurrences, Some(450));
}

#[test]
fn no_match_row_is_never_dropped() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let input = MergeInput {
        taxa: vec![taxon("1", "Draba aizoides L.", 320)],
        indicators: vec![indicator("Draba aizoides", 9, 2, 2)],
        trait_species: vec![species(5, "Festuca quadriflora Honck.")],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    assert_eq!(result.records.len(), 1);
    let r = &result.records[0];
    assert_eq!(r.taxon_id, "1");
    assert_eq!(r.trait_species_id, None);
    assert_eq!(r.provenance, MatchPass::Unresolved);
}

#[test]
fn mixed_checklist_exercises_every_pass() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let input = MergeInput {
        taxa: vec![
            // Pass 1: binomial equals the trait table's raw name.
            taxon("t1", "Carex firma Host", 500),
            // Pass 2: trait name carries authorship, binomials agree.
            taxon("t2", "Sesleria caerulea (L.) Ard.", 610),
            // Pass 3a: synonym string equals the raw trait name.
            taxon("t3", "Senecio jacobaea L.", 700),
            // Pass 3b: synonym string equals the trait binomial.
            taxon("t4", "Betonica officinalis L.", 380),
            // Residue: no match, no synonym.
            taxon("t5", "Draba aizoides L.", 320),
            // Dropped by the indicator filter (too shady).
            taxon("t6", "Abies alba Mill.", 900),
        ],
        indicators: vec![
            indicator("Carex firma", 9, 3, 2),
            indicator("Sesleria caerulea", 8, 3, 2),
            indicator("Senecio jacobaea", 8, 4, 3),
            indicator("Betonica officinalis", 7, 4, 3),
            indicator("Draba aizoides", 9, 2, 2),
            indicator("Abies alba", 4, 5, 5),
        ],
        trait_species: vec![
            species(1, "Carex firma"),
            species(2, "Sesleria caerulea Ard."),
            species(3, "Jacobaea vulgaris"),
            species(4, "Stachys officinalis L."),
        ],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    assert_eq!(result.summary.filtered_rows, 5);
    assert_eq!(result.summary.filtered_out, 1);
    assert_eq!(result.records.len(), 5);

    let by_id = |id: &str| result.records.iter().find(|r| r.taxon_id == id).unwrap();
    assert_eq!(by_id("t1").provenance, MatchPass::ExactName);
    assert_eq!(by_id("t2").provenance, MatchPass::Binomial);
    assert_eq!(by_id("t3").provenance, MatchPass::SynonymExact);
    assert_eq!(by_id("t4").provenance, MatchPass::SynonymBinomial);
    assert_eq!(by_id("t5").provenance, MatchPass::Unresolved);
    assert_eq!(by_id("t4").trait_species_id, Some(4));

    // Output order: pass partitions in pass order, then the residue.
    let order: Vec<&str> = result.records.iter().map(|r| r.taxon_id.as_str()).collect();
    assert_eq!(order, vec!["t1", "t2", "t3", "t4", "t5"]);

    // Per-pass counts credit each row exactly once.
    let resolved: Vec<usize> =
        result.summary.trait_join.passes.iter().map(|p| p.resolved).collect();
    assert_eq!(resolved, vec![1, 1, 1, 1]);
    assert_eq!(result.summary.trait_join.residue, 1);
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

#[test]
fn exclusivity_partitions_cover_the_left_set_exactly_once() {
    // Every trait row also matches by binomial, so later passes would re-hit
    // rows already resolved; exclusivity must prevent that.
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let names = [
        ("a1", "Carex firma Host"),
        ("a2", "Sesleria caerulea (L.) Ard."),
        ("a3", "Festuca pumila Chaix"),
        ("a4", "Betonica officinalis L."),
        ("a5", "Draba aizoides L."),
        ("a6", "Globularia cordifolia L."),
    ];
    let input = MergeInput {
        taxa: names.iter().map(|(id, n)| taxon(id, n, 300)).collect(),
        indicators: names
            .iter()
            .map(|(_, n)| {
                let b: String = n.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
                indicator(&b, 8, 3, 2)
            })
            .collect(),
        trait_species: vec![
            species(1, "Carex firma"),
            species(2, "Carex firma"),
            species(3, "Sesleria caerulea Ard."),
            species(99, "Festuca quadriflora Honck."),
            species(4, "Stachys officinalis L."),
            species(5, "Globularia cordifolia"),
        ],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    // Each left row appears under exactly one provenance tag. Fan-out rows
    // (a1 matches species 1 and 2 on pass 1) stay within their single pass.
    let mut seen: std::collections::HashMap<&str, MatchPass> = Default::default();
    for r in &result.records {
        if let Some(prev) = seen.insert(r.taxon_id.as_str(), r.provenance) {
            assert_eq!(prev, r.provenance, "taxon {} credited to two passes", r.taxon_id);
        }
    }
    let ids: HashSet<&str> = seen.keys().copied().collect();
    let expected: HashSet<&str> = names.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, expected);
}

#[test]
fn trait_join_conserves_filtered_rows() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let input = MergeInput {
        taxa: vec![
            taxon("1", "Carex firma Host", 500),
            taxon("2", "Draba aizoides L.", 320),
            taxon("3", "Globularia cordifolia L.", 410),
        ],
        indicators: vec![
            indicator("Carex firma", 9, 3, 2),
            indicator("Draba aizoides", 9, 2, 2),
            indicator("Globularia cordifolia", 8, 3, 2),
        ],
        trait_species: vec![species(1, "Carex firma")],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    // Left-outer: no fan-out here, so output rows == filtered rows. The
    // indicator join is inner, so filtered rows never exceed the checklist.
    assert_eq!(result.summary.output_rows, result.summary.filtered_rows);
    assert!(result.summary.filtered_rows <= result.summary.checklist_rows);
    assert_eq!(
        result.summary.trait_join.resolved + result.summary.trait_join.residue,
        result.summary.filtered_rows
    );
}

#[test]
fn identical_inputs_produce_identical_results() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let build = || MergeInput {
        taxa: vec![
            taxon("1", "Carex firma Host", 500),
            taxon("2", "Festuca pumila Chaix", 450),
            taxon("3", "Draba aizoides L.", 320),
        ],
        indicators: vec![
            indicator("Carex firma", 9, 3, 2),
            indicator("Festuca pumila", 8, 3, 2),
            indicator("Draba aizoides", 9, 2, 2),
        ],
        trait_species: vec![
            species(1, "Carex firma"),
            species(99, "Festuca quadriflora Honck."),
        ],
        parse_stats: ParseStats::default(),
    };
    let a = run(&config, &build()).unwrap();
    let b = run(&config, &build()).unwrap();

    let rows = |result: &taxmerge_engine::MergeResult| {
        result
            .records
            .iter()
            .map(|r| (r.taxon_id.clone(), r.trait_species_id, r.provenance))
            .collect::<Vec<_>>()
    };
    assert_eq!(rows(&a), rows(&b));
    assert_eq!(
        serde_json::to_string(&a.summary).unwrap(),
        serde_json::to_string(&b.summary).unwrap()
    );
}

// -------------------------------------------------------------------------
// Downstream report
// -------------------------------------------------------------------------

#[test]
fn species_id_report_over_merged_output() {
    let config = MergeConfig::from_toml(CONFIG).unwrap();
    let input = MergeInput {
        taxa: vec![
            taxon("1", "Carex firma Host", 500),
            taxon("2", "Festuca pumila Chaix", 8),
            taxon("3", "Draba aizoides L.", 320),
        ],
        indicators: vec![
            indicator("Carex firma", 9, 3, 2),
            indicator("Festuca pumila", 8, 3, 2),
            indicator("Draba aizoides", 9, 2, 2),
        ],
        trait_species: vec![
            species(1, "Carex firma"),
            species(99, "Festuca quadriflora Honck."),
        ],
        parse_stats: ParseStats::default(),
    };
    let result = run(&config, &input).unwrap();

    let all = species_id_list(&result.records, None);
    assert_eq!(all, vec![1, 99]);
    // Festuca pumila has only 8 occurrences and drops out of the
    // thresholded list; the unresolved Draba contributes nothing either way.
    let frequent = species_id_list(&result.records, Some(10));
    assert_eq!(frequent, vec![1]);
    assert_eq!(format_id_list(&all), "1,99");
}
