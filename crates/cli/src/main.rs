//! `taxmerge` — config-driven reconciliation of a taxon checklist against
//! an indicator-value table and a trait database.

mod exit_codes;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS};
use taxmerge_engine::{report, stats, MergeConfig, MergeResult};

#[derive(Parser)]
#[command(name = "taxmerge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the merge pipeline from a TOML config file
    #[command(after_help = "\
Examples:
  taxmerge run merge.toml
  taxmerge run merge.toml --json
  taxmerge run merge.toml --output result.json")]
    Run {
        /// Path to the merge config file
        config: PathBuf,

        /// Output the JSON result document to stdout instead of the
        /// human summary only
        #[arg(long)]
        json: bool,

        /// Write the JSON result document to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a merge config without running
    Validate {
        /// Path to the merge config file
        config: PathBuf,
    },

    /// Print trait IDs whose description matches the configured keywords
    TraitIds {
        /// Path to the merge config file (needs a [trait_definitions] section)
        config: PathBuf,
    },
}

struct CliError {
    code: u8,
    message: String,
}

fn cli_err(code: u8, message: impl Into<String>) -> CliError {
    CliError { code, message: message.into() }
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
        Commands::TraitIds { config } => cmd_trait_ids(config),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e.message);
        std::process::exit(i32::from(e.code));
    }
    std::process::exit(i32::from(EXIT_SUCCESS));
}

fn read_config(config_path: &Path) -> Result<MergeConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;
    MergeConfig::from_toml(&config_str).map_err(|e| cli_err(EXIT_INVALID_CONFIG, e.to_string()))
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Source paths resolve relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = taxmerge_io::load_input(&config, base_dir)
        .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;

    let occurrence_stats = stats::describe(input.taxa.iter().filter_map(|t| t.occurrences));

    let result =
        taxmerge_engine::run(&config, &input).map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;

    // JSON result document
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref file) = config.output.json {
        let path = base_dir.join(file);
        std::fs::write(&path, &json_str)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref file) = config.output.csv {
        let path = base_dir.join(file);
        let out = std::fs::File::create(&path)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        taxmerge_io::write_merged_csv(&result.records, out)
            .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result, occurrence_stats.as_ref());
    print_species_report(&config, &result);

    Ok(())
}

/// Human summary to stderr; stdout stays reserved for --json.
fn print_summary(result: &MergeResult, occurrence_stats: Option<&stats::OccurrenceStats>) {
    let s = &result.summary;
    eprintln!(
        "merge '{}': {} checklist rows, {} indicator rows, {} trait rows",
        result.meta.config_name, s.checklist_rows, s.indicator_rows, s.trait_rows,
    );
    if let Some(o) = occurrence_stats {
        eprintln!(
            "occurrences: n={} mean={:.1} std={:.1} min={} q25={:.1} median={:.1} q75={:.1} max={}",
            o.count, o.mean, o.std, o.min, o.q25, o.median, o.q75, o.max,
        );
    }

    for p in &s.indicator_join.passes {
        eprintln!("indicator pass {}: {} rows ({} resolved)", p.pass, p.matched_rows, p.resolved);
    }
    eprintln!(
        "indicator join: {} resolved, {} dropped; {} rows after thresholds ({} filtered out)",
        s.indicator_join.resolved, s.indicator_join.residue, s.filtered_rows, s.filtered_out,
    );

    for p in &s.trait_join.passes {
        eprintln!("trait pass {}: {} rows ({} resolved)", p.pass, p.matched_rows, p.resolved);
    }
    eprintln!(
        "trait join: {} resolved, {} unresolved (kept with null trait fields)",
        s.trait_join.resolved, s.trait_join.residue,
    );

    if s.indicator_join.fan_out_rows + s.trait_join.fan_out_rows > 0 {
        eprintln!(
            "fan-out: {} indicator, {} trait rows matched more than one record",
            s.indicator_join.fan_out_rows, s.trait_join.fan_out_rows,
        );
    }
    let u = &s.unknown_cells;
    if u.checklist_unknown + u.indicator_unknown + u.trait_unknown > 0 {
        eprintln!(
            "unknown cells: {} checklist, {} indicator, {} trait",
            u.checklist_unknown, u.indicator_unknown, u.trait_unknown,
        );
    }
    eprintln!("{} output rows", s.output_rows);
}

fn print_species_report(config: &MergeConfig, result: &MergeResult) {
    let all = report::species_id_list(&result.records, None);
    eprintln!("trait species IDs ({}): {}", all.len(), report::format_id_list(&all));

    if let Some(min) = config.report.min_occurrences {
        let frequent = report::species_id_list(&result.records, Some(min));
        eprintln!(
            "trait species IDs with >= {min} occurrences ({}): {}",
            frequent.len(),
            report::format_id_list(&frequent),
        );
    }
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: merge '{}' with {} synonym(s), thresholds L>={} F<={} N<={}",
        config.name,
        config.synonyms.len(),
        config.thresholds.light_min,
        config.thresholds.moisture_max,
        config.thresholds.nutrient_max,
    );
    Ok(())
}

fn cmd_trait_ids(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let defs_config = config.trait_definitions.as_ref().ok_or_else(|| {
        cli_err(EXIT_ERROR, "config has no [trait_definitions] section")
    })?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let path = base_dir.join(&defs_config.file);
    let data = std::fs::read_to_string(&path)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot read {}: {e}", path.display())))?;

    let definitions = taxmerge_io::load_trait_definitions(&data, defs_config)
        .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;
    let ids = report::select_trait_ids(&definitions, &defs_config.keywords)
        .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;

    eprintln!("{} trait ID(s) matched the configured keywords", ids.len());
    println!("{}", report::format_id_list(&ids));
    Ok(())
}
