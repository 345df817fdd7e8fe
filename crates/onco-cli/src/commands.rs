use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use onco_cli::pipeline::{DeriveRequest, default_output_dir, derivation_options, derive};
use onco_core::{AnalysisDataset, CohortSummary, Estimand, select};
use onco_report::{OutputFormat, OutputPaths, write_analysis_csv, write_outputs};

use crate::cli::{AnalysisArgs, DeriveArgs, InputArgs, OutputFormatArg};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{AnalysisResult, DeriveResult};

pub fn run_estimands() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Estimand"),
        header_cell("Variant"),
        header_cell("Population"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for estimand in Estimand::ALL {
        let strategy = estimand.strategy();
        table.add_row(vec![
            estimand.label().to_string(),
            strategy.variant.to_string(),
            format!("{:?}", strategy.population).to_lowercase(),
            estimand.description().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_derive(args: &DeriveArgs) -> Result<DeriveResult> {
    let request = derive_request(&args.input);
    let derive_span = info_span!("run", assessments = %request.assessments.display());
    let _derive_guard = derive_span.enter();

    let derivation = derive(&request)?;
    let summary = CohortSummary::from_derivation(&derivation);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&request.assessments));

    let outputs = if args.dry_run {
        info!("dry run, no outputs written");
        OutputPaths::default()
    } else {
        write_outputs(
            &output_dir,
            &derivation,
            &request.options,
            &format_outputs(args.format),
        )?
    };

    Ok(DeriveResult {
        assessments: request.assessments,
        output_dir,
        summary,
        outputs,
        has_errors: args.input.strict && derivation.report.has_errors(),
        issues: derivation.report.issues,
        dry_run: args.dry_run,
    })
}

pub fn run_analysis(args: &AnalysisArgs) -> Result<AnalysisResult> {
    let strategy = select(&args.estimand)?;
    let request = derive_request(&args.input);
    let analysis_span = info_span!("analysis", estimand = strategy.label());
    let _analysis_guard = analysis_span.enter();

    let derivation = derive(&request)?;
    let dataset = AnalysisDataset::extract(strategy, &derivation.endpoints, &derivation.schedule);
    let output = args.output.clone().unwrap_or_else(|| {
        default_output_dir(&request.assessments).join(format!("{}.csv", strategy.label()))
    });
    write_analysis_csv(&output, &dataset)
        .with_context(|| format!("write analysis dataset {}", output.display()))?;

    Ok(AnalysisResult {
        estimand: strategy.label(),
        output,
        records: dataset.len(),
        events: dataset.event_count(),
        excluded: derivation.excluded.len(),
    })
}

fn derive_request(input: &InputArgs) -> DeriveRequest {
    let options = derivation_options(input.strict, input.cycle_length, input.fixed_cohort_max);
    let mut request = DeriveRequest::new(&input.assessments).with_options(options);
    if let Some(path) = &input.interventions {
        request = request.with_interventions(path);
    }
    request.id_column = input.id_column.clone();
    request
}

fn format_outputs(format: OutputFormatArg) -> Vec<OutputFormat> {
    match format {
        OutputFormatArg::Csv => vec![OutputFormat::Csv],
        OutputFormatArg::Json => vec![OutputFormat::Json],
        OutputFormatArg::Both => vec![OutputFormat::Csv, OutputFormat::Json],
    }
}
