//! polars frames for derived endpoints and analysis datasets.

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use onco_core::{AnalysisDataset, VisitSchedule};
use onco_model::{PatientEndpoints, Variant, VariantEndpoints};

type FlagColumn = (&'static str, fn(&VariantEndpoints) -> bool);
type TimeColumn = (&'static str, fn(&VariantEndpoints) -> u32);
type StatusColumn = (&'static str, fn(&VariantEndpoints) -> u8);

const FLAG_FIELDS: [FlagColumn; 5] = [
    ("objective_response", |v: &VariantEndpoints| v.objective_response),
    ("any_pd", |v: &VariantEndpoints| v.any_pd),
    ("or_and_pd", |v: &VariantEndpoints| v.or_and_pd),
    ("no_or_and_pd", |v: &VariantEndpoints| v.no_or_and_pd),
    ("no_or_or_pd", |v: &VariantEndpoints| v.no_or_or_pd),
];

/// Cycle-valued times; each also gets a `_months` column.
const TIME_FIELDS: [TimeColumn; 6] = [
    ("last_cycle", |v: &VariantEndpoints| v.last_cycle),
    ("ttr", |v: &VariantEndpoints| v.ttr),
    ("dor", |v: &VariantEndpoints| v.dor),
    ("ttp", |v: &VariantEndpoints| v.ttp),
    ("ttp_censored_at_response", |v: &VariantEndpoints| v.ttp_censored_at_response),
    ("sttr", |v: &VariantEndpoints| v.sttr),
];

const STATUS_FIELDS: [StatusColumn; 3] = [
    ("ttr_status", |v: &VariantEndpoints| v.ttr_status.code()),
    ("tir_status", |v: &VariantEndpoints| v.tir_status.code()),
    ("ttp_status", |v: &VariantEndpoints| v.ttp_status.code()),
];

const VARIANTS: [Variant; 2] = [Variant::Raw, Variant::CensoredAtAnp];

fn column<T>(name: impl Into<String>, values: Vec<T>) -> Column
where
    Series: NamedFrom<Vec<T>, [T]>,
{
    let name: String = name.into();
    Series::new(name.into(), values).into_column()
}

/// Output column names of the endpoint frame, in order.
pub fn endpoint_column_names() -> Vec<String> {
    let mut names = vec![
        "subject_id".to_string(),
        "any_anp".to_string(),
        "anp_cycle".to_string(),
    ];
    for variant in VARIANTS {
        let suffix = variant.column_suffix();
        names.push(format!("bor{suffix}"));
        for (base, _) in FLAG_FIELDS {
            names.push(format!("{base}{suffix}"));
        }
        for (base, _) in TIME_FIELDS {
            names.push(format!("{base}{suffix}"));
            names.push(format!("{base}{suffix}_months"));
        }
        for (base, _) in STATUS_FIELDS {
            names.push(format!("{base}{suffix}"));
        }
    }
    names.extend(
        [
            "ttp_while_on_treatment",
            "ttp_while_on_treatment_months",
            "ttp_while_on_treatment_status",
        ]
        .map(String::from),
    );
    names
}

/// One row per patient with every derived endpoint in both variants.
///
/// Column order matches [`endpoint_column_names`].
pub fn endpoint_frame(endpoints: &[PatientEndpoints], schedule: &VisitSchedule) -> Result<DataFrame> {
    let mut columns = vec![
        column(
            "subject_id",
            endpoints
                .iter()
                .map(|patient| patient.subject_id.clone())
                .collect::<Vec<_>>(),
        ),
        column(
            "any_anp",
            endpoints
                .iter()
                .map(|patient| patient.any_anp)
                .collect::<Vec<_>>(),
        ),
        column(
            "anp_cycle",
            endpoints
                .iter()
                .map(|patient| patient.anp_cycle)
                .collect::<Vec<_>>(),
        ),
    ];

    for variant in VARIANTS {
        let suffix = variant.column_suffix();
        let values: Vec<&VariantEndpoints> = endpoints
            .iter()
            .map(|patient| patient.variant(variant))
            .collect();
        columns.push(column(
            format!("bor{suffix}"),
            values
                .iter()
                .map(|v| v.bor.as_code())
                .collect::<Vec<_>>(),
        ));
        for (base, get) in FLAG_FIELDS {
            columns.push(column(
                format!("{base}{suffix}"),
                values.iter().map(|v| get(v)).collect::<Vec<_>>(),
            ));
        }
        for (base, get) in TIME_FIELDS {
            let cycles: Vec<u32> = values.iter().map(|v| get(v)).collect();
            let months: Vec<f64> = cycles.iter().map(|cycle| schedule.months(*cycle)).collect();
            columns.push(column(format!("{base}{suffix}"), cycles));
            columns.push(column(format!("{base}{suffix}_months"), months));
        }
        for (base, get) in STATUS_FIELDS {
            columns.push(column(
                format!("{base}{suffix}"),
                values
                    .iter()
                    .map(|v| i32::from(get(v)))
                    .collect::<Vec<_>>(),
            ));
        }
    }

    let times: Vec<u32> = endpoints
        .iter()
        .map(|patient| patient.while_on_treatment.time)
        .collect();
    let months: Vec<f64> = times.iter().map(|cycle| schedule.months(*cycle)).collect();
    let statuses: Vec<i32> = endpoints
        .iter()
        .map(|patient| i32::from(patient.while_on_treatment.status.code()))
        .collect();
    columns.push(column("ttp_while_on_treatment", times));
    columns.push(column("ttp_while_on_treatment_months", months));
    columns.push(column("ttp_while_on_treatment_status", statuses));

    DataFrame::new(columns).context("build endpoint frame")
}

/// Frame of (subject, time, status) rows for one estimand.
pub fn analysis_frame(dataset: &AnalysisDataset) -> Result<DataFrame> {
    let records = &dataset.records;
    let columns = vec![
        column(
            "subject_id",
            records
                .iter()
                .map(|record| record.subject_id.clone())
                .collect::<Vec<_>>(),
        ),
        column(
            "time",
            records
                .iter()
                .map(|record| record.time_cycles)
                .collect::<Vec<_>>(),
        ),
        column(
            "time_months",
            records
                .iter()
                .map(|record| record.time_months)
                .collect::<Vec<_>>(),
        ),
        column(
            "status",
            records
                .iter()
                .map(|record| i32::from(record.status))
                .collect::<Vec<_>>(),
        ),
    ];
    DataFrame::new(columns)
        .with_context(|| format!("build analysis frame for {}", dataset.strategy.label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use onco_core::{CohortInput, DerivationEngine};
    use onco_model::WideTable;

    fn derived() -> onco_core::CohortDerivation {
        let mut table = WideTable::new("ID", vec!["C1".to_string(), "C2".to_string()]);
        table.push_row("P01", vec!["PR".to_string(), "PD".to_string()]);
        table.push_row("P02", vec!["SD".to_string(), String::new()]);
        DerivationEngine::default()
            .derive(&CohortInput::new(table))
            .unwrap()
    }

    #[test]
    fn frame_columns_match_names() {
        let derived = derived();
        let df = endpoint_frame(&derived.endpoints, &derived.schedule).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, endpoint_column_names());
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn empty_cohort_builds_empty_frame() {
        let derived = derived();
        let df = endpoint_frame(&[], &derived.schedule).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), endpoint_column_names().len());
    }
}
