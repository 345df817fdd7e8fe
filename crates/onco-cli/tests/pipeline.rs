//! Integration tests for the pipeline module.

use std::fs;
use std::path::{Path, PathBuf};

use onco_cli::pipeline::{DeriveRequest, default_output_dir, derivation_options, derive, ingest};
use onco_model::{CohortMaximum, CompetingStatus, InvalidPatientPolicy, IssueCode};
use tempfile::TempDir;

const ASSESSMENTS: &str = "SUBJID,C1,C2,C3,C4\n\
                           P01,SD,PR,PR,PD\n\
                           P02,SD,SD,PD,\n\
                           P03,SD,SD,SD,SD\n";

const INTERVENTIONS: &str = "SUBJID,C1,C2,C3,C4\nP03,,,ANP,\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn test_derivation_options_from_flags() {
    let options = derivation_options(false, 21, None);
    assert_eq!(options.cycle_length_days, 21);
    assert_eq!(options.invalid_patient, InvalidPatientPolicy::Exclude);
    assert_eq!(options.cohort_maximum, CohortMaximum::Derived);

    let strict = derivation_options(true, 28, Some(12));
    assert_eq!(strict.invalid_patient, InvalidPatientPolicy::Abort);
    assert_eq!(strict.cohort_maximum, CohortMaximum::Fixed(12));
}

#[test]
fn test_default_output_dir() {
    assert_eq!(
        default_output_dir(Path::new("/data/study/rs.csv")),
        PathBuf::from("/data/study/output")
    );
}

#[test]
fn test_ingest_reads_both_tables() {
    let dir = TempDir::new().expect("temp dir");
    let assessments = write(&dir, "rs.csv", ASSESSMENTS);
    let interventions = write(&dir, "anp.csv", INTERVENTIONS);

    let input = ingest(&DeriveRequest::new(&assessments).with_interventions(&interventions))
        .expect("ingest");
    assert_eq!(input.assessments.len(), 3);
    assert_eq!(input.interventions.as_ref().map(onco_model::WideTable::len), Some(1));
}

#[test]
fn test_ingest_missing_file_has_context() {
    let dir = TempDir::new().expect("temp dir");
    let err = ingest(&DeriveRequest::new(dir.path().join("absent.csv"))).unwrap_err();
    assert!(format!("{err:#}").contains("read assessments"));
}

#[test]
fn test_derive_without_interventions() {
    let dir = TempDir::new().expect("temp dir");
    let assessments = write(&dir, "rs.csv", ASSESSMENTS);

    let derivation = derive(&DeriveRequest::new(&assessments)).expect("derive");
    assert_eq!(derivation.endpoints.len(), 3);
    assert!(derivation.excluded.is_empty());

    let p01 = &derivation.endpoints[0];
    assert_eq!(p01.subject_id, "P01");
    assert_eq!(p01.raw.ttr, 2);
    assert_eq!(p01.raw.dor, 2);
    assert_eq!(p01.censored_at_anp, p01.raw);

    let p03 = &derivation.endpoints[2];
    assert!(!p03.any_anp);
    assert_eq!(p03.while_on_treatment.status, CompetingStatus::Censored);
    assert_eq!(derivation.cohort.max_ttp, 4);
}

#[test]
fn test_derive_censors_at_new_therapy() {
    let dir = TempDir::new().expect("temp dir");
    let assessments = write(&dir, "rs.csv", ASSESSMENTS);
    let interventions = write(&dir, "anp.csv", INTERVENTIONS);

    let request = DeriveRequest::new(&assessments).with_interventions(&interventions);
    let derivation = derive(&request).expect("derive");

    let p03 = &derivation.endpoints[2];
    assert!(p03.any_anp);
    assert_eq!(p03.anp_cycle, Some(3));
    assert_eq!(p03.raw.last_cycle, 4);
    assert_eq!(p03.censored_at_anp.last_cycle, 2);
    assert_eq!(p03.while_on_treatment.time, 3);
    assert_eq!(p03.while_on_treatment.status, CompetingStatus::NewTherapy);

    // C3 and C4 were recorded once the new therapy had started.
    assert!(
        derivation
            .report
            .issues
            .iter()
            .any(|issue| issue.code == IssueCode::PostInterventionAssessment
                && issue.subject_id == "P03")
    );
}

#[test]
fn test_strict_derive_rejects_post_intervention_assessment() {
    let dir = TempDir::new().expect("temp dir");
    let assessments = write(&dir, "rs.csv", ASSESSMENTS);
    let interventions = write(&dir, "anp.csv", INTERVENTIONS);

    let request = DeriveRequest::new(&assessments)
        .with_interventions(&interventions)
        .with_options(derivation_options(true, 28, None));
    assert!(derive(&request).is_err());
}

#[test]
fn test_fixed_cohort_maximum_below_observed_fails() {
    let dir = TempDir::new().expect("temp dir");
    let assessments = write(&dir, "rs.csv", ASSESSMENTS);

    let request =
        DeriveRequest::new(&assessments).with_options(derivation_options(false, 28, Some(2)));
    assert!(derive(&request).is_err());
}
