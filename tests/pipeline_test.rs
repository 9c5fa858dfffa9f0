mod utils;

use patient_outcomes::config::LabelSpec;
use patient_outcomes::error::as_pipeline_error;
use patient_outcomes::utils::arrow::{column_names, float_values, string_values};
use patient_outcomes::{
    Error, FeatureBuilder, FnPredictor, MalformedPolicy, ModelSchema, Pipeline, PipelineConfig,
    RawPrediction, RecordBatch, Result, Target, prepare_features,
};

use utils::{RawRecord, cohort, raw_batch};

/// Schema listing exactly the columns the encoder produces for this batch
fn own_schema(config: &PipelineConfig, batch: &RecordBatch) -> ModelSchema {
    let empty = ModelSchema::new(Vec::<String>::new()).unwrap();
    let prepared = prepare_features(config, batch, &empty).unwrap();
    ModelSchema::new(column_names(&prepared.encoded)).unwrap()
}

fn pipeline_with(config: PipelineConfig, batch: &RecordBatch, outputs: Vec<i64>) -> Pipeline {
    let schema = own_schema(&config, batch);
    let predictor = FnPredictor::new(schema, move |_: &RecordBatch| -> Result<Vec<RawPrediction>> {
        Ok(outputs.iter().copied().map(RawPrediction::Index).collect())
    });
    Pipeline::new(config, Box::new(predictor)).unwrap()
}

#[test]
fn test_coronary_record_end_to_end() {
    let batch = raw_batch(&[RawRecord::new("10006")]);
    let built = FeatureBuilder::from_pipeline(&PipelineConfig::discharge())
        .build(&batch)
        .unwrap();

    assert_eq!(built.identifiers, vec!["10006"]);
    assert_eq!(built.original_labels, vec![Some("HOME".to_string())]);
    assert_eq!(
        string_values(&built.table, "ICD9_CATEGORY").unwrap(),
        vec![Some("Circulatory".to_string())]
    );
    assert_eq!(
        string_values(&built.table, "ETHNICITY").unwrap(),
        vec![Some("NON-WHITE".to_string())]
    );
    assert_eq!(
        string_values(&built.table, "DISCHARGE_LOCATION").unwrap(),
        vec![Some("HOME".to_string())]
    );
    assert_eq!(float_values(&built.table, "LOS_in_Hospital").unwrap(), vec![Some(3.0)]);
}

#[test]
fn test_admission_predictions() {
    let batch = raw_batch(&cohort());
    let pipeline = pipeline_with(PipelineConfig::admission(), &batch, vec![1, 0, 1, 0]);
    let set = pipeline.run(&batch).unwrap();

    assert_eq!(set.target(), Target::Admission);
    assert_eq!(set.len(), 4);
    let first = set.get("10006").unwrap();
    assert_eq!(first.original.as_deref(), Some("EMERGENCY ROOM ADMIT"));
    assert_eq!(first.predicted, "Admitted to ICU");
    let second = set.get("10011").unwrap();
    assert_eq!(second.original.as_deref(), Some("PHYS REFERRAL/NORMAL DELI"));
    assert_eq!(second.predicted, "Not admitted to ICU");
}

#[test]
fn test_discharge_predictions() {
    let batch = raw_batch(&cohort());
    let pipeline = pipeline_with(PipelineConfig::discharge(), &batch, vec![0, 3, 2, 1]);
    let set = pipeline.run(&batch).unwrap();

    let expected = [
        ("10006", "HOME", "HOME"),
        ("10011", "REHAB", "REHAB"),
        ("10013", "OTHERS", "OTHERS"),
        ("10017", "LONG TERM CARE FACILITY", "LONG TERM CARE FACILITY"),
    ];
    for (id, original, predicted) in expected {
        let entry = set.get(id).unwrap();
        assert_eq!(entry.original.as_deref(), Some(original), "original of {id}");
        assert_eq!(entry.predicted, predicted, "prediction of {id}");
    }

    let json: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
    assert_eq!(json["10013"]["Original_DISCHARGE_LOCATION"], "OTHERS");
}

#[test]
fn test_length_of_stay_predictions_are_clipped() {
    let batch = raw_batch(&cohort());
    let pipeline = pipeline_with(PipelineConfig::length_of_stay(), &batch, vec![1, 2, 0, 9]);
    let set = pipeline.run(&batch).unwrap();

    let expected = [
        ("10006", "1-5", "1-5"),
        ("10011", "5-10", "5-10"),
        ("10013", "0-1", "0-1"),
        ("10017", "50+", "50+"),
    ];
    for (id, original, predicted) in expected {
        let entry = set.get(id).unwrap();
        assert_eq!(entry.original.as_deref(), Some(original), "original of {id}");
        assert_eq!(entry.predicted, predicted, "prediction of {id}");
    }
}

#[test]
fn test_aligning_to_own_output_is_identity() {
    let batch = raw_batch(&cohort());
    for target in Target::ALL {
        let config = PipelineConfig::for_target(target);
        let schema = own_schema(&config, &batch);
        let prepared = prepare_features(&config, &batch, &schema).unwrap();

        assert_eq!(column_names(&prepared.aligned.table), schema.columns(), "{target}");
        assert!(prepared.aligned.report.zero_filled.is_empty(), "{target}");
        assert!(prepared.aligned.report.dropped.is_empty(), "{target}");
        assert_eq!(prepared.aligned.table.num_rows(), 4);
    }
}

#[test]
fn test_category_missing_from_batch_is_zero_filled() {
    let batch = raw_batch(&cohort());
    let config = PipelineConfig::admission();
    let mut columns: Vec<String> = own_schema(&config, &batch).columns().to_vec();
    columns.push("ETHNICITY_HISPANIC OR LATINO".to_string());
    let schema = ModelSchema::new(columns).unwrap();

    let prepared = prepare_features(&config, &batch, &schema).unwrap();
    assert_eq!(prepared.aligned.report.zero_filled, vec!["ETHNICITY_HISPANIC OR LATINO"]);
    assert_eq!(
        float_values(&prepared.aligned.table, "ETHNICITY_HISPANIC OR LATINO").unwrap(),
        vec![Some(0.0); 4]
    );
}

#[test]
fn test_missing_discharge_time_is_malformed() {
    let mut records = cohort();
    records[2].discharge = None;
    let batch = raw_batch(&records);

    let config = PipelineConfig::discharge();
    let schema = ModelSchema::new(["LOS"]).unwrap();
    let err = prepare_features(&config, &batch, &schema).unwrap_err();
    match as_pipeline_error(&err) {
        Some(Error::MalformedRecord { identifier, column, .. }) => {
            assert_eq!(identifier, "10013");
            assert_eq!(column, "DISCHTIME");
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn test_malformed_records_dropped_under_policy() {
    let mut records = cohort();
    records[1].admit = Some("not a date");
    let batch = raw_batch(&records);

    let config = PipelineConfig::admission().with_malformed_policy(MalformedPolicy::DropRecord);
    let pipeline = pipeline_with(config, &batch, vec![0, 0, 1]);
    let set = pipeline.run(&batch).unwrap();

    assert_eq!(set.len(), 3);
    assert!(set.get("10011").is_none());
    assert_eq!(set.get("10017").unwrap().predicted, "Admitted to ICU");
}

#[test]
fn test_wrong_prediction_count_is_fatal() {
    let batch = raw_batch(&cohort());
    let pipeline = pipeline_with(PipelineConfig::admission(), &batch, vec![1, 0]);
    let err = pipeline.run(&batch).unwrap_err();
    assert!(matches!(
        as_pipeline_error(&err),
        Some(Error::LengthMismatch { expected: 4, actual: 2, .. })
    ));
}

#[test]
fn test_predictor_error_is_reported() {
    let batch = raw_batch(&cohort());
    let predictor = FnPredictor::new(
        ModelSchema::new(["LOS"]).unwrap(),
        |_: &RecordBatch| -> Result<Vec<RawPrediction>> { anyhow::bail!("model file corrupt") },
    );
    let pipeline = Pipeline::new(PipelineConfig::admission(), Box::new(predictor)).unwrap();
    let err = pipeline.run(&batch).unwrap_err();
    match as_pipeline_error(&err) {
        Some(Error::PredictorFailure(message)) => assert!(message.contains("model file corrupt")),
        other => panic!("expected PredictorFailure, got {other:?}"),
    }
}

#[test]
fn test_invalid_bins_rejected_before_building() {
    let batch = raw_batch(&cohort());
    let mut config = PipelineConfig::length_of_stay();
    if let LabelSpec::Binned { bins, .. } = &mut config.features.label {
        bins.labels.pop();
    }
    let schema = ModelSchema::new(["LOS"]).unwrap();
    let err = prepare_features(&config, &batch, &schema).unwrap_err();
    assert!(matches!(as_pipeline_error(&err), Some(Error::InvalidConfig(_))));
}
