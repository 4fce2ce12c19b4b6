// system-tests/tests/suites/bulk_predict.rs
// ============================================================================
// Module: Bulk Predict Contract Tests
// Description: Request validation and happy-path cases for /bulk-predict.
// Purpose: Ensure the live predictor accepts valid batches and rejects invalid ones.
// Dependencies: kawsay-contract, helpers
// ============================================================================

//! ## Overview
//! One test per bulk-predict table entry so each verdict is reported and
//! archived on its own.

use std::error::Error;

use kawsay_contract::suites::SuiteName;
use kawsay_contract::suites::names;

use crate::helpers::scenarios::run_table_scenario;

#[tokio::test(flavor = "multi_thread")]
async fn happy_path_valid_mix_of_records() -> Result<(), Box<dyn Error>> {
    run_table_scenario("happy_path_valid_mix_of_records", SuiteName::BulkPredict, names::HAPPY_PATH)
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_records_array_is_rejected() -> Result<(), Box<dyn Error>> {
    run_table_scenario(
        "empty_records_array_is_rejected",
        SuiteName::BulkPredict,
        names::EMPTY_RECORDS,
    )
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn grade_out_of_bounds_is_rejected() -> Result<(), Box<dyn Error>> {
    run_table_scenario(
        "grade_out_of_bounds_is_rejected",
        SuiteName::BulkPredict,
        names::GRADE_OUT_OF_BOUNDS,
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn negative_grade_is_rejected() -> Result<(), Box<dyn Error>> {
    run_table_scenario("negative_grade_is_rejected", SuiteName::BulkPredict, names::NEGATIVE_GRADE)
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_required_field_is_rejected() -> Result<(), Box<dyn Error>> {
    run_table_scenario(
        "missing_required_field_is_rejected",
        SuiteName::BulkPredict,
        names::MISSING_FIELD,
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_is_rejected() -> Result<(), Box<dyn Error>> {
    run_table_scenario("malformed_json_is_rejected", SuiteName::BulkPredict, names::MALFORMED_JSON)
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn grades_at_range_limits_are_accepted() -> Result<(), Box<dyn Error>> {
    run_table_scenario(
        "grades_at_range_limits_are_accepted",
        SuiteName::BulkPredict,
        names::RANGE_LIMITS,
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn response_shape_holds_for_valid_batch() -> Result<(), Box<dyn Error>> {
    run_table_scenario(
        "response_shape_holds_for_valid_batch",
        SuiteName::BulkPredict,
        names::RESPONSE_SHAPE,
    )
    .await
}
