use napi::Result as NapiResult;
use napi_derive::napi;

use credit_quest_core::amortization::{schedule, stats, utilization, validation};
use credit_quest_core::LoanProfile;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_stats(input_json: String) -> NapiResult<String> {
    let input: stats::ProgressInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = stats::analyze_progress(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn yearly_utilization(input_json: String) -> NapiResult<String> {
    let req: utilization::UtilizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        utilization::yearly_utilization(req.year, &req.extra_payments, req.initial_principal)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// `{"valid", "minimumMonthlyPayment", "reason"?}` for the given profile.
#[napi]
pub fn validate_profile(profile_json: String) -> NapiResult<String> {
    let profile: LoanProfile = serde_json::from_str(&profile_json).map_err(to_napi_error)?;
    let check = validation::check_profile(&profile).map_err(to_napi_error)?;
    serde_json::to_string(&check).map_err(to_napi_error)
}
