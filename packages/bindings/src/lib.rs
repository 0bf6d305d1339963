use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use debt_engine_core::debt::{self, Debt, DebtDraft, ExtraPayment};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_debt(input_json: &str) -> NapiResult<Debt> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct WhatIfRequest {
    debt: Debt,
    hypothetical: ExtraPayment,
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let debt = parse_debt(&input_json)?;
    let output = debt::build_schedule(&debt).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Live preview for a partially filled form. Never fails on incomplete
/// terms; returns an empty array instead.
#[napi]
pub fn preview_schedule(draft_json: String) -> NapiResult<String> {
    let draft: DebtDraft = serde_json::from_str(&draft_json).map_err(to_napi_error)?;
    serde_json::to_string(&draft.preview()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Summaries and simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn debt_summary(input_json: String) -> NapiResult<String> {
    let debt = parse_debt(&input_json)?;
    let output = debt::analyze_debt(&debt).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn what_if(input_json: String) -> NapiResult<String> {
    let request: WhatIfRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        debt::run_what_if(&request.debt, &request.hypothetical).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cash flow and portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn project_expenses(input_json: String) -> NapiResult<String> {
    let input: debt_engine_core::projection::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_engine_core::projection::project_debt_expenses(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn portfolio_summary(input_json: String) -> NapiResult<String> {
    let debts: Vec<Debt> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        debt_engine_core::portfolio::analyze_portfolio(&debts).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
