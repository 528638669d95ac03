#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use emitter_registry::{
    AppConfig, AppState, InMemoryRepository,
    dto::EmitterRequest,
    models::{EmitterData, EmitterOwner, EmitterOwnerData, EmitterType, EmitterTypeData},
    repository::RepositoryState,
    validation::Validate,
};

// --- TEST UTILITIES ---

/// Fresh state over an empty in-memory repository and default configuration.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryRepository::new()) as RepositoryState,
        AppConfig::default(),
    )
}

pub async fn seed_type(state: &AppState, name: &str) -> EmitterType {
    state
        .types
        .create(EmitterTypeData {
            name: name.to_string(),
        })
        .await
        .unwrap()
}

pub async fn seed_owner(state: &AppState, name: &str) -> EmitterOwner {
    state
        .owners
        .create(EmitterOwnerData {
            name: name.to_string(),
        })
        .await
        .unwrap()
}

/// A complete request for an emitter driven by an external generator.
pub fn emitter_request(factory_number: &str, type_id: i64, owner_id: i64) -> EmitterRequest {
    EmitterRequest {
        factory_number: Some(factory_number.to_string()),
        manufacture_date: NaiveDate::from_ymd_opt(2019, 3, 14),
        verification_periodicity_in_months: Some(24),
        for_external_use: Some(true),
        has_internal_generator: Some(false),
        minimum_pulse_width: Some(10.0),
        maximum_pulse_width: Some(50.0),
        minimum_pulse_frequency_10: Some(9.0),
        maximum_pulse_frequency_10: Some(11.0),
        minimum_pulse_frequency_100: Some(90.0),
        maximum_pulse_frequency_100: Some(110.0),
        minimum_pulse_frequency_1000: Some(900.0),
        maximum_pulse_frequency_1000: Some(1100.0),
        minimum_pulse_power: Some(1.5),
        maximum_pulse_power: Some(3.0),
        minimum_radiation_flux_divergence_angle: Some(2.0),
        maximum_radiation_flux_divergence_angle: Some(4.0),
        minimum_non_parallelism_of_axes: Some(0.5),
        maximum_non_parallelism_of_axes: Some(1.0),
        minimum_unevenness_of_radiation_flux: Some(5.0),
        maximum_unevenness_of_radiation_flux: Some(15.0),
        emitter_type_id: Some(type_id),
        emitter_owner_id: Some(owner_id),
    }
}

/// Same as `emitter_request`, already validated.
pub fn emitter_data(factory_number: &str, type_id: i64, owner_id: i64) -> EmitterData {
    emitter_request(factory_number, type_id, owner_id)
        .validate()
        .unwrap()
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads a response body as text.
pub async fn body_text(response: axum::response::Response) -> String {
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
