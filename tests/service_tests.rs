mod common;

use common::{emitter_data, seed_owner, seed_type, test_state};
use emitter_registry::{
    AppError,
    models::{EmitterOwnerData, EmitterTypeData},
    pagination::PageParams,
};

fn page(number: i64, size: i64, field: &str, ascending: bool) -> PageParams {
    PageParams {
        page_number: number,
        page_size: size,
        sort_field: field.to_string(),
        sort_ascending: ascending,
    }
}

// --- Emitter Types & Owners ---

#[tokio::test]
async fn test_create_then_get_returns_equal_record() {
    let state = test_state();
    let created = seed_type(&state, "Laser").await;

    let fetched = state.types.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.name, "Laser");
}

#[tokio::test]
async fn test_duplicate_name_conflicts_and_keeps_original() {
    let state = test_state();
    let original = seed_owner(&state, "Metrology lab").await;

    let err = state
        .owners
        .create(EmitterOwnerData {
            name: "Metrology lab".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::Conflict(msg) if msg.contains("Metrology lab")));
    let all = state.owners.list().await.unwrap();
    assert_eq!(all, vec![original]);
}

#[tokio::test]
async fn test_rename_onto_existing_name_conflicts() {
    let state = test_state();
    seed_type(&state, "Laser").await;
    let diode = seed_type(&state, "Diode").await;

    let err = state
        .types
        .update(
            diode.id,
            EmitterTypeData {
                name: "Laser".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(state.types.get_by_id(diode.id).await.unwrap().name, "Diode");
}

#[tokio::test]
async fn test_update_missing_type_is_not_found() {
    let state = test_state();
    let err = state
        .types
        .update(
            42,
            EmitterTypeData {
                name: "Ghost".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("42")));
}

#[tokio::test]
async fn test_first_page_of_three_items() {
    let state = test_state();
    for name in ["Alpha", "Bravo", "Charlie"] {
        seed_type(&state, name).await;
    }

    let result = state.types.get_page(&page(1, 5, "id", true)).await.unwrap();

    assert_eq!(result.page_number, 0);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.content.len(), 3);
}

#[tokio::test]
async fn test_page_sorted_by_name_descending() {
    let state = test_state();
    for name in ["Bravo", "Charlie", "Alpha"] {
        seed_owner(&state, name).await;
    }

    let result = state
        .owners
        .get_page(&page(1, 2, "name", false))
        .await
        .unwrap();
    let names: Vec<_> = result.content.iter().map(|o| o.name.as_str()).collect();

    assert_eq!(names, vec!["Charlie", "Bravo"]);
    assert_eq!(result.total_pages, 2);
}

#[tokio::test]
async fn test_unknown_sort_field_is_rejected() {
    let state = test_state();
    let err = state
        .types
        .get_page(&page(1, 5, "colour", true))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ParameterValidation(_)));
}

#[tokio::test]
async fn test_delete_missing_is_not_found_with_id() {
    let state = test_state();
    let err = state.owners.delete(777).await.unwrap_err();
    assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("777")));

    let err = state.emitters.delete(778).await.unwrap_err();
    assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("778")));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let state = test_state();
    let created = seed_type(&state, "Laser").await;

    state.types.delete(created.id).await.unwrap();

    assert!(matches!(
        state.types.get_by_id(created.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_referenced_type_and_owner_cannot_be_deleted() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;
    state
        .emitters
        .create(emitter_data("EM-001", laser.id, lab.id))
        .await
        .unwrap();

    assert!(matches!(
        state.types.delete(laser.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        state.owners.delete(lab.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(state.types.get_by_id(laser.id).await.is_ok());
}

// --- Emitters ---

#[tokio::test]
async fn test_emitter_create_then_get_embeds_references() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;

    let created = state
        .emitters
        .create(emitter_data("EM-001", laser.id, lab.id))
        .await
        .unwrap();
    let fetched = state.emitters.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.emitter_type, laser);
    assert_eq!(fetched.emitter_owner, lab);
}

#[tokio::test]
async fn test_external_generator_requires_all_bands() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;

    let mut data = emitter_data("EM-001", laser.id, lab.id);
    data.spec.minimum_pulse_frequency_100 = None;

    let err = state.emitters.create(data).await.unwrap_err();
    assert!(
        matches!(&err, AppError::BadRequest(msg) if msg.contains("minimumPulseFrequency100"))
    );
    assert!(state.emitters.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_internal_generator_forbids_bands() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;

    let mut data = emitter_data("EM-001", laser.id, lab.id);
    data.spec.has_internal_generator = true;

    let err = state.emitters.create(data.clone()).await.unwrap_err();
    assert!(
        matches!(&err, AppError::BadRequest(msg) if msg.contains("minimumPulseFrequency10"))
    );

    data.spec.minimum_pulse_frequency_10 = None;
    data.spec.maximum_pulse_frequency_10 = None;
    data.spec.minimum_pulse_frequency_100 = None;
    data.spec.maximum_pulse_frequency_100 = None;
    data.spec.minimum_pulse_frequency_1000 = None;
    data.spec.maximum_pulse_frequency_1000 = None;
    assert!(state.emitters.create(data).await.is_ok());
}

#[tokio::test]
async fn test_emitter_with_missing_owner_is_not_found() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;

    let err = state
        .emitters
        .create(emitter_data("EM-001", laser.id, 55))
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("owner") && msg.contains("55")));
}

#[tokio::test]
async fn test_duplicate_factory_number_conflicts() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;
    state
        .emitters
        .create(emitter_data("EM-001", laser.id, lab.id))
        .await
        .unwrap();

    let err = state
        .emitters
        .create(emitter_data("EM-001", laser.id, lab.id))
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::Conflict(msg) if msg.contains("EM-001")));
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let diode = seed_type(&state, "Diode").await;
    let lab = seed_owner(&state, "Optics lab").await;
    let plant = seed_owner(&state, "Assembly plant").await;
    let created = state
        .emitters
        .create(emitter_data("EM-001", laser.id, lab.id))
        .await
        .unwrap();

    let mut replacement = emitter_data("EM-002", diode.id, plant.id);
    replacement.spec.verification_periodicity_in_months = 6;
    replacement.spec.maximum_pulse_power = 9.5;
    state
        .emitters
        .update(created.id, replacement.clone())
        .await
        .unwrap();

    let fetched = state.emitters.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.spec, replacement.spec);
    assert_eq!(fetched.emitter_type, diode);
    assert_eq!(fetched.emitter_owner, plant);
}

#[tokio::test]
async fn test_update_missing_emitter_is_not_found() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let lab = seed_owner(&state, "Optics lab").await;

    let err = state
        .emitters
        .update(9, emitter_data("EM-009", laser.id, lab.id))
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("Emitter with id 9")));
}

#[tokio::test]
async fn test_emitter_page_sorted_by_owner_name() {
    let state = test_state();
    let laser = seed_type(&state, "Laser").await;
    let zeta = seed_owner(&state, "Zeta works").await;
    let acme = seed_owner(&state, "Acme").await;
    state
        .emitters
        .create(emitter_data("EM-001", laser.id, zeta.id))
        .await
        .unwrap();
    state
        .emitters
        .create(emitter_data("EM-002", laser.id, acme.id))
        .await
        .unwrap();

    let result = state
        .emitters
        .get_page(&page(1, 5, "emitterOwner", true))
        .await
        .unwrap();
    let numbers: Vec<_> = result
        .content
        .iter()
        .map(|e| e.spec.factory_number.as_str())
        .collect();

    assert_eq!(numbers, vec!["EM-002", "EM-001"]);
}
