use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{
    Emitter, EmitterData, EmitterOwner, EmitterOwnerData, EmitterSpec, EmitterType,
    EmitterTypeData,
};
use crate::pagination::Page;
use crate::validation::{FieldErrors, Validate};

pub const TYPE_NAME_MIN: usize = 3;
pub const TYPE_NAME_MAX: usize = 255;
pub const OWNER_NAME_MIN: usize = 3;
pub const OWNER_NAME_MAX: usize = 50;
pub const FACTORY_NUMBER_MIN: usize = 2;
pub const FACTORY_NUMBER_MAX: usize = 255;

// --- Requests ---

/// EmitterTypeRequest
///
/// Body of `POST /api/v1/types` and `PUT /api/v1/types/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterTypeRequest {
    pub name: Option<String>,
}

impl Validate for EmitterTypeRequest {
    type Valid = EmitterTypeData;

    fn validate(self) -> Result<EmitterTypeData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.require_text(
            "name",
            "Name",
            self.name.as_deref(),
            TYPE_NAME_MIN,
            TYPE_NAME_MAX,
        );
        errors.into_result()?;
        Ok(EmitterTypeData { name })
    }
}

/// EmitterOwnerRequest
///
/// Body of `POST /api/v1/owners` and `PUT /api/v1/owners/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterOwnerRequest {
    pub name: Option<String>,
}

impl Validate for EmitterOwnerRequest {
    type Valid = EmitterOwnerData;

    fn validate(self) -> Result<EmitterOwnerData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.require_text(
            "name",
            "Name",
            self.name.as_deref(),
            OWNER_NAME_MIN,
            OWNER_NAME_MAX,
        );
        errors.into_result()?;
        Ok(EmitterOwnerData { name })
    }
}

/// EmitterRequest
///
/// Body of `POST /api/v1/emitters` and `PUT /api/v1/emitters/{id}`. Every field is optional
/// at the serde level so that missing values are reported per field instead of as a
/// single deserialization failure.
///
/// The frequency-band fields stay optional after validation; whether they must be present
/// depends on `hasInternalGenerator` and is checked by the emitter service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterRequest {
    pub factory_number: Option<String>,
    #[ts(type = "string | null")]
    pub manufacture_date: Option<NaiveDate>,
    pub verification_periodicity_in_months: Option<i32>,
    pub for_external_use: Option<bool>,
    pub has_internal_generator: Option<bool>,

    pub minimum_pulse_width: Option<f64>,
    pub maximum_pulse_width: Option<f64>,

    pub minimum_pulse_frequency_10: Option<f64>,
    pub maximum_pulse_frequency_10: Option<f64>,
    pub minimum_pulse_frequency_100: Option<f64>,
    pub maximum_pulse_frequency_100: Option<f64>,
    pub minimum_pulse_frequency_1000: Option<f64>,
    pub maximum_pulse_frequency_1000: Option<f64>,

    pub minimum_pulse_power: Option<f64>,
    pub maximum_pulse_power: Option<f64>,
    pub minimum_radiation_flux_divergence_angle: Option<f64>,
    pub maximum_radiation_flux_divergence_angle: Option<f64>,
    #[serde(rename = "minimumNonParallelismOfTheOpticalAndConstructionAxis")]
    pub minimum_non_parallelism_of_axes: Option<f64>,
    #[serde(rename = "maximumNonParallelismOfTheOpticalAndConstructionAxis")]
    pub maximum_non_parallelism_of_axes: Option<f64>,
    pub minimum_unevenness_of_radiation_flux: Option<f64>,
    pub maximum_unevenness_of_radiation_flux: Option<f64>,

    pub emitter_type_id: Option<i64>,
    pub emitter_owner_id: Option<i64>,
}

impl Validate for EmitterRequest {
    type Valid = EmitterData;

    fn validate(self) -> Result<EmitterData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let factory_number = errors.require_text(
            "factoryNumber",
            "Factory number",
            self.factory_number.as_deref(),
            FACTORY_NUMBER_MIN,
            FACTORY_NUMBER_MAX,
        );

        // NaiveDate has no Default, so the placeholder is handled here.
        let manufacture_date = match self.manufacture_date {
            Some(date) if date < Utc::now().date_naive() => Some(date),
            Some(_) => {
                errors.add(
                    "manufactureDate",
                    "Field \"Manufacture date\" must be in the past",
                );
                None
            }
            None => {
                errors.add("manufactureDate", "Field \"Manufacture date\" is required");
                None
            }
        };

        let verification_periodicity_in_months = errors.required(
            "verificationPeriodicityInMonths",
            "Verification periodicity",
            self.verification_periodicity_in_months,
        );
        let for_external_use =
            errors.required("forExternalUse", "For external use", self.for_external_use);
        let has_internal_generator = errors.required(
            "hasInternalGenerator",
            "Has internal generator",
            self.has_internal_generator,
        );

        let minimum_pulse_width =
            errors.required("minimumPulseWidth", "Minimum pulse width", self.minimum_pulse_width);
        let maximum_pulse_width =
            errors.required("maximumPulseWidth", "Maximum pulse width", self.maximum_pulse_width);
        let minimum_pulse_power =
            errors.required("minimumPulsePower", "Minimum pulse power", self.minimum_pulse_power);
        let maximum_pulse_power =
            errors.required("maximumPulsePower", "Maximum pulse power", self.maximum_pulse_power);
        let minimum_radiation_flux_divergence_angle = errors.required(
            "minimumRadiationFluxDivergenceAngle",
            "Minimum radiation flux divergence angle",
            self.minimum_radiation_flux_divergence_angle,
        );
        let maximum_radiation_flux_divergence_angle = errors.required(
            "maximumRadiationFluxDivergenceAngle",
            "Maximum radiation flux divergence angle",
            self.maximum_radiation_flux_divergence_angle,
        );
        let minimum_non_parallelism_of_axes = errors.required(
            "minimumNonParallelismOfTheOpticalAndConstructionAxis",
            "Minimum non-parallelism of the optical and construction axis",
            self.minimum_non_parallelism_of_axes,
        );
        let maximum_non_parallelism_of_axes = errors.required(
            "maximumNonParallelismOfTheOpticalAndConstructionAxis",
            "Maximum non-parallelism of the optical and construction axis",
            self.maximum_non_parallelism_of_axes,
        );
        let minimum_unevenness_of_radiation_flux = errors.required(
            "minimumUnevennessOfRadiationFlux",
            "Minimum unevenness of radiation flux",
            self.minimum_unevenness_of_radiation_flux,
        );
        let maximum_unevenness_of_radiation_flux = errors.required(
            "maximumUnevennessOfRadiationFlux",
            "Maximum unevenness of radiation flux",
            self.maximum_unevenness_of_radiation_flux,
        );

        let emitter_type_id =
            errors.required("emitterTypeId", "Emitter type", self.emitter_type_id);
        let emitter_owner_id =
            errors.required("emitterOwnerId", "Emitter owner", self.emitter_owner_id);

        let Some(manufacture_date) = manufacture_date else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(EmitterData {
            spec: EmitterSpec {
                factory_number,
                manufacture_date,
                verification_periodicity_in_months,
                for_external_use,
                has_internal_generator,
                minimum_pulse_width,
                maximum_pulse_width,
                minimum_pulse_frequency_10: self.minimum_pulse_frequency_10,
                maximum_pulse_frequency_10: self.maximum_pulse_frequency_10,
                minimum_pulse_frequency_100: self.minimum_pulse_frequency_100,
                maximum_pulse_frequency_100: self.maximum_pulse_frequency_100,
                minimum_pulse_frequency_1000: self.minimum_pulse_frequency_1000,
                maximum_pulse_frequency_1000: self.maximum_pulse_frequency_1000,
                minimum_pulse_power,
                maximum_pulse_power,
                minimum_radiation_flux_divergence_angle,
                maximum_radiation_flux_divergence_angle,
                minimum_non_parallelism_of_axes,
                maximum_non_parallelism_of_axes,
                minimum_unevenness_of_radiation_flux,
                maximum_unevenness_of_radiation_flux,
            },
            emitter_type_id,
            emitter_owner_id,
        })
    }
}

// --- Responses ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterTypeResponse {
    pub id: i64,
    pub name: String,
}

impl From<EmitterType> for EmitterTypeResponse {
    fn from(record: EmitterType) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterOwnerResponse {
    pub id: i64,
    pub name: String,
}

impl From<EmitterOwner> for EmitterOwnerResponse {
    fn from(record: EmitterOwner) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

/// EmitterResponse
///
/// An emitter as returned by the API: the flat spec fields alongside its type and owner
/// embedded as `{id, name}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterResponse {
    pub id: i64,
    #[serde(flatten)]
    pub spec: EmitterSpec,
    pub emitter_type: EmitterTypeResponse,
    pub emitter_owner: EmitterOwnerResponse,
}

impl From<Emitter> for EmitterResponse {
    fn from(record: Emitter) -> Self {
        Self {
            id: record.id,
            spec: record.spec,
            emitter_type: record.emitter_type.into(),
            emitter_owner: record.emitter_owner.into(),
        }
    }
}

/// PagedResponse
///
/// Body of every paginated list endpoint. `pageNumber` is 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PagedResponse<T> {
    pub page_number: i64,
    pub total_pages: i64,
    pub content: Vec<T>,
}

impl<R, T: From<R>> From<Page<R>> for PagedResponse<T> {
    fn from(page: Page<R>) -> Self {
        let page = page.map(T::from);
        Self {
            page_number: page.page_number,
            total_pages: page.total_pages,
            content: page.content,
        }
    }
}
