use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::pagination::SortColumns;

// --- Lookup Records ---

/// EmitterType
///
/// A category of emitter, stored in the `emitter_type` table. Names are unique.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct EmitterType {
    pub id: i64,
    #[sqlx(rename = "type_name")]
    pub name: String,
}

impl EmitterType {
    pub const SORT_COLUMNS: SortColumns = &[("id", "id"), ("name", "type_name")];
}

/// EmitterOwner
///
/// The organisation or person an emitter belongs to, stored in the `emitter_owner` table.
/// Names are unique.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct EmitterOwner {
    pub id: i64,
    #[sqlx(rename = "owner_name")]
    pub name: String,
}

impl EmitterOwner {
    pub const SORT_COLUMNS: SortColumns = &[("id", "id"), ("name", "owner_name")];
}

/// Validated input for creating or renaming an EmitterType.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterTypeData {
    pub name: String,
}

/// Validated input for creating or renaming an EmitterOwner.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterOwnerData {
    pub name: String,
}

// --- Emitter ---

/// EmitterSpec
///
/// The descriptive part of an emitter: identity, service schedule and measured ranges.
/// Column names match the field names, so it is read straight out of `emitter` rows.
///
/// The six `*_pulse_frequency_*` fields are only meaningful for emitters driven by an
/// external generator; see `check_frequency_bands`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmitterSpec {
    pub factory_number: String,
    #[ts(type = "string")]
    pub manufacture_date: NaiveDate,
    pub verification_periodicity_in_months: i32,
    pub for_external_use: bool,
    pub has_internal_generator: bool,

    pub minimum_pulse_width: f64,
    pub maximum_pulse_width: f64,

    pub minimum_pulse_frequency_10: Option<f64>,
    pub maximum_pulse_frequency_10: Option<f64>,
    pub minimum_pulse_frequency_100: Option<f64>,
    pub maximum_pulse_frequency_100: Option<f64>,
    pub minimum_pulse_frequency_1000: Option<f64>,
    pub maximum_pulse_frequency_1000: Option<f64>,

    pub minimum_pulse_power: f64,
    pub maximum_pulse_power: f64,
    pub minimum_radiation_flux_divergence_angle: f64,
    pub maximum_radiation_flux_divergence_angle: f64,
    #[serde(rename = "minimumNonParallelismOfTheOpticalAndConstructionAxis")]
    pub minimum_non_parallelism_of_axes: f64,
    #[serde(rename = "maximumNonParallelismOfTheOpticalAndConstructionAxis")]
    pub maximum_non_parallelism_of_axes: f64,
    pub minimum_unevenness_of_radiation_flux: f64,
    pub maximum_unevenness_of_radiation_flux: f64,
}

impl EmitterSpec {
    /// The frequency-band fields in their fixed checking order, keyed by JSON name.
    pub fn frequency_bands(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("minimumPulseFrequency10", self.minimum_pulse_frequency_10),
            ("maximumPulseFrequency10", self.maximum_pulse_frequency_10),
            ("minimumPulseFrequency100", self.minimum_pulse_frequency_100),
            ("maximumPulseFrequency100", self.maximum_pulse_frequency_100),
            ("minimumPulseFrequency1000", self.minimum_pulse_frequency_1000),
            ("maximumPulseFrequency1000", self.maximum_pulse_frequency_1000),
        ]
    }

    /// check_frequency_bands
    ///
    /// An emitter without an internal generator must declare all six frequency-band limits;
    /// one with an internal generator must declare none of them. Reports the first offending
    /// field only.
    pub fn check_frequency_bands(&self) -> AppResult<()> {
        for (field, value) in self.frequency_bands() {
            match (self.has_internal_generator, value) {
                (false, None) => {
                    return Err(AppError::BadRequest(format!(
                        "Field \"{field}\" is required for an emitter without an internal generator"
                    )));
                }
                (true, Some(_)) => {
                    return Err(AppError::BadRequest(format!(
                        "Field \"{field}\" must be empty for an emitter with an internal generator"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Emitter
///
/// A physical device under verification tracking, with its type and owner resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub id: i64,
    pub spec: EmitterSpec,
    pub emitter_type: EmitterType,
    pub emitter_owner: EmitterOwner,
}

impl Emitter {
    /// Sortable JSON fields and the columns of the joined `emitter e / emitter_type t /
    /// emitter_owner o` query they map to.
    pub const SORT_COLUMNS: SortColumns = &[
        ("id", "e.id"),
        ("factoryNumber", "e.factory_number"),
        ("manufactureDate", "e.manufacture_date"),
        (
            "verificationPeriodicityInMonths",
            "e.verification_periodicity_in_months",
        ),
        ("forExternalUse", "e.for_external_use"),
        ("hasInternalGenerator", "e.has_internal_generator"),
        ("emitterType", "t.type_name"),
        ("emitterOwner", "o.owner_name"),
    ];
}

/// EmitterData
///
/// Validated input for creating or replacing an emitter. References are ids; the service
/// checks they exist before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterData {
    pub spec: EmitterSpec,
    pub emitter_type_id: i64,
    pub emitter_owner_id: i64,
}

/// EmitterRow
///
/// Raw result of the emitter/type/owner join. Only used inside the repository before being
/// folded into an `Emitter`.
#[derive(Debug, Clone, FromRow)]
pub struct EmitterRow {
    pub id: i64,
    #[sqlx(flatten)]
    pub spec: EmitterSpec,
    pub emitter_type_id: i64,
    pub emitter_type_name: String,
    pub emitter_owner_id: i64,
    pub emitter_owner_name: String,
}

impl From<EmitterRow> for Emitter {
    fn from(row: EmitterRow) -> Self {
        Emitter {
            id: row.id,
            spec: row.spec,
            emitter_type: EmitterType {
                id: row.emitter_type_id,
                name: row.emitter_type_name,
            },
            emitter_owner: EmitterOwner {
                id: row.emitter_owner_id,
                name: row.emitter_owner_name,
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::external_generator_spec;
    use super::*;

    #[test]
    fn external_generator_with_all_bands_passes() {
        assert!(external_generator_spec("EM-01").check_frequency_bands().is_ok());
    }

    #[test]
    fn external_generator_reports_first_missing_band() {
        let mut spec = external_generator_spec("EM-01");
        spec.maximum_pulse_frequency_100 = None;
        spec.minimum_pulse_frequency_1000 = None;

        let err = spec.check_frequency_bands().unwrap_err();
        assert!(
            matches!(&err, AppError::BadRequest(msg) if msg.contains("maximumPulseFrequency100"))
        );
    }

    #[test]
    fn internal_generator_rejects_any_band() {
        let mut spec = external_generator_spec("EM-02");
        spec.has_internal_generator = true;

        let err = spec.check_frequency_bands().unwrap_err();
        assert!(
            matches!(&err, AppError::BadRequest(msg) if msg.contains("\"minimumPulseFrequency10\""))
        );
    }

    #[test]
    fn internal_generator_without_bands_passes() {
        let mut spec = external_generator_spec("EM-03");
        spec.has_internal_generator = true;
        spec.minimum_pulse_frequency_10 = None;
        spec.maximum_pulse_frequency_10 = None;
        spec.minimum_pulse_frequency_100 = None;
        spec.maximum_pulse_frequency_100 = None;
        spec.minimum_pulse_frequency_1000 = None;
        spec.maximum_pulse_frequency_1000 = None;

        assert!(spec.check_frequency_bands().is_ok());
    }

    #[test]
    fn spec_serializes_with_wire_names() {
        let json = serde_json::to_value(external_generator_spec("EM-04")).unwrap();
        assert_eq!(json["factoryNumber"], "EM-04");
        assert_eq!(json["manufactureDate"], "2020-05-17");
        assert_eq!(json["minimumPulseFrequency1000"], 800.0);
        assert!(json.get("minimumNonParallelismOfTheOpticalAndConstructionAxis").is_some());
    }
}
