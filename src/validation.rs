use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// FieldErrors
///
/// Violations collected while validating a request body, keyed by the JSON field name.
/// A field may carry several messages (e.g. blank *and* too short).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of offending fields (not messages).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Unwraps a required value, recording a violation when it is missing.
    ///
    /// The returned default is a placeholder; callers must not use the result once any
    /// violation has been recorded.
    pub fn required<T: Default>(&mut self, field: &str, label: &str, value: Option<T>) -> T {
        match value {
            Some(value) => value,
            None => {
                self.add(field, format!("Field \"{label}\" is required"));
                T::default()
            }
        }
    }

    /// Non-blank text with a length between `min` and `max` characters (inclusive).
    ///
    /// A missing value only reports blankness; a present value is checked for both rules,
    /// so `"  "` yields two messages.
    pub fn require_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> String {
        let Some(text) = value else {
            self.add(field, format!("Field \"{label}\" must not be blank"));
            return String::new();
        };
        if text.trim().is_empty() {
            self.add(field, format!("Field \"{label}\" must not be blank"));
        }
        let length = text.chars().count();
        if length < min || length > max {
            self.add(
                field,
                format!("Field \"{label}\" must be between {min} and {max} characters long"),
            );
        }
        text.to_string()
    }
}

/// Validate
///
/// Structural validation of an inbound payload, converting it into its checked form.
/// Implementations report every violation, not just the first one.
pub trait Validate: Sized {
    type Valid;

    fn validate(self) -> Result<Self::Valid, FieldErrors>;
}

/// ValidatedJson
///
/// JSON body extractor that deserializes `T` and yields its validated form `T::Valid`.
///
/// Rejections are `AppError`s, so malformed bodies and failed validation reach the client in
/// the same structured shape as every other error.
pub struct ValidatedJson<T: Validate>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let valid = value.validate().map_err(AppError::FormValidation)?;

        Ok(Self(valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_reports_both_rules() {
        let mut errors = FieldErrors::new();
        errors.require_text("name", "Name", Some("  "), 3, 50);

        let messages = errors.get("name").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("blank"));
        assert!(messages[1].contains("between 3 and 50"));
    }

    #[test]
    fn missing_text_reports_blank_only() {
        let mut errors = FieldErrors::new();
        errors.require_text("name", "Name", None, 3, 50);

        assert_eq!(errors.get("name").unwrap().len(), 1);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        // Three Cyrillic letters are six bytes.
        let name = errors.require_text("name", "Name", Some("Тип"), 3, 3);

        assert!(errors.is_empty());
        assert_eq!(name, "Тип");
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        let id: i64 = errors.required("emitterTypeId", "Emitter type", None);
        assert_eq!(id, 0);
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["emitterTypeId"]);
    }
}
