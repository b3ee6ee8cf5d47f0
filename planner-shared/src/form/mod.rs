//! # Forms
//!
//! Typed form state for every entity the client creates or edits.
//!
//! A [`FormState<T>`] owns a [`FormModel`] whose fields are raw strings, the
//! way input controls hand them over. Fields are set by name, and
//! [`FormState::submit`] parses and validates the whole model, returning
//! either the typed draft ready to send or the per-field
//! [`ValidationErrors`]. Nothing here touches the network: a form that
//! fails validation never produces a request.

mod auth;
mod itinerary;
mod profile;
mod weather;

pub use auth::{LoginForm, RegisterForm};
pub use itinerary::{AccommodationForm, ActivityForm, TransportForm, TripForm};
pub use profile::ProfileForm;
pub use weather::WeatherForm;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::models::serde_helpers::{parse_clock_time, parse_local_datetime};

/// Error raised while editing a form, as opposed to validating it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// The form has no field with this name.
    #[error("unknown form field '{field}' (expected one of: {expected})")]
    UnknownField {
        /// Name that was not recognized.
        field: String,
        /// Comma-separated list of accepted names.
        expected: String,
    },
}

/// A form whose fields are edited as strings and validated into `Output`.
pub trait FormModel: Clone {
    /// The validated value produced on submit.
    type Output;

    /// Field names accepted by [`FormModel::set_field`].
    const FIELDS: &'static [&'static str];

    /// Stores a raw value. Returns `false` when the field does not exist.
    fn set_field(&mut self, field: &str, value: String) -> bool;

    /// Reads a raw value back.
    fn field(&self, field: &str) -> Option<&str>;

    /// Parses every field, collecting all problems rather than stopping at the first.
    ///
    /// # Errors
    /// Returns the per-field messages when any field is missing or malformed.
    fn validate(&self) -> Result<Self::Output, ValidationErrors>;
}

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// An empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// True when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with a message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    fn clear_field(&mut self, field: &str) {
        self.fields.remove(field);
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    /// Returns `self` when at least one field failed.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Editable form state around a [`FormModel`].
#[derive(Debug, Clone)]
pub struct FormState<T: FormModel> {
    initial: T,
    model: T,
    dirty: bool,
    errors: ValidationErrors,
}

impl<T: FormModel + Default> Default for FormState<T> {
    fn default() -> Self {
        Self::with_model(T::default())
    }
}

impl<T: FormModel + Default> FormState<T> {
    /// A blank form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: FormModel> FormState<T> {
    /// Starts from a pre-populated model. [`FormState::reset`] returns to it.
    pub fn with_model(model: T) -> Self {
        Self {
            initial: model.clone(),
            model,
            dirty: false,
            errors: ValidationErrors::new(),
        }
    }

    /// Sets one field from its raw input value.
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if the model has no such field.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<&mut Self, FormError> {
        if !self.model.set_field(field, value.into()) {
            return Err(FormError::UnknownField {
                field: field.to_string(),
                expected: T::FIELDS.join(", "),
            });
        }
        self.errors.clear_field(field);
        self.dirty = true;
        Ok(self)
    }

    /// Builder-style [`FormState::set`].
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if the model has no such field.
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Result<Self, FormError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Sets a field only when a value is present.
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if the model has no such field.
    pub fn set_opt(
        &mut self,
        field: &str,
        value: Option<impl Into<String>>,
    ) -> Result<&mut Self, FormError> {
        match value {
            Some(value) => self.set(field, value),
            None => Ok(self),
        }
    }

    /// Current raw value of `field`.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&str> {
        self.model.field(field)
    }

    /// The model being edited.
    #[must_use]
    pub fn model(&self) -> &T {
        &self.model
    }

    /// True once any field has been set since the last reset.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Errors from the most recent [`FormState::submit`], minus fields edited since.
    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Validates the form.
    ///
    /// # Errors
    /// Returns the per-field messages; they also remain readable via
    /// [`FormState::errors`] until the offending fields are edited.
    pub fn submit(&mut self) -> Result<T::Output, ValidationErrors> {
        match self.model.validate() {
            Ok(output) => {
                self.errors = ValidationErrors::new();
                Ok(output)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Returns to the initial model and clears errors.
    pub fn reset(&mut self) {
        self.model = self.initial.clone();
        self.dirty = false;
        self.errors = ValidationErrors::new();
    }
}

pub(crate) fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn parse_date(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<NaiveDate> {
    let raw = required(errors, field, value)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "must be a date (YYYY-MM-DD)");
            None
        }
    }
}

pub(crate) fn parse_time(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<NaiveTime> {
    let raw = required(errors, field, value)?;
    let parsed = parse_clock_time(&raw);
    if parsed.is_none() {
        errors.add(field, "must be a time (HH:MM)");
    }
    parsed
}

pub(crate) fn parse_datetime(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<NaiveDateTime> {
    let raw = required(errors, field, value)?;
    let parsed = parse_local_datetime(&raw);
    if parsed.is_none() {
        errors.add(field, "must be a date and time (YYYY-MM-DDTHH:MM)");
    }
    parsed
}

pub(crate) fn parse_price(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<f64> {
    let raw = required(errors, field, value)?;
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
        _ => {
            errors.add(field, "must be a non-negative number");
            None
        }
    }
}

pub(crate) fn parse_rating(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<u8> {
    let raw = required(errors, field, value)?;
    match raw.parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => Some(rating),
        _ => {
            errors.add(field, "must be a whole number from 1 to 5");
            None
        }
    }
}

pub(crate) fn ensure_not_before<T: PartialOrd>(
    errors: &mut ValidationErrors,
    field: &str,
    start: Option<&T>,
    end: Option<&T>,
    message: &str,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add(field, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_keep_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("destination", "is required");
        errors.add("destination", "is too long");
        assert_eq!(errors.get("destination"), Some("is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validation_errors_display_is_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("startDate", "is required");
        errors.add("destination", "is required");
        assert_eq!(
            errors.to_string(),
            "destination: is required; startDate: is required"
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(|| 5), Ok(5));
        assert!(ValidationErrors::single("x", "bad").into_result(|| 5).is_err());
    }

    #[test]
    fn test_parse_helpers() {
        let mut errors = ValidationErrors::new();
        assert!(parse_price(&mut errors, "price", "-1").is_none());
        assert!(parse_rating(&mut errors, "rating", "6").is_none());
        assert!(parse_date(&mut errors, "date", "2025-13-01").is_none());
        assert_eq!(parse_price(&mut errors, "ok", " 12.50 "), Some(12.5));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("rating"), Some("must be a whole number from 1 to 5"));
    }

    #[test]
    fn test_ensure_not_before() {
        let mut errors = ValidationErrors::new();
        ensure_not_before(&mut errors, "end", Some(&2), Some(&1), "too early");
        ensure_not_before(&mut errors, "fine", Some(&1), Some(&1), "too early");
        ensure_not_before::<i32>(&mut errors, "missing", None, Some(&1), "too early");
        assert_eq!(errors.get("end"), Some("too early"));
        assert_eq!(errors.len(), 1);
    }
}
