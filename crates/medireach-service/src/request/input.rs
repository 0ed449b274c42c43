//! Caller-supplied request data and its validation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use medireach_core::error::AppError;
use medireach_core::result::AppResult;
use medireach_core::types::Coordinates;
use medireach_entity::request::{Request, RequestDetails, ResourceType, Urgency};

/// Data for a new request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequest {
    /// Requested resource.
    pub resource_type: ResourceType,
    /// Urgency level.
    pub urgency: Urgency,
    /// Free-text address. Required.
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    /// Known coordinates; when absent the location is geocoded.
    #[serde(default)]
    #[validate(custom(function = "in_range"))]
    pub coordinates: Option<Coordinates>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional descriptive details.
    #[serde(default)]
    #[validate(custom(function = "positive_units"))]
    pub details: RequestDetails,
}

impl CreateRequest {
    /// Creates input with only the required fields.
    pub fn new(resource_type: ResourceType, urgency: Urgency, location: impl Into<String>) -> Self {
        Self {
            resource_type,
            urgency,
            location: location.into(),
            coordinates: None,
            description: None,
            details: RequestDetails::default(),
        }
    }

    /// Sets known coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Trim text fields and check the input, returning the cleaned copy.
    pub fn validated(&self) -> AppResult<Self> {
        self.validate().map_err(rejected)?;
        Ok(Self {
            resource_type: self.resource_type,
            urgency: self.urgency,
            location: self.location.trim().to_string(),
            coordinates: self.coordinates,
            description: clean(self.description.as_deref()),
            details: cleaned_details(&self.details),
        })
    }
}

/// Owner changes to an editable request. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditRequest {
    /// New resource type.
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    /// New location text.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub location: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement descriptive details.
    #[serde(default)]
    #[validate(custom(function = "positive_units"))]
    pub details: Option<RequestDetails>,
}

/// An edit reduced to the fields that actually differ from the stored request.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EditDiff {
    pub resource_type: Option<ResourceType>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub details: Option<RequestDetails>,
}

impl EditDiff {
    /// Names of the changed fields, in a fixed order.
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.resource_type.is_some() {
            fields.push("resource_type".to_string());
        }
        if self.location.is_some() {
            fields.push("location".to_string());
        }
        if self.description.is_some() {
            fields.push("description".to_string());
        }
        if self.details.is_some() {
            fields.push("details".to_string());
        }
        fields
    }

    /// Whether donor matching must be recomputed.
    pub fn needs_rematch(&self) -> bool {
        self.resource_type.is_some() || self.location.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl EditRequest {
    /// Validate the edit and keep only the fields that change `current`.
    pub(crate) fn diff(&self, current: &Request) -> AppResult<EditDiff> {
        self.validate().map_err(rejected)?;

        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| *l != current.location)
            .map(str::to_string);

        let description = clean(self.description.as_deref())
            .filter(|d| current.description.as_deref() != Some(d.as_str()));

        let details = self
            .details
            .as_ref()
            .map(cleaned_details)
            .filter(|d| *d != current.details);

        Ok(EditDiff {
            resource_type: self.resource_type.filter(|t| *t != current.resource_type),
            location,
            description,
            details,
        })
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn cleaned_details(details: &RequestDetails) -> RequestDetails {
    RequestDetails {
        blood_group: clean(details.blood_group.as_deref()),
        units: details.units,
        hospital_name: clean(details.hospital_name.as_deref()),
        patient_name: clean(details.patient_name.as_deref()),
        contact_number: clean(details.contact_number.as_deref()),
    }
}

fn not_blank(location: &str) -> Result<(), ValidationError> {
    if location.trim().is_empty() {
        return Err(
            ValidationError::new("blank").with_message(Cow::Borrowed("Location is required"))
        );
    }
    Ok(())
}

fn in_range(coordinates: &Coordinates) -> Result<(), ValidationError> {
    if coordinates.is_valid() {
        return Ok(());
    }
    Err(ValidationError::new("range")
        .with_message(Cow::Owned(format!("Coordinates out of range: {coordinates}"))))
}

fn positive_units(details: &RequestDetails) -> Result<(), ValidationError> {
    match details.units {
        Some(units) if units <= 0 => Err(ValidationError::new("range")
            .with_message(Cow::Borrowed("Units must be a positive number"))),
        _ => Ok(()),
    }
}

/// Collapse validator output into one validation error, reporting the
/// first failing field in name order.
fn rejected(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let message = fields
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());
    AppError::validation(message)
}
