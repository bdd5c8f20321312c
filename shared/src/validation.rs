//! Validation utilities for RIMPE Invoice forms
//!
//! Field-level rules are declared on the input structs with `validator`
//! derives; the custom rules used by those derives live here together with
//! the helper that turns `ValidationErrors` into a single user-facing failure.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

// ============================================================================
// Custom field rules
// ============================================================================

/// Reject empty or whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "This field is required"));
    }
    Ok(())
}

/// Ecuadorian RUC (13 digits) or cédula (10 digits).
///
/// Checks the shape only: digits, a province code of 01-24 or 30, and for a
/// RUC a non-zero establishment suffix.
pub fn tax_id(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", "This field is required"));
    }
    validate_tax_id(value).map_err(|msg| field_error("tax_id", msg))
}

pub fn validate_tax_id(value: &str) -> Result<(), &'static str> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("RUC/cédula must contain only digits");
    }
    if value.len() != 10 && value.len() != 13 {
        return Err("RUC must have 13 digits, cédula 10");
    }
    let province: u8 = value[..2].parse().map_err(|_| "Invalid province code")?;
    if !(1..=24).contains(&province) && province != 30 {
        return Err("Invalid province code");
    }
    if value.len() == 13 && value.ends_with("000") {
        return Err("Invalid RUC establishment number");
    }
    Ok(())
}

/// Largest price or payable amount a form accepts
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Money amounts must be strictly positive and at most [`MAX_AMOUNT`]
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(field_error("positive", "Amount must be greater than zero"));
    }
    if *value > MAX_AMOUNT {
        return Err(field_error("max_amount", "Amount is too large"));
    }
    Ok(())
}

/// Optional e-mail: empty is fine, anything else must look like an address
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    validate_email(value).map_err(|msg| field_error("email", msg))
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

// ============================================================================
// Reporting
// ============================================================================

/// The first failing field of a form, in a shape fit for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldFailure {
    /// Spanish rendition of the failure for the UI
    pub fn message_es(&self) -> String {
        match self.code.as_str() {
            "required" => format!("El campo {} es obligatorio", self.field),
            "positive" => format!("El campo {} debe ser mayor a cero", self.field),
            "range" => format!("El campo {} no puede ser negativo", self.field),
            "max_amount" => format!("El campo {} excede el monto máximo", self.field),
            "email" => "El formato del correo electrónico no es válido".to_string(),
            "tax_id" => "El RUC o cédula no es válido".to_string(),
            _ => format!("El campo {} no es válido", self.field),
        }
    }
}

/// Pick a deterministic first failure (fields sorted by name)
pub fn first_failure(errors: &ValidationErrors) -> Option<FieldFailure> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields.into_iter().find_map(|(field, errs)| {
        errs.first().map(|err| FieldFailure {
            field: field.to_string(),
            code: err.code.to_string(),
            message: err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field)),
        })
    })
}
