//! Application services.
//!
//! Each service borrows the repository and configuration for the duration of
//! one request, validates its input into `FieldErrors`, and only then touches
//! storage. Handlers stay thin: extract, call a service, map to a response.

pub mod accounts;
pub mod blog;
pub mod roles;

use crate::{error::FieldErrors, slug};

pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_URL: &str = "Enter a valid URL.";
pub const INVALID_SLUG: &str =
    "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.";

pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Same wording as a unique-constraint violation reported by the repository.
pub fn already_exists(entity: &str, field: &str) -> String {
    format!("{entity} with this {field} already exists.")
}

/// Records an error when `value` exceeds `max` characters.
pub fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(field, too_long(max));
    }
}

/// Required, non-blank, bounded text.
pub fn check_required(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(field, BLANK);
    } else {
        check_max_len(errors, field, value, max);
    }
}

/// Required slug: non-blank, bounded, restricted charset.
pub fn check_slug(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.is_empty() {
        errors.push(field, BLANK);
        return;
    }
    if !slug::is_valid_slug(value) {
        errors.push(field, INVALID_SLUG);
    }
    check_max_len(errors, field, value, max);
}

/// Optional URL: empty is allowed, anything else must be http(s).
pub fn check_url(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.is_empty() {
        return;
    }
    let valid = ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.chars().any(char::is_whitespace))
    });
    if !valid {
        errors.push(field, INVALID_URL);
    }
    check_max_len(errors, field, value, max);
}

