//! Shared validation utilities
//!
//! Form input is checked here before any service touches the database.
//!
//! ```rust,ignore
//! use chocohub_server::features::shared::validation::{validate_text, validate_filename};
//!
//! validate_text(&command.title, "title", MAX_TITLE_LENGTH)?;
//! validate_filename(&model.uvl_filename)?;
//! ```

use thiserror::Error;

/// Errors from free-text field validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

/// Errors from uploaded file name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    #[error("File name is required")]
    Required,

    #[error("File name '{0}' must be a plain name without path separators")]
    NotPlain(String),

    #[error("File name '{0}' must have the .uvl extension")]
    WrongExtension(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field} '{value}' is not a valid DOI")]
pub struct DoiValidationError {
    pub field: &'static str,
    pub value: String,
}

/// Validate a required text field
///
/// Whitespace-only input counts as empty. Length is measured in characters.
pub fn validate_text(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Required { field });
    }

    if value.chars().count() > max_length {
        return Err(TextValidationError::TooLong { field, max_length });
    }

    Ok(())
}

/// Validate the name of a file staged in a user's temp folder
///
/// The name is joined onto the temp folder, so anything that could escape
/// it (separators, `..`) is rejected.
pub fn validate_filename(name: &str) -> Result<(), FilenameValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FilenameValidationError::Required);
    }

    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(FilenameValidationError::NotPlain(name.to_string()));
    }

    if !trimmed.to_ascii_lowercase().ends_with(".uvl") {
        return Err(FilenameValidationError::WrongExtension(name.to_string()));
    }

    Ok(())
}

/// Validate an optional DOI (`10.<registrant>/<suffix>`)
pub fn validate_doi(value: Option<&str>, field: &'static str) -> Result<(), DoiValidationError> {
    let Some(doi) = value.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(());
    };

    let valid = doi
        .strip_prefix("10.")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(registrant, suffix)| !registrant.is_empty() && !suffix.is_empty());

    if valid {
        Ok(())
    } else {
        Err(DoiValidationError {
            field,
            value: doi.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("Dataset", "title", 10).is_ok());
        assert_eq!(
            validate_text("   ", "title", 10),
            Err(TextValidationError::Required { field: "title" })
        );
        assert!(matches!(
            validate_text("a very long title", "title", 5),
            Err(TextValidationError::TooLong { max_length: 5, .. })
        ));
        // multi-byte characters count once
        assert!(validate_text("ééééé", "title", 5).is_ok());
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("model.uvl").is_ok());
        assert!(validate_filename("Model.UVL").is_ok());
        assert_eq!(validate_filename(""), Err(FilenameValidationError::Required));
        assert!(matches!(
            validate_filename("../etc/passwd.uvl"),
            Err(FilenameValidationError::NotPlain(_))
        ));
        assert!(matches!(
            validate_filename("dir\\model.uvl"),
            Err(FilenameValidationError::NotPlain(_))
        ));
        assert!(matches!(
            validate_filename("model.txt"),
            Err(FilenameValidationError::WrongExtension(_))
        ));
    }

    #[test]
    fn test_validate_doi() {
        assert!(validate_doi(None, "publication_doi").is_ok());
        assert!(validate_doi(Some(""), "publication_doi").is_ok());
        assert!(validate_doi(Some("10.1234/foo.bar"), "publication_doi").is_ok());
        assert!(validate_doi(Some("doi:10.1234"), "publication_doi").is_err());
        assert!(validate_doi(Some("10./x"), "publication_doi").is_err());
    }
}
