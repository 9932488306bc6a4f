use bizdesk_core::constants::MIB;
use bizdesk_core::models::file_extension;
use bizdesk_core::{CategorySpec, MimeRule, UploadCategory, ValidationRule};

/// Validation errors for uploaded files
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Only {label} files are allowed ({allowed})")]
    UnsupportedFileType {
        label: &'static str,
        allowed: String,
    },

    #[error("File too large: {category} uploads are limited to {}", human_size(.max))]
    FileTooLarge { category: UploadCategory, max: u64 },
}

fn human_size(bytes: &u64) -> String {
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Per-category content validator
///
/// Decides accept/reject from the declared MIME type and the original filename
/// alone, so a rejected file never reaches storage. The size ceiling is
/// enforced by the storage writer while bytes stream in; [`CategoryValidator::too_large`]
/// builds the matching rejection.
#[derive(Debug, Clone, Copy)]
pub struct CategoryValidator {
    category: UploadCategory,
    max_bytes: u64,
    rule: ValidationRule,
}

impl CategoryValidator {
    pub fn new(spec: &CategorySpec) -> Self {
        Self {
            category: spec.category,
            max_bytes: spec.max_bytes,
            rule: spec.rule,
        }
    }

    pub fn for_category(category: UploadCategory, max_bytes: u64) -> Self {
        Self {
            category,
            max_bytes,
            rule: category.rule(),
        }
    }

    pub fn category(&self) -> UploadCategory {
        self.category
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn rejection(&self) -> ValidationError {
        ValidationError::UnsupportedFileType {
            label: self.rule.label,
            allowed: self.rule.extensions.join(", "),
        }
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        if self.rule.extensions.is_empty() {
            return Ok(());
        }

        match file_extension(filename) {
            Some(ext) if self.rule.extensions.contains(&ext.as_str()) => Ok(()),
            _ => Err(self.rejection()),
        }
    }

    /// Validate content type
    ///
    /// Parameters (`; charset=...`) are ignored and the comparison is
    /// case-insensitive.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let accepted = match self.rule.mime {
            MimeRule::Unchecked => true,
            MimeRule::Prefix(prefix) => normalized.starts_with(prefix),
            MimeRule::Subtype(top_level) => match normalized.split_once('/') {
                Some((top, subtype)) => {
                    top == top_level && self.rule.extensions.contains(&subtype)
                }
                None => false,
            },
        };

        if accepted {
            Ok(())
        } else {
            Err(self.rejection())
        }
    }

    /// Validate extension and declared MIME type together
    pub fn validate(&self, content_type: &str, filename: &str) -> Result<(), ValidationError> {
        let result = self
            .validate_extension(filename)
            .and_then(|_| self.validate_content_type(content_type));

        if let Err(ref err) = result {
            tracing::debug!(
                category = %self.category,
                content_type = %content_type,
                error = %err,
                "Upload rejected by category rule"
            );
        }

        result
    }

    pub fn too_large(&self) -> ValidationError {
        ValidationError::FileTooLarge {
            category: self.category,
            max: self.max_bytes,
        }
    }
}
