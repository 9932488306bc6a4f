//! Category table
//!
//! The category → (directory, size ceiling, validation rule) mapping is built once
//! at startup from [`UploadLimits`] and shared read-only (behind an `Arc`) by every
//! request. Nothing mutates it after construction.

use crate::config::UploadLimits;
use crate::error::AppError;
use crate::models::{UploadCategory, ValidationRule};

/// Everything the pipeline needs to know about one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: UploadCategory,
    pub directory: &'static str,
    pub max_bytes: u64,
    pub rule: ValidationRule,
}

#[derive(Debug, Clone)]
pub struct CategoryTable {
    specs: [CategorySpec; 6],
}

impl CategoryTable {
    /// Build the table, rejecting zero ceilings or empty directories.
    pub fn new(limits: &UploadLimits) -> Result<Self, AppError> {
        // ALL lists every category at its own index
        let specs = UploadCategory::ALL.map(|category| CategorySpec {
            category,
            directory: category.directory(),
            max_bytes: limits.max_bytes_for(category),
            rule: category.rule(),
        });

        for spec in &specs {
            if spec.directory.is_empty() {
                return Err(AppError::Configuration(format!(
                    "Upload category '{}' has no storage directory",
                    spec.category
                )));
            }
            if spec.max_bytes == 0 {
                return Err(AppError::Configuration(format!(
                    "Upload category '{}' must have a positive size ceiling",
                    spec.category
                )));
            }
        }

        Ok(Self { specs })
    }

    pub fn get(&self, category: UploadCategory) -> &CategorySpec {
        &self.specs[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.specs.iter()
    }

    /// Largest single-file ceiling across all categories.
    pub fn largest_ceiling(&self) -> u64 {
        self.specs.iter().map(|s| s.max_bytes).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIB;

    #[test]
    fn test_default_ceilings() {
        let table = CategoryTable::new(&UploadLimits::default()).unwrap();
        assert_eq!(table.get(UploadCategory::Image).max_bytes, 10 * MIB);
        assert_eq!(table.get(UploadCategory::Receipt).max_bytes, 10 * MIB);
        assert_eq!(table.get(UploadCategory::Avatar).max_bytes, 5 * MIB);
        assert_eq!(table.get(UploadCategory::Document).max_bytes, 50 * MIB);
        assert_eq!(table.get(UploadCategory::Video).max_bytes, 500 * MIB);
        assert_eq!(table.get(UploadCategory::Generic).max_bytes, 100 * MIB);
        assert_eq!(table.largest_ceiling(), 500 * MIB);
    }

    #[test]
    fn test_lookup_matches_category() {
        let table = CategoryTable::new(&UploadLimits::default()).unwrap();
        for category in UploadCategory::ALL {
            let spec = table.get(category);
            assert_eq!(spec.category, category);
            assert_eq!(spec.directory, category.directory());
        }
        assert_eq!(table.iter().count(), 6);
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let limits = UploadLimits {
            avatar_max_bytes: 0,
            ..UploadLimits::default()
        };
        let err = CategoryTable::new(&limits).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("avatar"));
    }
}
