use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm"];

/// Upload category
///
/// Each category maps to exactly one storage directory, one size ceiling and
/// one validation rule. The set is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    Image,
    Document,
    Video,
    Receipt,
    Avatar,
    Generic,
}

impl UploadCategory {
    pub const ALL: [UploadCategory; 6] = [
        UploadCategory::Image,
        UploadCategory::Document,
        UploadCategory::Video,
        UploadCategory::Receipt,
        UploadCategory::Avatar,
        UploadCategory::Generic,
    ];

    /// Position of this category in [`UploadCategory::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            UploadCategory::Image => 0,
            UploadCategory::Document => 1,
            UploadCategory::Video => 2,
            UploadCategory::Receipt => 3,
            UploadCategory::Avatar => 4,
            UploadCategory::Generic => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Image => "image",
            UploadCategory::Document => "document",
            UploadCategory::Video => "video",
            UploadCategory::Receipt => "receipt",
            UploadCategory::Avatar => "avatar",
            UploadCategory::Generic => "generic",
        }
    }

    /// Directory name under the upload root. Also the category segment of public URLs.
    pub fn directory(&self) -> &'static str {
        match self {
            UploadCategory::Image => "images",
            UploadCategory::Document => "documents",
            UploadCategory::Video => "videos",
            UploadCategory::Receipt => "receipts",
            UploadCategory::Avatar => "avatars",
            UploadCategory::Generic => "temp",
        }
    }

    /// Validation rule applied to files uploaded into this category.
    pub fn rule(&self) -> ValidationRule {
        match self {
            UploadCategory::Image | UploadCategory::Avatar | UploadCategory::Receipt => {
                ValidationRule {
                    label: "image",
                    extensions: IMAGE_EXTENSIONS,
                    mime: MimeRule::Subtype("image"),
                }
            }
            UploadCategory::Document => ValidationRule {
                label: "document",
                extensions: DOCUMENT_EXTENSIONS,
                mime: MimeRule::Unchecked,
            },
            UploadCategory::Video => ValidationRule {
                label: "video",
                extensions: VIDEO_EXTENSIONS,
                mime: MimeRule::Prefix("video"),
            },
            UploadCategory::Generic => ValidationRule::UNRESTRICTED,
        }
    }
}

impl FromStr for UploadCategory {
    type Err = anyhow::Error;

    /// Accepts either the category name (`avatar`) or its directory (`avatars`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.to_lowercase();
        UploadCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle || c.directory() == needle)
            .ok_or_else(|| anyhow::anyhow!("Invalid upload category: {}", s))
    }
}

impl Display for UploadCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// How the declared MIME type of an upload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeRule {
    /// MIME type is not inspected.
    Unchecked,
    /// MIME type must be `{top_level}/{subtype}` where the subtype is one of the
    /// rule's allowed extensions.
    Subtype(&'static str),
    /// MIME type must start with the given prefix.
    Prefix(&'static str),
}

/// Extension and MIME acceptance policy for a category.
///
/// An empty extension list together with [`MimeRule::Unchecked`] accepts any file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRule {
    /// Human-readable kind used in rejection messages ("image", "document", ...).
    pub label: &'static str,
    pub extensions: &'static [&'static str],
    pub mime: MimeRule,
}

impl ValidationRule {
    pub const UNRESTRICTED: ValidationRule = ValidationRule {
        label: "any",
        extensions: &[],
        mime: MimeRule::Unchecked,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_directory() {
        for category in UploadCategory::ALL {
            assert!(!category.directory().is_empty());
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (position, category) in UploadCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), position, "{} out of place", category);
        }
    }

    #[test]
    fn test_from_str_accepts_name_and_directory() {
        assert_eq!(
            "avatar".parse::<UploadCategory>().unwrap(),
            UploadCategory::Avatar
        );
        assert_eq!(
            "avatars".parse::<UploadCategory>().unwrap(),
            UploadCategory::Avatar
        );
        assert_eq!(
            "TEMP".parse::<UploadCategory>().unwrap(),
            UploadCategory::Generic
        );
        assert!("contacts".parse::<UploadCategory>().is_err());
    }

    #[test]
    fn test_image_like_categories_share_rule() {
        assert_eq!(UploadCategory::Image.rule(), UploadCategory::Avatar.rule());
        assert_eq!(UploadCategory::Image.rule(), UploadCategory::Receipt.rule());
        assert_eq!(
            UploadCategory::Image.rule().mime,
            MimeRule::Subtype("image")
        );
    }

    #[test]
    fn test_generic_rule_is_unrestricted() {
        assert_eq!(UploadCategory::Generic.rule(), ValidationRule::UNRESTRICTED);
        assert_ne!(UploadCategory::Document.rule(), ValidationRule::UNRESTRICTED);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UploadCategory::Receipt).unwrap();
        assert_eq!(json, "\"receipt\"");
    }
}
