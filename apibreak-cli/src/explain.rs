//! Category explanations for the `apibreak explain` command.
//!
//! Adds to each row of the category table what the category does to a request and a
//! response, and a sample definition to paste into a profile.

use apibreak_types::{Category, CategoryInfo};

/// Explanation of one breaking category.
#[derive(Debug, Clone)]
pub struct CategoryExplanation {
    pub category: Category,
    /// Effect on the inbound request.
    pub request_effect: &'static str,
    /// Effect on the outbound response.
    pub response_effect: &'static str,
    /// Sample `definitions` entry for a profile file.
    pub example: &'static str,
}

impl CategoryExplanation {
    pub fn info(&self) -> &'static CategoryInfo {
        self.category.info()
    }
}

pub static EXPLANATIONS: &[CategoryExplanation] = &[
    CategoryExplanation {
        category: Category::FieldRename,
        request_effect: r#"A top-level field still using an old name is rejected with 400:

    { "error": "Unknown field: min_price", "code": "UNKNOWN_FIELD", "field": "min_price" }

Otherwise old names are renamed to new names at every depth, including inside
array elements, before the route sees the body."#,
        response_effect: "None.",
        example: r#""FIELD_RENAME": { "mapping": { "minPrice": "min_price" } }"#,
    },
    CategoryExplanation {
        category: Category::RequiredField,
        request_effect: r#"After renaming, the configured top-level field must be present and not null.
Falsy values such as 0, "" and false are accepted. A missing field is rejected
with 400:

    { "error": "limit is required", "code": "REQUIRED_FIELD_MISSING", "field": "limit" }"#,
        response_effect: "None.",
        example: r#""REQUIRED_FIELD": { "field": "limit", "type": "number" }"#,
    },
    CategoryExplanation {
        category: Category::StatusCode,
        request_effect: "None.",
        response_effect: r#"Any 2xx success status is replaced by the configured code. Non-2xx statuses
are left alone. The configured code must itself be 2xx."#,
        example: r#""STATUS_CODE": { "successCode": 218 }"#,
    },
    CategoryExplanation {
        category: Category::ResponseStructure,
        request_effect: "None.",
        response_effect: r#"The response body is nested under the configured key:

    [1, 2, 3]  becomes  { "data": [1, 2, 3] }"#,
        example: r#""RESPONSE_STRUCTURE": { "wrapKey": "data" }"#,
    },
    CategoryExplanation {
        category: Category::EnumValueChange,
        request_effect: "None (reserved).",
        response_effect: "None (reserved).",
        example: r#""ENUM_VALUE_CHANGE": {}"#,
    },
    CategoryExplanation {
        category: Category::TypeChange,
        request_effect: "None (reserved).",
        response_effect: "None (reserved).",
        example: r#""TYPE_CHANGE": {}"#,
    },
];

/// Look up a category by wire name, accepting `field-rename`, `field_rename` or `FIELD_RENAME`.
pub fn lookup_category(query: &str) -> Option<&'static CategoryExplanation> {
    let normalized = query.trim().replace('-', "_");
    let category: Category = normalized.parse().ok()?;
    EXPLANATIONS.iter().find(|e| e.category == category)
}

pub fn list_category_keys() -> Vec<&'static str> {
    EXPLANATIONS.iter().map(|e| e.category.as_str()).collect()
}

pub fn format_implemented(implemented: bool) -> &'static str {
    if implemented { "active" } else { "reserved" }
}
