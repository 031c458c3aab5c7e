use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named kind of simulated API-breaking change.
///
/// The declaration order below is the canonical order used everywhere a set of
/// categories is listed (reports, active sets, CLI output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    FieldRename,
    RequiredField,
    StatusCode,
    ResponseStructure,
    EnumValueChange,
    TypeChange,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::FieldRename,
        Category::RequiredField,
        Category::StatusCode,
        Category::ResponseStructure,
        Category::EnumValueChange,
        Category::TypeChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::FieldRename => "FIELD_RENAME",
            Category::RequiredField => "REQUIRED_FIELD",
            Category::StatusCode => "STATUS_CODE",
            Category::ResponseStructure => "RESPONSE_STRUCTURE",
            Category::EnumValueChange => "ENUM_VALUE_CHANGE",
            Category::TypeChange => "TYPE_CHANGE",
        }
    }

    /// Whether the handler has a transform for this category.
    ///
    /// `ENUM_VALUE_CHANGE` and `TYPE_CHANGE` can be declared and activated but
    /// have no effect on requests or responses.
    pub fn has_transform(self) -> bool {
        self.info().implemented
    }

    /// Position in `ALL` and in `CATEGORY_TABLE`.
    pub fn index(self) -> usize {
        match self {
            Category::FieldRename => 0,
            Category::RequiredField => 1,
            Category::StatusCode => 2,
            Category::ResponseStructure => 3,
            Category::EnumValueChange => 4,
            Category::TypeChange => 5,
        }
    }

    pub fn info(self) -> &'static CategoryInfo {
        &CATEGORY_TABLE[self.index()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown breaking category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One row of the fixed category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub title: &'static str,
    pub description: &'static str,
    /// Parameters the definition for this category carries (wire names).
    pub params: &'static [&'static str],
    pub implemented: bool,
}

/// The six-entry category table.
pub static CATEGORY_TABLE: [CategoryInfo; 6] = [
    CategoryInfo {
        category: Category::FieldRename,
        title: "Field rename",
        description: "Request fields are renamed; the previous names are rejected as unknown fields.",
        params: &["mapping"],
        implemented: true,
    },
    CategoryInfo {
        category: Category::RequiredField,
        title: "Required field",
        description: "A previously optional request field becomes mandatory.",
        params: &["field", "type"],
        implemented: true,
    },
    CategoryInfo {
        category: Category::StatusCode,
        title: "Status code",
        description: "Successful responses use an alternate 2xx status code.",
        params: &["successCode"],
        implemented: true,
    },
    CategoryInfo {
        category: Category::ResponseStructure,
        title: "Response structure",
        description: "Response payloads are nested under a single wrap key.",
        params: &["wrapKey"],
        implemented: true,
    },
    CategoryInfo {
        category: Category::EnumValueChange,
        title: "Enum value change",
        description: "Enumerated values change spelling or membership.",
        params: &[],
        implemented: false,
    },
    CategoryInfo {
        category: Category::TypeChange,
        title: "Type change",
        description: "A field changes its JSON type.",
        params: &[],
        implemented: false,
    },
];
