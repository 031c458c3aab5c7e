//! Per-category transform parameters.
//!
//! Declarations carry definitions as loose JSON objects keyed by category name.
//! [`Definition::from_params`] turns one of those objects into a typed value or
//! explains why it can't; callers decide whether that is fatal (it never is at
//! request time).

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{category} definition is malformed: {message}")]
    Malformed { category: Category, message: String },

    #[error("{0} has no transform and takes no definition")]
    NotImplemented(Category),
}

/// `FIELD_RENAME`: new-name → old-name table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRenameDef {
    mapping: BTreeMap<String, String>,

    #[serde(skip)]
    by_old: BTreeMap<String, String>,
}

impl FieldRenameDef {
    /// Build from `new → old` pairs. Old names must be unique and non-empty.
    pub fn new(mapping: BTreeMap<String, String>) -> Result<Self, DefinitionError> {
        let malformed = |message: String| DefinitionError::Malformed {
            category: Category::FieldRename,
            message,
        };

        if mapping.is_empty() {
            return Err(malformed("mapping is empty".to_string()));
        }

        let mut by_old = BTreeMap::new();
        for (new_name, old_name) in &mapping {
            if new_name.is_empty() || old_name.is_empty() {
                return Err(malformed("field names must be non-empty".to_string()));
            }
            if let Some(prev) = by_old.insert(old_name.clone(), new_name.clone()) {
                return Err(malformed(format!(
                    "old name '{old_name}' is mapped by both '{prev}' and '{new_name}'"
                )));
            }
        }

        Ok(Self { mapping, by_old })
    }

    /// `new → old` pairs in sorted new-name order.
    pub fn mapping(&self) -> &BTreeMap<String, String> {
        &self.mapping
    }

    pub fn is_old_name(&self, key: &str) -> bool {
        self.by_old.contains_key(key)
    }

    pub fn new_name_for(&self, old_name: &str) -> Option<&str> {
        self.by_old.get(old_name).map(String::as_str)
    }
}

/// `REQUIRED_FIELD`: a field that must be present and non-null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredFieldDef {
    pub field: String,

    /// Declared JSON type, informational only.
    #[serde(rename = "type", default = "default_field_type")]
    pub expected_type: String,
}

fn default_field_type() -> String {
    "any".to_string()
}

/// `STATUS_CODE`: replacement for 2xx statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCodeDef {
    pub success_code: u16,
}

/// `RESPONSE_STRUCTURE`: the key the payload is nested under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStructureDef {
    pub wrap_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Definition {
    FieldRename(FieldRenameDef),
    RequiredField(RequiredFieldDef),
    StatusCode(StatusCodeDef),
    ResponseStructure(ResponseStructureDef),
}

#[derive(Deserialize)]
struct RawFieldRename {
    mapping: BTreeMap<String, String>,
}

impl Definition {
    pub fn category(&self) -> Category {
        match self {
            Definition::FieldRename(_) => Category::FieldRename,
            Definition::RequiredField(_) => Category::RequiredField,
            Definition::StatusCode(_) => Category::StatusCode,
            Definition::ResponseStructure(_) => Category::ResponseStructure,
        }
    }

    pub fn from_params(
        category: Category,
        params: &serde_json::Value,
    ) -> Result<Definition, DefinitionError> {
        let malformed = |message: String| DefinitionError::Malformed { category, message };

        match category {
            Category::FieldRename => {
                let raw: RawFieldRename = serde_json::from_value(params.clone())
                    .map_err(|e| malformed(e.to_string()))?;
                FieldRenameDef::new(raw.mapping).map(Definition::FieldRename)
            }
            Category::RequiredField => {
                let def: RequiredFieldDef = serde_json::from_value(params.clone())
                    .map_err(|e| malformed(e.to_string()))?;
                if def.field.trim().is_empty() {
                    return Err(malformed("field is empty".to_string()));
                }
                Ok(Definition::RequiredField(def))
            }
            Category::StatusCode => {
                let def: StatusCodeDef = serde_json::from_value(params.clone())
                    .map_err(|e| malformed(e.to_string()))?;
                if !(200..300).contains(&def.success_code) {
                    return Err(malformed(format!(
                        "successCode {} is not a 2xx status",
                        def.success_code
                    )));
                }
                Ok(Definition::StatusCode(def))
            }
            Category::ResponseStructure => {
                let def: ResponseStructureDef = serde_json::from_value(params.clone())
                    .map_err(|e| malformed(e.to_string()))?;
                if def.wrap_key.is_empty() {
                    return Err(malformed("wrapKey is empty".to_string()));
                }
                Ok(Definition::ResponseStructure(def))
            }
            Category::EnumValueChange | Category::TypeChange => {
                Err(DefinitionError::NotImplemented(category))
            }
        }
    }

    pub fn as_field_rename(&self) -> Option<&FieldRenameDef> {
        match self {
            Definition::FieldRename(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_required_field(&self) -> Option<&RequiredFieldDef> {
        match self {
            Definition::RequiredField(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_status_code(&self) -> Option<&StatusCodeDef> {
        match self {
            Definition::StatusCode(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_response_structure(&self) -> Option<&ResponseStructureDef> {
        match self {
            Definition::ResponseStructure(def) => Some(def),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_rename_builds_reverse_lookup() {
        let def = Definition::from_params(
            Category::FieldRename,
            &json!({ "mapping": { "categoryId": "category_id", "minPrice": "min_price" } }),
        )
        .expect("parse");
        let rename = def.as_field_rename().expect("field rename");
        assert!(rename.is_old_name("category_id"));
        assert!(!rename.is_old_name("categoryId"));
        assert_eq!(rename.new_name_for("min_price"), Some("minPrice"));
    }

    #[test]
    fn field_rename_rejects_duplicate_old_names() {
        let err = Definition::from_params(
            Category::FieldRename,
            &json!({ "mapping": { "a": "x", "b": "x" } }),
        )
        .expect_err("duplicate old name");
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn field_rename_without_mapping_is_malformed() {
        let err = Definition::from_params(Category::FieldRename, &json!({}))
            .expect_err("missing mapping");
        assert!(matches!(err, DefinitionError::Malformed { .. }));

        let err = Definition::from_params(Category::FieldRename, &json!({ "mapping": {} }))
            .expect_err("empty mapping");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn required_field_type_defaults_to_any() {
        let def = Definition::from_params(Category::RequiredField, &json!({ "field": "limit" }))
            .expect("parse");
        let req = def.as_required_field().expect("required field");
        assert_eq!(req.field, "limit");
        assert_eq!(req.expected_type, "any");
    }

    #[test]
    fn status_code_must_be_2xx() {
        let ok = Definition::from_params(Category::StatusCode, &json!({ "successCode": 218 }))
            .expect("parse");
        assert_eq!(ok.as_status_code().map(|d| d.success_code), Some(218));

        let err = Definition::from_params(Category::StatusCode, &json!({ "successCode": 404 }))
            .expect_err("non-2xx");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn response_structure_needs_wrap_key() {
        let ok = Definition::from_params(
            Category::ResponseStructure,
            &json!({ "wrapKey": "data" }),
        )
        .expect("parse");
        assert_eq!(ok.category(), Category::ResponseStructure);

        assert!(
            Definition::from_params(Category::ResponseStructure, &json!({ "wrapKey": "" }))
                .is_err()
        );
    }

    #[test]
    fn unimplemented_categories_reject_definitions() {
        let err = Definition::from_params(Category::TypeChange, &json!({}))
            .expect_err("no transform");
        assert_eq!(err, DefinitionError::NotImplemented(Category::TypeChange));
    }
}
