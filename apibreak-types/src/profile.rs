use crate::category::Category;
use crate::definition::{Definition, DefinitionError};
use crate::endpoint::{EndpointKey, EndpointKeyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-endpoint declaration as written on disk.
///
/// ```json
/// {
///   "method": "GET",
///   "path": "/categories/:id/sales-stats",
///   "availableCategories": ["STATUS_CODE", "RESPONSE_STRUCTURE"],
///   "definitions": {
///     "STATUS_CODE": { "successCode": 218 },
///     "RESPONSE_STRUCTURE": { "wrapKey": "data" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDecl {
    pub method: String,
    pub path: String,

    #[serde(default)]
    pub available_categories: Vec<String>,

    #[serde(default)]
    pub definitions: BTreeMap<String, serde_json::Value>,
}

/// A configuration problem found while turning a declaration into a profile.
///
/// These never fail a load; the affected category simply behaves as identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDiagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub message: String,
}

/// An endpoint's available categories and their parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointBreakingProfile {
    pub key: EndpointKey,

    /// Deduplicated, in canonical category order.
    pub available: Vec<Category>,

    /// Only categories that are both available and well-formed appear here.
    pub definitions: BTreeMap<Category, Definition>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ProfileDiagnostic>,
}

impl EndpointBreakingProfile {
    /// A profile with nothing available; handlers built from it are inert.
    pub fn empty(key: EndpointKey) -> Self {
        Self {
            key,
            available: Vec::new(),
            definitions: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Mark `category` available without a definition.
    pub fn with_category(mut self, category: Category) -> Self {
        if !self.available.contains(&category) {
            self.available.push(category);
            self.available.sort();
        }
        self
    }

    /// Mark the definition's category available and attach the definition.
    pub fn with_definition(self, definition: Definition) -> Self {
        let category = definition.category();
        let mut out = self.with_category(category);
        out.definitions.insert(category, definition);
        out
    }

    pub fn is_available(&self, category: Category) -> bool {
        self.available.contains(&category)
    }

    pub fn definition(&self, category: Category) -> Option<&Definition> {
        self.definitions.get(&category)
    }

    /// Build a profile from its declaration.
    ///
    /// Only an unusable endpoint key is an error. Unknown categories, malformed
    /// definitions and definitions for categories that aren't available become
    /// diagnostics.
    pub fn from_decl(decl: &ProfileDecl) -> Result<Self, EndpointKeyError> {
        let key = EndpointKey::parse(&decl.method, &decl.path)?;
        let mut profile = Self::empty(key);

        for raw in &decl.available_categories {
            match raw.parse::<Category>() {
                Ok(category) => profile = profile.with_category(category),
                Err(e) => profile.diagnostics.push(ProfileDiagnostic {
                    category: None,
                    message: e.to_string(),
                }),
            }
        }

        for (raw, params) in &decl.definitions {
            let category = match raw.parse::<Category>() {
                Ok(c) => c,
                Err(e) => {
                    profile.diagnostics.push(ProfileDiagnostic {
                        category: None,
                        message: format!("definitions: {e}"),
                    });
                    continue;
                }
            };

            if !profile.is_available(category) {
                profile.diagnostics.push(ProfileDiagnostic {
                    category: Some(category),
                    message: format!("definition for {category} ignored: category is not available"),
                });
                continue;
            }

            match Definition::from_params(category, params) {
                Ok(def) => {
                    profile.definitions.insert(category, def);
                }
                // Declaring params for a category without a transform is harmless.
                Err(DefinitionError::NotImplemented(_)) => {}
                Err(e) => profile.diagnostics.push(ProfileDiagnostic {
                    category: Some(category),
                    message: e.to_string(),
                }),
            }
        }

        for &category in &profile.available {
            if category.has_transform() && !profile.definitions.contains_key(&category) {
                let already_reported = profile
                    .diagnostics
                    .iter()
                    .any(|d| d.category == Some(category));
                if !already_reported {
                    profile.diagnostics.push(ProfileDiagnostic {
                        category: Some(category),
                        message: format!("{category} is available but has no definition"),
                    });
                }
            }
        }

        Ok(profile)
    }
}
