use crate::activation::ActiveSet;
use crate::ports::ResponseSink;
use crate::walk::{has_top_level_key, rename_keys};
use apibreak_types::{
    Category, ContractViolation, Definition, EndpointBreakingProfile, EndpointKey,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status and body after breaking transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalResponse {
    pub status: u16,
    pub body: Value,
}

/// Per-request transform engine bound to one endpoint's profile and active set.
///
/// Route code must call, in order: [`check_deprecated_fields`](Self::check_deprecated_fields)
/// on the raw input, [`transform_request`](Self::transform_request),
/// [`check_required_field`](Self::check_required_field) on the transformed body, its own
/// logic, then [`send_response`](Self::send_response). `send_response` consumes the handler.
#[derive(Debug)]
pub struct BreakingHandler {
    profile: Arc<EndpointBreakingProfile>,
    active: ActiveSet,
}

impl BreakingHandler {
    /// Only categories that are both available and active are kept.
    pub fn new(profile: Arc<EndpointBreakingProfile>, active: &ActiveSet) -> Self {
        let active = active
            .iter()
            .copied()
            .filter(|c| profile.is_available(*c))
            .collect();
        Self { profile, active }
    }

    /// A handler that never changes anything, for endpoints without a profile.
    pub fn inert(key: EndpointKey) -> Self {
        Self {
            profile: Arc::new(EndpointBreakingProfile::empty(key)),
            active: ActiveSet::new(),
        }
    }

    pub fn key(&self) -> &EndpointKey {
        &self.profile.key
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.active.contains(&category)
    }

    /// The definition for `category` if it is active; inactive definitions are invisible.
    pub fn get_def(&self, category: Category) -> Option<&Definition> {
        if !self.is_active(category) {
            return None;
        }
        self.profile.definition(category)
    }

    /// Like `get_def`, but an active category without a usable definition is logged.
    fn active_def(&self, category: Category) -> Option<&Definition> {
        if !self.is_active(category) {
            return None;
        }
        let def = self.profile.definition(category);
        if def.is_none() {
            warn!(
                endpoint = %self.profile.key,
                category = category.as_str(),
                "active category has no usable definition; leaving payload unchanged"
            );
        }
        def
    }

    /// Reject raw input that still uses a pre-rename field name at its top level.
    pub fn check_deprecated_fields(&self, input: &Value) -> Option<ContractViolation> {
        let rename = self
            .active_def(Category::FieldRename)
            .and_then(Definition::as_field_rename)?;
        let hit = has_top_level_key(input, rename.mapping().values().map(String::as_str))?;
        debug!(endpoint = %self.profile.key, field = hit, "deprecated field in request");
        Some(ContractViolation::unknown_field(hit))
    }

    /// Rename old field names to new ones at every depth. Identity unless `FIELD_RENAME` is active.
    pub fn transform_request(&self, input: Value) -> Value {
        let Some(rename) = self
            .active_def(Category::FieldRename)
            .and_then(Definition::as_field_rename)
        else {
            return input;
        };
        rename_keys(input, &|k: &str| rename.new_name_for(k).map(str::to_string))
    }

    /// Require the configured field on the already-renamed body. `null` counts as missing.
    pub fn check_required_field(&self, body: &Value) -> Option<ContractViolation> {
        let required = self
            .active_def(Category::RequiredField)
            .and_then(Definition::as_required_field)?;
        match body.get(&required.field) {
            Some(v) if !v.is_null() => None,
            _ => {
                debug!(endpoint = %self.profile.key, field = %required.field, "required field missing");
                Some(ContractViolation::required_field_missing(&required.field))
            }
        }
    }

    /// Apply `STATUS_CODE` and `RESPONSE_STRUCTURE` to a successful result.
    pub fn finalize(&self, data: Value, status: u16) -> FinalResponse {
        let mut status_out = status;
        if (200..300).contains(&status)
            && let Some(def) = self
                .active_def(Category::StatusCode)
                .and_then(Definition::as_status_code)
        {
            status_out = def.success_code;
        }

        let body = match self
            .active_def(Category::ResponseStructure)
            .and_then(Definition::as_response_structure)
        {
            Some(def) => {
                let mut wrapped = serde_json::Map::new();
                wrapped.insert(def.wrap_key.clone(), data);
                Value::Object(wrapped)
            }
            None => data,
        };

        FinalResponse {
            status: status_out,
            body,
        }
    }

    /// Finalize and write the response, returning the status written.
    ///
    /// Consumes the handler, so it happens once per request:
    ///
    /// ```compile_fail
    /// use apibreak_domain::{BreakingHandler, RecordedResponse};
    /// use serde_json::json;
    ///
    /// let handler = BreakingHandler::inert("GET /orders".parse().unwrap());
    /// let mut sink = RecordedResponse::new();
    /// handler.send_response(&mut sink, json!({}), 200);
    /// handler.send_response(&mut sink, json!({}), 200);
    /// ```
    pub fn send_response(self, sink: &mut dyn ResponseSink, data: Value, status: u16) -> u16 {
        let out = self.finalize(data, status);
        if out.status != status {
            debug!(endpoint = %self.profile.key, from = status, to = out.status, "status code substituted");
        }
        sink.send(out.status, out.body);
        out.status
    }

    /// `send_response` with the default 200 status.
    pub fn send_ok(self, sink: &mut dyn ResponseSink, data: Value) -> u16 {
        self.send_response(sink, data, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RecordedResponse;
    use pretty_assertions::assert_eq;
    use apibreak_types::{
        FieldRenameDef, RequiredFieldDef, ResponseStructureDef, StatusCodeDef,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn key() -> EndpointKey {
        "POST /products/search".parse().expect("key")
    }

    fn rename_def() -> Definition {
        let mut mapping = BTreeMap::new();
        mapping.insert("categoryId".to_string(), "category_id".to_string());
        mapping.insert("minPrice".to_string(), "min_price".to_string());
        Definition::FieldRename(FieldRenameDef::new(mapping).expect("mapping"))
    }

    fn full_profile() -> Arc<EndpointBreakingProfile> {
        Arc::new(
            EndpointBreakingProfile::empty(key())
                .with_definition(rename_def())
                .with_definition(Definition::RequiredField(RequiredFieldDef {
                    field: "limit".to_string(),
                    expected_type: "number".to_string(),
                }))
                .with_definition(Definition::StatusCode(StatusCodeDef { success_code: 218 }))
                .with_definition(Definition::ResponseStructure(ResponseStructureDef {
                    wrap_key: "data".to_string(),
                })),
        )
    }

    fn handler(active: &[Category]) -> BreakingHandler {
        BreakingHandler::new(full_profile(), &active.iter().copied().collect())
    }

    #[test]
    fn active_set_is_intersected_with_available() {
        let profile = Arc::new(
            EndpointBreakingProfile::empty(key()).with_category(Category::StatusCode),
        );
        let h = BreakingHandler::new(
            profile,
            &[Category::StatusCode, Category::FieldRename].into_iter().collect(),
        );
        assert!(h.is_active(Category::StatusCode));
        assert!(!h.is_active(Category::FieldRename));
    }

    #[test]
    fn get_def_hides_inactive_definitions() {
        let h = handler(&[Category::StatusCode]);
        assert!(h.get_def(Category::StatusCode).is_some());
        assert!(h.get_def(Category::FieldRename).is_none());
        assert!(h.get_def(Category::ResponseStructure).is_none());
    }

    #[test]
    fn deprecated_field_detected_only_when_rename_active() {
        let body = json!({ "min_price": 10, "limit": 5 });

        let inactive = handler(&[Category::StatusCode]);
        assert!(inactive.check_deprecated_fields(&body).is_none());

        let active = handler(&[Category::FieldRename]);
        let v = active.check_deprecated_fields(&body).expect("violation");
        assert_eq!(v.code, "UNKNOWN_FIELD");
        assert_eq!(v.field.as_deref(), Some("min_price"));

        assert!(active.check_deprecated_fields(&json!({ "minPrice": 10 })).is_none());
    }

    #[test]
    fn deprecated_fields_reported_in_new_name_order() {
        let h = handler(&[Category::FieldRename]);
        let v = h
            .check_deprecated_fields(&json!({ "min_price": 1, "category_id": 2 }))
            .expect("violation");
        assert_eq!(v.field.as_deref(), Some("category_id"));
    }

    #[test]
    fn transform_request_is_identity_when_inactive() {
        let h = handler(&[]);
        let body = json!({ "filters": { "category_id": 1 } });
        assert_eq!(h.transform_request(body.clone()), body);
    }

    #[test]
    fn transform_request_renames_nested_old_names() {
        let h = handler(&[Category::FieldRename]);
        let out = h.transform_request(json!({
            "filters": [{ "category_id": 1 }, { "min_price": 2 }],
            "limit": 3
        }));
        assert_eq!(
            out,
            json!({ "filters": [{ "categoryId": 1 }, { "minPrice": 2 }], "limit": 3 })
        );
    }

    #[test]
    fn required_field_missing_or_null() {
        let h = handler(&[Category::RequiredField]);
        let v = h.check_required_field(&json!({})).expect("missing");
        assert_eq!(
            v.to_json(),
            json!({ "error": "limit is required", "code": "REQUIRED_FIELD_MISSING", "field": "limit" })
        );
        assert!(h.check_required_field(&json!({ "limit": null })).is_some());
    }

    #[test]
    fn falsy_but_present_required_field_passes() {
        let h = handler(&[Category::RequiredField]);
        assert!(h.check_required_field(&json!({ "limit": 0 })).is_none());
        assert!(h.check_required_field(&json!({ "limit": "" })).is_none());
        assert!(h.check_required_field(&json!({ "limit": false })).is_none());
    }

    #[test]
    fn status_code_substitution_only_for_2xx() {
        let h = handler(&[Category::StatusCode]);
        assert_eq!(h.finalize(json!([1, 2]), 200).status, 218);
        assert_eq!(h.finalize(json!("x"), 201).status, 218);
        assert_eq!(h.finalize(json!({}), 404).status, 404);
        assert_eq!(h.finalize(json!({}), 300).status, 300);
    }

    #[test]
    fn status_and_structure_combine() {
        let h = handler(&[Category::StatusCode, Category::ResponseStructure]);
        let mut sink = RecordedResponse::new();
        h.send_ok(&mut sink, json!({ "total": 12 }));
        assert_eq!(sink.status, Some(218));
        assert_eq!(sink.body, Some(json!({ "data": { "total": 12 } })));
        assert_eq!(sink.writes(), 1);
    }

    #[test]
    fn structure_wraps_error_statuses_too() {
        let h = handler(&[Category::ResponseStructure]);
        let out = h.finalize(json!({ "n": 1 }), 404);
        assert_eq!(out.status, 404);
        assert_eq!(out.body, json!({ "data": { "n": 1 } }));
    }

    #[test]
    fn missing_definitions_degrade_to_identity() {
        let profile = Arc::new(
            EndpointBreakingProfile::empty(key())
                .with_category(Category::FieldRename)
                .with_category(Category::RequiredField)
                .with_category(Category::StatusCode)
                .with_category(Category::ResponseStructure),
        );
        let h = BreakingHandler::new(profile, &Category::ALL.into_iter().collect());

        let body = json!({ "category_id": 1 });
        assert!(h.check_deprecated_fields(&body).is_none());
        assert_eq!(h.transform_request(body.clone()), body);
        assert!(h.check_required_field(&json!({})).is_none());
        assert_eq!(
            h.finalize(json!({ "a": 1 }), 200),
            FinalResponse {
                status: 200,
                body: json!({ "a": 1 })
            }
        );
    }

    #[test]
    fn send_response_writes_once_and_returns_status() {
        let h = handler(&[Category::StatusCode]);
        let mut sink = RecordedResponse::new();
        let written = h.send_response(&mut sink, json!({ "ok": true }), 201);
        assert_eq!(written, 218);
        assert_eq!(sink.writes(), 1);
        assert!(sink.is_sent());
    }

    #[test]
    fn inert_handler_passes_everything_through() {
        let h = BreakingHandler::inert(key());
        let mut sink = RecordedResponse::new();
        h.send_response(&mut sink, json!({ "x": 1 }), 200);
        assert_eq!(sink.status, Some(200));
        assert_eq!(sink.body, Some(json!({ "x": 1 })));
    }
}
