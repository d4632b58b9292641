//! Youth policy search.
//!
//! [`FilterForm`] collects the detailed-search filters and turns them into a
//! [`PolicySearchRequest`] for `POST /chat/search-policy/`.

mod form;
mod region;

use serde::{Deserialize, Serialize};

pub use form::{FilterForm, MaritalStatus, NO_RESTRICTION, TagRow, TagRowKind};
pub use region::{
    ALL_DISTRICTS, PROVINCES, Province, RegionPicker, RegionTag, UNSELECTED_SUMMARY,
};

use crate::api::{ApiError, ApiResult};

/// JSON body of a policy search.
///
/// Numeric filters travel as strings; an empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySearchRequest {
    pub query: String,
    pub exclude_closed: bool,
    /// Province key such as `seoul`, or empty.
    pub region: String,
    pub marital_status: String,
    pub age: String,
    pub income_min: String,
    pub income_max: String,
    pub education: Vec<String>,
    pub major: Vec<String>,
    pub employment_status: Vec<String>,
    pub specialization: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Application period as free text.
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySearchResponse {
    pub count: usize,
    pub results: Vec<PolicySummary>,
}

/// Raw response: either results or an `error` string.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    results: Vec<PolicySummary>,
}

impl SearchEnvelope {
    pub(crate) fn into_result(self) -> ApiResult<PolicySearchResponse> {
        if let Some(error) = self.error {
            return Err(ApiError::api(error));
        }
        Ok(PolicySearchResponse {
            count: self.count.unwrap_or(self.results.len()),
            results: self.results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_envelope_with_results() {
        let envelope: SearchEnvelope = serde_json::from_value(serde_json::json!({
            "count": 1,
            "results": [{
                "id": "R1",
                "title": "청년월세",
                "description": "월세 지원...",
                "region": "서울",
                "period": null,
                "url": ""
            }]
        }))
        .unwrap();

        let response = envelope.into_result().unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.results[0].title, "청년월세");
        assert_eq!(response.results[0].region.as_deref(), Some("서울"));
        assert_eq!(response.results[0].period, None);
    }

    #[test]
    fn test_envelope_error_maps_to_api_error() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"error": "DB unavailable"}"#).unwrap();

        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Api);
        assert!(err.message.contains("DB unavailable"));
    }

    #[test]
    fn test_missing_count_falls_back_to_len() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"results": [{"id": "a"}, {"id": "b"}]}"#).unwrap();
        assert_eq!(envelope.into_result().unwrap().count, 2);
    }

    #[test]
    fn test_request_serializes_wire_names() {
        let request = PolicySearchRequest {
            query: "주거".to_string(),
            education: vec![NO_RESTRICTION.to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "주거");
        assert_eq!(json["exclude_closed"], false);
        assert_eq!(json["employment_status"], serde_json::json!([]));
        assert_eq!(json["education"][0], "제한없음");
    }
}
