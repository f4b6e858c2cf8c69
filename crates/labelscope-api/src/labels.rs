//! Label listing handler

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::debug;

use labelscope_core::Pagination;
use labelscope_labels::{LabelCriteria, LabelRows, LabelTarget};

use crate::{AppState, error::ApiError, error::ApiResult};

/// Query parameters for label listing
///
/// `label` is required but may be empty. Paging applies only when both
/// `page` and `page_size` are given and positive.
#[derive(Debug, Default, Deserialize)]
pub struct LabelsQuery {
    pub label: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl LabelsQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_size.unwrap_or(0), self.page.unwrap_or(0))
    }
}

/// List the labels of one entity kind, or of every kind for `all`
pub async fn list_labels(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    params: Result<Query<LabelsQuery>, QueryRejection>,
) -> ApiResult<Json<LabelRows>> {
    let target: LabelTarget = kind
        .parse()
        .map_err(|_| ApiError::InvalidRequest(format!("unsupported type: {}", kind)))?;

    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let raw = params
        .label
        .as_deref()
        .ok_or_else(|| ApiError::InvalidRequest("label is required".to_string()))?;

    let criteria = LabelCriteria::parse(raw);
    let pagination = params.pagination();
    debug!(
        "Listing labels for {} (label={:?}, page={}, page_size={})",
        target, raw, pagination.page_number, pagination.page_size
    );

    let rows = state.query.list(target, &criteria, pagination).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_to_disabled() {
        let params = LabelsQuery::default();
        assert!(!params.pagination().is_enabled());

        let params = LabelsQuery {
            page: Some(2),
            ..Default::default()
        };
        assert!(!params.pagination().is_enabled());
    }

    #[test]
    fn test_pagination_from_both_params() {
        let params = LabelsQuery {
            label: Some(String::new()),
            page: Some(2),
            page_size: Some(10),
        };
        assert_eq!(params.pagination(), Pagination::new(10, 2));
    }
}
