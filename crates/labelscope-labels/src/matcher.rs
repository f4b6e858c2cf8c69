//! Label matching
//!
//! Matching is an OR over the entity's labels: an entity matches when any one
//! of its labels is accepted by the criteria. Extraction keeps exactly the
//! accepted labels.

use labelscope_core::{LabelMap, Labeled};

use crate::criteria::LabelCriteria;

/// Whether a label mapping satisfies the criteria.
///
/// Empty criteria match everything, including an entity without labels.
pub fn matches(criteria: &LabelCriteria, labels: Option<&LabelMap>) -> bool {
    if criteria.is_empty() {
        return true;
    }

    labels.is_some_and(|labels| labels.iter().any(|(k, v)| criteria.accepts(k, v)))
}

/// The labels accepted by the criteria.
///
/// Returns `None` when the entity has no label mapping at all, so callers can
/// skip it instead of emitting an empty row. Empty criteria return the whole
/// mapping.
pub fn extract_matches(criteria: &LabelCriteria, labels: Option<&LabelMap>) -> Option<LabelMap> {
    let labels = labels?;

    if criteria.is_empty() {
        return Some(labels.clone());
    }

    Some(
        labels
            .iter()
            .filter(|(k, v)| criteria.accepts(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// [`matches`] over any labelled entity
pub fn entity_matches<E: Labeled + ?Sized>(criteria: &LabelCriteria, entity: &E) -> bool {
    matches(criteria, entity.labels())
}

/// [`extract_matches`] over any labelled entity
pub fn entity_extract_matches<E: Labeled + ?Sized>(
    criteria: &LabelCriteria,
    entity: &E,
) -> Option<LabelMap> {
    extract_matches(criteria, entity.labels())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelscope_core::entity::{Consumer, Entity, Route, Ssl};

    fn labels(pairs: &[(&str, &str)]) -> LabelMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let any = LabelCriteria::any();
        assert!(matches(&any, None));
        assert!(matches(&any, Some(&LabelMap::new())));
        assert!(matches(&any, Some(&labels(&[("env", "dev")]))));
    }

    #[test]
    fn test_missing_or_empty_labels_never_match_criteria() {
        let criteria = LabelCriteria::parse("env");
        assert!(!matches(&criteria, None));
        assert!(!matches(&criteria, Some(&LabelMap::new())));
    }

    #[test]
    fn test_value_must_equal_unless_empty() {
        let ls = labels(&[("label1", "value1"), ("label2", "value2")]);
        assert!(matches(&LabelCriteria::parse("label1:value1"), Some(&ls)));
        assert!(!matches(&LabelCriteria::parse("label1:value2"), Some(&ls)));
        assert!(matches(&LabelCriteria::parse("label1"), Some(&ls)));
        assert!(!matches(&LabelCriteria::parse("label3"), Some(&ls)));
    }

    #[test]
    fn test_any_single_label_is_enough() {
        let ls = labels(&[("env", "production"), ("version", "v2")]);
        let criteria = LabelCriteria::parse("env:production,version:v1,missing");
        assert!(matches(&criteria, Some(&ls)));
    }

    #[test]
    fn test_extract_with_empty_criteria_returns_everything() {
        let ls = labels(&[("a", "1"), ("b", "2")]);
        assert_eq!(extract_matches(&LabelCriteria::any(), Some(&ls)), Some(ls));
    }

    #[test]
    fn test_extract_without_labels_is_none() {
        assert_eq!(extract_matches(&LabelCriteria::any(), None), None);
        assert_eq!(extract_matches(&LabelCriteria::parse("a"), None), None);
    }

    #[test]
    fn test_extract_keeps_only_accepted_labels() {
        let ls = labels(&[("build", "16"), ("env", "production"), ("version", "v2")]);
        let criteria = LabelCriteria::parse("build,env:dev,version:v2");

        let extracted = extract_matches(&criteria, Some(&ls)).unwrap();
        assert_eq!(extracted, labels(&[("build", "16"), ("version", "v2")]));

        for (k, v) in &extracted {
            assert_eq!(ls.get(k), Some(v));
            assert!(criteria.accepts(k, v));
        }
    }

    #[test]
    fn test_extract_with_no_accepted_labels_is_empty() {
        let ls = labels(&[("env", "production")]);
        let extracted = extract_matches(&LabelCriteria::parse("env:dev"), Some(&ls));
        assert_eq!(extracted, Some(LabelMap::new()));
    }

    #[test]
    fn test_entity_helpers_go_through_labels() {
        let criteria = LabelCriteria::parse("extra:ssl");
        let ssl: Entity = Ssl {
            labels: Some(labels(&[("extra", "ssl"), ("env", "production")])),
            ..Default::default()
        }
        .into();
        let route: Entity = Route::default().into();
        let consumer = Consumer {
            username: "jack".to_string(),
            labels: Some(labels(&[("extra", "consumer")])),
            ..Default::default()
        };

        assert!(entity_matches(&criteria, &ssl));
        assert!(!entity_matches(&criteria, &route));
        assert!(!entity_matches(&criteria, &consumer));
        assert_eq!(
            entity_extract_matches(&criteria, &ssl),
            Some(labels(&[("extra", "ssl")]))
        );
        assert_eq!(entity_extract_matches(&criteria, &route), None);
    }
}
