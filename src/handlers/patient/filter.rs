use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::patient::{self, PatientFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("patient_id", patient::ORDER_BY_PATIENT_ID),
    ("user_id", patient::ORDER_BY_USER_ID),
    ("name", patient::ORDER_BY_NAME),
    ("age", patient::ORDER_BY_AGE),
    ("condition", patient::ORDER_BY_CONDITION),
    ("healed", patient::ORDER_BY_HEALED),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<PatientFilter, ApiError> {
    Ok(PatientFilter {
        id: params::uuid(values, "patient_id")?,
        user_id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        age: params::parsed(values, "age")?,
        condition: params::string(values, "condition"),
        healed: params::parsed(values, "healed")?,
        video_link: params::string(values, "video_link"),
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, patient::default_order_by(), ORDER_BY_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn user_and_condition_fill_their_own_fields() {
        let user_id = uuid::Uuid::new_v4();
        let filter = parse_filter(&values(&[
            ("user_id", &user_id.to_string()),
            ("condition", "fracture"),
            ("healed", "true"),
        ]))
        .unwrap();

        assert_eq!(filter.user_id, Some(user_id));
        assert_eq!(filter.id, None);
        assert_eq!(filter.condition.as_deref(), Some("fracture"));
        assert_eq!(filter.name, None);
        assert_eq!(filter.healed, Some(true));
    }

    #[test]
    fn bad_age_is_a_field_error() {
        let err = parse_filter(&values(&[("age", "old")])).unwrap_err();
        assert!(err.to_json()["field_errors"]["age"].is_string());
    }
}
