//! Inbound form boundary.
//!
//! The request layer hands over a decoded urlencoded body as a multi-valued
//! field map; this module trims, coerces, and defaults it into a
//! [`VisitSubmission`]. All defaulting rules live here so the rest of the
//! crate only sees normalized input.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{VisitSubmission, DEFAULT_PAYMENT_METHOD};

/// Decoded form body: field name to one or more values.
pub type FormFields = HashMap<String, Vec<String>>;

/// First value for a field, trimmed; empty when the field is absent.
pub fn first_value<'a>(form: &'a FormFields, key: &str) -> &'a str {
    form.get(key)
        .and_then(|values| values.first())
        .map(|value| value.trim())
        .unwrap_or("")
}

/// Build a normalized submission from a decoded form body.
///
/// The visit date defaults to today, the payment method to
/// [`DEFAULT_PAYMENT_METHOD`]. The `fee_items` field is expected to carry a
/// JSON-encoded array; anything undecodable is passed through as null and
/// resolves to "no line items" in the fee model.
pub fn submission_from_form(form: &FormFields) -> VisitSubmission {
    let visit_date = first_value(form, "visit_date");
    let payment_method = first_value(form, "payment_method");

    VisitSubmission {
        visit_date: if visit_date.is_empty() {
            chrono::Local::now().format("%Y-%m-%d").to_string()
        } else {
            visit_date.to_string()
        },
        patient_name: first_value(form, "patient_name").to_string(),
        phone: first_value(form, "phone").to_string(),
        gender: first_value(form, "gender").to_string(),
        age: first_value(form, "age").to_string(),
        case_no: first_value(form, "case_no").to_string(),
        chief_complaint: first_value(form, "chief_complaint").to_string(),
        diagnosis: first_value(form, "diagnosis").to_string(),
        item: first_value(form, "item").to_string(),
        note: first_value(form, "note").to_string(),
        payment_method: if payment_method.is_empty() {
            DEFAULT_PAYMENT_METHOD.to_string()
        } else {
            payment_method.to_string()
        },
        fee: first_value(form, "fee").to_string(),
        fee_items: serde_json::from_str(first_value(form, "fee_items")).unwrap_or(Value::Null),
    }
}

/// Coerce a raw id value for deletion. Accepts integer text and
/// integer-valued decimals; anything else yields `None` and the caller
/// treats the delete as a no-op.
pub fn parse_record_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(id);
    }
    match raw.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 => Some(value as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_form(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
            .collect()
    }

    #[test]
    fn test_submission_trims_and_defaults() {
        let form = make_form(&[
            ("patient_name", "  李伟  "),
            ("visit_date", "2024-05-15"),
            ("fee", " 50.5 "),
        ]);
        let submission = submission_from_form(&form);
        assert_eq!(submission.patient_name, "李伟");
        assert_eq!(submission.visit_date, "2024-05-15");
        assert_eq!(submission.fee, "50.5");
        assert_eq!(submission.payment_method, DEFAULT_PAYMENT_METHOD);
        assert!(submission.fee_items.is_null());
    }

    #[test]
    fn test_missing_visit_date_defaults_to_today() {
        let form = make_form(&[("patient_name", "李伟")]);
        let submission = submission_from_form(&form);
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(submission.visit_date, today);
    }

    #[test]
    fn test_fee_items_field_decoded() {
        let form = make_form(&[
            ("patient_name", "李伟"),
            ("fee_items", r#"[{"name":"洗牙","price":100}]"#),
        ]);
        let submission = submission_from_form(&form);
        assert!(submission.fee_items.is_array());

        let form = make_form(&[("patient_name", "李伟"), ("fee_items", "{broken")]);
        let submission = submission_from_form(&form);
        assert!(submission.fee_items.is_null());
    }

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("7"), Some(7));
        assert_eq!(parse_record_id(" 12 "), Some(12));
        assert_eq!(parse_record_id("3.0"), Some(3));
        assert_eq!(parse_record_id("3.5"), None);
        assert_eq!(parse_record_id("-1"), None);
        assert_eq!(parse_record_id("abc"), None);
        assert_eq!(parse_record_id(""), None);
    }
}
