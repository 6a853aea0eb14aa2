//! Visit record models.

use serde::{Deserialize, Serialize};

use super::fee::LineItem;

/// Sentinel payment method used when a submission leaves the field blank.
pub const DEFAULT_PAYMENT_METHOD: &str = "现场";

/// One clinic visit by a patient: date, identity, clinical notes, and fee.
///
/// Records are created only by the store's append operation and removed only
/// by delete; there is no in-place update. Correcting a record means delete
/// plus re-add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Store-assigned identifier, unique within the document
    pub id: u64,
    /// Visit date, ISO `YYYY-MM-DD`
    pub visit_date: String,
    /// Patient name, never empty for a stored record
    pub patient_name: String,
    /// Contact phone
    pub phone: String,
    /// Gender
    pub gender: String,
    /// Age as entered
    pub age: String,
    /// Clinic case number
    pub case_no: String,
    /// Chief complaint
    pub chief_complaint: String,
    /// Diagnosis
    pub diagnosis: String,
    /// Display label of performed items; derived from line-item names when
    /// the submission leaves it empty
    pub item: String,
    /// Free-text note
    pub note: String,
    /// Payment method, defaulted to [`DEFAULT_PAYMENT_METHOD`]
    pub payment_method: String,
    /// Itemized charges; may be empty (flat-fee mode)
    pub fee_items: Vec<LineItem>,
    /// Total fee, non-negative, two-decimal rounded
    pub fee: f64,
    /// Creation timestamp, set once
    pub created_at: String,
}

/// Why a submission was rejected without touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("patient name is required")]
    MissingPatientName,
    #[error("gender is required for itemized submissions")]
    MissingGender,
}

/// A trimmed, defaulted new-record submission, not yet validated.
///
/// `fee` carries the flat fee exactly as entered; `fee_items` carries the
/// nested structure exactly as decoded. Both are normalized by the fee model
/// during append.
#[derive(Debug, Clone, Default)]
pub struct VisitSubmission {
    pub visit_date: String,
    pub patient_name: String,
    pub phone: String,
    pub gender: String,
    pub age: String,
    pub case_no: String,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub item: String,
    pub note: String,
    pub payment_method: String,
    /// Raw flat fee as entered
    pub fee: String,
    /// Untyped nested line-item structure
    pub fee_items: serde_json::Value,
}

impl VisitSubmission {
    /// Required-field validation. Itemized submissions additionally require
    /// a gender; pass `itemized` accordingly (clinic policy, not universal).
    pub fn validate(&self, itemized: bool) -> Result<(), RejectReason> {
        if self.patient_name.trim().is_empty() {
            return Err(RejectReason::MissingPatientName);
        }
        if itemized && self.gender.trim().is_empty() {
            return Err(RejectReason::MissingGender);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_patient_name() {
        let submission = VisitSubmission::default();
        assert_eq!(
            submission.validate(false),
            Err(RejectReason::MissingPatientName)
        );

        let submission = VisitSubmission {
            patient_name: "   ".into(),
            ..Default::default()
        };
        assert_eq!(
            submission.validate(false),
            Err(RejectReason::MissingPatientName)
        );
    }

    #[test]
    fn test_validate_gender_only_for_itemized() {
        let submission = VisitSubmission {
            patient_name: "李伟".into(),
            ..Default::default()
        };
        assert_eq!(submission.validate(false), Ok(()));
        assert_eq!(submission.validate(true), Err(RejectReason::MissingGender));

        let submission = VisitSubmission {
            patient_name: "李伟".into(),
            gender: "男".into(),
            ..Default::default()
        };
        assert_eq!(submission.validate(true), Ok(()));
    }
}
