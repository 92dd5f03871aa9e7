// 📝 Enrollment - form validation + webhook payload
// A validated form plus a priced quote becomes one EnrollmentSubmission

use crate::entities::equipment::{EquipmentCatalog, EquipmentItem};
use crate::entities::program::{Program, ProgramRegistry};
use crate::pricing::{DiscountLine, EnrollmentQuote, QuoteBreakdown};
use crate::promo::{PromoError, PromoRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// FORM
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentForm {
    pub parent_name: String,
    pub student_name: String,
    pub email: String,
    pub program_id: String,

    #[serde(default)]
    pub owned_item_ids: Vec<String>,

    /// Raw user input; blank means no code
    #[serde(default)]
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl EnrollmentForm {
    /// Check required fields and email shape; collects every failure
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.parent_name.trim().is_empty() {
            errors.push(FieldError::new("parentName", "Required field is empty"));
        }

        if self.student_name.trim().is_empty() {
            errors.push(FieldError::new("studentName", "Required field is empty"));
        }

        if self.program_id.trim().is_empty() {
            errors.push(FieldError::new("programId", "Required field is empty"));
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Required field is empty"));
        } else if !is_valid_email(self.email.trim()) {
            errors.push(FieldError::new("email", "Not a valid email address"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Trimmed promo code, None when absent or blank
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn owned_set(&self) -> HashSet<String> {
        self.owned_item_ids.iter().map(|id| id.trim().to_string()).collect()
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("Invalid enrollment form: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),

    #[error("Unknown program: {0}")]
    UnknownProgram(String),

    #[error(transparent)]
    Promo(#[from] PromoError),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EnrollmentError {
    pub fn user_message(&self) -> String {
        match self {
            EnrollmentError::Invalid(_) => "Revisa los campos marcados del formulario.".to_string(),
            EnrollmentError::UnknownProgram(_) => "El programa seleccionado no existe.".to_string(),
            EnrollmentError::Promo(e) => e.user_message().to_string(),
        }
    }
}

// ============================================================================
// SUBMISSION PAYLOAD
// ============================================================================

/// JSON body posted to the enrollment webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSubmission {
    pub submission_id: String,
    pub parent_name: String,
    pub student_name: String,
    pub email: String,
    pub program_name: String,
    pub base_price: f64,
    pub discounts: Vec<DiscountLine>,
    pub applied_code: Option<String>,
    pub final_total: f64,
    pub included_equipment: Vec<String>,
    pub owned_equipment: Vec<String>,

    /// Serialized as RFC 3339 / ISO-8601 UTC
    pub timestamp: DateTime<Utc>,
}

impl EnrollmentSubmission {
    /// Validate the form, resolve program and code, price it
    pub fn build(
        form: &EnrollmentForm,
        programs: &ProgramRegistry,
        catalog: &EquipmentCatalog,
        promos: &PromoRegistry,
        now: DateTime<Utc>,
    ) -> Result<Self, EnrollmentError> {
        form.validate().map_err(EnrollmentError::Invalid)?;

        let program = programs
            .find_by_id(&form.program_id)
            .ok_or_else(|| EnrollmentError::UnknownProgram(form.program_id.trim().to_string()))?;

        let bundle = program.bundle(catalog);
        let quote = enrollment_quote(form, program, promos)?;
        let breakdown = quote.breakdown(&bundle);

        // Only bundled items are reported as owned
        let owned_equipment = names(
            bundle
                .iter()
                .filter(|item| quote.owned_item_ids.contains(&item.id)),
        );

        Ok(EnrollmentSubmission {
            submission_id: uuid::Uuid::new_v4().to_string(),
            parent_name: form.parent_name.trim().to_string(),
            student_name: form.student_name.trim().to_string(),
            email: form.email.trim().to_string(),
            program_name: program.name.clone(),
            base_price: breakdown.base_price,
            discounts: breakdown.discounts,
            applied_code: breakdown.applied_code,
            final_total: breakdown.final_price,
            included_equipment: names(bundle.iter()),
            owned_equipment,
            timestamp: now,
        })
    }

    /// Stable key for the same student/program/time, sent as a header so the
    /// receiver can drop double submissions
    pub fn idempotency_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.email.to_lowercase(),
            self.student_name,
            self.program_name,
            self.timestamp.to_rfc3339()
        ));
        format!("{:x}", hasher.finalize())
    }
}

/// Price a form against an already resolved program. Owned equipment only
/// counts when the program bundles it.
pub fn quote_for(
    form: &EnrollmentForm,
    program: &Program,
    catalog: &EquipmentCatalog,
    promos: &PromoRegistry,
) -> Result<QuoteBreakdown, PromoError> {
    let quote = enrollment_quote(form, program, promos)?;
    Ok(quote.breakdown(&program.bundle(catalog)))
}

fn enrollment_quote(
    form: &EnrollmentForm,
    program: &Program,
    promos: &PromoRegistry,
) -> Result<EnrollmentQuote, PromoError> {
    let mut quote = EnrollmentQuote::new(program.base_price).with_owned(form.owned_set());

    if let Some(raw) = form.promo_code() {
        quote = quote.with_code(promos.lookup(raw)?.clone());
    }

    Ok(quote)
}

fn names<'a, I>(items: I) -> Vec<String>
where
    I: Iterator<Item = &'a EquipmentItem>,
{
    items.map(|item| item.name.clone()).collect()
}

// ============================================================================
// TESTS
// ============================================================================
