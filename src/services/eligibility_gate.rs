//! Pre-approval check that the acting party has a complete signing identity.
//!
//! The gate is pure: it inspects the setup record it is handed and reports
//! which fields are missing and which setup area has to be completed.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    EligibilityOutcome, InstitutionConfig, MissingField, SetupArea, VerifierEligibility,
    VerifierProfile,
};

/// Evaluates [`VerifierEligibility`] before an approval is recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityGate;

impl EligibilityGate {
    pub fn new() -> Self {
        Self
    }

    /// Check whether an approval may be recorded.
    pub fn check(&self, eligibility: &VerifierEligibility) -> EligibilityOutcome {
        let (missing, setup_area) = match eligibility {
            VerifierEligibility::Individual(profile) => (
                Self::missing_for_profile(profile.as_ref()),
                SetupArea::PersonalProfile,
            ),
            VerifierEligibility::Institutional {
                institution_id,
                config,
            } => (
                Self::missing_for_institution(config.as_ref()),
                SetupArea::InstitutionConfiguration {
                    institution_id: institution_id.clone(),
                },
            ),
        };

        if missing.is_empty() {
            EligibilityOutcome::Eligible
        } else {
            EligibilityOutcome::Ineligible {
                missing,
                setup_area,
            }
        }
    }

    /// Like [`check`](Self::check) but as an error for use with `?`.
    pub fn ensure(&self, eligibility: &VerifierEligibility) -> DomainResult<()> {
        match self.check(eligibility) {
            EligibilityOutcome::Eligible => Ok(()),
            EligibilityOutcome::Ineligible {
                missing,
                setup_area,
            } => Err(DomainError::Eligibility {
                missing,
                setup_area,
            }),
        }
    }

    fn missing_for_profile(profile: Option<&VerifierProfile>) -> Vec<MissingField> {
        // No profile record at all counts as nothing set up.
        let Some(profile) = profile else {
            return vec![MissingField::NameTitle, MissingField::Signature];
        };
        Self::collect_missing(
            profile.name.as_deref(),
            profile.title.as_deref(),
            profile.signature_ref.as_deref(),
        )
    }

    fn missing_for_institution(config: Option<&InstitutionConfig>) -> Vec<MissingField> {
        let Some(config) = config else {
            return vec![MissingField::NameTitle, MissingField::Signature];
        };
        Self::collect_missing(
            config.delegate_name.as_deref(),
            config.delegate_title.as_deref(),
            config.signature_ref.as_deref(),
        )
    }

    fn collect_missing(
        name: Option<&str>,
        title: Option<&str>,
        signature: Option<&str>,
    ) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if !is_present(name) || !is_present(title) {
            missing.push(MissingField::NameTitle);
        }
        if !is_present(signature) {
            missing.push(MissingField::Signature);
        }
        missing
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
