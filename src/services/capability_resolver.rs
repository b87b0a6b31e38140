//! One-shot capability resolution for a session's actor.

use std::collections::BTreeSet;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActorContext, ActorIdentity, Capability, EligibilitySource, Role};

/// Resolves an identity into a typed [`ActorContext`].
pub struct CapabilityResolver;

impl CapabilityResolver {
    /// Resolve capabilities and the eligibility source for an identity.
    pub fn resolve(identity: &ActorIdentity) -> DomainResult<ActorContext> {
        if identity.name.trim().is_empty() {
            return Err(DomainError::validation("actor.name", "must not be empty"));
        }

        let capabilities: BTreeSet<Capability> = Self::capabilities_for(identity.role)
            .iter()
            .copied()
            .collect();

        let eligibility_source = match identity.role {
            Role::InstitutionDelegate => {
                let institution_id = identity
                    .institution_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        DomainError::validation(
                            "actor.institution_id",
                            "institution delegates must name their institution",
                        )
                    })?;
                EligibilitySource::Institutional {
                    institution_id: institution_id.to_string(),
                }
            }
            Role::Superadmin | Role::Verifier | Role::Village => EligibilitySource::Individual,
        };

        tracing::debug!(
            actor = %identity.id,
            role = %identity.role,
            capabilities = ?capabilities,
            "resolved actor capabilities"
        );

        Ok(ActorContext {
            id: identity.id.clone(),
            name: identity.name.clone(),
            role: identity.role,
            capabilities,
            eligibility_source,
        })
    }

    fn capabilities_for(role: Role) -> &'static [Capability] {
        match role {
            Role::Superadmin => &[
                Capability::CanApprove,
                Capability::CanManage,
                Capability::CanViewHistory,
            ],
            Role::Verifier | Role::InstitutionDelegate => {
                &[Capability::CanApprove, Capability::CanViewHistory]
            }
            Role::Village => &[Capability::CanViewHistory],
        }
    }
}
