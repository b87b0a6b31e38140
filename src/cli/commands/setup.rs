//! Signing setup commands: the verifier profile and institution configuration
//! that the eligibility gate checks before an approval.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::cli::session::Session;
use crate::domain::errors::DomainError;
use crate::domain::models::{
    ActorContext, Capability, Config, EligibilityReport, EligibilitySource, InstitutionConfig,
    SetupArea, VerifierProfile,
};
use crate::domain::ports::ProposalRepository;

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(subcommand)]
    pub command: SetupCommands,
}

#[derive(Subcommand, Debug)]
pub enum SetupCommands {
    /// Update the acting verifier's own profile (sqlite backend)
    Profile {
        /// Full name as printed on approvals
        #[arg(long)]
        name: Option<String>,
        /// Official title
        #[arg(long)]
        title: Option<String>,
        /// Reference to the signature image
        #[arg(long)]
        signature: Option<String>,
    },
    /// Update an institution's delegate configuration (sqlite backend)
    Institution {
        /// Institution ID
        id: String,
        /// Delegate's full name
        #[arg(long)]
        delegate_name: Option<String>,
        /// Delegate's official title
        #[arg(long)]
        delegate_title: Option<String>,
        /// Reference to the delegate's signature image
        #[arg(long)]
        signature: Option<String>,
    },
    /// Check whether the acting verifier may approve
    Status,
}

#[derive(Debug, Serialize)]
pub struct SetupOutput {
    pub success: bool,
    pub message: String,
    pub eligibility: EligibilityReport,
}

impl CommandOutput for SetupOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        lines.push(describe_eligibility(&self.eligibility));
        lines.join("\n")
    }
}

fn describe_eligibility(report: &EligibilityReport) -> String {
    if report.eligible {
        return format!("{} ready to approve", console::style("✓").green().bold());
    }
    let missing = report
        .missing
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    match &report.setup_area {
        Some(area) => format!(
            "{} not yet able to approve: missing {missing}; complete the {area}",
            console::style("✗").red().bold()
        ),
        None => format!(
            "{} not yet able to approve: missing {missing}",
            console::style("✗").red().bold()
        ),
    }
}

/// Keep existing values for fields the user did not pass.
fn merge(current: Option<String>, given: Option<String>) -> Option<String> {
    given.or(current)
}

/// Delegates may configure their own institution; everyone else needs `CanManage`.
fn may_configure(actor: &ActorContext, institution_id: &str) -> bool {
    actor.can(Capability::CanManage)
        || matches!(
            &actor.eligibility_source,
            EligibilitySource::Institutional { institution_id: own } if own == institution_id
        )
}

pub async fn execute(args: SetupArgs, config: Config, json_mode: bool) -> Result<()> {
    let session = Session::open(config).await?;

    let message = match args.command {
        SetupCommands::Profile { name, title, signature } => {
            let repo = session.sqlite("setup profile")?;
            let current = repo.verifier_profile(&session.actor.id).await?.unwrap_or_default();
            let profile = VerifierProfile {
                name: merge(current.name, name),
                title: merge(current.title, title),
                signature_ref: merge(current.signature_ref, signature),
            };
            repo.upsert_verifier_profile(&session.actor.id, &profile).await?;
            tracing::info!(actor_id = %session.actor.id, "verifier profile updated");
            format!("Profile updated for {}", session.actor.name)
        }

        SetupCommands::Institution { id, delegate_name, delegate_title, signature } => {
            if !may_configure(&session.actor, &id) {
                return Err(DomainError::Forbidden(Capability::CanManage).into());
            }
            let repo = session.sqlite("setup institution")?;
            let current = repo.institution_config(&id).await?;
            let (cur_name, cur_title, cur_sig) = current
                .map(|c| (c.delegate_name, c.delegate_title, c.signature_ref))
                .unwrap_or_default();
            let institution = InstitutionConfig {
                institution_id: id.clone(),
                delegate_name: merge(cur_name, delegate_name),
                delegate_title: merge(cur_title, delegate_title),
                signature_ref: merge(cur_sig, signature),
            };
            repo.upsert_institution_config(&institution).await?;
            tracing::info!(institution_id = %id, "institution configuration updated");
            format!("Configuration updated for institution {id}")
        }

        SetupCommands::Status => match &session.actor.eligibility_source {
            EligibilitySource::Individual => {
                format!("{} ({})", session.actor.name, session.actor.role)
            }
            EligibilitySource::Institutional { institution_id } => format!(
                "{} ({}) for {}",
                session.actor.name,
                session.actor.role,
                SetupArea::InstitutionConfiguration {
                    institution_id: institution_id.clone()
                }
            ),
        },
    };

    let eligibility = session.service.check_eligibility(&session.actor).await?.to_report();
    output(
        &SetupOutput {
            success: true,
            message,
            eligibility,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ActorIdentity, MissingField, Role};
    use crate::services::CapabilityResolver;

    fn actor(role: Role, institution: Option<&str>) -> ActorContext {
        CapabilityResolver::resolve(&ActorIdentity {
            id: "u1".to_string(),
            name: "Ibu Sari".to_string(),
            role,
            institution_id: institution.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_may_configure() {
        assert!(may_configure(&actor(Role::Superadmin, None), "dpmd"));
        assert!(may_configure(&actor(Role::InstitutionDelegate, Some("dpmd")), "dpmd"));
        assert!(!may_configure(&actor(Role::InstitutionDelegate, Some("dpmd")), "bappeda"));
        assert!(!may_configure(&actor(Role::Verifier, None), "dpmd"));
    }

    #[test]
    fn test_merge_keeps_existing() {
        assert_eq!(merge(Some("a".into()), None), Some("a".into()));
        assert_eq!(merge(Some("a".into()), Some("b".into())), Some("b".into()));
        assert_eq!(merge(None, None), None);
    }

    #[test]
    fn test_describe_ineligible_names_area() {
        let report = EligibilityReport {
            eligible: false,
            missing: vec![MissingField::Signature],
            setup_area: Some(SetupArea::PersonalProfile),
        };
        let text = describe_eligibility(&report);
        assert!(text.contains("signature"));
        assert!(text.contains("personal verifier profile"));
    }
}
