//! Proposal CLI commands.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::adapters::sqlite::SqliteProposalRepository;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::tree::{render_region_tree, rollup_summary};
use crate::cli::output::{format_rupiah, output, short_id, styled_status, CommandOutput};
use crate::cli::session::Session;
use crate::domain::errors::DomainError;
use crate::domain::models::{
    ActingInstitution, ActivityItem, ActivityKindFilter, Capability, Config, DecisionAction,
    PendingAction, Proposal, ProposalQuery, ProposalStatus, RegionGroup, RegionRef, Rollup,
    StatusFilter, StatusStatistics, VerificationAction, VerificationEvent,
};
use crate::services::{DecisionOutcome, VerificationStateMachine};

#[derive(Args, Debug)]
pub struct ProposalArgs {
    #[command(subcommand)]
    pub command: ProposalCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProposalCommands {
    /// List proposals for a fiscal year
    List {
        /// Fiscal year (defaults to the configured year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Case-insensitive search over title, village, district and item names
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Status filter: all, pending, in_review, approved, revision, rejected
        #[arg(short, long)]
        status: Option<String>,
        /// Activity kind filter: all, infrastructure, non_infrastructure
        #[arg(short, long)]
        kind: Option<String>,
        /// Show as a district/village tree
        #[arg(long)]
        tree: bool,
    },
    /// Show status counts for a fiscal year
    Stats {
        /// Fiscal year (defaults to the configured year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show proposal details
    Show {
        /// Proposal ID or unique prefix
        id: String,
    },
    /// Approve a proposal
    Approve {
        /// Proposal ID or unique prefix
        id: String,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Send a proposal back for revision
    Reject {
        /// Proposal ID or unique prefix
        id: String,
        /// Reason for the revision (required)
        #[arg(short, long)]
        note: String,
    },
    /// Show the decision history of a proposal
    History {
        /// Proposal ID or unique prefix
        id: String,
    },
    /// Import proposals from a JSON or YAML file (sqlite backend)
    Import {
        /// File holding a list of proposals
        file: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct ProposalListOutput {
    pub year: i32,
    pub institution: Option<ActingInstitution>,
    pub query: ProposalQuery,
    pub matched: usize,
    pub total: usize,
    pub rollup: Rollup,
    pub groups: Vec<RegionGroup>,
    #[serde(skip)]
    pub tree: bool,
}

impl CommandOutput for ProposalListOutput {
    fn to_human(&self) -> String {
        if self.matched == 0 {
            return if self.total == 0 {
                format!("No proposals for {}.", self.year)
            } else {
                format!("No proposals match the filters ({} in {}).", self.total, self.year)
            };
        }

        let mut lines = Vec::new();
        if let Some(institution) = &self.institution {
            lines.push(format!("Institution: {}", institution.name));
        }
        lines.push(format!(
            "Fiscal year {}: {} of {} proposal(s) shown\n",
            self.year, self.matched, self.total
        ));

        if self.tree {
            lines.push(render_region_tree(&self.groups));
        } else {
            let proposals: Vec<Proposal> = self
                .groups
                .iter()
                .flat_map(|g| g.villages.iter())
                .flat_map(|v| v.proposals.iter().cloned())
                .collect();
            lines.push(TableFormatter::new().format_proposals(&proposals));
        }

        lines.push(format!("\n{}", rollup_summary(&self.rollup)));
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub year: i32,
    pub statistics: StatusStatistics,
    pub rollup: Rollup,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        format!(
            "Fiscal year {}\n{}\n{}",
            self.year,
            TableFormatter::new().format_statistics(&self.statistics),
            rollup_summary(&self.rollup)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalDetailOutput {
    pub proposal: Proposal,
    pub document_url: Option<String>,
    pub valid_actions: Vec<VerificationAction>,
}

impl CommandOutput for ProposalDetailOutput {
    fn to_human(&self) -> String {
        let p = &self.proposal;
        let mut lines = vec![
            format!("Proposal: {}", console::style(&p.title).bold()),
            format!("ID:        {}", p.id),
            format!("Year:      {}", p.year),
            format!("Village:   {} ({})", p.village.name, p.district.name),
            format!("Status:    {}", styled_status(p.status)),
            format!("Budget:    {}", format_rupiah(p.total_budget())),
        ];
        if let Some(note) = &p.note {
            lines.push(format!("Note:      {note}"));
        }
        if let Some(at) = p.verified_at {
            lines.push(format!("Verified:  {}", at.format("%Y-%m-%d %H:%M")));
        }
        if p.forwarded_to_next_tier {
            lines.push("Forwarded to the next approval tier".to_string());
        }
        lines.push(format!(
            "Document:  {}",
            self.document_url.as_deref().unwrap_or("-")
        ));

        if !p.items.is_empty() {
            lines.push("\nItems:".to_string());
            for item in &p.items {
                let mut line = format!(
                    "  - {} [{}] {}",
                    item.name,
                    item.kind,
                    format_rupiah(item.budget)
                );
                if let Some(volume) = &item.volume {
                    line.push_str(&format!(", {volume}"));
                }
                if let Some(location) = &item.location {
                    line.push_str(&format!(" @ {location}"));
                }
                lines.push(line);
            }
        }

        let actions = if self.valid_actions.is_empty() {
            "none".to_string()
        } else {
            self.valid_actions
                .iter()
                .map(VerificationAction::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("\nAvailable actions: {actions}"));
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct DecisionOutput {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: DecisionOutcome,
}

impl CommandOutput for DecisionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.outcome.history_recorded {
            lines.push(format!(
                "{} the decision was applied but its history entry could not be stored",
                console::style("warning:").yellow().bold()
            ));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub proposal_id: Uuid,
    pub events: Vec<VerificationEvent>,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if self.events.is_empty() {
            return format!("No decisions recorded for {}.", self.proposal_id);
        }
        format!(
            "{} decision(s) for {}:\n{}",
            self.events.len(),
            self.proposal_id,
            TableFormatter::new().format_history(&self.events)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub imported: usize,
    pub ids: Vec<Uuid>,
    /// Ids already present; their stored records were left as they are
    pub skipped: Vec<Uuid>,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        let mut message = format!("Imported {} proposal(s).", self.imported);
        if !self.skipped.is_empty() {
            message.push_str(&format!(
                " Skipped {} already present: {}",
                self.skipped.len(),
                self.skipped.iter().map(short_id).collect::<Vec<_>>().join(", ")
            ));
        }
        message
    }
}

/// Insert new proposals; ids that already exist are skipped, never overwritten.
pub async fn import_records(
    repo: &SqliteProposalRepository,
    records: Vec<ImportRecord>,
    default_year: i32,
) -> Result<ImportOutput> {
    let mut ids = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for record in records {
        let proposal = record.into_proposal(default_year);
        let inserted = repo
            .insert_proposal(&proposal)
            .await
            .with_context(|| format!("Failed to import '{}'", proposal.title))?;
        if inserted {
            ids.push(proposal.id);
        } else {
            tracing::warn!(proposal_id = %proposal.id, "proposal already exists; import skipped");
            skipped.push(proposal.id);
        }
    }
    Ok(ImportOutput {
        imported: ids.len(),
        ids,
        skipped,
    })
}

/// One proposal in an import file. Omitted ids are generated.
#[derive(Debug, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub village: RegionRef,
    pub district: RegionRef,
    #[serde(default)]
    pub items: Vec<ActivityItem>,
    #[serde(default)]
    pub status: ProposalStatus,
    #[serde(default)]
    pub document_ref: Option<String>,
}

impl ImportRecord {
    pub fn into_proposal(self, default_year: i32) -> Proposal {
        let mut proposal = Proposal::new(
            self.title,
            self.year.unwrap_or(default_year),
            self.village,
            self.district,
        )
        .with_status(self.status);
        if let Some(id) = self.id {
            proposal.id = id;
        }
        proposal.items = self.items;
        proposal.document_ref = self.document_ref;
        proposal
    }
}

/// Parse an import file; `.yaml`/`.yml` is read as YAML, everything else as JSON.
pub fn parse_import(path: &Path, content: &str) -> Result<Vec<ImportRecord>> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(content).context("Invalid YAML proposal list")
    } else {
        serde_json::from_str(content).context("Invalid JSON proposal list")
    }
}

/// Build the view query from CLI strings.
pub fn build_query(
    search: Option<String>,
    status: Option<&str>,
    kind: Option<&str>,
) -> Result<ProposalQuery> {
    let status_filter = match status {
        Some(s) => StatusFilter::parse(s).with_context(|| format!("Unknown status filter: {s}"))?,
        None => StatusFilter::All,
    };
    let activity_kind_filter = match kind {
        Some(k) => {
            ActivityKindFilter::parse(k).with_context(|| format!("Unknown activity kind: {k}"))?
        }
        None => ActivityKindFilter::All,
    };
    Ok(ProposalQuery {
        search_text: search.unwrap_or_default(),
        status_filter,
        activity_kind_filter,
    })
}

fn decision_message(outcome: &DecisionOutcome) -> String {
    let verb = match outcome.event.action.wire_action() {
        DecisionAction::Approved => "approved",
        DecisionAction::Revision => "sent back for revision",
    };
    format!("Proposal '{}' {verb} ({})", outcome.proposal.title, outcome.proposal.id)
}

pub async fn execute(args: ProposalArgs, config: Config, json_mode: bool) -> Result<()> {
    let session = Session::open(config).await?;

    match args.command {
        ProposalCommands::List { year, search, status, kind, tree } => {
            let year = session.year_or_default(year);
            let query = build_query(search, status.as_deref(), kind.as_deref())?;

            let console = session.console();
            console.refresh(year).await?;
            let view = console.view(&query).await;
            console.close();

            let out = ProposalListOutput {
                year,
                institution: view.institution,
                query: view.query,
                matched: view.matched,
                total: view.total,
                rollup: view.rollup,
                groups: view.groups,
                tree,
            };
            output(&out, json_mode);
        }

        ProposalCommands::Stats { year } => {
            let year = session.year_or_default(year);
            let statistics = session.service.statistics(year).await?;
            let out = StatsOutput {
                year,
                rollup: statistics.to_rollup(),
                statistics,
            };
            output(&out, json_mode);
        }

        ProposalCommands::Show { id } => {
            let id = session.resolve_id(&id).await?;
            let proposal = session.service.get(id).await?;
            let out = ProposalDetailOutput {
                document_url: session.documents.url_for(&proposal),
                valid_actions: VerificationStateMachine::valid_actions(proposal.status).to_vec(),
                proposal,
            };
            output(&out, json_mode);
        }

        ProposalCommands::Approve { id, note } => {
            let id = session.resolve_id(&id).await?;
            let mut pending = PendingAction::approve(id);
            if let Some(note) = note {
                pending = pending.with_note(note);
            }
            let outcome = session.service.decide(&session.actor, &pending).await?;
            let out = DecisionOutput {
                success: true,
                message: decision_message(&outcome),
                outcome,
            };
            output(&out, json_mode);
        }

        ProposalCommands::Reject { id, note } => {
            let id = session.resolve_id(&id).await?;
            let pending = PendingAction::reject(id, note);
            let outcome = session.service.decide(&session.actor, &pending).await?;
            let out = DecisionOutput {
                success: true,
                message: decision_message(&outcome),
                outcome,
            };
            output(&out, json_mode);
        }

        ProposalCommands::History { id } => {
            let id = session.resolve_id(&id).await?;
            let events = session.service.history(&session.actor, id).await?;
            output(&HistoryOutput { proposal_id: id, events }, json_mode);
        }

        ProposalCommands::Import { file } => {
            if !session.actor.can(Capability::CanManage) {
                return Err(DomainError::Forbidden(Capability::CanManage).into());
            }
            let repo = session.sqlite("proposal import")?;
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records = parse_import(&file, &content)?;
            if records.is_empty() {
                bail!("{} holds no proposals", file.display());
            }

            let result = import_records(repo, records, session.config.fiscal_year).await?;
            tracing::info!(
                count = result.imported,
                skipped = result.skipped.len(),
                file = %file.display(),
                "proposals imported"
            );
            output(&result, json_mode);
        }
    }

    Ok(())
}
