//! Wires configuration into a backend, an actor and the verification service.

use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::{RestAuditTrailStore, RestClient, RestProposalRepository};
use crate::adapters::sqlite::{
    initialize_database, PoolConfig, SqliteAuditTrailStore, SqliteProposalRepository,
};
use crate::cli::id_resolver::{parse_full_id, resolve_proposal_id};
use crate::domain::models::{ActingInstitution, ActorContext, BackendKind, Config};
use crate::domain::ports::{AuditTrailStore, ProposalRepository};
use crate::services::{CapabilityResolver, DocumentLinker, VerificationConsole, VerificationService};

pub type DynService = VerificationService<dyn ProposalRepository, dyn AuditTrailStore>;
pub type DynConsole = VerificationConsole<dyn ProposalRepository, dyn AuditTrailStore>;

/// Everything a command needs for one invocation.
pub struct Session {
    pub config: Config,
    pub actor: ActorContext,
    pub service: Arc<DynService>,
    pub documents: DocumentLinker,
    /// Present only for the sqlite backend, which also owns setup records
    sqlite: Option<SqliteProposalRepository>,
}

impl Session {
    pub async fn open(config: Config) -> Result<Self> {
        let identity = config
            .actor
            .identity()
            .ok_or_else(|| anyhow!("Unknown actor role '{}'", config.actor.role))?;
        let actor = CapabilityResolver::resolve(&identity)?;

        let (repository, store, sqlite): (
            Arc<dyn ProposalRepository>,
            Arc<dyn AuditTrailStore>,
            Option<SqliteProposalRepository>,
        ) = match config.backend.kind {
            BackendKind::Sqlite => {
                let pool = initialize_database(
                    &config.database.url(),
                    Some(PoolConfig::from(&config.database)),
                )
                .await
                .context("Failed to open database. Run 'bankeu init' first.")?;

                let mut repo = SqliteProposalRepository::new(pool.clone());
                if let Some(institution) = acting_institution(&config) {
                    repo = repo.with_institution(institution);
                }
                (
                    Arc::new(repo.clone()),
                    Arc::new(SqliteAuditTrailStore::new(pool)),
                    Some(repo),
                )
            }
            BackendKind::Http => {
                let client = RestClient::from_config(&config.backend)
                    .context("Failed to build REST client")?;
                tracing::debug!(base_url = client.base_url(), "using http backend");
                (
                    Arc::new(RestProposalRepository::new(client.clone())),
                    Arc::new(RestAuditTrailStore::new(client)),
                    None,
                )
            }
        };

        Ok(Self {
            documents: DocumentLinker::new(config.documents.base_url.clone()),
            service: Arc::new(VerificationService::new(repository, store)),
            actor,
            config,
            sqlite,
        })
    }

    /// A console session over this invocation's service.
    pub fn console(&self) -> DynConsole {
        VerificationConsole::new(Arc::clone(&self.service), self.actor.clone())
    }

    /// The sqlite repository, or an error naming the command that needs it.
    pub fn sqlite(&self, command: &str) -> Result<&SqliteProposalRepository> {
        match &self.sqlite {
            Some(repo) => Ok(repo),
            None => bail!(
                "'{command}' needs the sqlite backend; the http backend is read/decide only"
            ),
        }
    }

    /// Resolve a full id or, on sqlite, a unique id prefix.
    pub async fn resolve_id(&self, input: &str) -> Result<Uuid> {
        match &self.sqlite {
            Some(repo) => resolve_proposal_id(repo.pool(), input).await,
            None => parse_full_id(input),
        }
    }

    pub fn year_or_default(&self, year: Option<i32>) -> i32 {
        year.unwrap_or(self.config.fiscal_year)
    }
}

fn acting_institution(config: &Config) -> Option<ActingInstitution> {
    config
        .actor
        .institution_id
        .as_ref()
        .filter(|id| !id.trim().is_empty())
        .map(|id| ActingInstitution {
            id: id.clone(),
            name: id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Capability, DatabaseConfig};

    fn sqlite_config(dir: &tempfile::TempDir) -> Config {
        Config {
            database: DatabaseConfig {
                path: dir.path().join("bankeu.db").display().to_string(),
                max_connections: 1,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_open_sqlite_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(sqlite_config(&dir)).await.unwrap();
        assert!(session.actor.can(Capability::CanApprove));
        assert!(session.sqlite("proposal import").is_ok());
        assert_eq!(session.year_or_default(None), 2025);
        assert_eq!(session.year_or_default(Some(2026)), 2026);
    }

    #[tokio::test]
    async fn test_open_rejects_delegate_without_institution() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(&dir);
        config.actor.role = "institution_delegate".to_string();
        assert!(Session::open(config).await.is_err());
    }

    #[tokio::test]
    async fn test_http_session_has_no_setup_store() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Http;
        config.backend.base_url = Some("http://127.0.0.1:9/api".to_string());

        let session = Session::open(config).await.unwrap();
        assert!(session.sqlite("setup profile").is_err());
        assert!(session.resolve_id("a1b2").await.is_err());
    }
}
