//! Short ID prefix resolution for CLI proposal commands.
//!
//! Allows users to specify any unique prefix of a proposal UUID instead of
//! the full id, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const PROPOSAL_QUERY: &str = "SELECT id FROM proposals WHERE id LIKE ? ORDER BY id";

/// Parse a full proposal id without touching any database.
pub fn parse_full_id(input: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim()).map_err(|_| {
        anyhow::anyhow!("'{input}' is not a full proposal id; prefixes need the sqlite backend")
    })
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("Invalid ID prefix '{prefix}': must contain only hex characters and dashes");
    }
    Ok(())
}

/// Resolve a proposal ID prefix to a full UUID.
pub async fn resolve_proposal_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    let prefix = prefix.trim();

    // Fast path: a full UUID needs no lookup
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{}%", prefix.to_lowercase());
    let rows: Vec<(String,)> = sqlx::query_as(PROPOSAL_QUERY)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    match rows.len() {
        0 => bail!("No proposal found matching '{prefix}'"),
        1 => Ok(Uuid::parse_str(&rows[0].0)?),
        n => {
            let mut msg = format!("Ambiguous prefix '{prefix}': matches {n} proposals:");
            for row in &rows {
                msg.push_str(&format!("\n  {}", row.0));
            }
            bail!("{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteProposalRepository};
    use crate::domain::models::{Proposal, RegionRef};

    async fn seeded() -> (SqlitePool, Vec<Uuid>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteProposalRepository::new(pool.clone());

        let mut ids = Vec::new();
        for raw in [
            "a1b2c3d4-0000-4000-8000-000000000001",
            "a1b2ffff-0000-4000-8000-000000000002",
        ] {
            let mut p = Proposal::new(
                "Jalan Desa",
                2025,
                RegionRef::new("v1", "Cisarua"),
                RegionRef::new("d1", "Lembang"),
            );
            p.id = Uuid::parse_str(raw).unwrap();
            repo.insert_proposal(&p).await.unwrap();
            ids.push(p.id);
        }
        (pool, ids)
    }

    #[tokio::test]
    async fn test_unique_prefix_resolves() {
        let (pool, ids) = seeded().await;
        assert_eq!(resolve_proposal_id(&pool, "a1b2c3").await.unwrap(), ids[0]);
        assert_eq!(resolve_proposal_id(&pool, "A1B2FF").await.unwrap(), ids[1]);
    }

    #[tokio::test]
    async fn test_ambiguous_and_missing_prefix() {
        let (pool, _) = seeded().await;
        let err = resolve_proposal_id(&pool, "a1b2").await.unwrap_err();
        assert!(err.to_string().contains("Ambiguous prefix"));

        let err = resolve_proposal_id(&pool, "ffff").await.unwrap_err();
        assert!(err.to_string().contains("No proposal found"));
    }

    #[tokio::test]
    async fn test_invalid_prefix_rejected() {
        let (pool, _) = seeded().await;
        assert!(resolve_proposal_id(&pool, "zz%").await.is_err());
        assert!(resolve_proposal_id(&pool, "").await.is_err());
    }

    #[test]
    fn test_parse_full_id() {
        assert!(parse_full_id("a1b2c3d4-0000-4000-8000-000000000001").is_ok());
        assert!(parse_full_id("a1b2").is_err());
    }
}
