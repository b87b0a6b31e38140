//! Command-line interface for the bankeu verification console.

pub mod commands;
pub mod id_resolver;
pub mod output;
pub mod session;
pub mod types;

pub use types::{Cli, Commands};

use console::style;

use crate::domain::errors::DomainError;
use crate::domain::models::SetupArea;

/// Command that completes the given setup area.
pub fn setup_hint(area: &SetupArea) -> String {
    match area {
        SetupArea::PersonalProfile => {
            "bankeu setup profile --name <NAME> --title <TITLE> --signature <REF>".to_string()
        }
        SetupArea::InstitutionConfiguration { institution_id } => format!(
            "bankeu setup institution {institution_id} \
             --delegate-name <NAME> --delegate-title <TITLE> --signature <REF>"
        ),
    }
}

/// Print `err` and exit non-zero. Eligibility failures also name the setup
/// area to complete.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let setup_area = match err.downcast_ref::<DomainError>() {
        Some(DomainError::Eligibility { setup_area, .. }) => Some(setup_area.clone()),
        _ => None,
    };

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
            "setup_area": setup_area,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
        if let Some(area) = &setup_area {
            eprintln!("{} {}", style("hint:").cyan().bold(), setup_hint(area));
        }
    }

    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_hint_names_institution() {
        let hint = setup_hint(&SetupArea::InstitutionConfiguration {
            institution_id: "dpmd".to_string(),
        });
        assert!(hint.starts_with("bankeu setup institution dpmd"));
        assert!(setup_hint(&SetupArea::PersonalProfile).starts_with("bankeu setup profile"));
    }
}
