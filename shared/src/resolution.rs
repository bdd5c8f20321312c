//! Client autocomplete: matching typed text to an existing client

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Client, ClientInput};

/// What a piece of typed client text resolves to
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientResolution {
    /// Input was emptied; selection is cleared
    Cleared,
    Selected { client: Client },
    /// No client has this name; offer the pre-filled registration form
    RegisterNew { form: ClientInput },
}

/// Resolve free text against `clients` by case-insensitive exact name
pub fn resolve_client(clients: &[Client], input: &str) -> ClientResolution {
    let typed = input.trim();
    if typed.is_empty() {
        return ClientResolution::Cleared;
    }
    match find_client_by_name(clients, typed) {
        Some(client) => ClientResolution::Selected {
            client: client.clone(),
        },
        None => ClientResolution::RegisterNew {
            form: ClientInput::prefilled(typed),
        },
    }
}

pub fn find_client_by_name<'a>(clients: &'a [Client], name: &str) -> Option<&'a Client> {
    clients.iter().find(|c| c.name_matches(name))
}

/// One entry of the autocomplete dropdown
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientOption {
    Existing { id: Uuid, label: String },
    RegisterNew { input_value: String, label: String },
}

/// Clients whose name contains the input, plus a registration entry when
/// nothing matches exactly
pub fn client_suggestions(clients: &[Client], input: &str) -> Vec<ClientOption> {
    let typed = input.trim();
    let needle = typed.to_lowercase();

    let mut options: Vec<ClientOption> = clients
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .map(|c| ClientOption::Existing {
            id: c.id,
            label: c.name.clone(),
        })
        .collect();

    if !typed.is_empty() && find_client_by_name(clients, typed).is_none() {
        options.push(ClientOption::RegisterNew {
            input_value: typed.to_string(),
            label: format!("Registrar nuevo cliente: \"{}\"", typed),
        });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tax_id: "0912345678".to_string(),
            address: "Guayaquil".to_string(),
            phone: String::new(),
            email: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let clients = vec![client("Ferretería Luna"), client("Acme")];
        match resolve_client(&clients, "acme") {
            ClientResolution::Selected { client } => assert_eq!(client.name, "Acme"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_name_opens_prefilled_form() {
        let clients = vec![client("Ferretería Luna")];
        assert_eq!(
            resolve_client(&clients, "Acme"),
            ClientResolution::RegisterNew {
                form: ClientInput::prefilled("Acme")
            }
        );
    }

    #[test]
    fn test_empty_input_clears() {
        let clients = vec![client("Acme")];
        assert_eq!(resolve_client(&clients, "  "), ClientResolution::Cleared);
    }

    #[test]
    fn test_partial_match_is_not_a_selection() {
        let clients = vec![client("Acme Corp")];
        assert!(matches!(
            resolve_client(&clients, "Acme"),
            ClientResolution::RegisterNew { .. }
        ));
    }

    #[test]
    fn test_suggestions_filter_and_offer_registration() {
        let clients = vec![client("Acme Corp"), client("Panadería Acme"), client("Luna")];
        let options = client_suggestions(&clients, "acme");
        assert_eq!(options.len(), 3);
        assert!(matches!(
            options.last(),
            Some(ClientOption::RegisterNew { input_value, .. }) if input_value == "acme"
        ));
    }

    #[test]
    fn test_suggestions_skip_registration_on_exact_match() {
        let clients = vec![client("Luna")];
        let options = client_suggestions(&clients, "LUNA");
        assert_eq!(options.len(), 1);
        assert!(matches!(options[0], ClientOption::Existing { .. }));
    }
}
