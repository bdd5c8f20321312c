//! Client registry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    /// RUC or cédula
    #[serde(alias = "ruc")]
    pub tax_id: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn from_input(id: Uuid, input: ClientInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            tax_id: input.tax_id.trim().to_string(),
            address: input.address.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            created_at,
        }
    }

    /// Form contents for editing this client
    pub fn to_input(&self) -> ClientInput {
        ClientInput {
            name: self.name.clone(),
            tax_id: self.tax_id.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }

    /// Case-insensitive name comparison used by client resolution
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Client form: used for both registration and edits
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    #[validate(custom = "crate::validation::not_blank")]
    pub name: String,
    #[serde(alias = "ruc")]
    #[validate(custom = "crate::validation::tax_id")]
    pub tax_id: String,
    #[validate(custom = "crate::validation::not_blank")]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    #[validate(custom = "crate::validation::optional_email")]
    pub email: String,
}

impl ClientInput {
    /// Registration form pre-filled from the autocomplete text
    pub fn prefilled(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Default::default()
        }
    }
}
