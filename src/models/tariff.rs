use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 255;

/// A priced service from the salon's price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub id: u64,
    pub nom: String,
    /// Price in euros, always carried with two decimals.
    pub prix: Decimal,
    /// Duration in minutes.
    pub duree: u32,
    pub description: Option<String>,
}

/// Payload for creating or replacing a tariff.
#[derive(Debug, Clone, Deserialize)]
pub struct TariffInput {
    #[serde(default)]
    pub nom: Option<String>,
    pub prix: Option<Decimal>,
    pub duree: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validation failure body, keyed by field name.
#[derive(Debug, Serialize)]
pub struct ValidationErrors {
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn new(errors: BTreeMap<String, Vec<String>>) -> Self {
        let total = errors.values().map(Vec::len).sum::<usize>();
        let first = errors
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_default();
        let message = if total > 1 {
            format!("{} (and {} more errors)", first, total - 1)
        } else {
            first
        };
        Self { message, errors }
    }

    pub fn single(field: &str, message: &str) -> Self {
        Self::new(BTreeMap::from([(field.to_string(), vec![message.to_string()])]))
    }
}

/// Fields of a tariff that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTariff {
    pub nom: String,
    pub prix: Decimal,
    pub duree: u32,
    pub description: Option<String>,
}

impl TariffInput {
    pub fn validate(self) -> Result<ValidTariff, ValidationErrors> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut push = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        let nom = self.nom.as_deref().unwrap_or_default().trim().to_string();
        if nom.is_empty() {
            push("nom", "The nom field is required.");
        } else if nom.chars().count() > MAX_NAME_LENGTH {
            push("nom", "The nom field must not be greater than 255 characters.");
        }

        match self.prix {
            None => push("prix", "The prix field is required."),
            Some(prix) if prix.is_sign_negative() && !prix.is_zero() => {
                push("prix", "The prix field must be at least 0.")
            }
            Some(_) => {}
        }

        let duree = match self.duree {
            None => {
                push("duree", "The duree field is required.");
                0
            }
            Some(duree) if duree < 1 => {
                push("duree", "The duree field must be at least 1.");
                0
            }
            Some(duree) => match u32::try_from(duree) {
                Ok(duree) => duree,
                Err(_) => {
                    push("duree", "The duree field is too large.");
                    0
                }
            },
        };

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(ValidTariff {
            nom,
            prix: normalize_price(self.prix.unwrap_or_default()),
            duree,
            description,
        })
    }
}

/// Round to cents and keep two decimals so `25` renders as `25.00`.
pub fn normalize_price(prix: Decimal) -> Decimal {
    let mut rounded = prix.round_dp(2);
    rounded.rescale(2);
    rounded
}
