use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::tariff::{normalize_price, TariffEntry, ValidTariff};

const HEADERS: [&str; 5] = ["id", "nom", "prix", "duree", "description"];

// Row as stored in the CSV file. Prices stay textual so "25.00" survives.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct TariffRecord {
    id: u64,
    nom: String,
    prix: String,
    duree: u32,
    description: String,
}

impl TryFrom<TariffRecord> for TariffEntry {
    type Error = StoreError;

    fn try_from(record: TariffRecord) -> Result<Self, Self::Error> {
        let prix = Decimal::from_str(record.prix.trim()).map_err(|e| {
            StoreError::Corrupt(format!("tariff {} has price '{}': {}", record.id, record.prix, e))
        })?;

        Ok(TariffEntry {
            id: record.id,
            nom: record.nom,
            prix: normalize_price(prix),
            duree: record.duree,
            description: Some(record.description).filter(|d| !d.is_empty()),
        })
    }
}

impl From<&TariffEntry> for TariffRecord {
    fn from(entry: &TariffEntry) -> Self {
        TariffRecord {
            id: entry.id,
            nom: entry.nom.clone(),
            prix: normalize_price(entry.prix).to_string(),
            duree: entry.duree,
            description: entry.description.clone().unwrap_or_default(),
        }
    }
}

/// Prices shipped with the salon before anyone edits the list.
pub fn default_tariffs() -> Vec<ValidTariff> {
    vec![
        ValidTariff {
            nom: "Manucure simple".to_string(),
            prix: Decimal::new(2500, 2),
            duree: 30,
            description: Some("Manucure classique avec vernis".to_string()),
        },
        ValidTariff {
            nom: "Pose de gel".to_string(),
            prix: Decimal::new(4000, 2),
            duree: 60,
            description: Some("Pose complète de gel sur ongles naturels".to_string()),
        },
        ValidTariff {
            nom: "Pédicure complète".to_string(),
            prix: Decimal::new(3500, 2),
            duree: 45,
            description: Some("Soin complet des pieds avec vernis".to_string()),
        },
    ]
}

/// CSV-backed price list.
///
/// Every operation takes the file mutex and works on the whole file, which
/// stays small (a few dozen services).
pub struct TariffStore {
    csv_path: String,
    file_mutex: Mutex<()>,
}

impl TariffStore {
    pub fn new(csv_path: &str) -> Result<Self, StoreError> {
        if !Path::new(csv_path).exists() {
            info!("Creating new tariff database file at {}", csv_path);

            if let Some(dir) = Path::new(csv_path).parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }

            let file = File::create(csv_path)?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(HEADERS)?;
            writer.flush()?;
        }

        Ok(Self {
            csv_path: csv_path.to_string(),
            file_mutex: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.file_mutex.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read_all(&self) -> Result<Vec<TariffEntry>, StoreError> {
        let file = File::open(&self.csv_path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        reader
            .deserialize::<TariffRecord>()
            .map(|row| TariffEntry::try_from(row?))
            .collect()
    }

    fn write_all(&self, entries: &[TariffEntry]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.csv_path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(HEADERS)?;
        for entry in entries {
            writer.serialize(TariffRecord::from(entry))?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn list(&self) -> Result<Vec<TariffEntry>, StoreError> {
        let _lock = self.lock()?;
        self.read_all()
    }

    pub fn get(&self, id: u64) -> Result<Option<TariffEntry>, StoreError> {
        let _lock = self.lock()?;
        Ok(self.read_all()?.into_iter().find(|t| t.id == id))
    }

    /// Tariffs keyed by exact name, as used by the revenue estimate.
    pub fn by_name(&self) -> Result<HashMap<String, TariffEntry>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .map(|t| (t.nom.clone(), t))
            .collect())
    }

    pub fn create(&self, tariff: ValidTariff) -> Result<TariffEntry, StoreError> {
        let _lock = self.lock()?;
        let mut entries = self.read_all()?;

        if entries.iter().any(|t| t.nom == tariff.nom) {
            return Err(StoreError::DuplicateName(tariff.nom));
        }

        let id = entries.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let entry = TariffEntry {
            id,
            nom: tariff.nom,
            prix: normalize_price(tariff.prix),
            duree: tariff.duree,
            description: tariff.description,
        };

        entries.push(entry.clone());
        self.write_all(&entries)?;

        info!("Created tariff {} '{}' at {}", entry.id, entry.nom, entry.prix);
        Ok(entry)
    }

    /// Replace a tariff. Returns `None` when the id does not exist.
    pub fn update(&self, id: u64, tariff: ValidTariff) -> Result<Option<TariffEntry>, StoreError> {
        let _lock = self.lock()?;
        let mut entries = self.read_all()?;

        if entries.iter().any(|t| t.id != id && t.nom == tariff.nom) {
            return Err(StoreError::DuplicateName(tariff.nom));
        }

        let Some(entry) = entries.iter_mut().find(|t| t.id == id) else {
            warn!("Tariff {} not found for update", id);
            return Ok(None);
        };

        entry.nom = tariff.nom;
        entry.prix = normalize_price(tariff.prix);
        entry.duree = tariff.duree;
        entry.description = tariff.description;
        let updated = entry.clone();

        self.write_all(&entries)?;

        info!("Updated tariff {} '{}'", updated.id, updated.nom);
        Ok(Some(updated))
    }

    /// Returns `false` when the id does not exist.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let _lock = self.lock()?;
        let mut entries = self.read_all()?;

        let before = entries.len();
        entries.retain(|t| t.id != id);
        if entries.len() == before {
            warn!("Tariff {} not found for deletion", id);
            return Ok(false);
        }

        self.write_all(&entries)?;

        info!("Deleted tariff {}", id);
        Ok(true)
    }

    /// Insert the default price list when the store is empty.
    ///
    /// Returns how many tariffs were added.
    pub fn seed_defaults(&self) -> Result<usize, StoreError> {
        if !self.list()?.is_empty() {
            return Ok(0);
        }

        let defaults = default_tariffs();
        let count = defaults.len();
        for tariff in defaults {
            self.create(tariff)?;
        }

        info!("Seeded {} default tariffs", count);
        Ok(count)
    }
}

/// Open the configured tariff store, seeding it on first start if enabled.
pub fn create_tariff_store(config: &Config) -> Result<Arc<TariffStore>, StoreError> {
    let store = TariffStore::new(&config.tariff_database_path)?;

    if config.seed_default_tariffs {
        store.seed_defaults()?;
    }

    Ok(Arc::new(store))
}
