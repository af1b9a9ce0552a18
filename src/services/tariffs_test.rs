#[cfg(test)]
mod tariffs_tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    use rust_decimal::Decimal;
    use tempfile::tempdir;

    use crate::config::Config;
    use crate::error::StoreError;
    use crate::models::tariff::ValidTariff;
    use crate::services::tariffs::{create_tariff_store, TariffStore};

    fn valid(nom: &str, cents: i64, duree: u32) -> ValidTariff {
        ValidTariff {
            nom: nom.to_string(),
            prix: Decimal::new(cents, 2),
            duree,
            description: None,
        }
    }

    #[test]
    fn test_store_creation_writes_header() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("data").join("tarifs.csv");
        let csv_path_str = csv_path.to_str().unwrap();

        let store = TariffStore::new(csv_path_str).unwrap();

        assert!(Path::new(csv_path_str).exists());
        assert!(fs::read_to_string(&csv_path)
            .unwrap()
            .starts_with("id,nom,prix,duree,description"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_and_get() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("tarifs.csv");
        let store = TariffStore::new(csv_path.to_str().unwrap()).unwrap();

        let first = store.create(valid("Manucure simple", 2500, 30)).unwrap();
        let second = store
            .create(ValidTariff {
                description: Some("Gel, retrait compris".to_string()),
                ..valid("Pose de gel", 4000, 60)
            })
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let fetched = store.get(2).unwrap().unwrap();
        assert_eq!(fetched.nom, "Pose de gel");
        assert_eq!(fetched.prix.to_string(), "40.00");
        assert_eq!(fetched.description.as_deref(), Some("Gel, retrait compris"));
        assert!(store.get(99).unwrap().is_none());

        // Prices keep their two decimals on disk
        let contents = fs::read_to_string(&csv_path).unwrap();
        assert!(contents.contains("1,Manucure simple,25.00,30,"));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let dir = tempdir().unwrap();
        let store = TariffStore::new(dir.path().join("tarifs.csv").to_str().unwrap()).unwrap();

        store.create(valid("Manucure simple", 2500, 30)).unwrap();
        let result = store.create(valid("Manucure simple", 3000, 30));

        assert!(matches!(result, Err(StoreError::DuplicateName(name)) if name == "Manucure simple"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_update() {
        let dir = tempdir().unwrap();
        let store = TariffStore::new(dir.path().join("tarifs.csv").to_str().unwrap()).unwrap();
        store.create(valid("Manucure simple", 2500, 30)).unwrap();
        store.create(valid("Pose de gel", 4000, 60)).unwrap();

        let updated = store.update(1, valid("Manucure simple", 2750, 35)).unwrap().unwrap();
        assert_eq!(updated.prix.to_string(), "27.50");
        assert_eq!(store.get(1).unwrap().unwrap().duree, 35);

        // Renaming onto another tariff's name is refused
        assert!(matches!(
            store.update(1, valid("Pose de gel", 2500, 30)),
            Err(StoreError::DuplicateName(_))
        ));

        assert!(store.update(42, valid("Nail art", 1500, 20)).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = TariffStore::new(dir.path().join("tarifs.csv").to_str().unwrap()).unwrap();
        store.create(valid("Manucure simple", 2500, 30)).unwrap();
        store.create(valid("Pose de gel", 4000, 60)).unwrap();

        assert!(store.delete(1).unwrap());
        assert!(!store.delete(1).unwrap());

        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].nom, "Pose de gel");

        // Ids are not reused after a deletion
        let next = store.create(valid("Pédicure complète", 3500, 45)).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_by_name() {
        let dir = tempdir().unwrap();
        let store = TariffStore::new(dir.path().join("tarifs.csv").to_str().unwrap()).unwrap();
        store.create(valid("Manucure simple", 2500, 30)).unwrap();
        store.create(valid("Pose de gel", 4000, 60)).unwrap();

        let by_name = store.by_name().unwrap();
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_name["Pose de gel"].prix, Decimal::new(40, 0));
        assert!(!by_name.contains_key("pose de gel"));
    }

    #[test]
    fn test_seed_defaults_only_when_empty() {
        let dir = tempdir().unwrap();
        let store = TariffStore::new(dir.path().join("tarifs.csv").to_str().unwrap()).unwrap();

        assert_eq!(store.seed_defaults().unwrap(), 3);
        assert_eq!(store.seed_defaults().unwrap(), 0);

        let names: Vec<String> = store.list().unwrap().into_iter().map(|t| t.nom).collect();
        assert_eq!(names, vec!["Manucure simple", "Pose de gel", "Pédicure complète"]);
    }

    #[test]
    fn test_existing_file_is_reused() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("tarifs.csv");
        fs::write(
            &csv_path,
            "id,nom,prix,duree,description\n7,Vernis semi-permanent,30,40,\"Tenue, 3 semaines\"\n",
        )
        .unwrap();

        let store = TariffStore::new(csv_path.to_str().unwrap()).unwrap();
        let entries = store.list().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 7);
        assert_eq!(entries[0].prix.to_string(), "30.00");
        assert_eq!(entries[0].description.as_deref(), Some("Tenue, 3 semaines"));
        assert_eq!(store.create(valid("Retouche", 1000, 15)).unwrap().id, 8);
    }

    #[test]
    fn test_corrupt_price_is_reported() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("tarifs.csv");
        fs::write(&csv_path, "id,nom,prix,duree,description\n1,Manucure,vingt,30,\n").unwrap();

        let store = TariffStore::new(csv_path.to_str().unwrap()).unwrap();
        assert!(matches!(store.list(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_create_tariff_store_from_config() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("tarifs.csv").to_str().unwrap().to_string();

        let vars: HashMap<&str, String> = HashMap::from([
            ("GOOGLE_CALENDAR_ID", "salon@group.calendar.google.com".to_string()),
            ("GOOGLE_ACCESS_TOKEN", "ya29.test".to_string()),
            ("TARIFF_DATABASE_PATH", csv_path),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();

        let store = create_tariff_store(&config).unwrap();
        assert_eq!(store.list().unwrap().len(), 3);
    }
}
