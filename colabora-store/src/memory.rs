//! An initiative store that keeps everything in process memory.

use crate::{
    CrudAction, CrudOutcome, Initiative, InitiativeChanges, InitiativeKey, InitiativeRepository,
    StoreError,
};
use async_trait::async_trait;
use colabora_settings::Settings;
use dashmap::{mapref::entry::Entry, DashMap};
use std::path::Path;

/// An in-memory [`InitiativeRepository`].
///
/// Every mutation goes through a single [`DashMap`] entry or removal, which
/// holds the shard lock for its identity while checking and changing it.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    /// The stored initiatives, by identity.
    items: DashMap<InitiativeKey, Initiative>,
}

impl MemoryRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from settings, loading the configured fixtures if any.
    ///
    /// # Errors
    /// If the fixture file cannot be read or is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        match &settings.store.fixtures {
            Some(path) => Self::from_fixtures(path),
            None => Ok(Self::new()),
        }
    }

    /// Create a store pre-populated with the initiatives listed in `path`.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    ///
    /// # Errors
    /// If the file cannot be read, does not contain a list of initiatives, or
    /// lists the same identity more than once.
    pub fn from_fixtures<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::FixtureIo {
            path: path.display().to_string(),
            source,
        })?;

        let initiatives: Vec<Initiative> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|error| StoreError::FixtureFormat(error.into()))?,
            _ => serde_yaml::from_str(&contents)
                .map_err(|error| StoreError::FixtureFormat(error.into()))?,
        };

        let store = Self::from_initiatives(initiatives)?;
        tracing::info!(
            r#type = "store.fixtures.loaded",
            path = %path.display(),
            count = store.items.len(),
            "Loaded initiative fixtures"
        );
        Ok(store)
    }

    /// Create a store holding `initiatives`.
    ///
    /// # Errors
    /// If two initiatives share an identity.
    pub fn from_initiatives<I>(initiatives: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Initiative>,
    {
        let items = DashMap::new();
        for initiative in initiatives {
            match items.entry(initiative.key()) {
                Entry::Occupied(occupied) => {
                    return Err(StoreError::DuplicateFixture(occupied.key().clone()))
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(initiative);
                }
            }
        }
        Ok(Self { items })
    }

    /// The number of stored initiatives.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no initiatives.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl InitiativeRepository for MemoryRepository {
    async fn list(&self, entidad: &str, legislatura: &str) -> Result<Vec<Initiative>, StoreError> {
        let mut matching: Vec<Initiative> = self
            .items
            .iter()
            .filter(|item| item.key().entidad == entidad && item.key().legislatura == legislatura)
            .map(|item| item.value().clone())
            .collect();
        matching.sort_by_key(|initiative| initiative.numero);
        Ok(matching)
    }

    async fn get(&self, key: &InitiativeKey) -> Result<Option<Initiative>, StoreError> {
        Ok(self.items.get(key).map(|item| item.value().clone()))
    }

    async fn create(&self, initiative: Initiative) -> Result<CrudOutcome, StoreError> {
        let action = CrudAction::Create;
        let numero = initiative.numero;
        let key = initiative.key();

        // The entry holds the shard lock until the end of the match.
        let outcome = match self.items.entry(key.clone()) {
            Entry::Occupied(_) => CrudOutcome::Failure { action, numero },
            Entry::Vacant(vacant) => {
                vacant.insert(initiative);
                CrudOutcome::Success { action, numero }
            }
        };

        tracing::debug!(r#type = event_type(&outcome), %key, "{}", outcome);
        Ok(outcome)
    }

    async fn update(
        &self,
        key: &InitiativeKey,
        changes: InitiativeChanges,
    ) -> Result<CrudOutcome, StoreError> {
        let action = CrudAction::Update;
        let numero = key.numero;

        let outcome = match self.items.get_mut(key) {
            Some(mut existing) => {
                let InitiativeChanges { cambios, documento } = changes;
                existing.cambios = cambios;
                existing.documento = documento;
                CrudOutcome::Success { action, numero }
            }
            None => CrudOutcome::Failure { action, numero },
        };

        tracing::debug!(r#type = event_type(&outcome), %key, "{}", outcome);
        Ok(outcome)
    }

    async fn remove(&self, key: &InitiativeKey) -> Result<CrudOutcome, StoreError> {
        let action = CrudAction::Remove;
        let numero = key.numero;

        let outcome = match self.items.remove(key) {
            Some(_) => CrudOutcome::Success { action, numero },
            None => CrudOutcome::Failure { action, numero },
        };

        tracing::debug!(r#type = event_type(&outcome), %key, "{}", outcome);
        Ok(outcome)
    }

    async fn all(&self) -> Result<Vec<Initiative>, StoreError> {
        let mut everything: Vec<(InitiativeKey, Initiative)> = self
            .items
            .iter()
            .map(|item| (item.key().clone(), item.value().clone()))
            .collect();
        everything.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(everything.into_iter().map(|(_, initiative)| initiative).collect())
    }
}

/// The `type` field of the event logged when a mutation finishes.
fn event_type(outcome: &CrudOutcome) -> &'static str {
    match (outcome.action(), outcome.is_success()) {
        (CrudAction::Create, true) => "store.initiative.created",
        (CrudAction::Create, false) => "store.initiative.create-failed",
        (CrudAction::Update, true) => "store.initiative.updated",
        (CrudAction::Update, false) => "store.initiative.update-failed",
        (CrudAction::Remove, true) => "store.initiative.removed",
        (CrudAction::Remove, false) => "store.initiative.remove-failed",
    }
}

#[cfg(test)]
mod tests {
    use super::{event_type, MemoryRepository};
    use crate::{
        CrudAction, CrudOutcome, Initiative, InitiativeChanges, InitiativeKey,
        InitiativeRepository, StoreError,
    };
    use pretty_assertions::assert_eq;
    use std::{io::Write, sync::Arc};

    fn initiative(entidad: &str, legislatura: &str, numero: i64) -> Initiative {
        Initiative {
            entidad: entidad.to_string(),
            legislatura: legislatura.to_string(),
            numero,
            tema: format!("tema{}", numero),
            cambios: format!("cambios{}", numero),
            documento: format!("documento{}", numero),
        }
    }

    fn seeded() -> MemoryRepository {
        MemoryRepository::from_initiatives(vec![
            initiative("entidad1", "legislatura1", 3),
            initiative("entidad1", "legislatura1", 1),
            initiative("entidad2", "legislatura1", 2),
        ])
        .expect("fixtures are unique")
    }

    #[tokio::test]
    async fn test_create_twice_fails_the_second_time() {
        let store = MemoryRepository::new();
        let first = store.create(initiative("e", "l", 7)).await.unwrap();
        let second = store.create(initiative("e", "l", 7)).await.unwrap();

        assert_eq!(first, CrudOutcome::Success { action: CrudAction::Create, numero: 7 });
        assert_eq!(second, CrudOutcome::Failure { action: CrudAction::Create, numero: 7 });
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_original_record() {
        let store = seeded();
        let mut clash = initiative("entidad1", "legislatura1", 3);
        clash.cambios = "otro".to_string();

        let outcome = store.create(clash).await.unwrap();
        assert_eq!(outcome.to_string(), "error: iniciativa 3 no creada");

        let stored = store
            .get(&InitiativeKey::new("entidad1", "legislatura1", 3))
            .await
            .unwrap()
            .expect("record should still exist");
        assert_eq!(stored.cambios, "cambios3");
    }

    #[tokio::test]
    async fn test_update_and_remove_absent_fail() {
        let store = seeded();
        let key = InitiativeKey::new("entidad1", "legislatura1", 2);
        let changes = InitiativeChanges {
            cambios: "cambios22".to_string(),
            documento: "documento22".to_string(),
        };

        let updated = store.update(&key, changes).await.unwrap();
        let removed = store.remove(&key).await.unwrap();

        assert_eq!(updated.to_string(), "error: iniciativa 2 no actualizada");
        assert_eq!(removed.to_string(), "error: iniciativa 2 no removida");
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_create_update_remove_round_trip() {
        let store = seeded();
        let before = store.all().await.unwrap();
        let key = InitiativeKey::new("entidad1", "legislatura1", 4);

        let created = store.create(initiative("entidad1", "legislatura1", 4)).await.unwrap();
        assert!(created.is_success());
        assert_eq!(store.list("entidad1", "legislatura1").await.unwrap().len(), 3);

        let changes = InitiativeChanges {
            cambios: "cambios44".to_string(),
            documento: "documento44".to_string(),
        };
        let updated = store.update(&key, changes).await.unwrap();
        assert_eq!(updated.to_string(), "ok: iniciativa 4 actualizada");

        let stored = store.get(&key).await.unwrap().expect("just created");
        assert_eq!(stored.cambios, "cambios44");
        assert_eq!(stored.documento, "documento44");
        assert_eq!(stored.tema, "tema4");

        let removed = store.remove(&key).await.unwrap();
        assert_eq!(removed.to_string(), "ok: iniciativa 4 removida");
        assert_eq!(store.get(&key).await.unwrap(), None);
        assert_eq!(store.all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_by_number() {
        let store = seeded();
        let listed = store.list("entidad1", "legislatura1").await.unwrap();
        let numbers: Vec<i64> = listed.iter().map(|i| i.numero).collect();
        assert_eq!(numbers, vec![1, 3]);

        assert!(store.list("entidad1", "legislatura9").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_succeed_once() {
        let store = Arc::new(MemoryRepository::new());
        let attempts = (0..32).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(initiative("e", "l", 1)).await })
        });

        let outcomes = futures::future::join_all(attempts).await;
        let successes = outcomes
            .into_iter()
            .map(|joined| joined.expect("task panicked").expect("store error"))
            .filter(CrudOutcome::is_success)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn test_duplicate_fixtures_rejected() {
        let result = MemoryRepository::from_initiatives(vec![
            initiative("entidad1", "legislatura1", 1),
            initiative("entidad1", "legislatura1", 1),
        ]);
        assert!(matches!(result, Err(StoreError::DuplicateFixture(key)) if key.numero == 1));
    }

    #[test]
    fn test_load_yaml_fixtures() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("could not create temp file");
        writeln!(
            file,
            "- entidad: entidad1\n  legislatura: legislatura1\n  numero: 1\n  tema: tema1\n  cambios: c\n  documento: d"
        )
        .unwrap();

        let store = MemoryRepository::from_fixtures(file.path()).expect("fixtures should load");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_json_fixtures() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("could not create temp file");
        let body = serde_json::to_string(&vec![initiative("e", "l", 1), initiative("e", "l", 2)])
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let store = MemoryRepository::from_fixtures(file.path()).expect("fixtures should load");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_missing_fixture_file() {
        let result = MemoryRepository::from_fixtures("/nonexistent/fixtures.yaml");
        assert!(matches!(result, Err(StoreError::FixtureIo { .. })));
    }

    #[test]
    fn test_malformed_fixture_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("could not create temp file");
        writeln!(file, "not: [a, list").unwrap();

        let result = MemoryRepository::from_fixtures(file.path());
        assert!(matches!(result, Err(StoreError::FixtureFormat(_))));
    }

    #[test]
    fn test_event_types_name_the_outcome() {
        let created = CrudOutcome::Success {
            action: CrudAction::Create,
            numero: 4,
        };
        let not_removed = CrudOutcome::Failure {
            action: CrudAction::Remove,
            numero: 2,
        };
        assert_eq!(event_type(&created), "store.initiative.created");
        assert_eq!(event_type(&not_removed), "store.initiative.remove-failed");
    }
}
