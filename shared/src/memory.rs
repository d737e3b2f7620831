use crate::core::{InsertOutcome, Record, UrlRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// `UrlRepository` over a shared in-process map. Clones see the same records,
/// so two shorteners built from clones behave like two invocations sharing a
/// table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUrlRepository {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let repo = Self::new();
        repo.lock()
            .extend(records.into_iter().map(|r| (r.code, r.long_url)));
        repo
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn get_long_url(&self, code: &str) -> Result<Option<String>, String> {
        Ok(self.lock().get(code).cloned())
    }

    async fn put_record(&self, record: &Record) -> Result<(), String> {
        self.lock()
            .insert(record.code.clone(), record.long_url.clone());
        Ok(())
    }

    async fn insert_record_if_absent(&self, record: &Record) -> Result<InsertOutcome, String> {
        let mut records = self.lock();
        if records.contains_key(&record.code) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(record.code.clone(), record.long_url.clone());
        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AllocationStrategy, MockIdGenerator, UrlShortener};

    fn fixed_generator(ids: &'static [&'static str]) -> MockIdGenerator {
        let mut id_generator = MockIdGenerator::new();
        let mut next = 0;
        id_generator.expect_generate_id().returning(move || {
            let id = ids[next % ids.len()];
            next += 1;
            id.to_string()
        });
        id_generator
    }

    #[tokio::test]
    async fn created_code_resolves_to_original_url() {
        let repo = InMemoryUrlRepository::new();
        let url_shortener = UrlShortener::new(repo.clone(), fixed_generator(&["abcDEF12"]));

        let record = url_shortener
            .shorten_url("https://example.com".to_string())
            .await
            .unwrap();
        let resolved = repo.get_long_url(&record.code).await.unwrap();

        assert_eq!(resolved, Some("https://example.com".to_string()));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn conditional_insert_does_not_overwrite() {
        let repo = InMemoryUrlRepository::with_records([Record::new(
            "abcDEF12".to_string(),
            "https://first.example".to_string(),
        )]);

        let outcome = repo
            .insert_record_if_absent(&Record::new(
                "abcDEF12".to_string(),
                "https://second.example".to_string(),
            ))
            .await;

        assert_eq!(outcome, Ok(InsertOutcome::AlreadyExists));
        assert_eq!(
            repo.get_long_url("abcDEF12").await,
            Ok(Some("https://first.example".to_string()))
        );
    }

    // Two creators both see "abcDEF12" as free before either writes.
    #[tokio::test]
    async fn check_then_write_race_lets_later_write_win() {
        let repo = InMemoryUrlRepository::new();
        let first = UrlShortener::new(repo.clone(), fixed_generator(&["abcDEF12"]))
            .with_strategy(AllocationStrategy::CheckThenWrite);
        let second = UrlShortener::new(repo.clone(), fixed_generator(&["abcDEF12"]))
            .with_strategy(AllocationStrategy::CheckThenWrite);

        let first_code = first.allocate_code().await.unwrap();
        let second_code = second.allocate_code().await.unwrap();
        assert_eq!(first_code, second_code);

        first
            .store_record(&Record::new(first_code.clone(), "https://first.example".to_string()))
            .await
            .unwrap();
        second
            .store_record(&Record::new(second_code, "https://second.example".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(
            repo.get_long_url(&first_code).await.unwrap(),
            Some("https://second.example".to_string())
        );
    }

    #[tokio::test]
    async fn conditional_insert_race_keeps_both_links() {
        let repo = InMemoryUrlRepository::new();
        let first = UrlShortener::new(repo.clone(), fixed_generator(&["abcDEF12"]));
        let second = UrlShortener::new(repo.clone(), fixed_generator(&["abcDEF12", "ghiJKL34"]));

        let first_record = first
            .shorten_url("https://first.example".to_string())
            .await
            .unwrap();
        let second_record = second
            .shorten_url("https://second.example".to_string())
            .await
            .unwrap();

        assert_eq!(first_record.code, "abcDEF12");
        assert_eq!(second_record.code, "ghiJKL34");
        assert_eq!(
            repo.get_long_url("abcDEF12").await,
            Ok(Some("https://first.example".to_string()))
        );
        assert_eq!(
            repo.get_long_url("ghiJKL34").await,
            Ok(Some("https://second.example".to_string()))
        );
    }

    #[tokio::test]
    async fn concurrent_creates_never_share_a_code() {
        let repo = InMemoryUrlRepository::new();
        let url_shortener = std::sync::Arc::new(UrlShortener::new(
            repo.clone(),
            crate::core::RandomCodeGenerator::from_seed(99),
        ));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let url_shortener = url_shortener.clone();
                tokio::spawn(async move {
                    url_shortener
                        .shorten_url(format!("https://example.com/{}", i))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.len(), 32);
    }
}
