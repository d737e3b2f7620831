use crate::error::ShortenerError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

/// Characters a short code is drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const SHORT_CODE_LENGTH: usize = 8;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub code: String,
    pub long_url: String,
}

impl Record {
    pub fn new(code: String, long_url: String) -> Self {
        Self { code, long_url }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait UrlRepository: Debug {
    /// Point read. `Ok(None)` means no record holds this code.
    async fn get_long_url(&self, code: &str) -> Result<Option<String>, String>;
    /// Unconditional upsert keyed by `record.code`.
    async fn put_record(&self, record: &Record) -> Result<(), String>;
    async fn insert_record_if_absent(&self, record: &Record) -> Result<InsertOutcome, String>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
pub trait IdGenerator {
    fn generate_id(&self) -> String;
}

/// Draws `length` characters uniformly, with replacement, from [`ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug)]
pub struct RandomCodeGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomCodeGenerator {
    /// Seeds the random source once from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            length: SHORT_CODE_LENGTH,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomCodeGenerator {
    fn generate_id(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        generate_code(&mut *rng, self.length)
    }
}

/// How `UrlShortener::shorten_url` makes sure a code is used only once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Read the candidate, then write it unconditionally. Two concurrent
    /// callers can both see a code as free and the later write wins.
    CheckThenWrite,
    /// Let the store reject the write when the code is taken.
    #[default]
    ConditionalInsert,
}

#[derive(Debug)]
pub struct UrlShortener<R: UrlRepository, G: IdGenerator> {
    url_repo: R,
    id_generator: G,
    max_attempts: u32,
    strategy: AllocationStrategy,
}

impl<R: UrlRepository, G: IdGenerator> UrlShortener<R, G> {
    pub fn new(url_repo: R, id_generator: G) -> Self {
        Self {
            url_repo,
            id_generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            strategy: AllocationStrategy::default(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Generates candidates until the store reports one as unused.
    ///
    /// Store errors abort immediately; only a taken code is retried, at most
    /// `max_attempts` times. Nothing is reserved: the code is free as of the
    /// read, not as of any later write.
    pub async fn allocate_code(&self) -> Result<String, ShortenerError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.id_generator.generate_id();
            match self.url_repo.get_long_url(&candidate).await? {
                None => return Ok(candidate),
                Some(_) => {
                    tracing::warn!(attempt, code = %candidate, "short code taken, retrying");
                }
            }
        }

        Err(ShortenerError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Allocates a code for `long_url` and persists the record.
    pub async fn shorten_url(&self, long_url: String) -> Result<Record, ShortenerError> {
        match self.strategy {
            AllocationStrategy::CheckThenWrite => {
                let code = self.allocate_code().await?;
                let record = Record::new(code, long_url);
                self.store_record(&record).await?;
                Ok(record)
            }
            AllocationStrategy::ConditionalInsert => self.insert_with_retry(long_url).await,
        }
    }

    /// Unconditional write of an already allocated record.
    pub async fn store_record(&self, record: &Record) -> Result<(), ShortenerError> {
        self.url_repo.put_record(record).await?;
        tracing::debug!(code = %record.code, "record stored");
        Ok(())
    }

    async fn insert_with_retry(&self, long_url: String) -> Result<Record, ShortenerError> {
        let mut record = Record::new(String::new(), long_url);
        for attempt in 1..=self.max_attempts {
            record.code = self.id_generator.generate_id();
            match self.url_repo.insert_record_if_absent(&record).await? {
                InsertOutcome::Inserted => {
                    tracing::debug!(attempt, code = %record.code, "record inserted");
                    return Ok(record);
                }
                InsertOutcome::AlreadyExists => {
                    tracing::warn!(attempt, code = %record.code, "short code taken, retrying");
                }
            }
        }

        Err(ShortenerError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
