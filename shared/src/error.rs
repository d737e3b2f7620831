#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShortenerError {
    /// The store call itself failed. Carries the store's error text unchanged.
    #[error("{0}")]
    Store(String),
    #[error("no unused short code found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl From<String> for ShortenerError {
    fn from(message: String) -> Self {
        ShortenerError::Store(message)
    }
}
