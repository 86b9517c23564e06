#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed filter for '{key}': {token}")]
    Malformed { key: String, token: String },
    #[error("Invalid value for '{key}': {value}")]
    Pagination { key: String, value: String },
    #[error("Expression exceeds maximum nesting depth of {0}")]
    DepthExceeded(usize),
}
