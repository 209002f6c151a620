use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    #[error("nil comparison function")]
    MissingComparator,
}
