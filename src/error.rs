use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TreeError {
    #[error("element already exist")]
    DuplicateElement,
}
