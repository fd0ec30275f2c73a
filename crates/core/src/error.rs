use crate::types::DbId;

/// Boxed driver error carried by [`CoreError::Store`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The entity does not exist or is not accessible to the requester.
    /// Callers cannot tell the two cases apart.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The persistence layer could not complete an operation.
    #[error("Store failure: {0}")]
    Store(BoxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap any driver error as a store failure.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoreError::Store(Box::new(err))
    }

    /// Shorthand for a missing task.
    pub fn task_not_found(id: DbId) -> Self {
        CoreError::NotFound { entity: "Task", id }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
