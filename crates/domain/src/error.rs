#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Field { field: String, message: String },
    #[error("{0} has already been taken")]
    Conflict(String),
}

impl ValidationError {
    pub fn field(field: &str, message: impl std::fmt::Display) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// An ownership check failed. Converted into the not-found variant of the
/// operation's error type so that a foreign id is indistinguishable from a
/// missing one.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AccessError {
    #[error("access denied")]
    Denied,
}

impl From<AccessError> for ReadError {
    fn from(_: AccessError) -> Self {
        ReadError::NotFound
    }
}

impl From<AccessError> for CreateError {
    fn from(_: AccessError) -> Self {
        CreateError::NotFound
    }
}

impl From<AccessError> for UpdateError {
    fn from(_: AccessError) -> Self {
        UpdateError::NotFound
    }
}

impl From<AccessError> for DeleteError {
    fn from(_: AccessError) -> Self {
        DeleteError::NotFound
    }
}

impl From<ReadError> for CreateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => CreateError::NotFound,
            ReadError::Storage(storage) => CreateError::Storage(storage),
            ReadError::Other(other) => CreateError::Other(other),
        }
    }
}

impl From<ReadError> for UpdateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => UpdateError::NotFound,
            ReadError::Storage(storage) => UpdateError::Storage(storage),
            ReadError::Other(other) => UpdateError::Other(other),
        }
    }
}

impl From<ReadError> for DeleteError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => DeleteError::NotFound,
            ReadError::Storage(storage) => DeleteError::Storage(storage),
            ReadError::Other(other) => DeleteError::Other(other),
        }
    }
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CreateError::NotFound,
            UpdateError::Conflict => CreateError::Conflict,
            UpdateError::Validation(validation) => CreateError::Validation(validation),
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_from_access_error() {
        assert!(matches!(
            ReadError::from(AccessError::Denied),
            ReadError::NotFound
        ));
    }

    #[test]
    fn test_create_error_from_read_error() {
        assert!(matches!(
            CreateError::from(ReadError::NotFound),
            CreateError::NotFound
        ));
        assert!(matches!(
            CreateError::from(ReadError::Storage(StorageError::NoConnection)),
            CreateError::Storage(StorageError::NoConnection)
        ));
        assert!(matches!(
            CreateError::from(ReadError::Other("foo".into())),
            CreateError::Other(error) if error.to_string() == "foo"
        ));
    }

    #[test]
    fn test_create_error_from_update_error() {
        assert!(matches!(
            CreateError::from(UpdateError::Conflict),
            CreateError::Conflict
        ));
        assert!(matches!(
            CreateError::from(UpdateError::NotFound),
            CreateError::NotFound
        ));
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::field("reps", "Reps cannot exceed 500.").to_string(),
            "reps: Reps cannot exceed 500."
        );
        assert_eq!(
            ValidationError::Conflict("name".to_string()).to_string(),
            "name has already been taken"
        );
    }
}
