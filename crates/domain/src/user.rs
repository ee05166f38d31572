use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn get_user(&self, id: UserID) -> Result<User, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_user(&self, id: UserID) -> Result<User, ReadError>;
    async fn create_user(&self, user: User) -> Result<User, CreateError>;
}

/// Authentication is handled upstream; users exist here only as the root of
/// every ownership chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub name: Name,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
    }

    #[test]
    fn test_user_id_new() {
        assert!(!UserID::new().is_nil());
        assert_ne!(UserID::new(), UserID::new());
    }
}
