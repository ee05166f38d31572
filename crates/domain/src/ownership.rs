use crate::{AccessError, UserID};

/// Compare the requesting user against the resolved owner of an entity.
///
/// The owner of a child entity is resolved by walking its parent references
/// (session set → session exercise → training session → user; training
/// exercise → training → user) before any mutation and before any data is
/// returned. A failed check converts into the not-found variant of the
/// operation's error type, so a foreign id never reveals whether it exists.
pub fn authorize(requester: UserID, owner: UserID) -> Result<(), AccessError> {
    if requester == owner {
        Ok(())
    } else {
        Err(AccessError::Denied)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_authorize_owner() {
        assert_eq!(authorize(1.into(), 1.into()), Ok(()));
    }

    #[test]
    fn test_authorize_foreign_user() {
        assert_eq!(authorize(1.into(), 2.into()), Err(AccessError::Denied));
    }
}
