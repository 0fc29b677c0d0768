//! Request-scoped access checks.
//!
//! An [`Actor`] is the caller of a request: anonymous or a freshly loaded
//! user row. Handlers state the capability they need and get back either
//! the user or the right refusal (missing credentials vs. insufficient
//! role).

use thiserror::Error;

use reviewdeck_database::User;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,
}

/// The authenticated (or anonymous) caller of a request.
#[derive(Debug, Clone, Default)]
pub struct Actor {
    user: Option<User>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Any authenticated user.
    pub fn require_user(&self) -> Result<&User, AccessError> {
        self.user.as_ref().ok_or(AccessError::Unauthorized)
    }

    /// Admin role or the staff flag.
    pub fn require_admin(&self) -> Result<&User, AccessError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(AccessError::Forbidden)
        }
    }

    /// The content's author, or any moderator/admin.
    pub fn require_author_or_moderator(&self, author_id: i64) -> Result<&User, AccessError> {
        let user = self.require_user()?;
        if user.id == author_id || user.is_moderator() || user.is_admin() {
            Ok(user)
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewdeck_database::UserRole;

    fn user_with_role(id: i64, role: UserRole) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            bio: None,
            role,
            is_staff: false,
            confirmation_seed: "seed".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn anonymous_is_unauthorized_everywhere() {
        let actor = Actor::anonymous();
        assert_eq!(actor.require_user().unwrap_err(), AccessError::Unauthorized);
        assert_eq!(actor.require_admin().unwrap_err(), AccessError::Unauthorized);
        assert_eq!(
            actor.require_author_or_moderator(1).unwrap_err(),
            AccessError::Unauthorized
        );
    }

    #[test]
    fn plain_user_cannot_administer() {
        let actor = Actor::authenticated(user_with_role(1, UserRole::User));
        assert!(actor.require_user().is_ok());
        assert_eq!(actor.require_admin().unwrap_err(), AccessError::Forbidden);
    }

    #[test]
    fn author_and_moderator_may_touch_content() {
        let author = Actor::authenticated(user_with_role(1, UserRole::User));
        assert!(author.require_author_or_moderator(1).is_ok());
        assert_eq!(
            author.require_author_or_moderator(2).unwrap_err(),
            AccessError::Forbidden
        );

        let moderator = Actor::authenticated(user_with_role(3, UserRole::Moderator));
        assert!(moderator.require_author_or_moderator(2).is_ok());

        let admin = Actor::authenticated(user_with_role(4, UserRole::Admin));
        assert!(admin.require_author_or_moderator(2).is_ok());
    }
}
