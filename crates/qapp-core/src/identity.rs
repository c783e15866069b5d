// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-identity authorship: registered users and temporary-token posters.
//!
//! A request may carry a registered user (bearer token), a temporary token,
//! both, or neither. The registered user always wins. Display names follow a
//! fixed fallback chain and collapse to [`ANONYMOUS`] whenever the author
//! chose to hide their identity.

use uuid::Uuid;

use crate::error::QappError;
use crate::types::{NewAuthor, User};

/// Name shown for hidden or unknown authors.
pub const ANONYMOUS: &str = "Anonymous";

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Registered author fields needed to render a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAuthor {
    pub user_id: i64,
    pub username: String,
    /// Profile display name; may be empty.
    pub display_name: String,
}

/// Temporary author fields needed to render a display name and check ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryAuthor {
    pub temp_user_id: i64,
    pub token: Uuid,
    pub display_name: String,
}

/// The nullable author pair attached to a post or reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorship {
    pub registered: Option<RegisteredAuthor>,
    pub temporary: Option<TemporaryAuthor>,
}

impl Authorship {
    /// Resolve the public display name.
    pub fn display_name(&self, hide_identity: bool) -> String {
        if hide_identity {
            return ANONYMOUS.to_string();
        }
        if let Some(author) = &self.registered {
            if author.display_name.is_empty() {
                return author.username.clone();
            }
            return author.display_name.clone();
        }
        if let Some(temp) = &self.temporary
            && !temp.display_name.is_empty()
        {
            return temp.display_name.clone();
        }
        ANONYMOUS.to_string()
    }

    /// Whether `requester` may modify the row this authorship belongs to.
    pub fn is_owned_by(&self, requester: &Requester) -> bool {
        if let (Some(author), Some(user)) = (&self.registered, &requester.user) {
            return author.user_id == user.id;
        }
        match (&self.temporary, requester.temp_token) {
            (Some(temp), Some(token)) => requester.user.is_none() && temp.token == token,
            _ => false,
        }
    }

    /// [`QappError::Forbidden`] unless `requester` owns the row.
    pub fn ensure_owned_by(&self, requester: &Requester) -> Result<(), QappError> {
        if self.is_owned_by(requester) {
            Ok(())
        } else {
            Err(QappError::Forbidden(PERMISSION_DENIED.to_string()))
        }
    }
}

/// The identities presented by a single request.
#[derive(Debug, Clone, Default)]
pub struct Requester {
    pub user: Option<User>,
    pub temp_token: Option<Uuid>,
}

impl Requester {
    /// The registered user, or [`QappError::Unauthorized`] without one.
    pub fn registered_user(&self) -> Result<&User, QappError> {
        self.user
            .as_ref()
            .ok_or_else(|| QappError::Unauthorized(NOT_AUTHENTICATED.to_string()))
    }

    /// Returns a copy with `body_token` taking precedence over the header token.
    pub fn with_body_token(&self, body_token: Option<Uuid>) -> Self {
        Self {
            user: self.user.clone(),
            temp_token: body_token.or(self.temp_token),
        }
    }

    /// Who a newly created post or reply will be attributed to.
    pub fn new_author(&self) -> NewAuthor {
        match (&self.user, self.temp_token) {
            (Some(user), _) => NewAuthor::Registered(user.id),
            (None, Some(token)) => NewAuthor::Temporary(token),
            (None, None) => NewAuthor::Fresh,
        }
    }

    /// Effective `hide_identity` for a new post or reply.
    ///
    /// Registered users fall back to their profile default, token holders to
    /// `false`. Posts from requests with no identity at all are always hidden.
    pub fn hide_identity(&self, requested: Option<bool>) -> bool {
        match (&self.user, self.temp_token) {
            (Some(user), _) => requested.unwrap_or(user.profile.is_anonymous_by_default),
            (None, Some(_)) => requested.unwrap_or(false),
            (None, None) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Profile;

    fn user(id: i64, username: &str, display_name: &str, anon_default: bool) -> User {
        User {
            id,
            username: username.to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            profile: Profile {
                user_id: id,
                display_name: display_name.to_string(),
                avatar: String::new(),
                is_anonymous_by_default: anon_default,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
        }
    }

    fn registered(id: i64, username: &str, display_name: &str) -> Authorship {
        Authorship {
            registered: Some(RegisteredAuthor {
                user_id: id,
                username: username.to_string(),
                display_name: display_name.to_string(),
            }),
            temporary: None,
        }
    }

    fn temporary(token: Uuid, display_name: &str) -> Authorship {
        Authorship {
            registered: None,
            temporary: Some(TemporaryAuthor {
                temp_user_id: 7,
                token,
                display_name: display_name.to_string(),
            }),
        }
    }

    #[test]
    fn hidden_identity_is_always_anonymous() {
        assert_eq!(registered(1, "alice", "Alice").display_name(true), ANONYMOUS);
        assert_eq!(temporary(Uuid::new_v4(), "Ghost").display_name(true), ANONYMOUS);
    }

    #[test]
    fn registered_author_prefers_profile_name_then_username() {
        assert_eq!(registered(1, "alice", "Alice A.").display_name(false), "Alice A.");
        assert_eq!(registered(1, "alice", "").display_name(false), "alice");
    }

    #[test]
    fn temporary_author_falls_back_to_anonymous() {
        assert_eq!(temporary(Uuid::new_v4(), "Ghost").display_name(false), "Ghost");
        assert_eq!(temporary(Uuid::new_v4(), "").display_name(false), ANONYMOUS);
    }

    #[test]
    fn no_author_is_anonymous() {
        assert_eq!(Authorship::default().display_name(false), ANONYMOUS);
    }

    #[test]
    fn registered_author_takes_priority_over_temporary() {
        let mut both = registered(1, "alice", "");
        both.temporary = temporary(Uuid::new_v4(), "Ghost").temporary;
        assert_eq!(both.display_name(false), "alice");
    }

    #[test]
    fn new_author_priority() {
        let token = Uuid::new_v4();
        let both = Requester {
            user: Some(user(3, "carol", "", false)),
            temp_token: Some(token),
        };
        assert_eq!(both.new_author(), NewAuthor::Registered(3));

        let temp_only = Requester {
            user: None,
            temp_token: Some(token),
        };
        assert_eq!(temp_only.new_author(), NewAuthor::Temporary(token));
        assert_eq!(Requester::default().new_author(), NewAuthor::Fresh);
    }

    #[test]
    fn hide_identity_defaults() {
        let shy = Requester {
            user: Some(user(1, "shy", "", true)),
            temp_token: None,
        };
        assert!(shy.hide_identity(None));
        assert!(!shy.hide_identity(Some(false)));

        let temp = Requester {
            user: None,
            temp_token: Some(Uuid::new_v4()),
        };
        assert!(!temp.hide_identity(None));
        assert!(temp.hide_identity(Some(true)));

        assert!(Requester::default().hide_identity(Some(false)));
    }

    #[test]
    fn body_token_overrides_header_token() {
        let header = Uuid::new_v4();
        let body = Uuid::new_v4();
        let requester = Requester {
            user: None,
            temp_token: Some(header),
        };
        assert_eq!(requester.with_body_token(Some(body)).temp_token, Some(body));
        assert_eq!(requester.with_body_token(None).temp_token, Some(header));
    }

    #[test]
    fn ownership_checks() {
        let token = Uuid::new_v4();
        let alice = Requester {
            user: Some(user(1, "alice", "", false)),
            temp_token: None,
        };
        let bob = Requester {
            user: Some(user(2, "bob", "", false)),
            temp_token: None,
        };
        let holder = Requester {
            user: None,
            temp_token: Some(token),
        };

        assert!(registered(1, "alice", "").is_owned_by(&alice));
        assert!(!registered(1, "alice", "").is_owned_by(&bob));
        assert!(!registered(1, "alice", "").is_owned_by(&holder));
        assert!(temporary(token, "").is_owned_by(&holder));
        assert!(!temporary(Uuid::new_v4(), "").is_owned_by(&holder));
        assert!(!temporary(token, "").is_owned_by(&Requester::default()));
        assert!(!Authorship::default().is_owned_by(&alice));
    }

    #[test]
    fn permission_errors() {
        let token = Uuid::new_v4();
        let holder = Requester {
            user: None,
            temp_token: Some(token),
        };
        assert!(temporary(token, "").ensure_owned_by(&holder).is_ok());
        let err = registered(1, "alice", "").ensure_owned_by(&holder).unwrap_err();
        assert!(matches!(err, QappError::Forbidden(ref m) if m == PERMISSION_DENIED));

        let err = holder.registered_user().unwrap_err();
        assert!(matches!(err, QappError::Unauthorized(ref m) if m == NOT_AUTHENTICATED));
        let alice = Requester {
            user: Some(user(1, "alice", "", false)),
            temp_token: None,
        };
        assert_eq!(alice.registered_user().unwrap().username, "alice");
    }
}
