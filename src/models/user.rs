use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::users;

/// User as exposed over the API (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            username: model.username,
        }
    }
}

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &"**********")
            .finish()
    }
}

/// Body of `PATCH /users/{id}`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "**********"))
            .finish()
    }
}

impl From<NewUser> for UserPatch {
    fn from(user: NewUser) -> Self {
        Self {
            first_name: Some(user.first_name),
            last_name: Some(user.last_name),
            username: Some(user.username),
            password: Some(user.password),
        }
    }
}

/// Body of `PATCH /users/{id}/password`.
#[derive(Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_passwords() {
        let user = NewUser {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            username: "jan".to_string(),
            password: "secret123".to_string(),
        };
        let rendered = format!("{user:?}");
        assert!(rendered.contains("jan"));
        assert!(!rendered.contains("secret123"));

        let patch = UserPatch::from(user);
        assert!(!format!("{patch:?}").contains("secret123"));

        let change = PasswordChange {
            current_password: "secret123".to_string(),
            new_password: "secret456".to_string(),
        };
        let rendered = format!("{change:?}");
        assert!(!rendered.contains("secret123"));
        assert!(!rendered.contains("secret456"));
    }
}
