//! In-memory user directory standing in for a real user store.
//!
//! Credentials are kept as plaintext keyed by email. This table only exists
//! because there is no backend; it must never be mistaken for a credential
//! store.

use std::collections::HashMap;

use time::OffsetDateTime;
use time::macros::datetime;

use crate::types::{Preferences, User};

/// Password shared by the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "Password123";

#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<User>,
    credentials: HashMap<String, String>,
}

impl Directory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with the two demo accounts.
    #[must_use]
    pub fn seeded() -> Self {
        let mut dir = Self::new();
        dir.insert(
            User {
                id: "1".into(),
                name: "Xosé Manuel".into(),
                email: "xose@example.com".into(),
                phone: Some("+34 600 123 456".into()),
                avatar: Some("/avatars/xose.jpg".into()),
                join_date: datetime!(2024-01-15 10:30:00 UTC),
                preferences: Some(Preferences { newsletter: true, notifications: true }),
            },
            DEMO_PASSWORD,
        );
        dir.insert(
            User {
                id: "2".into(),
                name: "María do Campo".into(),
                email: "maria@example.com".into(),
                phone: Some("+34 600 789 012".into()),
                avatar: Some("/avatars/maria.jpg".into()),
                join_date: datetime!(2024-02-20 14:15:00 UTC),
                preferences: Some(Preferences { newsletter: false, notifications: true }),
            },
            DEMO_PASSWORD,
        );
        dir
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Exact-match lookup by email.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    #[must_use]
    pub fn password_for(&self, email: &str) -> Option<&str> {
        self.credentials.get(email).map(String::as_str)
    }

    /// Next sequential id: one past the current user count.
    #[must_use]
    pub fn next_id(&self) -> String {
        (self.users.len() + 1).to_string()
    }

    /// Append a user and its credential entry. Callers check email
    /// uniqueness first.
    pub fn insert(&mut self, user: User, password: &str) {
        self.credentials.insert(user.email.clone(), password.to_owned());
        self.users.push(user);
    }

    /// Build a new user record with default preferences and the next id.
    #[must_use]
    pub fn new_user(&self, name: &str, email: &str, phone: Option<String>, newsletter: bool) -> User {
        User {
            id: self.next_id(),
            name: name.to_owned(),
            email: email.to_owned(),
            phone,
            avatar: None,
            join_date: OffsetDateTime::now_utc(),
            preferences: Some(Preferences { newsletter, notifications: true }),
        }
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
