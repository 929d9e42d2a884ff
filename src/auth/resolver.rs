// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Maps a verified subject to exactly one internal user, creating it on
//! first sight.

use tracing::{debug, info};

use crate::storage::{StoreError, StoreResult, UserProfile, UserRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub user: UserProfile,
    pub is_new_user: bool,
}

pub struct IdentityResolver<'a> {
    users: UserRepository<'a>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(users: UserRepository<'a>) -> Self {
        Self { users }
    }

    /// Find or create the user for `subject`.
    ///
    /// Concurrent first logins race on the store's unique subject column;
    /// the loser re-reads the winner's row and reports `is_new_user = false`.
    pub async fn resolve(&self, subject: &str, phone_number: &str) -> StoreResult<Resolution> {
        if let Some(existing) = self.users.find_by_subject(subject).await? {
            return self.returning(existing).await;
        }

        match self.users.create(subject, phone_number).await {
            Ok(user) => {
                info!(user_id = %user.id, "created user for new subject");
                Ok(Resolution {
                    user,
                    is_new_user: true,
                })
            }
            Err(StoreError::Conflict(_)) => {
                debug!("lost first-login race, reading existing user");
                let winner = self
                    .users
                    .find_by_subject(subject)
                    .await?
                    .ok_or_else(|| StoreError::NotFound("User".to_string()))?;
                self.returning(winner).await
            }
            Err(err) => Err(err),
        }
    }

    async fn returning(&self, user: UserProfile) -> StoreResult<Resolution> {
        let user = self.users.touch_last_login(user.id).await?;
        Ok(Resolution {
            user,
            is_new_user: false,
        })
    }
}
