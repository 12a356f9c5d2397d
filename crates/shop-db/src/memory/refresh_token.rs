//! In-memory RefreshTokenRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use shop_core::{
    DomainError, NewRefreshToken, RefreshToken, RefreshTokenRepository, RefreshTokenState,
    RepoResult, RevokeOutcome, RotateOutcome, UserId,
};

/// Rows keyed by token digest
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenRepository {
    rows: Mutex<HashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows in any state
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

fn insert_row(
    rows: &mut HashMap<String, RefreshToken>,
    token: NewRefreshToken,
    now: DateTime<Utc>,
) -> RepoResult<RefreshToken> {
    if rows.contains_key(&token.token_hash) {
        return Err(DomainError::DuplicateToken);
    }
    let record = token.into_record(now);
    rows.insert(record.token_hash.clone(), record.clone());
    Ok(record)
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn insert(&self, token: NewRefreshToken) -> RepoResult<RefreshToken> {
        insert_row(&mut self.rows.lock(), token, Utc::now())
    }

    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        Ok(self.rows.lock().get(token_hash).cloned())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: NewRefreshToken,
    ) -> RepoResult<RotateOutcome> {
        let now = Utc::now();
        // One lock spans check, revoke and insert
        let mut rows = self.rows.lock();

        let Some(old) = rows.get(old_hash) else {
            return Ok(RotateOutcome::NotFound);
        };
        match old.state_at(now) {
            RefreshTokenState::Expired => return Ok(RotateOutcome::Expired),
            RefreshTokenState::Revoked => return Ok(RotateOutcome::Revoked),
            RefreshTokenState::Active => {}
        }
        if old.user_id != replacement.user_id {
            return Err(DomainError::InternalError(
                "replacement token belongs to a different user".to_string(),
            ));
        }
        if rows.contains_key(&replacement.token_hash) {
            return Err(DomainError::DuplicateToken);
        }

        if let Some(old) = rows.get_mut(old_hash) {
            old.revoked = true;
            old.updated_at = now;
        }
        insert_row(&mut rows, replacement, now).map(RotateOutcome::Rotated)
    }

    async fn revoke(&self, token_hash: &str) -> RepoResult<RevokeOutcome> {
        let mut rows = self.rows.lock();
        Ok(match rows.get_mut(token_hash) {
            None => RevokeOutcome::NotFound,
            Some(row) if row.revoked => RevokeOutcome::AlreadyRevoked,
            Some(row) => {
                row.revoked = true;
                row.updated_at = Utc::now();
                RevokeOutcome::Revoked
            }
        })
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let now = Utc::now();
        let mut count = 0;
        for row in self.rows.lock().values_mut() {
            if row.user_id == user_id && !row.revoked {
                row.revoked = true;
                row.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn count_active_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let now = Utc::now();
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|r| r.user_id == user_id && r.state_at(now) == RefreshTokenState::Active)
            .count() as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, r| !r.is_expired_at(now));
        Ok((before - rows.len()) as u64)
    }
}
