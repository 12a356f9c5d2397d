//! In-memory UserRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use shop_core::{
    DomainError, RepoResult, User, UserId, UserListQuery, UserPage, UserRepository,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<UserId, StoredUser>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a non-deleted user
    fn with_live<T>(&self, id: UserId, f: impl FnOnce(&mut StoredUser) -> T) -> RepoResult<T> {
        let mut users = self.users.lock();
        match users.get_mut(&id) {
            Some(stored) if !stored.user.is_deleted() => Ok(f(stored)),
            _ => Err(DomainError::UserNotFound(id)),
        }
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .lock()
            .values()
            .find(|s| predicate(&s.user))
            .map(|s| s.user.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.find(|u| u.id == id && !u.is_deleted()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.find(|u| u.email == email && !u.is_deleted()))
    }

    async fn find_by_id_admin(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.users.lock().get(&id).map(|s| s.user.clone()))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<User>> {
        Ok(self.find(|u| u.reset_token_hash.as_deref() == Some(token_hash) && !u.is_deleted()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.find(|u| u.email == email).is_some())
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut users = self.users.lock();
        if users.values().any(|s| s.user.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.lock();
        let stored = users
            .get_mut(&user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        stored.user.full_name.clone_from(&user.full_name);
        stored.user.role = user.role;
        stored.user.status = user.status;
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self.with_live(id, |s| s.password_hash.clone()).ok())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        self.with_live(id, |s| {
            s.password_hash = password_hash.to_string();
            s.user.reset_token_hash = None;
            s.user.reset_token_expires_at = None;
            s.user.updated_at = Utc::now();
        })
    }

    async fn set_active_status(&self, id: UserId) -> RepoResult<()> {
        self.with_live(id, |s| s.user.mark_logged_in(Utc::now()))
    }

    async fn set_inactive_status(&self, id: UserId) -> RepoResult<()> {
        self.with_live(id, |s| s.user.mark_logged_out(Utc::now()))
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> RepoResult<()> {
        self.with_live(id, |s| {
            s.user.reset_token_hash = token.map(|(hash, _)| hash.to_string());
            s.user.reset_token_expires_at = token.map(|(_, expires_at)| expires_at);
            s.user.updated_at = Utc::now();
        })
    }

    async fn soft_delete(&self, id: UserId) -> RepoResult<()> {
        self.with_live(id, |s| s.user.soft_delete(Utc::now()))
    }

    async fn restore(&self, id: UserId) -> RepoResult<()> {
        let mut users = self.users.lock();
        let stored = users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        if !stored.user.is_deleted() {
            return Err(DomainError::UserNotDeleted);
        }
        stored.user.restore(Utc::now());
        Ok(())
    }

    async fn delete_permanently(&self, id: UserId) -> RepoResult<()> {
        self.users
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::UserNotFound(id))
    }

    async fn list(&self, query: &UserListQuery) -> RepoResult<UserPage> {
        let mut matching: Vec<User> = self
            .users
            .lock()
            .values()
            .filter(|s| query.include_deleted || !s.user.is_deleted())
            .map(|s| s.user.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let users = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();

        Ok(UserPage { users, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::UserStatus;

    fn user(email: &str) -> User {
        User::new(email.to_string(), "Test".to_string())
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user_until_restored() {
        let repo = MemoryUserRepository::new();
        let a = user("a@x.com");
        let b = user("b@x.com");
        repo.create(&a, "hash").await.unwrap();
        repo.create(&b, "hash").await.unwrap();

        repo.soft_delete(b.id).await.unwrap();
        assert!(repo.find_by_email("b@x.com").await.unwrap().is_none());
        assert!(repo.find_by_id(b.id).await.unwrap().is_none());
        assert!(repo.find_by_id_admin(b.id).await.unwrap().is_some());
        assert!(repo.find_by_id(a.id).await.unwrap().is_some());

        repo.restore(b.id).await.unwrap();
        assert_eq!(repo.find_by_id(b.id).await.unwrap().unwrap().email, "b@x.com");
        assert!(matches!(
            repo.restore(b.id).await,
            Err(DomainError::UserNotDeleted)
        ));
    }

    #[tokio::test]
    async fn test_email_stays_reserved_while_soft_deleted() {
        let repo = MemoryUserRepository::new();
        let a = user("a@x.com");
        repo.create(&a, "hash").await.unwrap();
        repo.soft_delete(a.id).await.unwrap();

        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(matches!(
            repo.create(&user("a@x.com"), "hash").await,
            Err(DomainError::EmailAlreadyExists)
        ));

        repo.delete_permanently(a.id).await.unwrap();
        assert!(!repo.email_exists("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_status_transitions_respect_blocked() {
        let repo = MemoryUserRepository::new();
        let mut a = user("a@x.com");
        repo.create(&a, "hash").await.unwrap();

        repo.set_active_status(a.id).await.unwrap();
        let found = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(found.status, UserStatus::Active);
        assert!(found.last_login_at.is_some());

        a.status = UserStatus::Blocked;
        repo.update(&a).await.unwrap();
        repo.set_active_status(a.id).await.unwrap();
        repo.set_inactive_status(a.id).await.unwrap();
        assert_eq!(
            repo.find_by_id(a.id).await.unwrap().unwrap().status,
            UserStatus::Blocked
        );
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let repo = MemoryUserRepository::new();
        for i in 0..5 {
            let mut u = user(&format!("u{i}@x.com"));
            u.created_at += chrono::Duration::seconds(i);
            repo.create(&u, "hash").await.unwrap();
        }

        let page = repo
            .list(&UserListQuery {
                page: 1,
                limit: 2,
                include_deleted: false,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[0].email, "u4@x.com");

        let last = repo
            .list(&UserListQuery {
                page: 3,
                limit: 2,
                include_deleted: false,
            })
            .await
            .unwrap();
        assert_eq!(last.users.len(), 1);
        assert_eq!(last.users[0].email, "u0@x.com");
    }

    #[tokio::test]
    async fn test_update_password_clears_reset_token() {
        let repo = MemoryUserRepository::new();
        let a = user("a@x.com");
        repo.create(&a, "old").await.unwrap();
        repo.set_reset_token(a.id, Some(("digest", Utc::now() + chrono::Duration::hours(1))))
            .await
            .unwrap();
        assert!(repo.find_by_reset_token("digest").await.unwrap().is_some());

        repo.update_password(a.id, "new").await.unwrap();
        assert_eq!(repo.get_password_hash(a.id).await.unwrap().as_deref(), Some("new"));
        assert!(repo.find_by_reset_token("digest").await.unwrap().is_none());
    }
}
