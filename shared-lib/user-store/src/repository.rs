//! User repository
//!
//! Lookups and mutations over a [`UserStore`] backend. Every mutation is a
//! read-modify-write of the full set, serialized by a single async mutex so
//! concurrent requests in this process cannot lose each other's updates.

use std::sync::Arc;

use error::StoreError;
use tokio::sync::Mutex;

use crate::backend::UserStore;
use crate::models::UserRecord;

pub struct UserRepository {
    store: Arc<dyn UserStore>,
    lock: Mutex<()>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// All users in stored order.
    pub async fn all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        self.store.read_all().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.all().await?.into_iter().find(|u| u.id == id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.all().await?.into_iter().find(|u| u.email == email))
    }

    /// Find a user whose username or email equals `login`.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.all().await?.into_iter().find(|u| u.matches_login(login)))
    }

    /// Append a new user. Username is checked before email.
    pub async fn insert(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        self.mutate(|users| {
            check_unique(users, &record, None)?;
            users.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// Apply `f` to the user with `id` and persist the result.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<UserRecord, StoreError>
    where
        F: FnOnce(&mut UserRecord) + Send,
    {
        self.mutate(|users| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or(StoreError::NotFound)?;

            let mut updated = users[index].clone();
            f(&mut updated);
            check_unique(users, &updated, Some(index))?;

            users[index] = updated.clone();
            Ok(updated)
        })
        .await
    }

    /// Replace the stored password hash of the user with `email`.
    pub async fn update_password(&self, email: &str, password_hash: String) -> Result<(), StoreError> {
        self.mutate(|users| {
            let user = users
                .iter_mut()
                .find(|u| u.email == email)
                .ok_or(StoreError::NotFound)?;
            user.password = password_hash;
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<UserRecord, StoreError> {
        self.mutate(|users| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or(StoreError::NotFound)?;
            Ok(users.remove(index))
        })
        .await
    }

    /// Locked read-modify-write. Nothing is written when `f` fails.
    async fn mutate<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<UserRecord>) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut users = self.store.read_all().await?;
        let result = f(&mut users)?;
        self.store.write_all(&users).await?;
        Ok(result)
    }
}

fn check_unique(users: &[UserRecord], candidate: &UserRecord, skip: Option<usize>) -> Result<(), StoreError> {
    let others: Vec<&UserRecord> = users
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .map(|(_, u)| u)
        .collect();

    if others.iter().any(|u| u.username == candidate.username) {
        return Err(StoreError::DuplicateEntry("username".to_string()));
    }
    if others.iter().any(|u| u.email == candidate.email) {
        return Err(StoreError::DuplicateEntry("email".to_string()));
    }
    Ok(())
}
