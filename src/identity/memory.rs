//! In-memory identity provider for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::identity::{ClaimMap, IdentityError, IdentityProvider};

#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub claims: ClaimMap,
}

#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    claim_writes: AtomicUsize,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a fixed id, as tests need callers to pre-exist.
    pub fn seed_account(&self, id: &str, email: &str) {
        self.accounts.lock().unwrap().insert(
            id.to_string(),
            Account {
                email: email.to_string(),
                claims: ClaimMap::new(),
            },
        );
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Number of `set_claims` calls observed - the rate-limited operation
    /// the synchronizer's no-op detection exists to avoid.
    pub fn claim_writes(&self) -> usize {
        self.claim_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(&self, email: &str, _password: &str) -> Result<String, IdentityError> {
        let id = Uuid::new_v4().to_string();
        self.accounts.lock().unwrap().insert(
            id.clone(),
            Account {
                email: email.to_string(),
                claims: ClaimMap::new(),
            },
        );
        Ok(id)
    }

    async fn delete_account(&self, id: &str) -> Result<(), IdentityError> {
        match self.accounts.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(IdentityError::NotFound(id.to_string())),
        }
    }

    async fn claims(&self, id: &str) -> Result<ClaimMap, IdentityError> {
        self.accounts
            .lock()
            .unwrap()
            .get(id)
            .map(|a| a.claims.clone())
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))
    }

    async fn set_claims(&self, id: &str, claims: ClaimMap) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))?;
        account.claims = claims;
        self.claim_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
