//! In-memory substitute stores.
//!
//! The service and event-handler layers only see the store traits, so the
//! tests (and local development without Postgres) run against these.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::auth::Role;
use crate::store::{BrandDeletion, CatalogStore, Profile, ProfileStore, StoreError};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(id).cloned())
    }

    async fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(id) {
            profile.role = role;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.profiles.lock().unwrap().remove(id);
        Ok(())
    }

    async fn push_tokens(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter_map(|p| p.push_token.clone())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

#[derive(Default)]
struct CatalogInner {
    /// brand id -> denormalized post count
    brands: HashMap<String, i64>,
    /// post id -> brand id
    posts: HashMap<String, String>,
    /// applied (event, brand) delta pairs
    applied: HashSet<(Uuid, String)>,
}

/// One mutex over the whole catalog stands in for the database
/// transaction; phase-2 of brand deletion is atomic under it.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<CatalogInner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a brand row (for tests; created by authoring flows otherwise).
    pub fn insert_brand(&self, brand_id: &str, post_count: i64) {
        self.inner
            .lock()
            .unwrap()
            .brands
            .insert(brand_id.to_string(), post_count);
    }

    /// Seed a post row, as external content authoring would.
    pub fn insert_post(&self, post_id: &str, brand_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .posts
            .insert(post_id.to_string(), brand_id.to_string());
    }

    pub fn remove_post(&self, post_id: &str) {
        self.inner.lock().unwrap().posts.remove(post_id);
    }

    pub fn brand_exists(&self, brand_id: &str) -> bool {
        self.inner.lock().unwrap().brands.contains_key(brand_id)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn post_count(&self, brand_id: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts.values().filter(|b| b.as_str() == brand_id).count() as i64)
    }

    async fn apply_post_delta(
        &self,
        brand_id: &str,
        delta: i64,
        event_id: Uuid,
        create_if_missing: bool,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.applied.insert((event_id, brand_id.to_string())) {
            return Ok(false);
        }

        if create_if_missing {
            *inner.brands.entry(brand_id.to_string()).or_insert(0) += delta;
        } else if let Some(count) = inner.brands.get_mut(brand_id) {
            *count += delta;
        }

        Ok(true)
    }

    async fn brand_post_count(&self, brand_id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().unwrap().brands.get(brand_id).copied())
    }

    async fn delete_brand_if_empty(&self, brand_id: &str) -> Result<BrandDeletion, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.brands.contains_key(brand_id) {
            return Ok(BrandDeletion::AlreadyAbsent);
        }

        let live = inner.posts.values().filter(|b| b.as_str() == brand_id).count();
        if live > 0 {
            return Ok(BrandDeletion::HasPosts);
        }

        inner.brands.remove(brand_id);
        Ok(BrandDeletion::Deleted)
    }
}
