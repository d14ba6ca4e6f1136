//! Shared in-memory infrastructure for the integration suites: storage and
//! queue doubles wired to the public service and router facades.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{json, Value};

use jobboard::adverts::{
    advert_router, Advert, AdvertId, AdvertRepository, AdvertRouterState, AdvertService,
    AdvertUpdate, Application, ApplicationId, ApplicationRepository, PublishJob, PublishQueue,
    QueueError, StoreError,
};
use jobboard::identity::{
    identity_router, Account, AccountId, AccountRepository, IdentityService, IdentityStoreError,
    TokenRepository,
};

#[derive(Default)]
pub struct MemoryJobBoard {
    inner: Mutex<JobBoardTables>,
}

#[derive(Default)]
struct JobBoardTables {
    adverts: BTreeMap<AdvertId, Advert>,
    applications: BTreeMap<ApplicationId, Application>,
}

impl AdvertRepository for MemoryJobBoard {
    fn insert(&self, advert: Advert) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("lock");
        guard.adverts.insert(advert.id.clone(), advert.clone());
        Ok(advert)
    }

    fn fetch(&self, id: &AdvertId) -> Result<Option<Advert>, StoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard.adverts.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Advert>, StoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard.adverts.values().cloned().collect())
    }

    fn update_fields(&self, id: &AdvertId, update: &AdvertUpdate) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("lock");
        let advert = guard.adverts.get_mut(id).ok_or(StoreError::NotFound)?;
        update.apply_to(advert);
        advert.updated_at = Utc::now();
        Ok(advert.clone())
    }

    fn set_published(&self, id: &AdvertId, published: bool) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("lock");
        let advert = guard.adverts.get_mut(id).ok_or(StoreError::NotFound)?;
        if advert.is_published != published {
            advert.is_published = published;
            advert.updated_at = Utc::now();
        }
        Ok(advert.clone())
    }

    fn delete_unpublished(&self, id: &AdvertId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("lock");
        match guard.adverts.get(id) {
            None => Err(StoreError::NotFound),
            Some(advert) if advert.is_published => Err(StoreError::StillPublished),
            Some(_) => {
                guard.adverts.remove(id);
                guard
                    .applications
                    .retain(|_, application| application.advert_id != *id);
                Ok(())
            }
        }
    }
}

impl ApplicationRepository for MemoryJobBoard {
    fn insert_for_published(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.inner.lock().expect("lock");
        match guard.adverts.get(&application.advert_id) {
            None => Err(StoreError::NotFound),
            Some(advert) if !advert.is_published => Err(StoreError::NotPublished),
            Some(_) => {
                guard
                    .applications
                    .insert(application.id.clone(), application.clone());
                Ok(application)
            }
        }
    }

    fn list_for(&self, advert: &AdvertId) -> Result<Vec<Application>, StoreError> {
        let guard = self.inner.lock().expect("lock");
        let mut applications: Vec<Application> = guard
            .applications
            .values()
            .filter(|application| application.advert_id == *advert)
            .cloned()
            .collect();
        applications.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(applications)
    }

    fn count_for(&self, advert: &AdvertId) -> Result<usize, StoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard
            .applications
            .values()
            .filter(|application| application.advert_id == *advert)
            .count())
    }

    fn counts(&self) -> Result<HashMap<AdvertId, usize>, StoreError> {
        let guard = self.inner.lock().expect("lock");
        let mut counts = HashMap::new();
        for application in guard.applications.values() {
            *counts.entry(application.advert_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<IdentityTables>,
}

#[derive(Default)]
struct IdentityTables {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, AccountId>,
}

impl AccountRepository for MemoryIdentityStore {
    fn insert(&self, account: Account) -> Result<Account, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("lock");
        let clash = guard
            .accounts
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&account.email));
        if clash {
            return Err(IdentityStoreError::DuplicateEmail);
        }
        guard.accounts.insert(account.id.0.clone(), account.clone());
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>, IdentityStoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    fn find(&self, id: &AccountId) -> Result<Option<Account>, IdentityStoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard.accounts.get(&id.0).cloned())
    }
}

impl TokenRepository for MemoryIdentityStore {
    fn get_or_issue(
        &self,
        account: &AccountId,
        candidate: String,
    ) -> Result<String, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("lock");
        if let Some((token, _)) = guard.tokens.iter().find(|(_, bound)| *bound == account) {
            return Ok(token.clone());
        }
        guard.tokens.insert(candidate.clone(), account.clone());
        Ok(candidate)
    }

    fn lookup(&self, token: &str) -> Result<Option<AccountId>, IdentityStoreError> {
        let guard = self.inner.lock().expect("lock");
        Ok(guard.tokens.get(token).cloned())
    }

    fn revoke(&self, token: &str) -> Result<bool, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("lock");
        Ok(guard.tokens.remove(token).is_some())
    }
}

/// Queue double recording every accepted deferred-publish job.
#[derive(Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<PublishJob>>,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<PublishJob> {
        self.jobs.lock().expect("lock").clone()
    }
}

impl PublishQueue for RecordingQueue {
    fn enqueue(&self, job: PublishJob) -> Result<(), QueueError> {
        self.jobs.lock().expect("lock").push(job);
        Ok(())
    }
}

pub type TestIdentityService = IdentityService<MemoryIdentityStore, MemoryIdentityStore>;
pub type TestAdvertService = AdvertService<MemoryJobBoard, RecordingQueue>;

/// Fully wired application: composed routers plus handles on the doubles so
/// tests can assert what reached the stores and the queue.
pub struct TestApp {
    pub router: axum::Router,
    pub board: Arc<MemoryJobBoard>,
    pub queue: Arc<RecordingQueue>,
}

pub fn build_services() -> (
    Arc<TestIdentityService>,
    Arc<TestAdvertService>,
    Arc<MemoryJobBoard>,
    Arc<RecordingQueue>,
) {
    let board = Arc::new(MemoryJobBoard::default());
    let queue = Arc::new(RecordingQueue::default());
    let identity_store = Arc::new(MemoryIdentityStore::default());
    let identity = Arc::new(IdentityService::new(identity_store.clone(), identity_store));
    let adverts = Arc::new(AdvertService::new(board.clone(), queue.clone()));
    (identity, adverts, board, queue)
}

pub fn build_app() -> TestApp {
    let (identity, adverts, board, queue) = build_services();
    let state = AdvertRouterState {
        service: adverts,
        authenticator: identity.clone(),
        page_size: 20,
    };
    let router = identity_router(identity).merge(advert_router(state));
    TestApp {
        router,
        board,
        queue,
    }
}

pub fn advert_payload(title: &str, published: bool) -> Value {
    json!({
        "title": title,
        "company_name": "ABC",
        "employment_type": "Full Time",
        "experience_level": "Entry Level",
        "description": "Build and run backend services.",
        "location": "Remote",
        "is_published": published,
    })
}

pub fn application_payload() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0000",
        "linkedin_url": "https://linkedin.com/in/ada",
        "github_url": "https://github.com/ada",
        "website": "https://ada.dev",
        "experience_years": "0-1",
        "cover_letter": "Analytical engines are my thing.",
    })
}
