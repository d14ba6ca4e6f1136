use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use jobboard::adverts::{
    Advert, AdvertId, AdvertRepository, AdvertUpdate, Application, ApplicationId,
    ApplicationRepository, PublishJob, PublishQueue, QueueError, StoreError,
};
use jobboard::identity::{
    Account, AccountId, AccountRepository, IdentityStoreError, TokenRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Advert and application tables behind one mutex: every conditional store
/// operation holds the lock across its state check and its write, which is
/// the atomicity the repository traits demand.
#[derive(Default)]
pub(crate) struct InMemoryJobBoard {
    inner: Mutex<JobBoardTables>,
}

#[derive(Default)]
struct JobBoardTables {
    adverts: BTreeMap<AdvertId, Advert>,
    applications: BTreeMap<ApplicationId, Application>,
}

impl AdvertRepository for InMemoryJobBoard {
    fn insert(&self, advert: Advert) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("job board mutex poisoned");
        guard.adverts.insert(advert.id.clone(), advert.clone());
        Ok(advert)
    }

    fn fetch(&self, id: &AdvertId) -> Result<Option<Advert>, StoreError> {
        let guard = self.inner.lock().expect("job board mutex poisoned");
        Ok(guard.adverts.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Advert>, StoreError> {
        let guard = self.inner.lock().expect("job board mutex poisoned");
        Ok(guard.adverts.values().cloned().collect())
    }

    fn update_fields(&self, id: &AdvertId, update: &AdvertUpdate) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("job board mutex poisoned");
        let advert = guard.adverts.get_mut(id).ok_or(StoreError::NotFound)?;
        update.apply_to(advert);
        advert.updated_at = Utc::now();
        Ok(advert.clone())
    }

    fn set_published(&self, id: &AdvertId, published: bool) -> Result<Advert, StoreError> {
        let mut guard = self.inner.lock().expect("job board mutex poisoned");
        let advert = guard.adverts.get_mut(id).ok_or(StoreError::NotFound)?;
        if advert.is_published != published {
            advert.is_published = published;
            advert.updated_at = Utc::now();
        }
        Ok(advert.clone())
    }

    fn delete_unpublished(&self, id: &AdvertId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("job board mutex poisoned");
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

impl ApplicationRepository for InMemoryJobBoard {
    fn insert_for_published(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.inner.lock().expect("job board mutex poisoned");
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
        let guard = self.inner.lock().expect("job board mutex poisoned");
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
        let guard = self.inner.lock().expect("job board mutex poisoned");
        Ok(guard
            .applications
            .values()
            .filter(|application| application.advert_id == *advert)
            .count())
    }

    fn counts(&self) -> Result<HashMap<AdvertId, usize>, StoreError> {
        let guard = self.inner.lock().expect("job board mutex poisoned");
        let mut counts = HashMap::new();
        for application in guard.applications.values() {
            *counts.entry(application.advert_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Accounts and their bearer tokens behind one mutex, so the email
/// uniqueness check and the insert cannot interleave.
#[derive(Default)]
pub(crate) struct InMemoryIdentityStore {
    inner: Mutex<IdentityTables>,
}

#[derive(Default)]
struct IdentityTables {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, AccountId>,
}

impl AccountRepository for InMemoryIdentityStore {
    fn insert(&self, account: Account) -> Result<Account, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("identity mutex poisoned");
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
        let guard = self.inner.lock().expect("identity mutex poisoned");
        Ok(guard
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    fn find(&self, id: &AccountId) -> Result<Option<Account>, IdentityStoreError> {
        let guard = self.inner.lock().expect("identity mutex poisoned");
        Ok(guard.accounts.get(&id.0).cloned())
    }
}

impl TokenRepository for InMemoryIdentityStore {
    fn get_or_issue(
        &self,
        account: &AccountId,
        candidate: String,
    ) -> Result<String, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("identity mutex poisoned");
        if let Some((token, _)) = guard.tokens.iter().find(|(_, bound)| *bound == account) {
            return Ok(token.clone());
        }
        guard.tokens.insert(candidate.clone(), account.clone());
        Ok(candidate)
    }

    fn lookup(&self, token: &str) -> Result<Option<AccountId>, IdentityStoreError> {
        let guard = self.inner.lock().expect("identity mutex poisoned");
        Ok(guard.tokens.get(token).cloned())
    }

    fn revoke(&self, token: &str) -> Result<bool, IdentityStoreError> {
        let mut guard = self.inner.lock().expect("identity mutex poisoned");
        Ok(guard.tokens.remove(token).is_some())
    }
}

/// Broker stand-in: accepts deferred-publish jobs and hands back the ones
/// whose eta has passed. A deployment swaps this for a real queue client;
/// delivery guarantees and retry policy live there, not here.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPublishQueue {
    jobs: Arc<Mutex<Vec<PublishJob>>>,
}

impl InMemoryPublishQueue {
    pub(crate) fn jobs(&self) -> Vec<PublishJob> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }

    /// Remove and return every job whose eta is at or before `now`.
    pub(crate) fn take_due(&self, now: DateTime<Utc>) -> Vec<PublishJob> {
        let mut guard = self.jobs.lock().expect("queue mutex poisoned");
        let (due, pending): (Vec<PublishJob>, Vec<PublishJob>) =
            guard.drain(..).partition(|job| job.eta <= now);
        *guard = pending;
        due
    }
}

impl PublishQueue for InMemoryPublishQueue {
    fn enqueue(&self, job: PublishJob) -> Result<(), QueueError> {
        self.jobs.lock().expect("queue mutex poisoned").push(job);
        Ok(())
    }
}
