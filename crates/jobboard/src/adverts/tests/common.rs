use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::adverts::applications::{
    Application, ApplicationId, ApplicationSubmission, ExperienceYears,
};
use crate::adverts::dispatch::{PublishJob, PublishQueue, QueueError};
use crate::adverts::domain::{
    Advert, AdvertId, AdvertUpdate, EmploymentType, ExperienceLevel, NewAdvert,
};
use crate::adverts::repository::{AdvertRepository, ApplicationRepository, StoreError};
use crate::adverts::service::AdvertService;

/// In-memory advert + application tables behind one mutex, so every
/// check-then-act pair in the trait contract is naturally atomic.
#[derive(Default)]
pub(super) struct MemoryJobBoard {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
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

/// Queue double that records every accepted job.
#[derive(Default)]
pub(super) struct RecordingQueue {
    jobs: Mutex<Vec<PublishJob>>,
}

impl RecordingQueue {
    pub(super) fn jobs(&self) -> Vec<PublishJob> {
        self.jobs.lock().expect("lock").clone()
    }
}

impl PublishQueue for RecordingQueue {
    fn enqueue(&self, job: PublishJob) -> Result<(), QueueError> {
        self.jobs.lock().expect("lock").push(job);
        Ok(())
    }
}

pub(super) fn new_advert(title: &str, published: bool) -> NewAdvert {
    NewAdvert {
        title: title.to_string(),
        company_name: "ABC".to_string(),
        employment_type: EmploymentType::FullTime,
        experience_level: ExperienceLevel::EntryLevel,
        description: "Build and run backend services.".to_string(),
        location: "Remote".to_string(),
        is_published: published,
    }
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+44 20 7946 0000".to_string(),
        linkedin_url: "https://linkedin.com/in/ada".to_string(),
        github_url: "https://github.com/ada".to_string(),
        website: Some("https://ada.dev".to_string()),
        experience_years: ExperienceYears::OneToTwo,
        cover_letter: None,
    }
}

pub(super) fn build_service() -> (
    AdvertService<MemoryJobBoard, RecordingQueue>,
    Arc<MemoryJobBoard>,
    Arc<RecordingQueue>,
) {
    let repository = Arc::new(MemoryJobBoard::default());
    let queue = Arc::new(RecordingQueue::default());
    let service = AdvertService::new(repository.clone(), queue.clone());
    (service, repository, queue)
}
