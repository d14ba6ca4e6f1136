use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::applications::{Application, ApplicationId, ApplicationSubmission};
use super::dispatch::{PublishJob, PublishQueue, QueueError};
use super::domain::{Advert, AdvertId, AdvertUpdate, AdvertView, NewAdvert, Viewer};
use super::repository::{AdvertRepository, ApplicationRepository, StoreError};
use crate::error::ValidationError;

static ADVERT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_advert_id() -> AdvertId {
    let id = ADVERT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdvertId(format!("adv-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Lifecycle service for adverts and their applications: state transitions,
/// gated submission and deletion, and the scheduled-publish hand-off.
pub struct AdvertService<R, Q> {
    repository: Arc<R>,
    queue: Arc<Q>,
}

impl<R, Q> AdvertService<R, Q>
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    pub fn new(repository: Arc<R>, queue: Arc<Q>) -> Self {
        Self { repository, queue }
    }

    /// Create an advert. Unless the payload opts out, it starts published.
    pub fn create(&self, payload: NewAdvert) -> Result<Advert, AdvertServiceError> {
        payload.validate()?;

        let now = Utc::now();
        let advert = Advert {
            id: next_advert_id(),
            title: payload.title,
            company_name: payload.company_name,
            employment_type: payload.employment_type,
            experience_level: payload.experience_level,
            description: payload.description,
            location: payload.location,
            is_published: payload.is_published,
            created_at: now,
            updated_at: now,
        };

        Ok(self.repository.insert(advert)?)
    }

    /// List adverts for `viewer`: published first, then by descending
    /// applicant count, then newest first. Anonymous viewers only see
    /// published adverts.
    pub fn list(&self, viewer: Viewer) -> Result<Vec<AdvertView>, AdvertServiceError> {
        let counts = self.repository.counts()?;
        let mut views: Vec<AdvertView> = self
            .repository
            .list()?
            .into_iter()
            .filter(|advert| advert.is_published || viewer == Viewer::Authenticated)
            .map(|advert| {
                let applicant_count = counts.get(&advert.id).copied().unwrap_or(0);
                AdvertView {
                    advert,
                    applicant_count,
                }
            })
            .collect();

        views.sort_by_key(|view| {
            (
                Reverse(view.advert.is_published),
                Reverse(view.applicant_count),
                Reverse(view.advert.created_at),
                Reverse(view.advert.id.clone()),
            )
        });

        Ok(views)
    }

    /// Fetch one advert with its derived applicant count. Unpublished
    /// adverts are invisible to anonymous viewers.
    pub fn retrieve(&self, id: &AdvertId, viewer: Viewer) -> Result<AdvertView, AdvertServiceError> {
        let advert = self.repository.fetch(id)?.ok_or(StoreError::NotFound)?;
        if !advert.is_published && viewer == Viewer::Anonymous {
            return Err(StoreError::NotFound.into());
        }

        let applicant_count = self.repository.count_for(id)?;
        Ok(AdvertView {
            advert,
            applicant_count,
        })
    }

    /// Partial update of the mutable fields; the publish flag is out of reach.
    pub fn update(
        &self,
        id: &AdvertId,
        update: AdvertUpdate,
    ) -> Result<Advert, AdvertServiceError> {
        update.validate()?;
        Ok(self.repository.update_fields(id, &update)?)
    }

    /// Transition to published. Idempotent.
    pub fn publish(&self, id: &AdvertId) -> Result<Advert, AdvertServiceError> {
        Ok(self.repository.set_published(id, true)?)
    }

    /// Transition to unpublished. Idempotent.
    pub fn unpublish(&self, id: &AdvertId) -> Result<Advert, AdvertServiceError> {
        Ok(self.repository.set_published(id, false)?)
    }

    /// Delete an unpublished advert, cascading its applications.
    pub fn delete(&self, id: &AdvertId) -> Result<(), AdvertServiceError> {
        self.repository.delete_unpublished(id)?;
        Ok(())
    }

    /// Hand one deferred-publish message to the queue, to run at `eta`.
    /// Legal only while the advert is unpublished. The timestamp is passed
    /// through untouched — past etas are the broker's problem — and pending
    /// jobs are never deduplicated: scheduling twice enqueues twice.
    pub fn schedule_publish(
        &self,
        id: &AdvertId,
        eta: DateTime<Utc>,
    ) -> Result<PublishJob, AdvertServiceError> {
        let advert = self.repository.fetch(id)?.ok_or(StoreError::NotFound)?;
        if advert.is_published {
            return Err(StoreError::StillPublished.into());
        }

        let job = PublishJob {
            advert_id: advert.id,
            eta,
        };
        self.queue.enqueue(job.clone())?;
        info!(advert_id = %job.advert_id.0, eta = %job.eta, "publish scheduled");
        Ok(job)
    }

    /// Store a submission against a published advert. Open to anonymous
    /// callers; the publish-state gate is enforced atomically by the store.
    pub fn apply(
        &self,
        id: &AdvertId,
        submission: ApplicationSubmission,
    ) -> Result<Application, AdvertServiceError> {
        submission.validate()?;

        let application = Application {
            id: next_application_id(),
            first_name: submission.first_name,
            last_name: submission.last_name,
            email: submission.email,
            phone: submission.phone,
            linkedin_url: submission.linkedin_url,
            github_url: submission.github_url,
            website: submission.website,
            experience_years: submission.experience_years,
            cover_letter: submission.cover_letter,
            advert_id: id.clone(),
            created_at: Utc::now(),
        };

        Ok(self.repository.insert_for_published(application)?)
    }

    /// An advert's applications, oldest first.
    pub fn applications(&self, id: &AdvertId) -> Result<Vec<Application>, AdvertServiceError> {
        self.repository.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(self.repository.list_for(id)?)
    }
}

/// Error raised by the advert lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum AdvertServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
