//! Advert lifecycle: the advert and application stores, the state-transition
//! service, and the deferred-publish dispatch.
//!
//! Two states per advert, `Published` and `Unpublished`. Publish and
//! unpublish are idempotent; deletion is legal only while unpublished and
//! cascades the advert's applications; applying is legal only while
//! published. Scheduling hands a single `{advert_id, eta}` message to an
//! external queue — the broker owns delivery timing, and the job body simply
//! forces the advert to published whenever it runs.

pub mod applications;
pub mod dispatch;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use applications::{Application, ApplicationId, ApplicationSubmission, ExperienceYears};
pub use dispatch::{run_publish_job, PublishJob, PublishQueue, QueueError};
pub use domain::{
    Advert, AdvertId, AdvertUpdate, AdvertView, EmploymentType, ExperienceLevel, NewAdvert, Viewer,
};
pub use repository::{AdvertRepository, ApplicationRepository, StoreError};
pub use router::{advert_router, AdvertRouterState, ScheduleRequest};
pub use service::{AdvertService, AdvertServiceError};
