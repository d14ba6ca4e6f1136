//! Job-board backend core: identity, advert lifecycle, applications, and
//! scheduled publishing.
//!
//! Storage and the message broker are collaborators expressed as traits
//! ([`identity::AccountRepository`], [`adverts::AdvertRepository`],
//! [`adverts::PublishQueue`], ...); the api service crate provides in-memory
//! implementations and the HTTP bootstrap.

pub mod adverts;
pub mod config;
pub mod error;
pub mod identity;
pub mod pagination;
pub mod telemetry;
