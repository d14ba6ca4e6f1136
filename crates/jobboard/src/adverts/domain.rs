use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier wrapper for job adverts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdvertId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full Time")]
    FullTime,
    #[serde(rename = "Part Time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full Time",
            Self::PartTime => "Part Time",
            Self::Contract => "Contract",
            Self::Internship => "Internship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Entry Level")]
    EntryLevel,
    #[serde(rename = "Mid Level")]
    MidLevel,
    #[serde(rename = "Senior")]
    Senior,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EntryLevel => "Entry Level",
            Self::MidLevel => "Mid Level",
            Self::Senior => "Senior",
        }
    }
}

/// A job advert. Adverts start published unless created otherwise and move
/// between the published and unpublished states idempotently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advert {
    pub id: AdvertId,
    pub title: String,
    pub company_name: String,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub description: String,
    pub location: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who is looking at the board. Anonymous viewers only see published adverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated,
}

const TITLE_MAX: usize = 150;
const COMPANY_MAX: usize = 150;
const LOCATION_MAX: usize = 200;

/// Creation payload. `is_published` is writable and defaults to true.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdvert {
    pub title: String,
    pub company_name: String,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub description: String,
    pub location: String,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

impl NewAdvert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        check_text(&mut errors, "title", &self.title, TITLE_MAX);
        check_text(&mut errors, "company_name", &self.company_name, COMPANY_MAX);
        if self.description.trim().is_empty() {
            errors.push("description", "This field may not be blank.");
        }
        check_text(&mut errors, "location", &self.location, LOCATION_MAX);
        errors.into_result()
    }
}

/// Partial update of the mutable advert fields. The publish flag, identifier,
/// and timestamps are not settable here; publish state changes only through
/// the lifecycle transitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvertUpdate {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl AdvertUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if let Some(title) = &self.title {
            check_text(&mut errors, "title", title, TITLE_MAX);
        }
        if let Some(company_name) = &self.company_name {
            check_text(&mut errors, "company_name", company_name, COMPANY_MAX);
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                errors.push("description", "This field may not be blank.");
            }
        }
        if let Some(location) = &self.location {
            check_text(&mut errors, "location", location, LOCATION_MAX);
        }
        errors.into_result()
    }

    /// Fold the present fields into `advert`, leaving the rest untouched.
    pub fn apply_to(&self, advert: &mut Advert) {
        if let Some(title) = &self.title {
            advert.title = title.clone();
        }
        if let Some(company_name) = &self.company_name {
            advert.company_name = company_name.clone();
        }
        if let Some(employment_type) = self.employment_type {
            advert.employment_type = employment_type;
        }
        if let Some(experience_level) = self.experience_level {
            advert.experience_level = experience_level;
        }
        if let Some(description) = &self.description {
            advert.description = description.clone();
        }
        if let Some(location) = &self.location {
            advert.location = location.clone();
        }
    }
}

/// Serialized advert enriched with the applicant count derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct AdvertView {
    #[serde(flatten)]
    pub advert: Advert,
    pub applicant_count: usize,
}

fn check_text(errors: &mut ValidationError, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(field, "This field may not be blank.");
    } else if value.chars().count() > max {
        errors.push(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}
