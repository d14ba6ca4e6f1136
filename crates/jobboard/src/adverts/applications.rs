use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::AdvertId;
use crate::error::ValidationError;
use crate::identity::domain::is_valid_email;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Bucketed years of professional experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceYears {
    #[serde(rename = "0-1")]
    ZeroToOne,
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "2-5")]
    TwoToFive,
    #[serde(rename = "5+")]
    FivePlus,
}

impl ExperienceYears {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ZeroToOne => "0-1",
            Self::OneToTwo => "1-2",
            Self::TwoToFive => "2-5",
            Self::FivePlus => "5+",
        }
    }
}

/// A candidate's submission against one advert. Immutable once stored;
/// removed only when the owning advert is deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub github_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub experience_years: ExperienceYears,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub advert_id: AdvertId,
    pub created_at: DateTime<Utc>,
}

const NAME_MAX: usize = 255;
const PHONE_MAX: usize = 30;
const COVER_LETTER_MAX: usize = 255;

/// Inbound application payload; the owning advert comes from the URL, not
/// the body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub github_url: String,
    #[serde(default)]
    pub website: Option<String>,
    pub experience_years: ExperienceYears,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        check_name(&mut errors, "first_name", &self.first_name);
        check_name(&mut errors, "last_name", &self.last_name);
        if !is_valid_email(self.email.trim()) {
            errors.push("email", "Enter a valid email address.");
        }
        if self.phone.trim().is_empty() {
            errors.push("phone", "This field may not be blank.");
        } else if self.phone.chars().count() > PHONE_MAX {
            errors.push(
                "phone",
                format!("Ensure this field has no more than {PHONE_MAX} characters."),
            );
        }
        check_url(&mut errors, "linkedin_url", &self.linkedin_url);
        check_url(&mut errors, "github_url", &self.github_url);
        if let Some(website) = &self.website {
            check_url(&mut errors, "website", website);
        }
        if let Some(cover_letter) = &self.cover_letter {
            if cover_letter.chars().count() > COVER_LETTER_MAX {
                errors.push(
                    "cover_letter",
                    format!("Ensure this field has no more than {COVER_LETTER_MAX} characters."),
                );
            }
        }
        errors.into_result()
    }
}

fn check_name(errors: &mut ValidationError, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "This field may not be blank.");
    } else if value.chars().count() > NAME_MAX {
        errors.push(
            field,
            format!("Ensure this field has no more than {NAME_MAX} characters."),
        );
    }
}

fn check_url(errors: &mut ValidationError, field: &str, value: &str) {
    let trimmed = value.trim();
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    if !has_scheme || trimmed.len() <= "https://".len() {
        errors.push(field, "Enter a valid URL.");
    }
}
