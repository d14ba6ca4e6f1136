use crate::infra::{InMemoryIdentityStore, InMemoryJobBoard, InMemoryPublishQueue};
use chrono::{Duration, Utc};
use clap::Args;
use std::sync::Arc;

use jobboard::adverts::{
    run_publish_job, AdvertService, ApplicationSubmission, EmploymentType, ExperienceLevel,
    ExperienceYears, NewAdvert, Viewer,
};
use jobboard::error::AppError;
use jobboard::identity::{Credentials, IdentityService, RegisterRequest};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Minutes ahead to schedule the deferred publish; the demo fast-forwards
    /// past the eta instead of sleeping.
    #[arg(long, default_value_t = 30)]
    pub(crate) eta_minutes: i64,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let board = Arc::new(InMemoryJobBoard::default());
    let queue = Arc::new(InMemoryPublishQueue::default());
    let identity_store = Arc::new(InMemoryIdentityStore::default());
    let identity = IdentityService::new(identity_store.clone(), identity_store);
    let adverts = AdvertService::new(board.clone(), queue.clone());

    println!("== Job board lifecycle demo ==\n");

    let account = identity
        .register(RegisterRequest {
            email: "recruiter@example.com".to_string(),
            password: "TestPass@1".to_string(),
        })
        .expect("demo account registers");
    let token = identity
        .login(&Credentials {
            email: account.email.clone(),
            password: "TestPass@1".to_string(),
        })
        .expect("demo login succeeds");
    println!("registered {} and logged in (token {}...)", account.email, &token[..8]);

    let published = adverts
        .create(demo_advert("Backend Engineer", true))
        .expect("published advert creates");
    println!(
        "\ncreated advert {} '{}' (published={})",
        published.id.0, published.title, published.is_published
    );

    adverts
        .apply(&published.id, demo_submission("Ada", "Lovelace"))
        .expect("first application lands");
    adverts
        .apply(&published.id, demo_submission("Grace", "Hopper"))
        .expect("second application lands");
    let view = adverts
        .retrieve(&published.id, Viewer::Authenticated)
        .expect("advert retrieves");
    println!("applications received: {}", view.applicant_count);

    let draft = adverts
        .create(demo_advert("Platform Engineer", false))
        .expect("draft advert creates");
    let eta = Utc::now() + Duration::minutes(args.eta_minutes);
    let job = adverts
        .schedule_publish(&draft.id, eta)
        .expect("draft schedules");
    println!(
        "\ncreated draft advert {} and scheduled publish at {}",
        draft.id.0, job.eta
    );
    println!("queue now holds {} pending job(s)", queue.jobs().len());

    // Play the part of the worker pool: fast-forward past the eta.
    let due = queue.take_due(eta + Duration::seconds(1));
    println!("worker picked up {} due job(s)", due.len());
    for job in &due {
        run_publish_job(board.as_ref(), &job.advert_id).expect("publish job runs");
    }
    let draft_view = adverts
        .retrieve(&draft.id, Viewer::Anonymous)
        .expect("published draft is now public");
    println!(
        "advert {} is_published={} after the job ran",
        draft_view.advert.id.0, draft_view.advert.is_published
    );

    println!("\nunpublishing and deleting advert {}", published.id.0);
    adverts.unpublish(&published.id).expect("unpublish succeeds");
    adverts
        .delete(&published.id)
        .expect("delete succeeds once unpublished");

    let remaining = adverts.list(Viewer::Anonymous).expect("public listing");
    println!("public adverts remaining: {}", remaining.len());
    for view in &remaining {
        println!(
            "  {} '{}' ({} applicant(s))",
            view.advert.id.0, view.advert.title, view.applicant_count
        );
    }

    identity.logout(&token).expect("logout succeeds");
    println!("\nlogged out; demo complete");
    Ok(())
}

fn demo_advert(title: &str, published: bool) -> NewAdvert {
    NewAdvert {
        title: title.to_string(),
        company_name: "Initech".to_string(),
        employment_type: EmploymentType::FullTime,
        experience_level: ExperienceLevel::MidLevel,
        description: "Design, build, and operate the services behind the board.".to_string(),
        location: "Remote".to_string(),
        is_published: published,
    }
}

fn demo_submission(first_name: &str, last_name: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: "+1 555 0100".to_string(),
        linkedin_url: format!("https://linkedin.com/in/{}", first_name.to_lowercase()),
        github_url: format!("https://github.com/{}", first_name.to_lowercase()),
        website: None,
        experience_years: ExperienceYears::TwoToFive,
        cover_letter: Some("I would love to work on this.".to_string()),
    }
}
