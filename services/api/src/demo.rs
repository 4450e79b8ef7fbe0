use crate::cli::render_queue;
use crate::infra::{load_applications, parse_sort};
use chrono::{Duration, Utc};
use clap::Args;
use recruit_desk::error::AppError;
use recruit_desk::pipeline::{
    ApplicationQuery, ApplicationStore, FlagState, InMemoryTeamStore, NewApplication, ReviewFlag,
    ReviewPipeline, SortOrder, TeamStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON seed file to review instead of the built-in sample applicants
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Queue order for the walkthrough: asc or desc
    #[arg(long, value_parser = parse_sort)]
    pub(crate) sort: Option<SortOrder>,
    /// Stop after showing the queue without approving or rejecting anything
    #[arg(long)]
    pub(crate) read_only: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        sort,
        read_only,
    } = args;

    let applications = Arc::new(load_applications(seed.as_deref())?);
    if seed.is_none() {
        for submission in sample_applicants() {
            applications.insert(submission).await?;
        }
    }
    let team = Arc::new(InMemoryTeamStore::new());
    let pipeline = ReviewPipeline::new(applications, team.clone());
    let session = pipeline.session();
    let query = ApplicationQuery::sorted(sort.unwrap_or_default());

    println!("Recruit desk demo");
    let queue = session.refresh(&query).await?;
    print!("{}", render_queue(&queue));

    if read_only {
        return Ok(());
    }

    let Some(first) = queue.applications.first().cloned() else {
        return Ok(());
    };

    println!("\nReviewing {} ({})", first.name, first.id);
    session.set_email_sent(&first.id, true).await?;
    session.set_interview_approved(&first.id, true).await?;
    for flag in [ReviewFlag::EmailSent, ReviewFlag::InterviewApproved] {
        if let Some(state) = session.flag_state(&first.id, flag).await {
            println!("- {}: {}", flag_label(flag), describe_flag(&state));
        }
    }

    let approval = session.approve(&first.id).await?;
    println!(
        "- approved; enrolled {} as team member {} with referral code {}",
        approval.team_member.name, approval.team_member.id, approval.team_member.referral_code
    );

    if let Err(err) = session.approve(&first.id).await {
        println!("- second approval refused: {err}");
    }

    if queue.len() > 1 {
        if let Some(last) = queue.applications.last() {
            session.reject(&last.id).await?;
            println!("- rejected {} ({})", last.name, last.id);
        }
    }

    println!("\nRemaining queue");
    let remaining = session.refresh(&query).await?;
    print!("{}", render_queue(&remaining));

    let members = team.list().await?;
    println!("\nTeam roster ({} member(s))", members.len());
    for member in members {
        println!(
            "- {} | {} | {} | referral {}",
            member.id, member.name, member.email, member.referral_code
        );
    }

    Ok(())
}

fn flag_label(flag: ReviewFlag) -> &'static str {
    match flag {
        ReviewFlag::EmailSent => "email sent",
        ReviewFlag::InterviewApproved => "interview approved",
    }
}

fn describe_flag(state: &FlagState) -> String {
    match state {
        FlagState::Persisted { value } => format!("{value} (saved)"),
        FlagState::PendingWrite { attempted, .. } => format!("{attempted} (saving)"),
        FlagState::WriteFailed {
            persisted, reason, ..
        } => format!("{persisted} (write failed: {reason})"),
    }
}

fn sample_applicants() -> Vec<NewApplication> {
    let now = Utc::now();
    let applicant = |name: &str, handle: &str, phone: &str, role: &str, hours: i64| {
        NewApplication {
            name: name.to_string(),
            email: format!("{handle}@example.com"),
            phone: phone.to_string(),
            role: role.to_string(),
            linkedin_url: format!("https://linkedin.com/in/{handle}"),
            resume_url: format!("https://files.example.com/resumes/{handle}.pdf"),
            referral_code: String::new(),
            referral_code_used: false,
            created_at: now - Duration::hours(hours),
        }
    };

    let mut referred = applicant("Ada Lovelace", "ada", "9876543210", "Backend Engineer", 2);
    referred.referral_code = "GRA199".to_string();
    referred.referral_code_used = true;

    vec![
        referred,
        applicant("Alan Turing", "alan", "5551234", "Cryptanalyst", 30),
        applicant("Katherine Johnson", "katherine", "5550142", "Data Analyst", 12),
    ]
}
