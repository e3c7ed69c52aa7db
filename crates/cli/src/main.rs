use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_api_client::HttpPatientBackend;
use triage_core::config::{
    duration_secs_from_env_value, organisation_name_from_lookup, ENV_BACKEND_URL,
    ENV_HTTP_TIMEOUT_SECS,
};
use triage_core::constants::DEFAULT_HTTP_TIMEOUT;
use triage_core::dashboard::DashboardView;
use triage_core::ports::{
    BusinessHoursScheduler, InMemoryBackend, PatientBackend, SchedulingProvider, TimeSlot,
};
use triage_core::{
    EmailDraft, FilterCriteria, Patient, PatientDetail, PatientId, ReviewStatus, Selection,
    SummaryStats, TriageDashboard,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Surgical patient triage dashboard CLI")]
#[command(group(ArgGroup::new("source").args(["backend_url", "fixture"])))]
struct Cli {
    /// Backend base URL (defaults to TRIAGE_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,
    /// JSON file holding an array of patients, used instead of a backend
    #[arg(long)]
    fixture: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients by triage bucket
    List {
        /// all, needs-review or reviewed
        #[arg(long)]
        review_status: Option<String>,
        /// Exact surgery type
        #[arg(long)]
        surgery_type: Option<String>,
        /// Exact assigned provider
        #[arg(long)]
        provider: Option<String>,
        /// Case-insensitive match on name or surgery type
        #[arg(long)]
        search: Option<String>,
    },
    /// Show summary statistics
    Stats,
    /// Show one patient with review progress and readiness
    Show {
        /// Patient id
        id: String,
    },
    /// Record a review decision
    Mark {
        /// Patient id
        id: String,
        /// reviewed or needs-review
        status: String,
    },
    /// Draft an email requesting a missing document
    EmailDraft {
        /// Patient id
        id: String,
        /// Document type, e.g. "Cardiac Clearance"
        document_type: String,
    },
    /// List upcoming appointment slots
    Slots,
}

fn backend(cli: &Cli) -> Result<Arc<dyn PatientBackend>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.fixture {
        return Ok(Arc::new(InMemoryBackend::from_fixture_file(path)?));
    }

    let url = match &cli.backend_url {
        Some(url) => url.clone(),
        None => std::env::var(ENV_BACKEND_URL)
            .map_err(|_| format!("pass --backend-url or --fixture, or set {ENV_BACKEND_URL}"))?,
    };
    let timeout = duration_secs_from_env_value(
        ENV_HTTP_TIMEOUT_SECS,
        std::env::var(ENV_HTTP_TIMEOUT_SECS).ok(),
        DEFAULT_HTTP_TIMEOUT,
    )?;

    Ok(Arc::new(HttpPatientBackend::new(&url, timeout)?))
}

fn patient_line(patient: &Patient) -> String {
    format!(
        "  {:<10} {:<24} {:<20} {:<14} priority {}",
        patient.id, patient.name, patient.surgery_type, patient.assigned_to, patient.priority_score
    )
}

fn render_view(view: &DashboardView) -> String {
    let mut out = String::new();
    let sections = [
        ("Needs review", &view.needs_review),
        ("Reviewed / scheduled", &view.scheduled),
        ("Rejected", &view.rejected),
    ];

    for (title, patients) in sections {
        out.push_str(&format!("{title} ({})\n", patients.len()));
        for patient in patients.iter() {
            out.push_str(&patient_line(patient));
            out.push('\n');
        }
    }
    out.push_str(&render_stats(&view.stats));
    out
}

fn render_stats(stats: &SummaryStats) -> String {
    format!(
        "Total: {}, Needs review: {}, Reviewed: {}\n",
        stats.total, stats.needs_review, stats.reviewed
    )
}

fn render_detail(detail: &PatientDetail) -> String {
    let p = &detail.patient;
    let mut out = format!(
        "{} ({}), age {}\nSurgery: {}\nAssigned to: {}\nReferred by: {}\n",
        p.name, p.id, p.age, p.surgery_type, p.assigned_to, p.referring_provider
    );
    out.push_str(&format!(
        "Consult date: {}\nReviewed at: {}\nScheduled: {}\n",
        detail.dates.consult_date, detail.dates.reviewed_at, detail.dates.scheduled_date
    ));
    out.push_str(&format!(
        "Readiness: {}\nProgress: {}/{} ({:.0}%), {} critical pending\n",
        detail.readiness_description,
        detail.progress.completed,
        detail.progress.total,
        detail.progress.percent,
        detail.progress.critical_pending
    ));
    for step in &detail.progress.steps {
        let mark = if step.completed { "x" } else { " " };
        out.push_str(&format!("  [{mark}] {}\n", step.label));
    }
    out
}

fn render_draft(draft: &EmailDraft) -> String {
    format!("Subject: {}\n\n{}\n", draft.subject, draft.body)
}

fn render_slots(slots: &[TimeSlot]) -> String {
    slots
        .iter()
        .map(|s| {
            format!(
                "{}  {}  {}{}\n",
                s.id,
                s.date.format("%a %-m/%-d/%Y %H:%M"),
                s.provider,
                if s.available { "" } else { "  (booked)" }
            )
        })
        .collect()
}

/// Run one command.
///
/// # Errors
///
/// Returns an error if the patient source cannot be reached or the command
/// fails, so `main` can exit non-zero.
async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = &cli.command else {
        println!("Use 'triage --help' for commands");
        return Ok(());
    };

    if let Commands::Slots = command {
        let slots = BusinessHoursScheduler::new()
            .available_slots(Utc::now())
            .await?;
        print!("{}", render_slots(&slots));
        return Ok(());
    }

    let dashboard = TriageDashboard::new(backend(cli)?);
    dashboard
        .load_patients()
        .await
        .map_err(|e| format!("loading patients: {e}"))?;

    match command {
        Commands::List {
            review_status,
            surgery_type,
            provider,
            search,
        } => {
            let criteria = FilterCriteria {
                review_status: review_status.as_deref().unwrap_or_default().parse()?,
                surgery_type: Selection::from_param(surgery_type.as_deref()),
                provider: Selection::from_param(provider.as_deref()),
            };
            let view = dashboard.view(&criteria, search.as_deref().unwrap_or_default());
            print!("{}", render_view(&view));
        }
        Commands::Stats => print!("{}", render_stats(&dashboard.stats())),
        Commands::Show { id } => {
            let detail = dashboard.detail(&PatientId::new(id)?)?;
            print!("{}", render_detail(&detail));
        }
        Commands::Mark { id, status } => {
            let id = PatientId::new(id)?;
            let status: ReviewStatus = status.parse()?;
            dashboard
                .update_status(&id, status)
                .await
                .map_err(|e| format!("updating status: {e}"))?;
            println!("Marked {} as {}", id, status);
        }
        Commands::EmailDraft { id, document_type } => {
            let patient = dashboard.patient(&PatientId::new(id)?)?;
            let organisation = organisation_name_from_lookup(|key| std::env::var(key).ok());
            let draft = EmailDraft::for_missing_document(
                &patient.name,
                document_type,
                &patient.referring_provider,
                &organisation,
            );
            print!("{}", render_draft(&draft));
        }
        Commands::Slots => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
