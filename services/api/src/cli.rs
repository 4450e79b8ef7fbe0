use crate::demo::{run_demo, DemoArgs};
use crate::infra::{build_pipeline, parse_sort};
use crate::server;
use clap::{Args, Parser, Subcommand};
use recruit_desk::config::AppConfig;
use recruit_desk::error::AppError;
use recruit_desk::pipeline::{ActiveQueue, ApplicationQuery, CsvExportSink, ExportSink, SortOrder};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Recruit Desk",
    about = "Review job applications, approve hires into the team, and export the queue",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the active review queue
    Queue(QueueArgs),
    /// Write the active review queue as a CSV spreadsheet
    Export(ExportArgs),
    /// Walk a sample review session from queue to approval
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON seed file for the in-memory application store
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QueueFilters {
    /// JSON seed file for the in-memory application store
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Only keep applications whose referral code contains this text (case-sensitive)
    #[arg(long)]
    pub(crate) referral_code: Option<String>,
    /// Order by submission time: asc or desc
    #[arg(long, value_parser = parse_sort)]
    pub(crate) sort: Option<SortOrder>,
    /// Case-insensitive match against name, email, or role
    #[arg(long)]
    pub(crate) search: Option<String>,
}

impl QueueFilters {
    fn query(&self, base: ApplicationQuery) -> ApplicationQuery {
        let mut query = base;
        if let Some(sort) = self.sort {
            query.sort_order = sort;
        }
        query
            .with_referral_code(self.referral_code.clone().unwrap_or_default())
            .with_search(self.search.clone().unwrap_or_default())
    }
}

#[derive(Args, Debug)]
pub(crate) struct QueueArgs {
    #[command(flatten)]
    filters: QueueFilters,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    filters: QueueFilters,
    /// Destination file (defaults to stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Queue(args) => run_queue(args).await,
        Command::Export(args) => run_export(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

async fn load_queue(filters: QueueFilters) -> Result<ActiveQueue, AppError> {
    let config = AppConfig::load()?;
    let query = filters.query(ApplicationQuery::sorted(config.pipeline.default_sort));
    let pipeline = build_pipeline(&config, filters.seed)?;
    Ok(pipeline.queries().fetch(&query).await?)
}

async fn run_queue(args: QueueArgs) -> Result<(), AppError> {
    let queue = load_queue(args.filters).await?;
    print!("{}", render_queue(&queue));
    Ok(())
}

async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { filters, output } = args;
    let queue = load_queue(filters).await?;
    let bytes = CsvExportSink::default().export(&queue.applications)?;

    match output {
        Some(path) => {
            std::fs::write(&path, bytes)?;
            println!(
                "Exported {} application(s) to {}",
                queue.len(),
                path.display()
            );
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

pub(crate) fn render_queue(queue: &ActiveQueue) -> String {
    if queue.is_empty() {
        return "No active applications.\n".to_string();
    }

    let mut out = format!(
        "{} active application(s), {} by submission time\n",
        queue.len(),
        queue.query.sort_order.label()
    );
    for application in &queue.applications {
        let referral = if application.referral_code.is_empty() {
            "-"
        } else {
            application.referral_code.as_str()
        };
        out.push_str(&format!(
            "- {} | {} | {} <{}> | {} | referral {} | email sent: {} | interview approved: {}\n",
            application.id,
            application.created_at.format("%Y-%m-%d %H:%M"),
            application.name,
            application.email,
            application.role,
            referral,
            yes_no(application.email_sent),
            yes_no(application.interview_approved),
        ));
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
