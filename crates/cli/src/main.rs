//! SkillRoute CLI - career roadmap and progress tracking.

mod offline;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skillroute_cache::TtlCache;
use skillroute_core::Profile;
use skillroute_gateway::{HttpTransport, RemoteGateway, StaticCredential, Transport};
use skillroute_session::{
    LoadOutcome, NotificationSink, RoadmapSession, SessionConfig, SessionError,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skillroute")]
#[command(about = "Career roadmap and progress tracker", long_about = None)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "SKILLROUTE_API_URL")]
    api_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "SKILLROUTE_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in backend stored under .skillroute/
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or save the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Work with the roadmap
    Roadmap {
        #[command(subcommand)]
        action: RoadmapAction,
    },
    /// Show progress and recommendations
    Progress,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the stored profile
    Show,
    /// Save the profile
    Save {
        /// Name
        #[arg(long)]
        name: String,
        /// Education level
        #[arg(long)]
        education: String,
        /// Comma-separated skills
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        /// Comma-separated interests
        #[arg(long, value_delimiter = ',')]
        interests: Vec<String>,
        /// Career goals
        #[arg(long)]
        goals: String,
        /// Prior experience
        #[arg(long)]
        experience: Option<String>,
    },
}

#[derive(Subcommand)]
enum RoadmapAction {
    /// Show the active roadmap
    Show,
    /// Generate a roadmap from the stored profile
    Generate,
    /// Adapt the roadmap to current progress
    Adapt,
    /// Delete the roadmap
    Reset,
    /// Toggle a phase between pending and completed
    Toggle {
        /// Phase number, starting at 1
        phase: usize,
    },
}

type Session = RoadmapSession<Arc<dyn Transport>, StaticCredential>;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = SessionConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    config.validate()?;

    let local = if cli.offline {
        Some(offline::open(&offline::state_path())?)
    } else {
        None
    };
    let transport: Arc<dyn Transport> = match &local {
        Some(backend) => backend.clone() as Arc<dyn Transport>,
        None => Arc::new(HttpTransport::new(config.api_url.clone())),
    };
    debug!(api_url = %config.api_url, offline = cli.offline, "Session configured");

    let gateway = RemoteGateway::with_policy(transport, StaticCredential::new(cli.token), config.call_policy());
    let session: Session = RoadmapSession::new(
        gateway,
        Arc::new(TtlCache::new()),
        Arc::new(NotificationSink::new()),
        config.user(),
    )
    .with_cache_ttl(config.cache_ttl());

    let result = run(&session, cli.command).await;
    render::notifications(session.notifications().drain());

    if let Some(backend) = &local {
        offline::persist(&offline::state_path(), backend)?;
    }
    result
}

async fn run(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Profile { action: ProfileAction::Show } => {
            report_load("profile", session.load_profile(None).await);
            render::profile(session.snapshot().profile.as_ref());
        }
        Commands::Profile {
            action:
                ProfileAction::Save {
                    name,
                    education,
                    skills,
                    interests,
                    goals,
                    experience,
                },
        } => {
            let mut profile = Profile::new(name, education, skills, interests, goals);
            if let Some(experience) = experience {
                profile = profile.with_experience(experience);
            }
            session.save_profile(&profile).await?;
            render::profile(session.snapshot().profile.as_ref());
        }
        Commands::Roadmap { action } => roadmap(session, action).await?,
        Commands::Progress => {
            report_load("roadmap", session.load_roadmap(None).await);
            match session.progress_report(chrono::Utc::now()) {
                Some(report) => render::progress(&report, &session.recommendations()),
                None => println!("No roadmap yet. Run `skillroute roadmap generate`."),
            }
        }
    }
    Ok(())
}

async fn roadmap(session: &Session, action: RoadmapAction) -> Result<()> {
    match action {
        RoadmapAction::Show => {
            report_load("roadmap", session.load_roadmap(None).await);
        }
        RoadmapAction::Generate => {
            report_load("profile", session.load_profile(None).await);
            match session.generate_loaded().await {
                Err(SessionError::MissingProfile) => {
                    bail!("No profile yet. Run `skillroute profile save` first.")
                }
                other => {
                    other?;
                }
            }
        }
        RoadmapAction::Adapt => {
            report_load("roadmap", session.load_roadmap(None).await);
            session.adapt().await?;
        }
        RoadmapAction::Reset => {
            session.reset().await?;
        }
        RoadmapAction::Toggle { phase } => {
            let index = phase.checked_sub(1).context("Phase numbers start at 1")?;
            report_load("roadmap", session.load_roadmap(None).await);
            let status = session
                .snapshot()
                .roadmap
                .active()
                .and_then(|active| active.phases().get(index).map(|p| p.status))
                .with_context(|| format!("No phase {} in the current roadmap", phase))?;
            session.toggle_phase(index, status).await?;
        }
    }
    render::roadmap(&session.snapshot().roadmap);
    Ok(())
}

fn report_load(resource: &str, outcome: LoadOutcome) {
    if let LoadOutcome::Failed(kind) = outcome {
        warn!(resource, %kind, "Showing last known state");
    }
}
