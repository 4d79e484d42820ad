use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use civic_pulse::{
    config::Config,
    evidence::{
        Capture, EvidenceCapture, FixedLocation, LocationProvider, NoLocation, Phase,
        StillImageCamera,
    },
    export::issues_to_geojson,
    format::{format_date, time_ago},
    protocol::{Coordinate, CreateRegionalAdminRequest, Issue, IssueStatus},
    report::{
        filter_issues, validate_comment, validate_registration, IssueBoard, IssueFields,
        ReportDraft, StatusCounts,
    },
    server::{CivicApi, ImageHost},
    session::{Permission, Session, SessionStore, ZoneScope},
    zone::{self, Zone},
    Error,
};

#[derive(Parser)]
struct CliParser {
    /// Base URL of the issue service. Overrides CIVIC_API_BASE_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Directory holding the stored session. Overrides CIVIC_SESSION_DIR.
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// A GPS position given on the command line.
#[derive(clap::Args, Clone, Copy)]
struct PositionArgs {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,
    /// Accuracy radius in meters.
    #[arg(long)]
    accuracy: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CIVIC_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password.
        #[arg(long)]
        confirm: String,
    },
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CIVIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Show which zone a position falls in.
    Zone {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Capture a watermarked evidence photo from a still frame, without uploading it.
    Capture {
        /// Image served as the live camera frame.
        frame: PathBuf,
        #[command(flatten)]
        position: PositionArgs,
        /// Where to write the JPEG. Defaults to its generated file name.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Capture evidence, upload it and file a new issue.
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// One of the fixed categories, e.g. "Roads & Potholes".
        #[arg(long)]
        category: String,
        /// Image served as the live camera frame.
        #[arg(long)]
        frame: PathBuf,
        #[command(flatten)]
        position: PositionArgs,
    },
    /// List issues.
    Issues {
        /// Only issues reported by me.
        #[arg(long)]
        mine: bool,
        /// Only issues with this status: pending, in-progress or resolved.
        #[arg(long)]
        status: Option<IssueStatus>,
        /// Only issues whose title, category or description contains this text.
        #[arg(long, default_value = "")]
        search: String,
        /// Write located issues as a GeoJSON FeatureCollection to this file.
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Show one issue with its comments.
    Issue { id: i64 },
    /// Change an issue's status (administrators).
    Status {
        id: i64,
        /// pending, in-progress or resolved.
        status: IssueStatus,
    },
    /// Delete an issue (district administrators).
    Delete { id: i64 },
    /// Comment on an issue.
    Comment { id: i64, text: String },
    /// List notifications.
    Notifications,
    /// District administration.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Zone dashboard for regional administrators.
    Regional {
        #[command(subcommand)]
        command: RegionalCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List regional administrators with their zone counts.
    ListAdmins,
    /// Create a regional administrator for a zone.
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CIVIC_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        zone: Zone,
    },
    /// Remove a regional administrator.
    DeleteAdmin { id: i64 },
    /// List issues outside every zone.
    Unassigned,
    /// Hand an issue to a regional administrator.
    Assign { issue_id: i64, admin_id: i64 },
}

#[derive(Subcommand)]
enum RegionalCommand {
    /// Issues in my zone.
    Issues,
    /// Status counts for my zone.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("civic_pulse=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli_args = CliParser::parse();

    let mut config = Config::load();
    if let Some(api_url) = cli_args.api_url {
        config.api_base_url = api_url;
    }
    if let Some(session_dir) = cli_args.session_dir {
        config.session_dir = session_dir;
    }

    let driver = CivicPulse::new(config);
    let result = driver.run(cli_args.command).await;

    if let Err(e) = &result {
        if matches!(e.downcast_ref::<Error>(), Some(Error::Unauthorized)) {
            driver.store.clear()?;
        }
    }

    result
}

struct CivicPulse {
    config: Config,
    store: SessionStore,
}

impl CivicPulse {
    fn new(config: Config) -> Self {
        let store = SessionStore::new(&config.session_dir);
        Self { config, store }
    }

    fn api(&self) -> Result<CivicApi> {
        Ok(CivicApi::new(self.config.api_base_url.as_str())?)
    }

    fn session(&self) -> Result<(Session, CivicApi)> {
        let session = self.store.load().ok_or(Error::NotLoggedIn)?;
        let api = self.api()?.with_session(&session);
        Ok((session, api))
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Register {
                name,
                email,
                password,
                confirm,
            } => {
                let request = validate_registration(&name, &email, &password, &confirm)?;
                let session = Session::from(self.api()?.register(&request).await?);
                self.store.save(&session)?;
                println!("Welcome, {}!", session.user.name);
            }
            Command::Login { email, password } => {
                let session = Session::from(self.api()?.login(&email, &password).await?);
                self.store.save(&session)?;
                println!("Logged in as {} ({})", session.user.name, session.user.role);
            }
            Command::Logout => {
                self.store.clear()?;
                println!("Logged out");
            }
            Command::Whoami => match self.store.load() {
                Some(session) => {
                    let user = &session.user;
                    print!("{} <{}> {}", user.name, user.email, user.role);
                    if let Some(zone) = user.zone {
                        print!(" [{zone}]");
                    }
                    println!();
                }
                None => println!("Not logged in"),
            },
            Command::Zone {
                latitude,
                longitude,
            } => {
                let zone = zone::resolve(&Coordinate::new(latitude, longitude));
                println!("{zone}: {}", zone.description());
                println!("{}", zone.areas());
            }
            Command::Capture {
                frame,
                position,
                output,
            } => {
                let capture = capture_evidence(frame, position).await?;
                let path = output.unwrap_or_else(|| PathBuf::from(capture.file_name()));
                capture.write_to(&path)?;

                let (width, height) = capture.dimensions();
                println!("Wrote {} ({width}x{height})", path.display());
                println!("Zone: {}", zone::resolve_optional(capture.coordinate()));
            }
            Command::Report {
                title,
                description,
                category,
                frame,
                position,
            } => {
                let (session, api) = self.session()?;
                session.capabilities().ensure(Permission::ReportIssues)?;

                let mut draft = ReportDraft::new(IssueFields::new(title, description, category));
                // catch form errors before touching the camera or the network
                draft.fields().validate()?;

                draft.attach_capture(capture_evidence(frame, position).await?);
                println!("Zone: {}", draft.zone());

                let host = ImageHost::new(self.config.upload.clone());
                let uploaded = draft.upload(&host).await?;
                println!("Uploaded evidence: {}", uploaded.url());

                let issue = draft.submit(&api).await?;
                println!("Filed issue #{} in {}", issue.id, issue.resolved_zone());
            }
            Command::Issues {
                mine,
                status,
                search,
                geojson,
            } => {
                let (_, api) = self.session()?;
                let issues = if mine {
                    api.my_issues().await?
                } else {
                    api.list_issues().await?
                };
                let visible: Vec<Issue> = filter_issues(&issues, status, &search)
                    .into_iter()
                    .cloned()
                    .collect();

                if let Some(path) = geojson {
                    let collection = issues_to_geojson(&visible);
                    std::fs::write(&path, serde_json::to_string_pretty(&collection)?)
                        .with_context(|| format!("could not write {}", path.display()))?;
                    println!(
                        "Wrote {} located issues to {}",
                        collection.features.len(),
                        path.display()
                    );
                } else {
                    let counts = StatusCounts::tally(&issues);
                    println!(
                        "total {}, pending {}, in progress {}, resolved {}",
                        counts.total, counts.pending, counts.in_progress, counts.resolved
                    );
                    print_issues(&visible);
                }
            }
            Command::Issue { id } => {
                let (_, api) = self.session()?;
                print_issue(&api.issue(id).await?);
            }
            Command::Status { id, status } => {
                let (session, api) = self.session()?;
                let capabilities = session.capabilities();
                capabilities.ensure(Permission::UpdateStatus)?;

                // the zone list already covers issues assigned to a regional admin
                let issues = match capabilities.zone_scope {
                    ZoneScope::All => api.list_issues().await?,
                    _ => api.zone_issues().await?,
                };
                let mut board = IssueBoard::new(issues);
                let issue = board
                    .change_status_within(&api, &capabilities, id, status)
                    .await?;
                println!("Issue #{} is now {}", issue.id, issue.status);
            }
            Command::Delete { id } => {
                let (session, api) = self.session()?;
                session.capabilities().ensure(Permission::DeleteIssues)?;

                let mut board = IssueBoard::new(api.list_issues().await?);
                board.delete(&api, id).await?;
                println!("Deleted issue #{id}; {} remain", board.issues().len());
            }
            Command::Comment { id, text } => {
                let (_, api) = self.session()?;
                let comment = api.add_comment(id, validate_comment(&text)?).await?;
                println!("Comment #{} added", comment.id);
            }
            Command::Notifications => {
                let (_, api) = self.session()?;
                let notifications = api.notifications().await?;
                if notifications.is_empty() {
                    println!("No notifications");
                }
                for n in &notifications {
                    let marker = if n.read { " " } else { "*" };
                    println!("{marker} {} ({})", n.message, time_ago(n.created_at.as_ref()));
                }
            }
            Command::Admin { command } => self.run_admin(command).await?,
            Command::Regional { command } => self.run_regional(command).await?,
        }

        Ok(())
    }

    async fn run_admin(&self, command: AdminCommand) -> Result<()> {
        let (session, api) = self.session()?;
        let capabilities = session.capabilities();

        match command {
            AdminCommand::ListAdmins => {
                capabilities.ensure(Permission::ManageRegionalAdmins)?;
                for admin in api.regional_admins().await? {
                    let zone = admin.zone.unwrap_or(Zone::Unassigned);
                    println!(
                        "#{} {} <{}> {zone}: {} total, {} pending, {} resolved",
                        admin.id,
                        admin.name,
                        admin.email,
                        admin.total_issues,
                        admin.pending_issues,
                        admin.resolved_issues
                    );
                }
            }
            AdminCommand::CreateAdmin {
                name,
                email,
                password,
                zone,
            } => {
                capabilities.ensure(Permission::ManageRegionalAdmins)?;
                if zone == Zone::Unassigned {
                    bail!("a regional admin needs one of: north, south, east, west, central");
                }
                let admin = api
                    .create_regional_admin(&CreateRegionalAdminRequest {
                        name,
                        email,
                        password,
                        zone,
                    })
                    .await?;
                println!("Created regional admin #{} for {zone}", admin.id);
            }
            AdminCommand::DeleteAdmin { id } => {
                capabilities.ensure(Permission::ManageRegionalAdmins)?;
                api.delete_regional_admin(id).await?;
                println!("Removed regional admin #{id}");
            }
            AdminCommand::Unassigned => {
                capabilities.ensure(Permission::AssignIssues)?;
                print_issues(&api.unassigned_issues().await?);
            }
            AdminCommand::Assign { issue_id, admin_id } => {
                capabilities.ensure(Permission::AssignIssues)?;
                let issue = api.assign_issue(issue_id, admin_id).await?;
                println!("Issue #{} assigned to regional admin #{admin_id}", issue.id);
            }
        }

        Ok(())
    }

    async fn run_regional(&self, command: RegionalCommand) -> Result<()> {
        let (session, api) = self.session()?;
        session
            .capabilities()
            .ensure(Permission::ViewZoneDashboard)?;

        match command {
            RegionalCommand::Issues => print_issues(&api.zone_issues().await?),
            RegionalCommand::Stats => {
                let stats = api.zone_stats().await?;
                println!(
                    "{} ({})",
                    stats.zone,
                    stats.zone_desc.as_deref().unwrap_or("")
                );
                println!(
                    "total {}, pending {}, in progress {}, resolved {}",
                    stats.total, stats.pending, stats.in_progress, stats.resolved
                );
            }
        }

        Ok(())
    }
}

async fn capture_evidence(frame: PathBuf, position: PositionArgs) -> Result<Capture> {
    let camera = StillImageCamera::new(frame);
    match (position.latitude, position.longitude) {
        (Some(latitude), Some(longitude)) => {
            let location = FixedLocation::new(latitude, longitude, position.accuracy);
            run_capture(EvidenceCapture::new(location, camera)).await
        }
        _ => run_capture(EvidenceCapture::new(NoLocation, camera)).await,
    }
}

async fn run_capture<L: LocationProvider>(
    mut flow: EvidenceCapture<L, StillImageCamera>,
) -> Result<Capture> {
    flow.start().await;
    if flow.phase() == Phase::Error {
        bail!(
            "{}",
            flow.error_message().unwrap_or("Could not open the camera.")
        );
    }

    flow.capture().await?;
    flow.take_capture()
        .context("capture finished without a photo")
}

fn print_issues(issues: &[Issue]) {
    if issues.is_empty() {
        println!("No issues");
    }
    for issue in issues {
        println!(
            "#{:<5} {:<12} {:<8} {:<20} {} ({})",
            issue.id,
            issue.status.label(),
            issue.resolved_zone().as_str(),
            issue.category,
            issue.title,
            time_ago(issue.created_at.as_ref())
        );
    }
}

fn print_issue(issue: &Issue) {
    println!("#{} {}", issue.id, issue.title);
    println!("Status:   {}", issue.status);
    println!("Category: {}", issue.category);
    println!("Zone:     {}", issue.resolved_zone().description());
    if let Some(coordinate) = issue.coordinate() {
        println!("Location: {}", coordinate.to_display_string());
    }
    if let Some(reporter) = &issue.created_by {
        println!("Reported: {} by {}", format_date(issue.created_at.as_ref()), reporter.name);
    }
    if let Some(url) = &issue.image_url {
        println!("Evidence: {url}");
    }
    println!();
    println!("{}", issue.description);

    println!();
    println!("Comments ({})", issue.comments.len());
    for comment in &issue.comments {
        println!(
            "  {} ({}): {}",
            comment.user_name.as_deref().unwrap_or("Anonymous"),
            time_ago(comment.created_at.as_ref()),
            comment.text
        );
    }
}
