use chrono::NaiveDate;
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use kalenteri::components::api::Session;
use kalenteri::components::calendar::{EventColor, ViewState};
use kalenteri::components::{ApiClient, AuthService, EventService, EventsQueryHandle, SessionStore};
use kalenteri::config::Config;
use kalenteri::error::{CalResult, Error};
use std::sync::Arc;

// Export submodules
pub mod auth;
pub mod calendar;
pub mod events;
pub mod render;

#[derive(Parser)]
#[command(name = "kalenteri")]
#[command(about = "Browse and edit your calendar from the terminal", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from standard input when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Read from standard input when omitted
        #[arg(short, long)]
        password: Option<String>,
        /// Must match the password; read from standard input when omitted
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List every event
    Events,
    /// Month grid
    Month(NavArgs),
    /// Week columns
    Week(NavArgs),
    /// A single day in detail
    Day(NavArgs),
    /// Create an event
    Create(CreateArgs),
    /// Change an event
    Update(UpdateArgs),
    /// Delete an event
    Delete {
        id: u64,
    },
}

/// Which period a view shows
#[derive(Args, Debug, Clone, Default)]
pub struct NavArgs {
    /// Date to show (YYYY-MM-DD), today when omitted
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
    /// Periods to move forward, or back when negative
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i32,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    pub title: String,
    /// Start, e.g. "2024-03-05T09:00" or "2024-03-05"; local to the configured zone
    #[arg(short, long)]
    pub start: String,
    #[arg(short, long)]
    pub end: Option<String>,
    #[arg(long)]
    pub all_day: bool,
    #[arg(short, long, default_value_t = EventColor::Blue)]
    pub color: EventColor,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub label: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    pub id: u64,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub start: Option<String>,
    #[arg(short, long, conflicts_with = "clear_end")]
    pub end: Option<String>,
    /// Remove the end time
    #[arg(long)]
    pub clear_end: bool,
    #[arg(long)]
    pub all_day: Option<bool>,
    #[arg(short, long)]
    pub color: Option<EventColor>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
    /// New label; a label can be replaced but not removed
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub label: Option<String>,
    /// New location; a location can be replaced but not removed
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub location: Option<String>,
}

/// State shared by the commands of one invocation
pub struct AppContext {
    pub config: Config,
    pub session: SessionStore,
    pub view: ViewState,
    client: ApiClient,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let client = ApiClient::from_config(&config);
        let view = ViewState::new(config.timezone.today(), config.week_start);
        Self {
            session: client.session().clone(),
            config,
            view,
            client,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    /// Event access through a fresh query cache
    pub fn events(&self) -> EventsQueryHandle {
        EventsQueryHandle::new(Arc::new(EventService::new(self.client.clone())))
    }

    /// The stored session, or an error telling the user to sign in
    pub fn require_session(&self) -> CalResult<Session> {
        self.session
            .load()
            .filter(|session| session.token.is_some())
            .ok_or(Error::Unauthorized)
    }

    /// Fail when a request in this invocation dropped the session
    pub fn ensure_still_signed_in(&self) -> CalResult<()> {
        self.require_session().map(|_| ())
    }
}

/// Run one parsed command
pub async fn run(cli: Cli, config: Config) -> CalResult<()> {
    let mut ctx = AppContext::new(config);

    match cli.command {
        Commands::Login { email, password } => auth::login(&ctx, email, password).await,
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => auth::register(&ctx, name, email, password, confirm_password).await,
        Commands::Logout => auth::logout(&ctx),
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Events => events::list(&ctx).await,
        Commands::Month(nav) => calendar::month(&mut ctx, nav).await,
        Commands::Week(nav) => calendar::week(&mut ctx, nav).await,
        Commands::Day(nav) => calendar::day(&mut ctx, nav).await,
        Commands::Create(args) => events::create(&ctx, args).await,
        Commands::Update(args) => events::update(&ctx, args).await,
        Commands::Delete { id } => events::delete(&ctx, id).await,
    }
}
