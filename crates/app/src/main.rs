use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use evx_api::{
    ApiClient, ApiError, BookingRequest, Credentials, Dashboard, EventDraft, EventQuery,
    Registration,
};
use evx_booking::{
    BookingWorkflow, CatalogBrowser, CategoryFilter, EventFilter, Phase, SeatMap, SelectOutcome,
    Submit, bucket_tickets, seat_map,
};
use evx_config::{Config, Gate, Role, Session, authorize};
use evx_models::{EventCategory, Seat, Ticket, TicketBucket};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::OffsetTime;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_HASH: &str = env!("EVX_GIT_HASH");

fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH})")
}

// --- CLI definition ---

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "evx")]
#[command(about = "EventX terminal client: browse events, pick a seat, book tickets")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("EVX_GIT_HASH"), ")"))]
struct Cli {
    /// Log level
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,

    /// Display log timestamps in UTC (default: local time)
    #[arg(long, global = true)]
    utc: bool,

    /// Base URL of the EventX API
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Discard the stored session
    Logout,
    /// Browse the event catalog
    Events {
        /// Free-text search over title, description, and location
        #[arg(long)]
        search: Option<String>,
        /// Category filter ("all" matches everything)
        #[arg(long, value_parser = parse_category_filter, default_value = "all")]
        category: CategoryFilter,
        /// Result page (when the server paginates)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one event with its seat map
    Event { id: String },
    /// Book a seat for an event
    Book {
        event_id: String,
        /// Seat number, e.g. "A12"
        #[arg(long)]
        seat: Option<String>,
    },
    /// List your tickets, grouped by status
    Tickets,
    /// Cancel one of your tickets
    CancelTicket { id: String },
    /// Event and revenue management (admin role required)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create a new event
    CreateEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Event date (YYYY-MM-DD), must be in the future
        #[arg(long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(long)]
        time: String,
        #[arg(long)]
        location: String,
        #[arg(long, value_parser = parse_category)]
        category: EventCategory,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        seats: u32,
    },
    /// Update an existing event; omitted fields keep their current value
    UpdateEvent {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<EventCategory>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        seats: Option<u32>,
    },
    /// Delete an event
    DeleteEvent {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List all events with capacity for management
    ListEvents,
    /// Show aggregate counts, revenue, and recent activity
    Dashboard,
}

fn parse_category(s: &str) -> Result<EventCategory, String> {
    s.parse()
}

fn parse_category_filter(s: &str) -> Result<CategoryFilter, String> {
    if s.eq_ignore_ascii_case("all") {
        Ok(CategoryFilter::All)
    } else {
        s.parse().map(CategoryFilter::Only)
    }
}

// --- Logging ---

fn init_logging(config: &Config) {
    let filter = EnvFilter::new(&config.log_level);

    if config.utc {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(OffsetTime::new(
                time::UtcOffset::UTC,
                time::macros::format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                ),
            ))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(LocalTimer)
            .init();
    }
}

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

// --- Session boundary ---

/// Translate a remote failure into what the user sees. The one globally
/// propagated case is an auth rejection: whatever command triggered it, the
/// stored session is torn down and the user is routed to `evx login`.
fn surface(err: ApiError) -> anyhow::Error {
    if err.is_auth() {
        if let Err(io_err) = Session::clear() {
            warn!("Could not clear stored session: {io_err}");
        } else {
            info!("Stored session cleared");
        }
        return anyhow!("{err} Run `evx login` to sign in again.");
    }
    if err.retryable() {
        return anyhow!("{err} Run the command again to retry.");
    }
    anyhow!("{err}")
}

/// Resolve the route gate before a protected command runs.
fn require_session(admin_required: bool) -> Result<Session> {
    let session = Session::current();
    match (authorize(session.as_ref(), admin_required), session) {
        (Gate::Allow, Some(session)) => Ok(session),
        _ if admin_required => bail!("This command needs an admin session. Run `evx login`."),
        _ => bail!("You are not logged in. Run `evx login` first."),
    }
}

fn api_client(config: &Config) -> Result<ApiClient> {
    let token = Session::current().map(|s| s.token);
    Ok(ApiClient::new(
        &config.api_url,
        token,
        Duration::from_secs(config.timeout_secs),
    )?)
}

// --- Local form validation ---

fn validate_registration(password: &str, confirm_password: &str) -> Result<()> {
    if password != confirm_password {
        bail!("Passwords do not match");
    }
    Ok(())
}

/// Admin event forms must name a parseable schedule that lies in the future.
fn build_draft(
    title: String,
    description: String,
    date: &str,
    time: &str,
    location: String,
    category: EventCategory,
    price: f64,
    seats: u32,
    now: DateTime<Utc>,
) -> Result<EventDraft> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{date}' (expected YYYY-MM-DD)"))?;
    let time_of_day = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| anyhow!("Invalid time '{time}' (expected HH:MM)"))?;
    if date.and_time(time_of_day) <= now.naive_utc() {
        bail!("Event date must be in the future");
    }
    if price < 0.0 {
        bail!("Price must not be negative");
    }
    if seats == 0 {
        bail!("An event needs at least one seat");
    }
    Ok(EventDraft {
        title,
        description,
        date,
        time: time.to_string(),
        location,
        category,
        price,
        total_seats: seats,
    })
}

// --- Commands ---

async fn cmd_login(client: &ApiClient, email: String, password: String) -> Result<()> {
    let auth = client
        .login(&Credentials { email, password })
        .await
        .map_err(surface)?;
    let role = auth.role.parse::<Role>().unwrap_or_default();
    let session = Session {
        token: auth.token,
        role,
        name: auth.name,
    };
    session.store()?;
    println!("Logged in as {} ({role}).", session.name);
    match role {
        Role::Admin => println!("Start with `evx admin dashboard`."),
        Role::User => println!("Browse events with `evx events`."),
    }
    Ok(())
}

async fn cmd_register(
    client: &ApiClient,
    name: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<()> {
    // Local validation first; nothing is sent when it fails.
    validate_registration(&password, &confirm_password)?;
    let auth = client
        .register(&Registration { name, email, password })
        .await
        .map_err(surface)?;
    let session = Session {
        token: auth.token,
        role: auth.role.parse::<Role>().unwrap_or_default(),
        name: auth.name,
    };
    session.store()?;
    println!("Account created. Logged in as {}.", session.name);
    println!("Browse events with `evx events`.");
    Ok(())
}

fn cmd_logout() -> Result<()> {
    Session::clear()?;
    println!("Logged out.");
    Ok(())
}

async fn cmd_events(
    client: &ApiClient,
    search: Option<String>,
    category: CategoryFilter,
    page: Option<u32>,
) -> Result<()> {
    let mut browser = CatalogBrowser::new(EventFilter {
        search: search.clone().unwrap_or_default(),
        category,
    });

    let token = browser.begin_refresh();
    let query = EventQuery {
        search,
        category: match category {
            CategoryFilter::Only(c) => Some(c),
            CategoryFilter::All => None,
        },
        page,
    };
    let fetched = client.list_events(&query).await.map_err(surface)?;
    let total_pages = fetched.total_pages;
    browser.apply(token, fetched.events);

    let now = Utc::now();
    let visible = browser.visible();
    if visible.is_empty() {
        println!("No events found");
        return Ok(());
    }

    println!(
        "{:<28} {:<12} {:<12} {:<20} {:>9} {:>11} {:<10} {}",
        "Title", "Date", "Category", "Location", "Price", "Seats left", "Status", "ID"
    );
    println!("{}", "-".repeat(130));
    for event in &visible {
        println!(
            "{:<28} {:<12} {:<12} {:<20} {:>9} {:>11} {:<10} {}",
            event.title,
            event.date.format("%Y-%m-%d"),
            event.category,
            event.location,
            format!("${:.2}", event.price),
            event.seats_remaining(),
            event.status(now),
            event.id,
        );
    }
    println!("\n{} event(s)", visible.len());
    if let Some(total) = total_pages {
        println!("Page {} of {total}", page.unwrap_or(1));
    }
    Ok(())
}

async fn cmd_event(client: &ApiClient, id: String) -> Result<()> {
    let event = client.get_event(&id).await.map_err(surface)?;
    let now = Utc::now();

    println!("{}", event.title);
    println!("{}", "=".repeat(event.title.chars().count().max(24)));
    println!("{}", event.description);
    println!();
    match &event.time {
        Some(time) => println!("Date:      {} at {time}", event.date.format("%Y-%m-%d")),
        None => println!("Date:      {}", event.date.format("%Y-%m-%d")),
    }
    println!("Location:  {}", event.location);
    println!("Category:  {}", event.category);
    println!("Price:     ${:.2}", event.price);
    println!(
        "Seats:     {} of {} available",
        event.seats_remaining(),
        event.total_seats
    );
    println!("Status:    {}", event.status(now));
    println!();
    render_seat_map_or_empty(event.seats.as_deref().unwrap_or(&[]), None);
    println!("\nBook with `evx book {} --seat <number>`.", event.id);
    Ok(())
}

async fn cmd_book(client: &ApiClient, event_id: String, seat: Option<String>) -> Result<()> {
    let event = client.get_event(&event_id).await.map_err(surface)?;
    let seats = event.seats.clone().unwrap_or_default();
    let mut workflow = BookingWorkflow::new(&event.id);

    if let Some(seat_number) = &seat {
        match workflow.select(&seats, seat_number) {
            SelectOutcome::Selected => {}
            SelectOutcome::SeatTaken => {
                render_seat_map_or_empty(&seats, None);
                bail!("Seat {seat_number} is already booked. Pick an available seat and retry.");
            }
            SelectOutcome::UnknownSeat => {
                render_seat_map_or_empty(&seats, None);
                bail!("Seat {seat_number} does not exist for \"{}\".", event.title);
            }
        }
    }

    match workflow.submit() {
        Submit::Invalid(message) => {
            println!("{message}");
            println!();
            render_seat_map_or_empty(&seats, None);
            println!("\nRerun with `--seat <number>` to book.");
            Ok(())
        }
        // One submit per invocation; the pending guard only trips in-flight.
        Submit::AlreadyPending => Ok(()),
        Submit::Dispatch {
            event_id,
            seat_number,
        } => {
            println!(
                "Booking seat {seat_number} for \"{}\" (${:.2})…",
                event.title, event.price
            );
            let request = BookingRequest {
                event_id,
                seat_number: seat_number.clone(),
            };
            match client.book_ticket(&request).await {
                Ok(ticket) => {
                    workflow.resolve_success();
                    println!("Booking confirmed: seat {}.", ticket.seat_number);
                    println!();
                    // The ticket list is the source of truth for what was booked.
                    let tickets = client.my_tickets().await.map_err(surface)?;
                    render_tickets(tickets);
                    Ok(())
                }
                Err(err) if err.is_auth() => Err(surface(err)),
                Err(err) => {
                    workflow.resolve_failure(err.to_string());
                    if let Phase::Failed(message) = workflow.phase() {
                        eprintln!("Booking failed: {message}");
                    }
                    bail!(
                        "Seat {seat_number} was not booked. Pick a seat and run the command again."
                    )
                }
            }
        }
    }
}

async fn cmd_tickets(client: &ApiClient) -> Result<()> {
    let tickets = client.my_tickets().await.map_err(surface)?;
    render_tickets(tickets);
    Ok(())
}

async fn cmd_cancel_ticket(client: &ApiClient, id: String) -> Result<()> {
    client.cancel_ticket(&id).await.map_err(surface)?;
    println!("Ticket {id} cancelled.");
    Ok(())
}

// --- Admin commands ---

async fn cmd_admin(client: &ApiClient, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::CreateEvent {
            title,
            description,
            date,
            time,
            location,
            category,
            price,
            seats,
        } => {
            let draft = build_draft(
                title,
                description,
                &date,
                &time,
                location,
                category,
                price,
                seats,
                Utc::now(),
            )?;
            match client.create_event(&draft).await {
                Ok(event) => {
                    println!("Created \"{}\" ({}).", event.title, event.id);
                    Ok(())
                }
                Err(err) => {
                    echo_draft_on_rejection(&draft, &err);
                    Err(surface(err))
                }
            }
        }
        AdminCommands::UpdateEvent {
            id,
            title,
            description,
            date,
            time,
            location,
            category,
            price,
            seats,
        } => {
            let current = client.get_event(&id).await.map_err(surface)?;
            let date = date.unwrap_or_else(|| current.date.format("%Y-%m-%d").to_string());
            let time = time
                .or_else(|| current.time.clone())
                .unwrap_or_else(|| "00:00".to_string());
            let draft = build_draft(
                title.unwrap_or(current.title),
                description.unwrap_or(current.description),
                &date,
                &time,
                location.unwrap_or(current.location),
                category.unwrap_or(current.category),
                price.unwrap_or(current.price),
                seats.unwrap_or(current.total_seats),
                Utc::now(),
            )?;
            match client.update_event(&id, &draft).await {
                Ok(event) => {
                    println!("Updated \"{}\" ({}).", event.title, event.id);
                    Ok(())
                }
                Err(err) => {
                    echo_draft_on_rejection(&draft, &err);
                    Err(surface(err))
                }
            }
        }
        AdminCommands::DeleteEvent { id, yes } => {
            if !yes {
                bail!("Deleting an event cannot be undone. Pass --yes to confirm.");
            }
            client.delete_event(&id).await.map_err(surface)?;
            println!("Event {id} deleted.");
            Ok(())
        }
        AdminCommands::ListEvents => {
            let page = client
                .list_events(&EventQuery::default())
                .await
                .map_err(surface)?;
            if page.events.is_empty() {
                println!("No events found");
                return Ok(());
            }
            let now = Utc::now();
            println!(
                "{:<28} {:<12} {:<20} {:>13} {:<10} {}",
                "Title", "Date", "Location", "Seats", "Status", "ID"
            );
            println!("{}", "-".repeat(110));
            for event in &page.events {
                println!(
                    "{:<28} {:<12} {:<20} {:>13} {:<10} {}",
                    event.title,
                    event.date.format("%Y-%m-%d"),
                    event.location,
                    format!("{}/{}", event.seats_remaining(), event.total_seats),
                    event.status(now),
                    event.id,
                );
            }
            println!("\n{} event(s)", page.events.len());
            Ok(())
        }
        AdminCommands::Dashboard => {
            let dashboard = client.dashboard().await.map_err(surface)?;
            render_dashboard(&dashboard);
            Ok(())
        }
    }
}

/// Failed admin forms keep the operator's input: echo what was submitted so
/// nothing has to be retyped from memory.
fn echo_draft_on_rejection(draft: &EventDraft, err: &ApiError) {
    if err.is_auth() {
        return;
    }
    eprintln!("Your entries were kept:");
    eprintln!("  title:       {}", draft.title);
    eprintln!("  description: {}", draft.description);
    eprintln!("  date:        {} at {}", draft.date, draft.time);
    eprintln!("  location:    {}", draft.location);
    eprintln!("  category:    {}", draft.category);
    eprintln!("  price:       ${:.2}", draft.price);
    eprintln!("  seats:       {}", draft.total_seats);
}

// --- Rendering ---

fn render_seat_map_or_empty(seats: &[Seat], selected: Option<&str>) {
    match SeatMap::build(seats) {
        None => println!("No seating information available for this event."),
        Some(map) => render_seat_map(&map, selected),
    }
}

fn render_seat_map(map: &SeatMap, selected: Option<&str>) {
    println!("Seating map (x = booked, * = selected):");
    for row in map.rows() {
        let mut line = format!("  {:<4}", row.label);
        for seat in &row.seats {
            let marker = if seat.is_booked {
                'x'
            } else if selected == Some(seat.seat_number.as_str()) {
                '*'
            } else {
                ' '
            };
            line.push_str(&format!(" {marker}{:<3}", seat_map::seat_index(&seat.seat_number)));
        }
        println!("{line}");
    }
    if let Some(seat_number) = selected {
        println!("Selected: {seat_number}");
    }
}

fn render_tickets(tickets: Vec<Ticket>) {
    if tickets.is_empty() {
        println!("You don't have any tickets yet.");
        return;
    }
    let buckets = bucket_tickets(tickets, Utc::now());
    let has_qr = buckets
        .upcoming
        .iter()
        .any(|ticket| ticket.qr_code.is_some());
    for (heading, group) in [
        (TicketBucket::Upcoming, &buckets.upcoming),
        (TicketBucket::Used, &buckets.used),
        (TicketBucket::Expired, &buckets.expired),
    ] {
        if group.is_empty() {
            continue;
        }
        println!("{heading}");
        println!(
            "{:<28} {:<12} {:<6} {:>9} {:<4} {}",
            "Event", "Date", "Seat", "Price", "QR", "Ticket ID"
        );
        println!("{}", "-".repeat(90));
        for ticket in group {
            let (event_title, event_date) = match &ticket.event {
                Some(event) => (
                    event.title.as_str(),
                    event.date.format("%Y-%m-%d").to_string(),
                ),
                None => ("(unknown event)", "-".to_string()),
            };
            println!(
                "{:<28} {:<12} {:<6} {:>9} {:<4} {}",
                event_title,
                event_date,
                ticket.seat_number,
                format!("${:.2}", ticket.price),
                if ticket.qr_code.is_some() { "yes" } else { "no" },
                ticket.id,
            );
        }
        println!();
    }
    if has_qr {
        println!("Show your QR code at entry.");
    }
}

fn render_dashboard(dashboard: &Dashboard) {
    let overview = &dashboard.overview;
    println!("Overview");
    println!(
        "  Events:  {} total, {} active",
        overview.total_events, overview.active_events
    );
    println!("  Tickets: {}", overview.total_tickets);
    println!("  Users:   {}", overview.total_users);
    println!("  Revenue: ${:.2}", overview.total_revenue);
    println!();

    println!("Latest tickets");
    if dashboard.latest_tickets.is_empty() {
        println!("  No tickets found");
    } else {
        println!("  {:<20} {:<28} {}", "User", "Event", "Date");
        println!("  {}", "-".repeat(64));
        for ticket in &dashboard.latest_tickets {
            println!(
                "  {:<20} {:<28} {}",
                ticket.user_name,
                ticket.event_title,
                ticket.date.format("%Y-%m-%d"),
            );
        }
    }
    println!();

    println!("Top events");
    if dashboard.top_events.is_empty() {
        println!("  No events found");
    } else {
        println!("  {:<28} {:>12} {:>12}", "Event", "Tickets sold", "Revenue");
        println!("  {}", "-".repeat(56));
        for event in &dashboard.top_events {
            println!(
                "  {:<28} {:>12} {:>12}",
                event.title,
                event.tickets_sold,
                format!("${:.2}", event.revenue),
            );
        }
    }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(level) = &cli.log_level {
        config.log_level = level.to_string();
    }
    if cli.utc {
        config.utc = true;
    }
    if let Some(api_url) = cli.api_url.clone() {
        config.api_url = api_url;
    }

    init_logging(&config);
    info!("evx v{}", version_string());

    match cli.command {
        Commands::Login { email, password } => {
            let client = api_client(&config)?;
            cmd_login(&client, email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let client = api_client(&config)?;
            cmd_register(&client, name, email, password, confirm_password).await
        }
        Commands::Logout => cmd_logout(),
        Commands::Events {
            search,
            category,
            page,
        } => {
            let client = api_client(&config)?;
            cmd_events(&client, search, category, page).await
        }
        Commands::Event { id } => {
            let client = api_client(&config)?;
            cmd_event(&client, id).await
        }
        Commands::Book { event_id, seat } => {
            require_session(false)?;
            let client = api_client(&config)?;
            cmd_book(&client, event_id, seat).await
        }
        Commands::Tickets => {
            require_session(false)?;
            let client = api_client(&config)?;
            cmd_tickets(&client).await
        }
        Commands::CancelTicket { id } => {
            require_session(false)?;
            let client = api_client(&config)?;
            cmd_cancel_ticket(&client, id).await
        }
        Commands::Admin { command } => {
            require_session(true)?;
            let client = api_client(&config)?;
            cmd_admin(&client, command).await
        }
    }
}
