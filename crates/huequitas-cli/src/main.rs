use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use huequitas_core::api::ReviewApi;
use huequitas_core::config::{self, HueConfig, VALID_BACKENDS};
use huequitas_core::forms::{
    self, EditReviewForm, NewPasswordForm, PhotoEdit, ReviewForm, SignInForm, SignUpForm,
    StrengthLevel,
};
use huequitas_core::image;
use huequitas_core::model::*;
use huequitas_core::search::{CategoryFilter, CATEGORIES};
use huequitas_core::{HueClient, HueError};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "huequitas",
    about = "Las HueQuitas: find, review, and talk about local restaurants",
    version
)]
enum Cli {
    /// Initialize HueQuitas in the current project
    Init {
        /// Backend to configure (http, mock)
        #[arg(long, default_value = "http")]
        backend: String,
        /// API base URL written to the project config
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Show configuration, session, and backend reachability
    Status {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask for a password reset token
    ResetRequest {
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        /// Token from `reset-request`
        #[arg(short, long)]
        token: String,
        /// New password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// List restaurants, optionally filtered by name and category
    Restaurants {
        /// Case-insensitive name filter
        #[arg(default_value = "")]
        query: String,
        /// Category (All, Soups, Main, Desserts)
        #[arg(short, long, default_value = "All")]
        category: String,
        /// Sort by rating, best first
        #[arg(long)]
        top: bool,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a restaurant with its reviews
    Restaurant {
        id: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a restaurant
    AddRestaurant {
        #[arg(short, long)]
        name: String,
        /// Cuisine, also used as the search category
        #[arg(short, long)]
        cuisine: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "")]
        address: String,
        /// Cover photo file
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a restaurant
    DeleteRestaurant {
        id: String,
    },
    /// Post a review
    Review {
        /// Restaurant ID
        restaurant_id: String,
        /// Stars, 1 to 5
        #[arg(short, long, default_value = "5")]
        rating: u8,
        #[arg(short, long)]
        comment: String,
        /// Photo file to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Edit one of your reviews
    EditReview {
        /// Restaurant the review belongs to
        restaurant_id: String,
        /// Review ID
        review_id: String,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: String,
        /// Replace the photo with this file
        #[arg(long, conflicts_with = "remove_photo")]
        photo: Option<PathBuf>,
        /// Drop the current photo
        #[arg(long)]
        remove_photo: bool,
    },
    /// List reviews for a restaurant
    Reviews {
        restaurant_id: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Like or unlike a restaurant
    Like {
        restaurant_id: String,
    },
    /// Show chat history
    Chat {
        #[arg(short, long, default_value = DEFAULT_ROOM)]
        room: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Post a chat message
    Say {
        text: String,
        #[arg(short, long, default_value = DEFAULT_ROOM)]
        room: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huequitas=warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = HueConfig::load(Some(&std::env::current_dir()?)).unwrap_or_else(|e| {
        tracing::warn!("config: {e}, using defaults");
        HueConfig::default_config()
    });

    let result = run(cli, &config).await;
    if let Err(ref err) = result {
        if let Some(friendly) = format_hue_error(err, &config) {
            eprintln!("{}", friendly);
            std::process::exit(1);
        }
    }
    result
}

async fn run(cli: Cli, config: &HueConfig) -> Result<()> {
    match cli {
        Cli::Init { backend, api_url } => cmd_init(&backend, api_url),
        Cli::Status { json } => cmd_status(&make_client(config)?, config, json).await,
        Cli::Login { email, password } => {
            let password = password_or_stdin(password)?;
            cmd_login(&make_client(config)?, email, password).await
        }
        Cli::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let password = password_or_stdin(password)?;
            let form = SignUpForm {
                name,
                email,
                confirm_password: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            cmd_register(&make_client(config)?, &form).await
        }
        Cli::Logout => cmd_logout(&make_client(config)?),
        Cli::Whoami { json } => cmd_whoami(&make_client(config)?, json),
        Cli::ResetRequest { email } => cmd_reset_request(&make_client(config)?, &email).await,
        Cli::ResetPassword {
            token,
            password,
            confirm,
        } => {
            let password = password_or_stdin(password)?;
            let form = NewPasswordForm {
                reset_token: token,
                confirm_password: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            cmd_reset_password(&make_client(config)?, &form).await
        }
        Cli::Restaurants {
            query,
            category,
            top,
            json,
        } => cmd_restaurants(&make_client(config)?, &query, &category, top, json).await,
        Cli::Restaurant { id, json } => cmd_restaurant(&make_client(config)?, &id, json).await,
        Cli::AddRestaurant {
            name,
            cuisine,
            description,
            address,
            image,
        } => {
            let mut data = NewRestaurant::new(name, cuisine)
                .with_description(description)
                .with_address(address);
            if let Some(path) = image {
                data = data.with_image(read_photo(&path).await?);
            }
            cmd_add_restaurant(&make_client(config)?, &data).await
        }
        Cli::DeleteRestaurant { id } => {
            let client = make_client(config)?;
            let ack = client.delete_restaurant(&id).await?;
            println!(
                "{} {}",
                "Deleted".green(),
                ack.message.unwrap_or_else(|| id.clone()).dimmed()
            );
            Ok(())
        }
        Cli::Review {
            restaurant_id,
            rating,
            comment,
            photo,
        } => {
            let image = match photo {
                Some(path) => Some(read_photo(&path).await?),
                None => None,
            };
            let form = ReviewForm::new(restaurant_id)
                .with_rating(rating)
                .with_comment(comment)
                .with_image(image);
            cmd_review(&make_client(config)?, &form).await
        }
        Cli::EditReview {
            restaurant_id,
            review_id,
            rating,
            comment,
            photo,
            remove_photo,
        } => {
            let photo = match (photo, remove_photo) {
                (Some(path), _) => PhotoEdit::Replace(read_photo(&path).await?),
                (None, true) => PhotoEdit::Remove,
                (None, false) => PhotoEdit::Keep,
            };
            let form = EditReviewForm {
                rating,
                comment,
                photo,
            };
            cmd_edit_review(&make_client(config)?, &restaurant_id, &review_id, &form).await
        }
        Cli::Reviews {
            restaurant_id,
            json,
        } => cmd_reviews(&make_client(config)?, &restaurant_id, json).await,
        Cli::Like { restaurant_id } => {
            let client = make_client(config)?;
            let liked = client.toggle_like(&restaurant_id).await?;
            if liked {
                println!("{} {}", "♥".red(), "Liked".green());
            } else {
                println!("{} {}", "♡".dimmed(), "Unliked".dimmed());
            }
            Ok(())
        }
        Cli::Chat { room, json } => cmd_chat(&make_client(config)?, &room, json).await,
        Cli::Say { text, room } => {
            let client = make_client(config)?;
            let sent = client.send_message(&room, &text).await?;
            println!("{} {}", format!("[{room}]").dimmed(), sent.message);
            Ok(())
        }
    }
}

fn make_client(config: &HueConfig) -> Result<HueClient> {
    HueClient::from_config(config).context("failed to create client")
}

/// Prefer the server's wording for request failures. Returns `None` when the
/// default anyhow report is good enough.
fn format_hue_error(err: &anyhow::Error, config: &HueConfig) -> Option<String> {
    let hue = err.downcast_ref::<HueError>()?;
    Some(match hue {
        HueError::Transport(e) if e.is_connect() || e.is_timeout() => format!(
            "{}\n\n  Cannot reach the HueQuitas API at {}.\n  Start the server, set {}, or try {}\n",
            "Error: API unavailable".red(),
            config.api.base_url,
            config::API_URL_ENV.cyan(),
            "huequitas init --backend mock".cyan()
        ),
        e if e.is_unauthorized() => format!(
            "{} {}\n  Sign in with {}",
            "Error:".red(),
            e.user_message(),
            "huequitas login --email <email>".cyan()
        ),
        e => format!("{} {}", "Error:".red(), e.user_message()),
    })
}

fn password_or_stdin(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn read_photo(path: &Path) -> Result<String> {
    Ok(image::encode_image_file(path).await?)
}

fn stars(rating: f64) -> String {
    let full = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

// ---------------------------------------------------------------------------
// init / status
// ---------------------------------------------------------------------------

fn cmd_init(backend: &str, api_url: Option<String>) -> Result<()> {
    if !VALID_BACKENDS.contains(&backend) {
        anyhow::bail!(
            "unknown backend '{}'. Valid options: {}",
            backend,
            VALID_BACKENDS.join(", ")
        );
    }

    let cwd = std::env::current_dir()?;
    let hue_dir = cwd.join(".huequitas");
    if hue_dir.exists() {
        println!("HueQuitas already initialized in this project.");
        return Ok(());
    }
    std::fs::create_dir_all(&hue_dir)?;

    let mut config = HueConfig::default_config();
    config.backend.kind = backend.to_string();
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    for w in config.validate() {
        println!("  {} {}", "WARNING:".yellow(), w);
    }

    let note = if config.is_mock() {
        "# Mock backend: fixtures only, nothing leaves this machine\n"
    } else {
        "# Override the base URL per shell with HUEQUITAS_API_URL\n"
    };
    let toml_str = format!("{}{}", note, toml::to_string_pretty(&config)?);
    std::fs::write(hue_dir.join("config.toml"), toml_str)?;

    let gitignore_path = cwd.join(".gitignore");
    let entry = ".huequitas/config.local.toml";
    if gitignore_path.exists() {
        let contents = std::fs::read_to_string(&gitignore_path)?;
        if !contents.lines().any(|l| l.trim() == entry) {
            let mut appended = contents;
            if !appended.ends_with('\n') {
                appended.push('\n');
            }
            appended.push_str(entry);
            appended.push('\n');
            std::fs::write(&gitignore_path, appended)?;
        }
    } else {
        std::fs::write(&gitignore_path, format!("{entry}\n"))?;
    }

    println!("{}", "Initialized HueQuitas in .huequitas/".green());
    println!("  {}   .huequitas/config.toml", "Config:".dimmed());
    println!("  {}  {}", "Backend:".dimmed(), config.backend.kind.cyan());
    if !config.is_mock() {
        println!("  {}  {}", "API URL:".dimmed(), config.api.base_url.cyan());
    }
    println!(
        "  {}",
        "Edit .huequitas/config.local.toml for local overrides (gitignored)".dimmed()
    );
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    version: &'static str,
    backend: String,
    api_url: String,
    config_file: String,
    session_file: Option<String>,
    signed_in_as: Option<User>,
    reachable: bool,
    restaurants: Option<usize>,
    error: Option<String>,
}

async fn cmd_status(client: &HueClient, config: &HueConfig, json: bool) -> Result<()> {
    let probe = client.api().list_restaurants().await;
    let report = StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        backend: client.api().kind().to_string(),
        api_url: config.api.base_url.clone(),
        config_file: config::global_config_display(),
        session_file: config
            .session_path()
            .ok()
            .map(|p| p.display().to_string()),
        signed_in_as: client.session()?.map(|s| s.user),
        reachable: probe.is_ok(),
        restaurants: probe.as_ref().ok().map(Vec::len),
        error: probe.as_ref().err().map(|e| e.to_string()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("HueQuitas Status v{}", report.version).bold());
    println!("  {}      {}", "Backend:".dimmed(), report.backend.cyan());
    if !config.is_mock() {
        match &report.error {
            None => println!(
                "  {}          {} ({})",
                "API:".dimmed(),
                "connected".green(),
                report.api_url
            ),
            Some(e) => println!(
                "  {}          {} ({}) - {}",
                "API:".dimmed(),
                "disconnected".red(),
                report.api_url,
                e
            ),
        }
    }
    match report.restaurants {
        Some(n) => println!("  {}  {}", "Restaurants:".dimmed(), n.to_string().cyan()),
        None => println!("  {}  {}", "Restaurants:".dimmed(), "unknown".yellow()),
    }
    match &report.signed_in_as {
        Some(user) => println!(
            "  {}      {} <{}>",
            "Session:".dimmed(),
            user.name.green(),
            user.email
        ),
        None => println!("  {}      {}", "Session:".dimmed(), "signed out".yellow()),
    }
    if let Some(ref path) = report.session_file {
        println!("  {} {}", "Session file:".dimmed(), path);
    }
    println!("  {}  {}", "Config file:".dimmed(), report.config_file);
    Ok(())
}

// ---------------------------------------------------------------------------
// auth
// ---------------------------------------------------------------------------

async fn cmd_login(client: &HueClient, email: String, password: String) -> Result<()> {
    let session = client.login(&SignInForm { email, password }).await?;
    println!(
        "{} {} <{}>",
        "Signed in as".green(),
        session.user.name.bold(),
        session.user.email
    );
    Ok(())
}

async fn cmd_register(client: &HueClient, form: &SignUpForm) -> Result<()> {
    let strength = forms::password_strength(&form.password);
    let session = client.register(form).await?;
    println!(
        "{} {} <{}>",
        "Welcome,".green(),
        session.user.name.bold(),
        session.user.email
    );
    if matches!(strength.level, StrengthLevel::VeryWeak | StrengthLevel::Weak) {
        println!("  {} weak password", "Note:".yellow());
        for tip in &strength.suggestions {
            println!("    - {}", tip.dimmed());
        }
    }
    Ok(())
}

fn cmd_logout(client: &HueClient) -> Result<()> {
    client.logout()?;
    println!("{}", "Signed out.".dimmed());
    Ok(())
}

fn cmd_whoami(client: &HueClient, json: bool) -> Result<()> {
    let session = client.session()?;
    if json {
        let user = session.map(|s| s.user);
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }
    match session {
        Some(s) => println!("{} <{}> {}", s.user.name.bold(), s.user.email, s.user.id.dimmed()),
        None => println!("{}", "Not signed in.".yellow()),
    }
    Ok(())
}

async fn cmd_reset_request(client: &HueClient, email: &str) -> Result<()> {
    let ticket = client.request_password_reset(email).await?;
    if let Some(msg) = ticket.message {
        println!("{}", msg.dimmed());
    }
    println!("  {} {}", "Reset token:".dimmed(), ticket.reset_token.cyan());
    println!(
        "  Next: {}",
        "huequitas reset-password --token <token>".cyan()
    );
    Ok(())
}

async fn cmd_reset_password(client: &HueClient, form: &NewPasswordForm) -> Result<()> {
    let ack = client.reset_password(form).await?;
    println!(
        "{}",
        ack.message
            .unwrap_or_else(|| "Password updated.".to_string())
            .green()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// restaurants
// ---------------------------------------------------------------------------

/// Name/category matches; with `top`, best-rated first.
async fn find_restaurants(
    client: &HueClient,
    query: &str,
    category: &str,
    top: bool,
) -> Result<Vec<Restaurant>> {
    let filter: CategoryFilter = category.parse().unwrap_or_default();
    if let CategoryFilter::Only(ref c) = filter {
        if !CATEGORIES.contains(&c.as_str()) {
            tracing::warn!(category = %c, "category not offered by the home view");
        }
    }

    if !top {
        return Ok(client.search(query, &filter).await?);
    }
    let ranked = client.top_rated().await?;
    if query.is_empty() && filter == CategoryFilter::All {
        return Ok(ranked);
    }
    Ok(huequitas_core::search::filter_restaurants(&ranked, query, &filter))
}

async fn cmd_restaurants(
    client: &HueClient,
    query: &str,
    category: &str,
    top: bool,
    json: bool,
) -> Result<()> {
    let restaurants = find_restaurants(client, query, category, top).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&restaurants)?);
        return Ok(());
    }

    if restaurants.is_empty() {
        println!("{}", "No restaurants found.".dimmed());
        return Ok(());
    }

    for r in &restaurants {
        let votes = r
            .total_ratings
            .map(|n| format!("({n})"))
            .unwrap_or_default();
        println!(
            "{}  {}  {:.1} {}  {}",
            r.id.cyan(),
            r.name.bold(),
            r.display_rating(),
            votes.dimmed(),
            r.cuisine.magenta()
        );
        if !r.description.is_empty() {
            println!("    {}", r.description.dimmed());
        }
    }
    println!();
    println!("{}", format!("{} restaurant(s)", restaurants.len()).dimmed());
    Ok(())
}

async fn cmd_restaurant(client: &HueClient, id: &str, json: bool) -> Result<()> {
    let detail = client.restaurant_detail(id).await?;

    if json {
        let value = serde_json::json!({
            "restaurant": detail.restaurant,
            "reviews": detail.reviews,
            "liked": detail.liked,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let r = &detail.restaurant;
    let heart = match detail.liked {
        Some(true) => "♥".red().to_string(),
        Some(false) => "♡".to_string(),
        None => "?".dimmed().to_string(),
    };
    println!("{} {}", r.name.bold(), heart);
    println!(
        "{} {:.1} {}",
        stars(r.display_rating()).yellow(),
        r.display_rating(),
        r.cuisine.magenta()
    );
    if !r.address.is_empty() {
        println!("{}", r.address.dimmed());
    }
    if !r.description.is_empty() {
        println!();
        println!("{}", r.description);
    }
    println!();
    print_reviews(&detail.reviews);
    Ok(())
}

async fn cmd_add_restaurant(client: &HueClient, data: &NewRestaurant) -> Result<()> {
    let created = client.create_restaurant(data).await?;
    println!(
        "{} {} {}",
        "Added".green(),
        created.name.bold(),
        created.id.cyan()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// reviews
// ---------------------------------------------------------------------------

fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("{}", "No reviews yet.".dimmed());
        return;
    }
    println!("{}", "--- Reviews ---".dimmed());
    for review in reviews {
        let author = if review.user_name.is_empty() {
            review.user_id.as_str()
        } else {
            review.user_name.as_str()
        };
        println!(
            "{} {}  {}  {}",
            stars(f64::from(review.rating)).yellow(),
            author.bold(),
            review
                .created_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed(),
            review.id.dimmed()
        );
        println!("  {}", review.comment);
        if review.image.is_some() {
            println!("  {}", "[photo]".dimmed());
        }
    }
}

async fn cmd_review(client: &HueClient, form: &ReviewForm) -> Result<()> {
    let review = client.submit_review(form).await?;
    println!(
        "{} {} {}",
        "Review posted".green(),
        stars(f64::from(review.rating)).yellow(),
        review.id.dimmed()
    );
    Ok(())
}

async fn cmd_edit_review(
    client: &HueClient,
    restaurant_id: &str,
    review_id: &str,
    form: &EditReviewForm,
) -> Result<()> {
    let reviews = client.reviews(restaurant_id).await?;
    let current = reviews
        .iter()
        .find(|r| r.id == review_id)
        .with_context(|| format!("review {review_id} not found for restaurant {restaurant_id}"))?;
    let updated = client
        .edit_review(review_id, form, current.image.as_deref())
        .await?;
    println!(
        "{} {} {}",
        "Review updated".green(),
        stars(f64::from(updated.rating)).yellow(),
        updated.id.dimmed()
    );
    Ok(())
}

async fn cmd_reviews(client: &HueClient, restaurant_id: &str, json: bool) -> Result<()> {
    let reviews = client.reviews(restaurant_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&reviews)?);
        return Ok(());
    }
    print_reviews(&reviews);
    Ok(())
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

async fn cmd_chat(client: &HueClient, room: &str, json: bool) -> Result<()> {
    let messages = client.chat_history(room).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }
    if messages.is_empty() {
        println!("{}", format!("No messages in #{room}.").dimmed());
        return Ok(());
    }
    for m in &messages {
        println!(
            "{} {} {}",
            m.timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M")
                .to_string()
                .dimmed(),
            format!("{}:", m.user_name).cyan(),
            m.message
        );
    }
    Ok(())
}
