use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use post_core::{
    types::parse_scheduled_time, views, CalendarMonth, ClientConfig, Confirm, DeleteConfirmation,
    DeleteRequest, Notification, Notifier, Post, PostDraft, PostStatus, StatusCounts, UpdatePost,
    Variant,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Schedule and manage social media posts", long_about = None)]
struct Cli {
    /// API base URL, e.g. http://localhost:5000/api (overrides POSTS_API_URL)
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List posts, earliest first
    List {
        /// Only posts whose content contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    Get {
        #[arg(short, long)]
        id: i64,
    },

    /// Schedule a new post
    Create {
        #[arg(short, long)]
        content: String,

        /// Target platform; repeat for several
        #[arg(short, long = "platform", default_value = "instagram")]
        platforms: Vec<String>,

        #[arg(short, long)]
        media_url: Option<String>,

        /// RFC 3339 or YYYY-MM-DDThh:mm (UTC)
        #[arg(short, long)]
        at: String,
    },

    Update {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long = "platform")]
        platforms: Vec<String>,

        #[arg(short, long, conflicts_with = "clear_media")]
        media_url: Option<String>,

        #[arg(long)]
        clear_media: bool,

        #[arg(short, long)]
        at: Option<String>,
    },

    Delete {
        #[arg(short, long)]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Counts per status
    Stats,

    /// Month grid of scheduled posts
    Calendar {
        /// YYYY-MM, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Prints notifications to stderr.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notification: Notification) {
        let mark = match notification.variant {
            Variant::Default => "✓",
            Variant::Destructive => "✗",
        };
        eprintln!("{mark} {}: {}", notification.title, notification.description);
    }
}

/// Asks on the terminal.
struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .with_context(|| format!("month must look like 2024-06, got `{raw}`"))?;
    Ok((date.year(), date.month()))
}

fn build_update(
    content: Option<String>,
    platforms: Vec<String>,
    media_url: Option<String>,
    clear_media: bool,
    at: Option<String>,
) -> Result<UpdatePost> {
    let scheduled_time = at.as_deref().map(parse_scheduled_time).transpose()?;
    let media_url = if clear_media {
        Some(None)
    } else {
        media_url.map(Some)
    };
    let changes = UpdatePost {
        content,
        media_url,
        platforms: (!platforms.is_empty()).then_some(platforms),
        scheduled_time,
        status: None,
    };
    if changes.is_empty() {
        bail!("nothing to update; pass at least one field");
    }
    Ok(changes)
}

fn status_label(post: &Post) -> String {
    match post.known_status() {
        Some(status) => status.to_string(),
        None => format!("{}?", post.status),
    }
}

fn print_post(post: &Post) {
    println!(
        "#{:<4} {:<10} {}  [{}]",
        post.id,
        status_label(post),
        post.scheduled_time.format("%Y-%m-%d %H:%M"),
        post.platforms.join(", ")
    );
    println!("      {}", post.content);
    if let Some(media) = &post.media_url {
        println!("      media: {media}");
    }
}

fn print_stats(counts: &StatusCounts) {
    println!("{:<10} {}", PostStatus::Scheduled, counts.scheduled);
    println!("{:<10} {}", PostStatus::Published, counts.published);
    println!("{:<10} {}", PostStatus::Failed, counts.failed);
    if counts.other > 0 {
        println!("{:<10} {}", "other", counts.other);
    }
}

fn print_calendar(month: &CalendarMonth) {
    println!("{}", month.title());
    println!(" Sun    Mon    Tue    Wed    Thu    Fri    Sat");
    for week in &month.weeks {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                let number = if day.in_month {
                    format!("{:>2}", day.date.day())
                } else {
                    " .".to_string()
                };
                match day.posts.len() {
                    0 => format!("{number}    "),
                    n => format!("{number}({n:<2})"),
                }
            })
            .collect();
        println!(" {}", row.join(" "));
    }

    for day in month.weeks.iter().flatten().filter(|d| d.in_month && !d.posts.is_empty()) {
        println!();
        println!("{}", day.date.format("%a %d %b"));
        for post in &day.posts {
            println!(
                "  {} #{} {} {}",
                post.scheduled_time.format("%H:%M"),
                post.id,
                status_label(post),
                post.content
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to read configuration")?;
    if let Some(server) = cli.server {
        config.base_url = server;
    }
    tracing::debug!(base_url = %config.base_url, "using API");
    let store = post_core::connect(&config, PrintNotifier).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::List { search } => {
            let posts = store.list().await?;
            let shown = views::search(&posts, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No posts found.");
            }
            for post in &shown {
                print_post(post);
            }
        }
        Commands::Get { id } => match store.get(Some(id)).await? {
            Some(post) => print_post(&post),
            None => bail!("post #{id} not found"),
        },
        Commands::Create {
            content,
            platforms,
            media_url,
            at,
        } => {
            let draft = PostDraft {
                content,
                media_url: media_url.unwrap_or_default(),
                platforms,
                scheduled_time: at,
            };
            let post = store.create(draft.to_insert()?).await?;
            print_post(&post);
        }
        Commands::Update {
            id,
            content,
            platforms,
            media_url,
            clear_media,
            at,
        } => {
            let changes = build_update(content, platforms, media_url, clear_media, at)?;
            let post = store.update(id, changes).await?;
            print_post(&post);
        }
        Commands::Delete { id, yes } => {
            let confirmation = if yes {
                DeleteConfirmation::assume_confirmed(id)
            } else {
                match DeleteRequest::new(id).confirm(&StdinPrompt) {
                    Some(confirmation) => confirmation,
                    None => {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }
            };
            store.delete(confirmation).await?;
        }
        Commands::Stats => {
            let posts = store.list().await?;
            print_stats(&StatusCounts::tally(&posts));
        }
        Commands::Calendar { month } => {
            let (year, month) = match month {
                Some(raw) => parse_month(&raw)?,
                None => {
                    let today = Utc::now().date_naive();
                    (today.year(), today.month())
                }
            };
            let posts = store.list().await?;
            print_calendar(&CalendarMonth::new(year, month, &posts)?);
        }
    }

    Ok(())
}
