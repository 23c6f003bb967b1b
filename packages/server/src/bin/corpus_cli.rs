//! Operator CLI for the curated corpus
//!
//! Runs migrations and the policy/review operations curators occasionally need
//! outside the normal request path. Output is JSON, one document per command.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corpus_core::common::Actor;
use corpus_core::config::Config;
use corpus_core::domains::domain_policy::actions::{
    add_excluded_domain, list_excluded_domains, remove_excluded_domain, upsert_publisher_domain,
};
use corpus_core::domains::schedule_reviews::actions::mark_reviewed;
use corpus_core::domains::surfaces::SurfaceRegistry;
use corpus_core::kernel::{CorpusDeps, NotificationStatus};

#[derive(Parser)]
#[command(name = "corpus_cli")]
#[command(about = "Curated corpus operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// List the scheduled surfaces
    Surfaces,

    /// List excluded domains
    ExcludedDomains,

    /// Add a domain to the exclusion list
    ExcludeDomain {
        domain: String,
        #[arg(long, default_value = "corpus_cli")]
        actor: String,
    },

    /// Remove a domain from the exclusion list
    IncludeDomain {
        domain: String,
        #[arg(long, default_value = "corpus_cli")]
        actor: String,
    },

    /// Map a domain to a publisher name
    PublisherDomain {
        domain: String,
        publisher: String,
        #[arg(long)]
        actor: String,
    },

    /// Mark a surface's schedule for a date as reviewed
    Review {
        surface: String,
        /// Date as YYYY-MM-DD
        date: NaiveDate,
        #[arg(long)]
        actor: String,
    },
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn report_notification(status: &NotificationStatus) {
    if let NotificationStatus::Failed(reason) = status {
        tracing::warn!(reason = %reason, "Change saved but its event was not delivered");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,corpus_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    if let Commands::Surfaces = cli.command {
        return output(&SurfaceRegistry::default().all());
    }

    let config = Config::from_env()?;
    let (deps, store) = CorpusDeps::connect(&config).await?;

    match cli.command {
        Commands::Migrate => {
            store.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations applied");
        }
        Commands::Surfaces => {}
        Commands::ExcludedDomains => {
            output(&list_excluded_domains(&deps).await?)?;
        }
        Commands::ExcludeDomain { domain, actor } => {
            let excluded = add_excluded_domain(&domain, &Actor::new(actor), &deps).await?;
            output(&excluded)?;
        }
        Commands::IncludeDomain { domain, actor } => {
            let removed = remove_excluded_domain(&domain, &Actor::new(actor), &deps).await?;
            output(&removed)?;
        }
        Commands::PublisherDomain {
            domain,
            publisher,
            actor,
        } => {
            let mapping =
                upsert_publisher_domain(&domain, &publisher, &Actor::new(actor), &deps).await?;
            output(&mapping)?;
        }
        Commands::Review {
            surface,
            date,
            actor,
        } => {
            let committed = mark_reviewed(&surface, date, &Actor::new(actor), &deps).await?;
            report_notification(&committed.notification);
            output(&committed.value)?;
        }
    }

    Ok(())
}
