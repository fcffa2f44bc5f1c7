use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use tickit::backend::{BackendApi, HttpBackend};
use tickit::config::{ClientConfig, WalletConfig};
use tickit::dashboard::format::{format_date, format_time, price_label, seats_label};
use tickit::dashboard::{DashboardTab, Event, EventDashboard, EventDraft};
use tickit::onboarding::{OnboardingSequencer, OnboardingStep};
use tickit::presenter::{Notification, NotificationKind, Presenter, TracingPresenter};
use tickit::store::{FileStore, Session, SessionStore};
use tickit::wallet::{EnvLocator, WalletConnector, short_address};

/// Presenter that writes to the terminal.
struct CliPresenter;

#[async_trait]
impl Presenter for CliPresenter {
    async fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => eprintln!("✅ {}", notification.message),
            NotificationKind::Error => eprintln!("❌ {}", notification.message),
        }
    }

    async fn open_new_tab(&self, url: &str) {
        eprintln!("🔗 Install a wallet: {url}");
    }

    async fn navigate(&self, route: &str) {
        tracing::debug!(route, "Navigate");
    }
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    let wallet_config = WalletConfig::from_env();

    let store: Arc<dyn SessionStore> = Arc::new(
        FileStore::open(&config.store_path)
            .await
            .with_context(|| format!("Failed to open session at {}", config.store_path.display()))?,
    );
    let session = Session::load(store.as_ref()).await?;
    let backend: Arc<dyn BackendApi> =
        Arc::new(HttpBackend::new(&config)?.with_token(session.token.clone()));
    // Notifications go to the log when input is piped.
    let presenter: Arc<dyn Presenter> = if std::io::stdin().is_terminal() {
        Arc::new(CliPresenter)
    } else {
        Arc::new(TracingPresenter)
    };

    eprintln!("🎟  tickit v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.backend_url);
    eprintln!("   Session: {}", config.store_path.display());
    eprintln!("   Wallet:  {}", wallet_config.provider_name);
    eprintln!("   Type /quit to exit.\n");

    let connector = WalletConnector::new(
        Arc::new(EnvLocator),
        Arc::clone(&backend),
        Arc::clone(&store),
        Arc::clone(&presenter),
        wallet_config,
    );
    let sequencer = OnboardingSequencer::load(
        connector,
        Arc::clone(&store),
        Arc::clone(&backend),
        Arc::clone(&presenter),
    )
    .await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !run_onboarding(&sequencer, &mut input).await? {
        return Ok(());
    }

    // Rebuild the client so requests carry the token issued during login.
    let session = sequencer.session().await;
    let backend: Arc<dyn BackendApi> =
        Arc::new(HttpBackend::new(&config)?.with_token(session.token.clone()));
    let dashboard = EventDashboard::new(backend, Arc::clone(&store));
    if let Some(address) = &session.address {
        let name = session.name.as_deref().unwrap_or("");
        eprintln!("   Signed in as {name} ({})\n", short_address(address));
    }

    run_dashboard(&dashboard, sequencer.connector(), &mut input).await
}

/// Prompt for each step until onboarding completes. Returns `false` on
/// EOF or `/quit`.
async fn run_onboarding(
    sequencer: &OnboardingSequencer,
    input: &mut Input,
) -> anyhow::Result<bool> {
    while let Some(step) = sequencer.current_step().await {
        let result = match step {
            OnboardingStep::Wallet => {
                eprint!("Press Enter to connect your wallet > ");
                if read_line(input).await?.is_none() {
                    return Ok(false);
                }
                sequencer.connect_wallet().await
            }
            OnboardingStep::Email => {
                eprint!("Email > ");
                let Some(line) = read_line(input).await? else {
                    return Ok(false);
                };
                sequencer.submit_email(&line).await
            }
            OnboardingStep::Name => {
                eprint!("Name > ");
                let Some(line) = read_line(input).await? else {
                    return Ok(false);
                };
                sequencer.submit_name(&line).await
            }
            OnboardingStep::Otp => {
                eprint!("4-character code > ");
                let Some(line) = read_line(input).await? else {
                    return Ok(false);
                };
                sequencer.submit_otp(&line).await
            }
        };
        if let Err(e) = result {
            tracing::debug!(%step, error = %e, "Step not completed");
        }
    }
    Ok(true)
}

async fn run_dashboard(
    dashboard: &EventDashboard,
    connector: &WalletConnector,
    input: &mut Input,
) -> anyhow::Result<()> {
    eprintln!(
        "Commands: available | joined | create <name> <yyyy-mm-dd> <hour> <seats> [price] | logout"
    );
    loop {
        eprint!("> ");
        let Some(line) = read_line(input).await? else {
            return Ok(());
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["available"] => print_events(dashboard.events(DashboardTab::Available).await),
            ["joined"] => print_events(dashboard.events(DashboardTab::Joined).await),
            ["create", name, date, hour, seats, rest @ ..] => {
                match parse_draft(name, date, hour, seats, rest.first().copied()) {
                    Ok(draft) => match dashboard.create_event(draft).await {
                        Ok(event) => eprintln!("✅ Created {} ({})", event.event_name, event.id),
                        Err(e) => eprintln!("❌ {e}"),
                    },
                    Err(e) => eprintln!("❌ {e}"),
                }
            }
            ["logout"] => {
                connector.disconnect().await?;
                eprintln!("Signed out.");
                return Ok(());
            }
            _ => eprintln!("Unknown command: {line}"),
        }
    }
}

fn parse_draft(
    name: &str,
    date: &str,
    hour: &str,
    seats: &str,
    price: Option<&str>,
) -> anyhow::Result<EventDraft> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("date must be yyyy-mm-dd")?;
    let mut draft = EventDraft::new(name, date);
    draft.time = hour.parse().context("hour must be 0-23")?;
    draft.max_seats = seats.parse().context("seats must be a whole number")?;
    if let Some(price) = price {
        draft.ticket_price = price.parse::<Decimal>().context("price must be a number")?;
    }
    Ok(draft)
}

fn print_events(result: Result<Vec<Event>, tickit::error::DashboardError>) {
    match result {
        Ok(events) if events.is_empty() => eprintln!("No events"),
        Ok(events) => {
            for event in events {
                let price = price_label(&event).unwrap_or_else(|| "free".to_string());
                println!(
                    "{} · {} {} · {} · {} · {}",
                    event.event_name,
                    format_date(&event.date),
                    format_time(event.time),
                    seats_label(&event),
                    event.permission,
                    price,
                );
            }
        }
        Err(e) => eprintln!("❌ {e}"),
    }
}

/// Next trimmed line, or `None` on EOF or `/quit`.
async fn read_line(input: &mut Input) -> anyhow::Result<Option<String>> {
    match input.next_line().await? {
        Some(line) if line.trim() == "/quit" => Ok(None),
        Some(line) => Ok(Some(line.trim().to_string())),
        None => Ok(None),
    }
}
