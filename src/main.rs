//! Raincast CLI - rainfall prediction from current weather

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use raincast::{AppServices, Notifier};
use raincast_auth::{Credential, Principal};
use raincast_core::{AppError, Config};
use raincast_services::{
    risk::{confidence_percent, rainfall_text},
    PredictionRecord, RiskFilter,
};
use raincast_weather::{Coordinate, Feature, UnavailableGeolocation};

#[derive(Parser)]
#[command(name = "raincast")]
#[command(about = "Rainfall prediction from current weather conditions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch current weather for a location and request a prediction
    Predict {
        /// Latitude (used together with --lon; otherwise the fallback location applies)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,

        /// Override a field before submitting, e.g. --set humidity=90
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// List your prediction history
    History {
        /// Only show areas containing this text
        #[arg(long, default_value = "")]
        search: String,

        /// Risk level: all, high, medium or low
        #[arg(long, default_value = "all")]
        risk: RiskFilter,
    },
    /// Show one prediction with its risk analysis, precautions and weather
    Show {
        /// Prediction id
        id: String,
    },
    /// Delete a prediction from your history
    Delete {
        /// Prediction id
        id: String,
    },
    /// Store a session credential
    Login {
        #[arg(long)]
        token: String,

        #[arg(long, default_value = "")]
        id: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        name: String,
    },
    /// Remove the stored session credential
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    raincast_core::init()?;

    let cli = Cli::parse();
    let (config, _validation) = Config::load_validated()?;
    let services = AppServices::new(config)?;

    match cli.command {
        Commands::Predict { lat, lon, set } => predict(&services, lat, lon, &set).await,
        Commands::History { search, risk } => history(&services, search, risk).await,
        Commands::Show { id } => show(&services, &id).await,
        Commands::Delete { id } => delete(&services, id).await,
        Commands::Login {
            token,
            id,
            email,
            name,
        } => {
            let principal = Principal {
                id: if id.is_empty() { email.clone() } else { id },
                email,
                fullname: name,
            };
            services
                .session()
                .lock()
                .sign_in(Credential::new(token, principal))
                .context("Failed to store credential")?;
            println!("Signed in.");
            Ok(())
        }
        Commands::Logout => {
            services
                .session()
                .lock()
                .sign_out()
                .context("Failed to remove credential")?;
            println!("Signed out.");
            Ok(())
        }
    }
}

async fn predict(
    services: &AppServices,
    lat: Option<String>,
    lon: Option<String>,
    set: &[String],
) -> Result<()> {
    let edits = set
        .iter()
        .map(|s| parse_edit(s))
        .collect::<Result<Vec<_>>>()?;

    let explicit = match (lat.as_deref(), lon.as_deref()) {
        (Some(lat), Some(lon)) => {
            let parsed = Coordinate::parse(lat, lon);
            if parsed.is_none() {
                tracing::warn!("Ignoring unparseable location {}, {}", lat, lon);
            }
            parsed
        }
        _ => None,
    };

    // No device location service on the command line
    let mut view = services.prediction_view(UnavailableGeolocation)?;
    if let Err(e) = view.load(explicit).await {
        return Err(report(e, services.notifier()));
    }

    if let Some(warning) = view.warning() {
        println!("Warning: {}", warning.user_message());
    }
    if let Some(resolution) = view.resolution() {
        println!("Location: {}", resolution.coordinate);
    }
    if let Some(display) = view.display() {
        println!(
            "Weather: {} {}",
            display.station_name,
            display.description.as_deref().unwrap_or_default()
        );
        if let Some(icon) = display.icon_url() {
            println!("Icon: {}", icon);
        }
    }

    for (feature, raw) in edits {
        view.edit(feature, raw);
    }

    if let Some(vector) = view.vector() {
        println!("Area: {}", vector.area());
        for (feature, value) in vector.iter() {
            println!("  {:<24} {} {}", feature.display_name(), value, feature.unit());
        }
    }

    if let Err(e) = view.submit().await {
        return Err(report(e, services.notifier()));
    }

    let outcome = view
        .outcome()
        .ok_or_else(|| anyhow!("No prediction was returned"))?;
    println!();
    println!("{}", rainfall_text(outcome.rainfall_prediction));
    println!("Risk: {} ({})", outcome.risk_tier(), outcome.risk_summary);
    for precaution in &outcome.precautions {
        println!("  - {}", precaution);
    }
    Ok(())
}

async fn history(services: &AppServices, search: String, risk: RiskFilter) -> Result<()> {
    let mut view = services.history_view();
    if let Err(e) = view.mount().await {
        return Err(report(e, services.notifier()));
    }

    view.set_search(search);
    view.set_risk(risk);

    if let Some(message) = view.empty_message() {
        println!("{}", message);
        return Ok(());
    }
    for record in view.visible() {
        print_record(record);
    }
    Ok(())
}

async fn show(services: &AppServices, id: &str) -> Result<()> {
    let mut view = services.history_view();
    if let Err(e) = view.mount().await {
        return Err(report(e, services.notifier()));
    }

    let record = view
        .record(id)
        .ok_or_else(|| anyhow!("No prediction with id '{}'", id))?;
    print_record(record);

    println!();
    println!("Risk analysis:");
    if record.risk_summary.is_empty() {
        println!("  No risk summary available");
    } else {
        println!("  {}", record.risk_summary);
    }

    println!("Recommended precautions:");
    if record.precautions.is_empty() {
        println!("  None");
    }
    for precaution in &record.precautions {
        println!("  - {}", precaution);
    }

    if let Some(weather) = &record.weather_conditions {
        println!("Weather at prediction time:");
        for (label, value, unit) in weather.readings() {
            println!("  {:<12} {}{}", label, value, unit);
        }
    }
    Ok(())
}

async fn delete(services: &AppServices, id: String) -> Result<()> {
    let mut view = services.history_view();
    view.request_delete(id);
    if let Err(e) = view.confirm_delete().await {
        return Err(report(e, services.notifier()));
    }
    if let Some(notification) = services.notifier().current() {
        println!("{}", notification.message);
    }
    Ok(())
}

fn print_record(record: &PredictionRecord) {
    let when = record
        .recorded_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{}  {}  {}  {} Risk  {}% confidence ({})  {}{}",
        record.id,
        when,
        record.area,
        record.risk_tier(),
        confidence_percent(record.model_confidence),
        record.confidence_bucket(),
        rainfall_text(record.final_prediction()),
        if record.was_overridden() {
            "  [overridden]"
        } else {
            ""
        },
    );
    let count = record.precautions.len();
    println!(
        "    {} precaution{} recommended",
        count,
        if count == 1 { "" } else { "s" }
    );
}

/// `FIELD=VALUE` for one of the user-editable fields.
fn parse_edit(s: &str) -> Result<(Feature, String)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got '{}'", s))?;
    let feature =
        Feature::from_name(name).ok_or_else(|| anyhow!("Unknown field '{}'", name.trim()))?;
    if feature.valid_range().is_none() {
        let editable: Vec<_> = Feature::editable().map(Feature::key).collect();
        bail!(
            "Field '{}' cannot be edited (editable: {})",
            feature.key(),
            editable.join(", ")
        );
    }
    Ok((feature, value.to_string()))
}

/// Print what the user should see for `err` and turn it into the exit error.
fn report(err: AppError, notifier: &Notifier) -> anyhow::Error {
    if let AppError::Validation(fields) = &err {
        for (field, message) in fields {
            eprintln!("  {}: {}", field, message);
        }
    }
    if err.requires_reauth() {
        eprintln!("Run `raincast login --token <TOKEN>` to sign in.");
    }
    // Notification-style errors were already raised on the notifier
    let message = notifier
        .current()
        .map(|n| n.message)
        .unwrap_or_else(|| err.user_message());
    anyhow!(message)
}
