use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uofthub_rs::models::Credentials;
use uofthub_rs::{App, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uofthub_rs=debug,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::new()?;
    let app = App::bootstrap(config).await?;
    let store = &app.store;

    // Optional sign-in for restricted databases
    if let (Ok(email), Ok(password)) = (std::env::var("UOFTHUB_EMAIL"), std::env::var("UOFTHUB_PASSWORD")) {
        if store.sign_user_in(Credentials::new(email, password)).await.is_err() {
            if let Some(err) = store.error().await {
                error!("Sign-in failed: {}", err);
            }
        }
    }

    let Some(scope) = std::env::args().nth(1) else {
        info!("Usage: uofthub-rs <classname>");
        return Ok(());
    };

    let (uploads, ratings) = tokio::join!(store.load_file_uploads(&scope), store.load_ratings(&scope));
    if uploads.is_err() || ratings.is_err() {
        error!("Could not load everything for {}", scope);
    }

    for upload in store.featured_file_uploads().await {
        info!(
            "{} [{}] {} {}",
            upload.filename,
            upload.upload_type,
            upload.date,
            upload.image_url.as_deref().unwrap_or("(no file)")
        );
    }

    let ratings = store.loaded_ratings().await;
    if !ratings.is_empty() {
        let average = ratings.iter().map(|r| r.rate).sum::<f64>() / ratings.len() as f64;
        info!("{} ratings, average {:.1}", ratings.len(), average);
    }

    Ok(())
}
