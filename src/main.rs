use anyhow::Context;
use library_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load library settings")?;
    library_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = %settings.database.backend,
        db = %settings.database.name,
        "library setup starting"
    );

    let store = library_db::connect(
        settings.database.backend,
        &settings.database.uri,
        &settings.database.name,
    )
    .await
    .with_context(|| format!("failed to open database '{}'", settings.database.name))?;

    let report = library_setup::setup::run(store.as_ref(), &settings).await?;

    println!("{report}");
    println!();
    println!("Setup completed successfully!");
    Ok(())
}
