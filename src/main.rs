use parking_sessions::{AppError, Config, build_rocket};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(AppError::from)?;
    let _rocket = build_rocket(config).launch().await?;

    Ok(())
}
