//! Inserts demo students of every level into the configured database.

use chrono::Utc;
use portal_backend::{
    account::Account,
    config::Config,
    store::{MongoStore, Store},
};
use portal_shared::account::{handle::RegisterReq, Level};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const STUDENTS_PER_LEVEL: u16 = 7;
const PASSWORD: &str = "password123";

/// Registration of the `i`th demo student of a level.
fn student(level: Level, i: u16) -> Result<RegisterReq, lettre::address::AddressError> {
    Ok(RegisterReq {
        first_name: format!("Student{i}"),
        last_name: format!("Level{level}"),
        email: format!("student{i}.level{level}@bowen.edu.ng").parse()?,
        matric_number: format!("{}/{}", level.get() / 100, 1000 + i),
        phone_number: format!("080{:02}{:06}", level.get() / 100, i),
        password: PASSWORD.to_owned(),
        level,
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::read()?;
    let store = MongoStore::connect(&config.mongodb_uri, &config.db_name).await?;
    store.ensure_indexes().await?;

    let (mut inserted, mut skipped) = (0, 0);
    for level in Level::ALL {
        for i in 1..=STUDENTS_PER_LEVEL {
            let account = Account::register(student(level, i)?, Utc::now())?;
            if store.insert_account(&account).await? {
                inserted += 1;
            } else {
                info!("{} already exists, skipped", account.email);
                skipped += 1;
            }
        }
    }
    info!("seeded {inserted} students, {skipped} skipped");
    info!("demo students sign in with password {PASSWORD}");
    Ok(())
}
