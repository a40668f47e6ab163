use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use chrono_tz::Tz;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::property::PropertyCatalog;
use crate::domain::models::user::{User, ROLE_OWNER};
use crate::domain::ports::{AuthRepository, CommentRepository, FeedCache, UploadedReservationRepository, UserRepository};
use crate::domain::services::accounting::CommissionPolicy;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::print::PRINT_TEMPLATE;
use crate::domain::services::reservation_service::ReservationService;
use crate::error::AppError;
use crate::infra::ics::{ics_feed_source::IcsFeedSource, moka_feed_cache::MokaFeedCache};
use crate::infra::lodgify::lodgify_client::LodgifyClient;
use crate::infra::repositories::{
    postgres_auth_repo::PostgresAuthRepo, postgres_comment_repo::PostgresCommentRepo,
    postgres_upload_repo::PostgresUploadRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_comment_repo::SqliteCommentRepo,
    sqlite_upload_repo::SqliteUploadRepo, sqlite_user_repo::SqliteUserRepo,
};

/// Storage-backed repositories, independent of the database flavour.
pub struct Repositories {
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub upload_repo: Arc<dyn UploadedReservationRepository>,
}

pub fn load_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template(PRINT_TEMPLATE, include_str!("../templates/calendar_print.html"))
        .expect("Failed to load calendar print template");
    tera
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Repositories {
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            auth_repo: Arc::new(PostgresAuthRepo::new(pool.clone())),
            comment_repo: Arc::new(PostgresCommentRepo::new(pool.clone())),
            upload_repo: Arc::new(PostgresUploadRepo::new(pool)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Repositories {
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            auth_repo: Arc::new(SqliteAuthRepo::new(pool.clone())),
            comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
            upload_repo: Arc::new(SqliteUploadRepo::new(pool)),
        }
    };

    let catalog = Arc::new(PropertyCatalog::new(config.properties.clone()));
    let calendar_tz: Tz = config.calendar_timezone.parse()
        .expect("CALENDAR_TIMEZONE must be an IANA time zone name");
    let feed_cache: Arc<dyn FeedCache> = Arc::new(MokaFeedCache::new(Duration::from_secs(config.ics_cache_ttl_secs)));

    let reservation_service = Arc::new(ReservationService::new(
        Arc::new(LodgifyClient::new(config.lodgify_api_url.clone(), config.lodgify_api_key.clone(), catalog.clone())),
        Arc::new(IcsFeedSource::new(catalog.clone(), feed_cache.clone(), calendar_tz)),
        repos.upload_repo.clone(),
    ));

    if let Err(e) = seed_owner(config, repos.user_repo.as_ref()).await {
        warn!("Failed to seed owner account: {}", e);
    }

    assemble_state(config, repos, catalog, calendar_tz, feed_cache, reservation_service, Arc::new(load_templates()))
}

/// Wires the shared services around a set of repositories.
pub fn assemble_state(
    config: &Config,
    repos: Repositories,
    catalog: Arc<PropertyCatalog>,
    calendar_tz: Tz,
    feed_cache: Arc<dyn FeedCache>,
    reservation_service: Arc<ReservationService>,
    templates: Arc<Tera>,
) -> AppState {
    let auth_service = Arc::new(AuthService::new(repos.auth_repo.clone(), config.clone()));
    let commission_policy = Arc::new(CommissionPolicy::new(
        config.channel_commissions.clone(),
        config.management_commission_pct,
    ));

    AppState {
        config: config.clone(),
        catalog,
        calendar_tz,
        user_repo: repos.user_repo,
        auth_repo: repos.auth_repo,
        comment_repo: repos.comment_repo,
        upload_repo: repos.upload_repo,
        feed_cache,
        reservation_service,
        auth_service,
        commission_policy,
        templates,
    }
}

/// Creates the configured owner account on first start.
pub async fn seed_owner(config: &Config, user_repo: &dyn UserRepository) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    if user_repo.find_by_username(username).await?.is_some() {
        return Ok(());
    }

    let password_hash = AuthService::hash_password(password)?;
    let owner = user_repo.create(&User::new(username.clone(), password_hash, ROLE_OWNER)).await?;
    info!("Seeded owner account {}", owner.username);
    Ok(())
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
