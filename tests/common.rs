use rental_calendar::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::accounting::ChannelCommission,
    domain::models::property::{PropertyCatalog, PropertyConfig},
    domain::models::reservation::{BookingSource, DateWindow, NewReservationParams, Reservation},
    domain::ports::{FeedCache, ReservationSource},
    domain::services::reservation_service::ReservationService,
    error::AppError,
    infra::factory::{assemble_state, load_templates, seed_owner, Repositories},
    infra::ics::{ics_feed_source::IcsFeedSource, moka_feed_cache::MokaFeedCache},
    infra::repositories::{
        sqlite_auth_repo::SqliteAuthRepo,
        sqlite_comment_repo::SqliteCommentRepo,
        sqlite_upload_repo::SqliteUploadRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, Response, header},
    Router,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tower::ServiceExt;
use serde_json::Value;

pub const OWNER_USERNAME: &str = "owner";
pub const OWNER_PASSWORD: &str = "owner-password";
pub const SEA_VIEW: &str = "Sea View";
pub const GARDEN_LOFT: &str = "Garden Loft";

/// In-memory stand-in for a remote reservation feed.
pub struct MockSource {
    name: &'static str,
    reservations: Mutex<Vec<Reservation>>,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(name: &'static str) -> Self {
        Self { name, reservations: Mutex::new(Vec::new()), failing: AtomicBool::new(false) }
    }

    pub fn push(&self, reservation: Reservation) {
        self.reservations.lock().unwrap().push(reservation);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReservationSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, window: DateWindow) -> Result<Vec<Reservation>, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream(format!("{} is down", self.name)));
        }
        Ok(self.reservations.lock().unwrap().iter().filter(|r| window.admits(r)).cloned().collect())
    }
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[allow(dead_code)]
pub fn reservation(id: &str, house: &str, source: BookingSource, arrival: NaiveDate, departure: NaiveDate) -> Reservation {
    Reservation::new(NewReservationParams {
        id: id.to_string(),
        arrival,
        departure,
        house_name: house.to_string(),
        source,
        guest_name: format!("Guest {}", id),
    })
}

#[allow(dead_code)]
pub fn priced(mut reservation: Reservation, amount: &str) -> Reservation {
    reservation.total_amount = Some(Decimal::from_str(amount).unwrap());
    reservation.currency = Some("EUR".to_string());
    reservation
}

pub fn test_properties() -> Vec<PropertyConfig> {
    vec![
        PropertyConfig { id: 101, name: SEA_VIEW.to_string(), cleaning_fee: Decimal::new(6000, 2), vrbo_ics_url: None },
        PropertyConfig { id: 102, name: GARDEN_LOFT.to_string(), cleaning_fee: Decimal::new(4500, 2), vrbo_ics_url: None },
    ]
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub lodgify: Arc<MockSource>,
    pub ics_feed: Arc<MockSource>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::build(test_properties(), false).await
    }

    pub async fn with_properties(properties: Vec<PropertyConfig>) -> Self {
        Self::build(properties, false).await
    }

    /// VRBO feeds are fetched over HTTP through the app's feed cache instead of `ics_feed`.
    pub async fn with_live_feeds(properties: Vec<PropertyConfig>) -> Self {
        Self::build(properties, true).await
    }

    async fn build(properties: Vec<PropertyConfig>, live_feeds: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            lodgify_api_url: "http://localhost".to_string(),
            lodgify_api_key: None,
            ics_cache_ttl_secs: 60,
            calendar_timezone: "UTC".to_string(),
            properties,
            channel_commissions: ChannelCommission::defaults(),
            management_commission_pct: 20,
            admin_username: Some(OWNER_USERNAME.to_string()),
            admin_password: Some(OWNER_PASSWORD.to_string()),
        };

        let repos = Repositories {
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            auth_repo: Arc::new(SqliteAuthRepo::new(pool.clone())),
            comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
            upload_repo: Arc::new(SqliteUploadRepo::new(pool.clone())),
        };

        seed_owner(&config, repos.user_repo.as_ref()).await.expect("Failed to seed owner");

        let feed_cache: Arc<dyn FeedCache> = Arc::new(MokaFeedCache::new(Duration::from_secs(60)));
        let catalog = Arc::new(PropertyCatalog::new(config.properties.clone()));

        let lodgify = Arc::new(MockSource::new("Lodgify"));
        let ics_feed = Arc::new(MockSource::new("VRBO ICS"));
        let ics_source: Arc<dyn ReservationSource> = if live_feeds {
            Arc::new(IcsFeedSource::new(catalog.clone(), feed_cache.clone(), chrono_tz::UTC))
        } else {
            ics_feed.clone()
        };
        let reservation_service = Arc::new(ReservationService::new(
            lodgify.clone(),
            ics_source,
            repos.upload_repo.clone(),
        ));

        let state = Arc::new(assemble_state(
            &config,
            repos,
            catalog,
            chrono_tz::UTC,
            feed_cache,
            reservation_service,
            Arc::new(load_templates()),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            lodgify,
            ics_feed,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "username": username,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token = cookie_value(&cookies, "access_token").expect("No access_token cookie returned");

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }

    pub async fn login_owner(&self) -> AuthHeaders {
        self.login(OWNER_USERNAME, OWNER_PASSWORD).await
    }

    /// Creates a staff account through the API and logs it in.
    pub async fn login_staff(&self, owner: &AuthHeaders, username: &str) -> AuthHeaders {
        let password = "staff-password";
        let response = self.send(
            "POST", "/api/v1/users", Some(owner),
            Some(("application/json", serde_json::json!({"username": username, "password": password}).to_string())),
        ).await;
        assert!(response.status().is_success(), "Failed to create staff user: {}", response.status());
        self.login(username, password).await
    }

    pub async fn get(&self, uri: &str, auth: Option<&AuthHeaders>) -> Response<Body> {
        self.send("GET", uri, auth, None).await
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<(&str, String)>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }

        let request = match body {
            Some((content_type, payload)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(payload))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    let cookie = set_cookies.iter().find(|c| c.starts_with(&prefix))?;
    let value = &cookie[prefix.len()..];
    Some(value.split(';').next().unwrap_or_default().to_string())
}

#[allow(dead_code)]
pub async fn parse_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
