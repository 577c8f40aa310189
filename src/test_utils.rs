use crate::config::{DatabaseConfig, ParkingConfig};
use crate::database::client::ClientRepository;
use crate::database::client_parking::ClientParkingRepository;
use crate::database::parking::ParkingRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::client::{Client, NewClient};
use crate::models::client_parking::{ClientParking, SessionKey, admit_entry, settle_exit};
use crate::models::parking::{NewParking, Parking};
use crate::{Config, build_rocket, mount_api_routes};
use chrono::{DateTime, Duration, Utc};
use rocket::local::asynchronous::Client as LocalClient;
use sqlx::postgres::PgPoolOptions;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

/// Database settings for tests that need a live Postgres; honours DATABASE_URL.
pub fn test_database_config() -> DatabaseConfig {
    let mut database = Config::default().database;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        database.url = url;
    }
    database.max_connections = 8;
    database.min_connections = 1;
    database
}

pub async fn database_client() -> LocalClient {
    let mut config = Config::default();
    config.database = test_database_config();
    config.api.enable_swagger = false;

    LocalClient::tracked(build_rocket(config)).await.expect("valid rocket instance")
}

/// A client over the real routes whose pool never connects. Good for
/// requests that are refused before any query runs.
pub async fn offline_client() -> LocalClient {
    let pool = PgPoolOptions::new()
        .min_connections(0)
        .connect_lazy(&test_database_config().url)
        .expect("valid database url");
    let rocket = rocket::build().manage(pool).manage(ParkingConfig::default());
    let rocket = mount_api_routes(rocket, "/api", false).register("/api", crate::routes::error::catchers());

    LocalClient::tracked(rocket).await.expect("valid rocket instance")
}

pub async fn postgres_repository() -> PostgresRepository {
    let pool = crate::db::init_pool(&test_database_config()).await.expect("database available");
    PostgresRepository { pool }
}

pub fn sample_client() -> Client {
    Client {
        id: 1,
        name: "Ivan".to_string(),
        surname: "Ivanov".to_string(),
        credit_card: Some("1234567812345678".to_string()),
        car_number: Some("A123BC777".to_string()),
    }
}

pub fn sample_parking() -> Parking {
    Parking {
        id: 1,
        address: "1 Test street".to_string(),
        opened: true,
        count_places: 10,
        count_available_places: 10,
    }
}

pub fn new_client(name: &str, surname: &str, credit_card: Option<&str>, car_number: Option<&str>) -> NewClient {
    NewClient {
        name: name.to_string(),
        surname: surname.to_string(),
        credit_card: credit_card.map(str::to_string),
        car_number: car_number.map(str::to_string),
    }
}

pub fn new_parking(count_places: i32, opened: bool) -> NewParking {
    NewParking {
        address: "1 Test street".to_string(),
        opened,
        count_places,
    }
}

#[derive(Default)]
struct MemoryState {
    clients: BTreeMap<i32, Client>,
    parkings: BTreeMap<i32, Parking>,
    client_parkings: Vec<ClientParking>,
    next_id: i32,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn active_for_client(&self, client_id: i32) -> Option<&ClientParking> {
        self.client_parkings.iter().find(|s| s.client_id == client_id && s.is_active())
    }
}

/// In-memory stand-in for Postgres. Every operation holds one lock for its
/// whole duration, which gives the same all-or-nothing behavior as a
/// transaction with row locks.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
    pending_conflicts: AtomicU32,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` enter/exit calls fail as if they lost a race.
    pub fn fail_next_with_conflict(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    /// Shifts the client's active session back in time.
    pub async fn backdate_active_session(&self, client_id: i32, by: Duration) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.client_parkings.iter_mut().find(|s| s.client_id == client_id && s.is_active()) {
            session.time_in -= by;
        }
    }

    fn take_conflict(&self) -> Result<(), AppError> {
        let taken = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if taken {
            Err(AppError::Conflict("Simulated concurrent update".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl ClientRepository for MemoryRepository {
    async fn create_client(&self, client: &NewClient) -> Result<Client, AppError> {
        let mut state = self.state.lock().await;
        let client = Client {
            id: state.next_id(),
            name: client.name.clone(),
            surname: client.surname.clone(),
            credit_card: client.credit_card.clone(),
            car_number: client.car_number.clone(),
        };
        state.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client_by_id(&self, id: i32) -> Result<Option<Client>, AppError> {
        Ok(self.state.lock().await.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.state.lock().await.clients.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl ParkingRepository for MemoryRepository {
    async fn create_parking(&self, parking: &NewParking) -> Result<Parking, AppError> {
        let mut state = self.state.lock().await;
        let parking = Parking {
            id: state.next_id(),
            address: parking.address.clone(),
            opened: parking.opened,
            count_places: parking.count_places,
            count_available_places: parking.count_places,
        };
        state.parkings.insert(parking.id, parking.clone());
        Ok(parking)
    }

    async fn get_parking_by_id(&self, id: i32) -> Result<Option<Parking>, AppError> {
        Ok(self.state.lock().await.parkings.get(&id).cloned())
    }

    async fn list_parkings(&self) -> Result<Vec<Parking>, AppError> {
        Ok(self.state.lock().await.parkings.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl ClientParkingRepository for MemoryRepository {
    async fn enter_parking(&self, key: &SessionKey, time_in: DateTime<Utc>) -> Result<ClientParking, AppError> {
        self.take_conflict()?;
        let mut state = self.state.lock().await;

        admit_entry(
            state.clients.get(&key.client_id),
            state.parkings.get(&key.parking_id),
            state.active_for_client(key.client_id),
        )?;

        let id = state.next_id();
        let parking = state
            .parkings
            .get_mut(&key.parking_id)
            .ok_or_else(|| AppError::Conflict("Parking disappeared".to_string()))?;
        parking.count_available_places -= 1;

        let session = ClientParking {
            id,
            client_id: key.client_id,
            parking_id: key.parking_id,
            time_in,
            time_out: None,
        };
        state.client_parkings.push(session.clone());
        Ok(session)
    }

    async fn exit_parking(&self, key: &SessionKey, time_out: DateTime<Utc>) -> Result<ClientParking, AppError> {
        self.take_conflict()?;
        let mut state = self.state.lock().await;

        let active = state
            .client_parkings
            .iter()
            .find(|s| s.client_id == key.client_id && s.parking_id == key.parking_id && s.is_active())
            .cloned();
        let session = settle_exit(active, state.clients.get(&key.client_id))?;
        let index = state
            .client_parkings
            .iter()
            .position(|s| s.id == session.id)
            .ok_or_else(|| AppError::Conflict("Client parking disappeared".to_string()))?;

        let parking = state
            .parkings
            .get_mut(&key.parking_id)
            .ok_or_else(|| AppError::Conflict("Parking disappeared".to_string()))?;
        if parking.count_available_places >= parking.count_places {
            return Err(AppError::Conflict("Parking occupancy changed concurrently".to_string()));
        }
        parking.count_available_places += 1;

        let stored = &mut state.client_parkings[index];
        stored.time_out = Some(time_out);
        Ok(stored.clone())
    }

    async fn list_client_parkings_for_client(&self, client_id: i32) -> Result<Vec<ClientParking>, AppError> {
        let state = self.state.lock().await;
        let mut sessions: Vec<ClientParking> = state.client_parkings.iter().filter(|s| s.client_id == client_id).cloned().collect();
        sessions.sort_by(|a, b| b.time_in.cmp(&a.time_in).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }
}
