use crate::config::ParkingConfig;
use crate::database::client_parking::ClientParkingRepository;
use crate::error::app_error::AppError;
use crate::models::client_parking::{ClientParking, ExitReceipt, SessionKey};
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::{debug, info, warn};

/// Fractional hours between entry and exit, never negative.
pub fn elapsed_hours(time_in: DateTime<Utc>, time_out: DateTime<Utc>) -> f64 {
    let millis = (time_out - time_in).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    pub hourly_rate: i64,
    pub minimum_fee: i64,
}

impl Tariff {
    /// `max(minimum_fee, round(hours * hourly_rate))`, rounding half to even.
    pub fn cost(&self, hours: f64) -> i64 {
        let raw = (hours * self.hourly_rate as f64).round_ties_even() as i64;
        raw.max(self.minimum_fee)
    }

    pub fn settle(&self, session: ClientParking) -> ExitReceipt {
        let time_out = session.time_out.unwrap_or(session.time_in);
        let hours = elapsed_hours(session.time_in, time_out);
        ExitReceipt {
            parking_time_hours: round_to_cents(hours),
            cost: self.cost(hours),
            client_parking: session,
        }
    }
}

impl From<&ParkingConfig> for Tariff {
    fn from(config: &ParkingConfig) -> Self {
        Self {
            hourly_rate: config.hourly_rate,
            minimum_fee: config.minimum_fee,
        }
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self::from(&ParkingConfig::default())
    }
}

pub struct ParkingSessionService<'a, R> {
    repository: &'a R,
    tariff: Tariff,
    max_attempts: u32,
}

impl<'a, R> ParkingSessionService<'a, R>
where
    R: ClientParkingRepository + Sync,
{
    pub fn new(repository: &'a R, config: &ParkingConfig) -> Self {
        ParkingSessionService {
            repository,
            tariff: Tariff::from(config),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Starts a session for the client at the lot and takes one place.
    pub async fn enter(&self, key: SessionKey) -> Result<ClientParking, AppError> {
        let session = self
            .with_retry("enter", key, || self.repository.enter_parking(&key, Utc::now()))
            .await?;

        info!(
            client_parking_id = session.id,
            client_id = key.client_id,
            parking_id = key.parking_id,
            "client entered parking"
        );
        Ok(session)
    }

    /// Closes the client's active session at the lot, frees the place and prices the stay.
    pub async fn exit(&self, key: SessionKey) -> Result<ExitReceipt, AppError> {
        let session = self
            .with_retry("exit", key, || self.repository.exit_parking(&key, Utc::now()))
            .await?;
        let receipt = self.tariff.settle(session);

        info!(
            client_parking_id = receipt.client_parking.id,
            client_id = key.client_id,
            parking_id = key.parking_id,
            parking_time_hours = receipt.parking_time_hours,
            cost = receipt.cost,
            "client exited parking"
        );
        Ok(receipt)
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, key: SessionKey, mut attempt: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Err(e) if e.is_conflict() && attempts < self.max_attempts => {
                    warn!(
                        operation,
                        attempt = attempts,
                        client_id = key.client_id,
                        parking_id = key.parking_id,
                        error = %e,
                        "parking session conflict, retrying"
                    );
                }
                Err(e) => {
                    debug!(operation, client_id = key.client_id, parking_id = key.parking_id, error = %e, "parking session refused");
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}
