use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::client::Client;
use crate::models::client_parking::{ClientParking, SessionKey, admit_entry, settle_exit};
use crate::models::parking::Parking;
use chrono::{DateTime, Utc};

/// Storage side of the parking-session lifecycle.
///
/// `enter_parking` and `exit_parking` each run as a single atomic unit: the
/// admission or settlement rules are evaluated against the same locked state
/// that is then mutated, and nothing is persisted if any step fails.
#[async_trait::async_trait]
pub trait ClientParkingRepository {
    async fn enter_parking(&self, key: &SessionKey, time_in: DateTime<Utc>) -> Result<ClientParking, AppError>;
    async fn exit_parking(&self, key: &SessionKey, time_out: DateTime<Utc>) -> Result<ClientParking, AppError>;
    async fn list_client_parkings_for_client(&self, client_id: i32) -> Result<Vec<ClientParking>, AppError>;
}

#[async_trait::async_trait]
impl ClientParkingRepository for PostgresRepository {
    async fn enter_parking(&self, key: &SessionKey, time_in: DateTime<Utc>) -> Result<ClientParking, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock order is client then parking, in both enter and exit.
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, surname, credit_card, car_number
            FROM client
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(key.client_id)
        .fetch_optional(&mut *tx)
        .await?;

        let parking = sqlx::query_as::<_, Parking>(
            r#"
            SELECT id, address, opened, count_places, count_available_places
            FROM parking
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(key.parking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let active = sqlx::query_as::<_, ClientParking>(
            r#"
            SELECT id, client_id, parking_id, time_in, time_out
            FROM client_parking
            WHERE client_id = $1 AND time_out IS NULL
            LIMIT 1
            "#,
        )
        .bind(key.client_id)
        .fetch_optional(&mut *tx)
        .await?;

        admit_entry(client.as_ref(), parking.as_ref(), active.as_ref())?;

        let client_parking = sqlx::query_as::<_, ClientParking>(
            r#"
            INSERT INTO client_parking (client_id, parking_id, time_in)
            VALUES ($1, $2, $3)
            RETURNING id, client_id, parking_id, time_in, time_out
            "#,
        )
        .bind(key.client_id)
        .bind(key.parking_id)
        .bind(time_in)
        .fetch_one(&mut *tx)
        .await?;

        let reserved = sqlx::query(
            r#"
            UPDATE parking
            SET count_available_places = count_available_places - 1
            WHERE id = $1 AND opened AND count_available_places > 0
            "#,
        )
        .bind(key.parking_id)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() != 1 {
            return Err(AppError::Conflict("Parking occupancy changed concurrently".to_string()));
        }

        tx.commit().await?;

        Ok(client_parking)
    }

    async fn exit_parking(&self, key: &SessionKey, time_out: DateTime<Utc>) -> Result<ClientParking, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, surname, credit_card, car_number
            FROM client
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(key.client_id)
        .fetch_optional(&mut *tx)
        .await?;

        let active = sqlx::query_as::<_, ClientParking>(
            r#"
            SELECT id, client_id, parking_id, time_in, time_out
            FROM client_parking
            WHERE client_id = $1 AND parking_id = $2 AND time_out IS NULL
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(key.client_id)
        .bind(key.parking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let session = settle_exit(active, client.as_ref())?;

        let closed = sqlx::query_as::<_, ClientParking>(
            r#"
            UPDATE client_parking
            SET time_out = $1
            WHERE id = $2 AND time_out IS NULL
            RETURNING id, client_id, parking_id, time_in, time_out
            "#,
        )
        .bind(time_out)
        .bind(session.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict("Client parking was closed concurrently".to_string()))?;

        let released = sqlx::query(
            r#"
            UPDATE parking
            SET count_available_places = count_available_places + 1
            WHERE id = $1 AND count_available_places < count_places
            "#,
        )
        .bind(key.parking_id)
        .execute(&mut *tx)
        .await?;

        if released.rows_affected() != 1 {
            return Err(AppError::Conflict("Parking occupancy changed concurrently".to_string()));
        }

        tx.commit().await?;

        Ok(closed)
    }

    async fn list_client_parkings_for_client(&self, client_id: i32) -> Result<Vec<ClientParking>, AppError> {
        let client_parkings = sqlx::query_as::<_, ClientParking>(
            r#"
            SELECT id, client_id, parking_id, time_in, time_out
            FROM client_parking
            WHERE client_id = $1
            ORDER BY time_in DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(client_parkings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::client::ClientRepository;
    use crate::database::parking::ParkingRepository;
    use crate::test_utils::{new_client, new_parking, postgres_repository};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_entries_never_overfill_a_lot() {
        let repo = Arc::new(postgres_repository().await);
        let parking = repo.create_parking(&new_parking(1, true)).await.unwrap();

        let mut tasks = JoinSet::new();
        for i in 0..8 {
            let client = repo
                .create_client(&new_client(&format!("Driver{i}"), "Racer", Some("4111111111111111"), None))
                .await
                .unwrap();
            let repo = Arc::clone(&repo);
            let key = SessionKey {
                client_id: client.id,
                parking_id: parking.id,
            };
            tasks.spawn(async move { repo.enter_parking(&key, Utc::now()).await });
        }

        let mut admitted = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap().is_ok() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        let parking = repo.get_parking_by_id(parking.id).await.unwrap().unwrap();
        assert_eq!(parking.count_available_places, 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_exits_settle_once() {
        let repo = Arc::new(postgres_repository().await);
        let parking = repo.create_parking(&new_parking(3, true)).await.unwrap();
        let client = repo
            .create_client(&new_client("Ivan", "Ivanov", Some("4111111111111111"), None))
            .await
            .unwrap();
        let key = SessionKey {
            client_id: client.id,
            parking_id: parking.id,
        };
        repo.enter_parking(&key, Utc::now()).await.unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..4 {
            let repo = Arc::clone(&repo);
            tasks.spawn(async move { repo.exit_parking(&key, Utc::now()).await });
        }

        let mut settled = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap().is_ok() {
                settled += 1;
            }
        }

        assert_eq!(settled, 1);
        let parking = repo.get_parking_by_id(parking.id).await.unwrap().unwrap();
        assert_eq!(parking.count_available_places, 3);
        let history = repo.list_client_parkings_for_client(client.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history[0].is_active());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn rejected_entry_leaves_no_trace() {
        let repo = postgres_repository().await;
        let parking = repo.create_parking(&new_parking(2, false)).await.unwrap();
        let client = repo.create_client(&new_client("Ivan", "Ivanov", None, None)).await.unwrap();
        let key = SessionKey {
            client_id: client.id,
            parking_id: parking.id,
        };

        let err = repo.enter_parking(&key, Utc::now()).await.unwrap_err();

        assert!(matches!(err, AppError::Rejected(_)));
        assert!(repo.list_client_parkings_for_client(client.id).await.unwrap().is_empty());
        let parking = repo.get_parking_by_id(parking.id).await.unwrap().unwrap();
        assert_eq!(parking.count_available_places, 2);
    }
}
