use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::parking::{NewParking, Parking};

#[async_trait::async_trait]
pub trait ParkingRepository {
    async fn create_parking(&self, parking: &NewParking) -> Result<Parking, AppError>;
    async fn get_parking_by_id(&self, id: i32) -> Result<Option<Parking>, AppError>;
    async fn list_parkings(&self) -> Result<Vec<Parking>, AppError>;
}

#[async_trait::async_trait]
impl ParkingRepository for PostgresRepository {
    async fn create_parking(&self, parking: &NewParking) -> Result<Parking, AppError> {
        let parking = sqlx::query_as::<_, Parking>(
            r#"
            INSERT INTO parking (address, opened, count_places, count_available_places)
            VALUES ($1, $2, $3, $3)
            RETURNING id, address, opened, count_places, count_available_places
            "#,
        )
        .bind(&parking.address)
        .bind(parking.opened)
        .bind(parking.count_places)
        .fetch_one(&self.pool)
        .await?;

        Ok(parking)
    }

    async fn get_parking_by_id(&self, id: i32) -> Result<Option<Parking>, AppError> {
        let parking = sqlx::query_as::<_, Parking>(
            r#"
            SELECT id, address, opened, count_places, count_available_places
            FROM parking
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(parking)
    }

    async fn list_parkings(&self) -> Result<Vec<Parking>, AppError> {
        let parkings = sqlx::query_as::<_, Parking>(
            r#"
            SELECT id, address, opened, count_places, count_available_places
            FROM parking
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(parkings)
    }
}
