use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::client::{Client, NewClient};

#[async_trait::async_trait]
pub trait ClientRepository {
    async fn create_client(&self, client: &NewClient) -> Result<Client, AppError>;
    async fn get_client_by_id(&self, id: i32) -> Result<Option<Client>, AppError>;
    async fn list_clients(&self) -> Result<Vec<Client>, AppError>;
}

#[async_trait::async_trait]
impl ClientRepository for PostgresRepository {
    async fn create_client(&self, client: &NewClient) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO client (name, surname, credit_card, car_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, surname, credit_card, car_number
            "#,
        )
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.credit_card)
        .bind(&client.car_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    async fn get_client_by_id(&self, id: i32) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, surname, credit_card, car_number
            FROM client
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, surname, credit_card, car_number
            FROM client
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }
}
