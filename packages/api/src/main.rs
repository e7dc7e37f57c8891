use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;

use api::config::{Config, StorageBackend};
use api::state::AppState;
use shared::repositories::game_repository::{DynamoDbGameRepository, GameRepository};
use shared::repositories::in_memory::{InMemoryGameRepository, InMemoryUserRepository};
use shared::repositories::user_repository::{DynamoDbUserRepository, UserRepository};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn GameRepository + Send + Sync>,
);

async fn repositories(storage: &StorageBackend) -> Repositories {
    match storage {
        StorageBackend::DynamoDb {
            users_table,
            games_table,
        } => {
            let aws_config = aws_config::load_from_env().await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            (
                Arc::new(DynamoDbUserRepository::new(client.clone(), users_table)),
                Arc::new(DynamoDbGameRepository::new(client, games_table)),
            )
        }
        StorageBackend::Memory => (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryGameRepository::new()),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let (user_repository, game_repository) = repositories(&config.storage).await;
    let app = api::app(AppState::new(
        user_repository,
        game_repository,
        &config.identity,
    ));

    match config.bind_addr {
        Some(addr) => {
            tracing::info!("Listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
            Ok(())
        }
        None => run(app).await,
    }
}
