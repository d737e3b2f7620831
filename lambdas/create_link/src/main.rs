use crate::config::Config;
use crate::http_handler::HandlerDeps;
use http_handler::function_handler;
use lambda_http::{http::StatusCode, run, service_fn, tracing, Error};
use shared::adapters::DynamoDbUrlRepository;
use shared::core::{RandomCodeGenerator, UrlShortener};

mod config;
mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let config = Config::load()?;
    tracing::info!(
        table_name = %config.table_name,
        strategy = ?config.allocation_strategy,
        max_attempts = config.max_allocation_attempts,
        "Configuration loaded"
    );
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);
    let url_repo = DynamoDbUrlRepository::new(config.table_name, dynamodb_client);
    let url_shortener = UrlShortener::new(url_repo, RandomCodeGenerator::new())
        .with_max_attempts(config.max_allocation_attempts)
        .with_strategy(config.allocation_strategy);
    let malformed_body_status = if config.malformed_body_as_server_error {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    let deps = HandlerDeps {
        url_shortener,
        base_url: config.base_url,
        malformed_body_status,
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
