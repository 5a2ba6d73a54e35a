use aws_sdk_s3::Client;

/// Build an S3 client from the ambient AWS configuration (Lambda role,
/// environment variables or profile).
pub async fn build_client() -> Client {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    Client::new(&config)
}
