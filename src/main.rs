use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;

use shift_helper::database::init_database;
use shift_helper::middleware::RequestId;
use shift_helper::services::mailer::mailer_from_config;
use shift_helper::{AppState, Config, routes};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration (.env included) before the logger reads RUST_LOG
    let config = Config::from_env()?;

    env_logger::init();

    log::info!(
        "Starting Shift Helper API (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let mailer = mailer_from_config(&config)?;
    log::info!(
        "Mail delivery: {}",
        if config.mail_configured() { "smtp" } else { "log only" }
    );

    let app_state = web::Data::new(AppState::new(pool, &config, mailer));

    let dispatcher = app_state.dispatcher.clone();
    let dispatcher_task = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.run().await }
    });

    let config_data = web::Data::new(config.clone());
    let server_address = config.server_address();
    let allowed_origin = config.client_base_url.clone();
    log::info!("Server starting on http://{}", server_address);

    let server_result = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&allowed_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await;

    dispatcher.shutdown();
    if let Err(e) = dispatcher_task.await {
        log::error!("Notification dispatcher task failed: {}", e);
    }

    server_result.map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
