use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use workersmate_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{Mailer, PaymentGateway, QrImageRenderer, SmtpMailer, StripeService, SvgQrRenderer},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // One JSON object per line
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let payment_gateway: Arc<dyn PaymentGateway> =
        Arc::new(StripeService::new(config.stripe.clone()));
    let mailer: Arc<dyn Mailer> =
        Arc::new(SmtpMailer::new(&config.smtp).expect("Failed to configure SMTP transport"));
    let qr_renderer: Arc<dyn QrImageRenderer> = Arc::new(SvgQrRenderer);

    let activity_log_service = ActivityLogService::new(pool.clone());
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let portfolio_service = PortfolioService::new(pool.clone());
    let reference_service = ReferenceService::new(pool.clone(), activity_log_service.clone());
    let admin_service = AdminService::new(pool.clone(), activity_log_service.clone());
    let qr_code_service = QrCodeService::new(
        pool.clone(),
        activity_log_service.clone(),
        qr_renderer,
        config.app.clone(),
    );
    let memorial_service = MemorialService::new(pool.clone());
    let payment_service = PaymentService::new(payment_gateway, config.app.clone());
    let contact_service = ContactService::new(mailer, config.smtp.contact_address.clone());
    let cart_service = CartService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(activity_log_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(portfolio_service.clone()))
            .app_data(web::Data::new(reference_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(qr_code_service.clone()))
            .app_data(web::Data::new(memorial_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(contact_service.clone()))
            .app_data(web::Data::new(cart_service.clone()))
            .configure(handlers::extractor_config)
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::worker_config)
                    .configure(handlers::reference_config)
                    .configure(handlers::qr_code_config)
                    .configure(handlers::memorial_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::contact_config)
                    .configure(handlers::cart_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
