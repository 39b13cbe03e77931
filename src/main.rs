use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;
use sqlx::PgPool;

use todovault::auth::{AuthMiddleware, TokenManager};
use todovault::config::Config;
use todovault::directory::UserDirectory;
use todovault::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let token_manager = TokenManager::new(config.jwt_secret.clone());
    let directory = UserDirectory::new(pool.clone(), token_manager);

    info!("Starting TodoVault server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(directory.clone()))
            // Registration order matters: the last wrap is outermost, and
            // CORS must sit outside auth so preflight requests (which never
            // carry the x-auth header) are answered instead of rejected 401.
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
