use std::net::TcpListener;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::RedisSessionStore;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, dev::Server, web, web::Data};
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::anti_forgery::{HmacTokenVerifier, TokenVerifier};
use crate::authentication::{AuthorizationChecker, SessionAdministrator, provision_administrator};
use crate::configuration::{DatabaseSettings, Settings};
use crate::directory::Directory;
use crate::intake::Intake;
use crate::routes::{
    form_error_handler, health_check, list_subscribers, log_out, login, search_subscribers,
    search_token, subscribe, subscription_token,
};
use crate::store::PgSubscriberStore;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let secret_key = session_key(&configuration.application.hmac_secret)?;

        let db_pool = get_connection_pool(&configuration.database);
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to migrate the database")?;

        if let Some(admin) = &configuration.admin {
            provision_administrator(&db_pool, &admin.username, &admin.password_hash).await?;
            tracing::info!(username = %admin.username, "Administrator provisioned");
        }

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        tracing::info!("Listening on {address}");

        let server = run(
            listener,
            db_pool,
            secret_key,
            configuration.application.hmac_secret,
            configuration.redis_uri,
        )
        .await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// Cookie signing and encryption keys are derived from this secret and need 64 bytes of it.
fn session_key(hmac_secret: &Secret<String>) -> Result<Key, anyhow::Error> {
    let secret = hmac_secret.expose_secret().as_bytes();
    if secret.len() < 64 {
        anyhow::bail!(
            "application.hmac_secret must be at least 64 bytes long, got {}",
            secret.len()
        );
    }
    Ok(Key::from(secret))
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

async fn run(
    listener: TcpListener,
    db_pool: PgPool,
    secret_key: Key,
    hmac_secret: Secret<String>,
    redis_uri: Secret<String>,
) -> Result<Server, anyhow::Error> {
    let redis_store = RedisSessionStore::new(redis_uri.expose_secret()).await?;

    let store = PgSubscriberStore::new(db_pool.clone());
    let authorization: Arc<dyn AuthorizationChecker> = Arc::new(SessionAdministrator);
    let verifier: Arc<dyn TokenVerifier> = Arc::new(HmacTokenVerifier::new(hmac_secret));

    let intake = Data::new(Intake::new(store.clone()));
    let directory = Data::new(Directory::new(store, authorization.clone()));
    let authorization: Data<dyn AuthorizationChecker> = Data::from(authorization);
    let verifier: Data<dyn TokenVerifier> = Data::from(verifier);
    let db_pool = Data::new(db_pool);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(
                redis_store.clone(),
                secret_key.clone(),
            ))
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions/token", web::get().to(subscription_token))
            .route(
                "/subscriptions",
                web::post().to(subscribe::<PgSubscriberStore>),
            )
            .route("/login", web::post().to(login))
            .service(
                web::scope("/admin")
                    .route(
                        "/subscribers",
                        web::get().to(list_subscribers::<PgSubscriberStore>),
                    )
                    .route("/subscribers/token", web::get().to(search_token))
                    .route(
                        "/subscribers/search",
                        web::post().to(search_subscribers::<PgSubscriberStore>),
                    )
                    .route("/logout", web::post().to(log_out)),
            )
            .app_data(web::FormConfig::default().error_handler(form_error_handler))
            .app_data(db_pool.clone())
            .app_data(intake.clone())
            .app_data(directory.clone())
            .app_data(authorization.clone())
            .app_data(verifier.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
