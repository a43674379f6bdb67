use argon2::PasswordHasher;
use newsletter::configuration::{DatabaseSettings, Settings, get_configuration};
use newsletter::startup::{Application, get_connection_pool};
use newsletter::telemetry;
use newsletter::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use reqwest::Response;
use sqlx::{Connection, Executor, PgPool};
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub db_pool: sqlx::PgPool,
    pub test_user: TestUser,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get_subscription_token(&self) -> String {
        let body: serde_json::Value = self
            .api_client
            .get(format!("{}/subscriptions/token", &self.address))
            .send()
            .await
            .expect("Failed to execute Request")
            .json()
            .await
            .unwrap();
        body["token"].as_str().unwrap().to_owned()
    }

    pub async fn post_subscriptions<T: serde::Serialize>(&self, form: &T) -> Response {
        self.api_client
            .post(format!("{}/subscriptions", &self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute Request")
    }

    /// Fetch a fresh token for this client's session and subscribe with it.
    pub async fn subscribe(&self, name: &str, email: &str) -> Response {
        let token = self.get_subscription_token().await;
        self.post_subscriptions(&serde_json::json!({
            "token": token,
            "name": name,
            "email": email
        }))
        .await
    }

    pub async fn post_login<T: serde::Serialize>(&self, form: &T) -> Response {
        self.api_client
            .post(format!("{}/login", self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute Request")
    }

    pub async fn login_test_user(&self) {
        let response = self
            .post_login(&serde_json::json!({
                "username": self.test_user.username,
                "password": self.test_user.password
            }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }

    pub async fn post_logout(&self) -> Response {
        self.api_client
            .post(format!("{}/admin/logout", self.address))
            .send()
            .await
            .expect("Failed to execute Request")
    }

    pub async fn get_admin_subscribers(&self) -> Response {
        self.api_client
            .get(format!("{}/admin/subscribers", self.address))
            .send()
            .await
            .expect("Failed to execute Request")
    }

    pub async fn get_search_token(&self) -> Response {
        self.api_client
            .get(format!("{}/admin/subscribers/token", self.address))
            .send()
            .await
            .expect("Failed to execute Request")
    }

    pub async fn post_search<T: serde::Serialize>(&self, form: &T) -> Response {
        self.api_client
            .post(format!("{}/admin/subscribers/search", self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute Request")
    }

    /// Fetch a search token for this client's session and search with it.
    pub async fn search(&self, term: &str) -> Response {
        let body: serde_json::Value = self.get_search_token().await.json().await.unwrap();
        let token = body["token"].as_str().unwrap();
        self.post_search(&serde_json::json!({ "token": token, "search": term }))
            .await
    }

    pub async fn subscriber_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count subscribers")
    }
}

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, after letting the test adjust the settings.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    let mut configuration = test_configuration();
    customize(&mut configuration);

    let application = build_app(configuration.clone())
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", application.port());

    _ = tokio::spawn(application.run_until_stopped());

    let test_user = TestUser::generate();

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    let app = TestApp {
        address,
        db_pool: get_connection_pool(&configuration.database),
        test_user,
        api_client,
    };

    app.test_user.store(&app.db_pool).await;

    app
}

/// Settings pointing at a fresh, uniquely named database and a random port.
pub fn test_configuration() -> Settings {
    Lazy::force(&TRACING);

    let mut c = get_configuration().expect("Failed to read configuration.");
    c.database.database_name = Uuid::new_v4().to_string();
    c.application.port = 0;
    c
}

/// Creates the database named in `configuration`, then builds the application against it.
pub async fn build_app(configuration: Settings) -> Result<Application, anyhow::Error> {
    configure_database(&configuration.database).await;
    Application::build(configuration).await
}

async fn configure_database(config: &DatabaseSettings) -> sqlx::PgPool {
    let mut connection = sqlx::PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to postgres instance");

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name,).as_str())
        .await
        .expect("Failed to create new database");

    let db_pool = sqlx::PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations");

    db_pool
}

pub struct TestUser {
    pub uuid: Uuid,
    pub username: String,
    pub password: String,
}

impl TestUser {
    fn generate() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: Uuid::new_v4().to_string(),
            password: Uuid::new_v4().to_string(),
        }
    }

    async fn store(&self, db_pool: &PgPool) {
        let hash = hash_password(&self.password);

        sqlx::query("INSERT INTO users (user_id, username, password_hash) VALUES ($1,$2,$3)")
            .bind(self.uuid)
            .bind(&self.username)
            .bind(hash)
            .execute(db_pool)
            .await
            .expect("Failed to create test user");
    }
}

/// Argon2id PHC string for `password`.
pub fn hash_password(password: &str) -> String {
    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::new(19 * 1024, 2, 1, None).unwrap(),
    );
    let salt = argon2::password_hash::SaltString::generate(rand::thread_rng());
    argon2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

pub async fn assert_message(response: Response, status: u16, message: &str) -> serde_json::Value {
    assert_eq!(response.status().as_u16(), status);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], message);
    body
}
