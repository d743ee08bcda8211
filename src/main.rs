use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use talentgate::handlers::{
    application_handlers, auth_handlers, job_handlers, notification_handlers,
    organization_handlers,
};
use talentgate::{audit, auth, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::init_pool(&database_url).await;
    db::run_migrations(&pool).await;

    // Seed role grants, the internal organization, and the admin account if missing
    let admin_hash =
        auth::password::hash("admin123").expect("Failed to hash default password");
    db::seed(&pool, &admin_hash).await;

    // Drop timeline entries past the retention window
    audit::cleanup_old_entries(&pool).await;

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let limiter = auth::rate_limit::RateLimiter::new();

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(limiter.clone()))
            // Public routes
            .route("/login", web::post().to(auth_handlers::login))
            .route(
                "/organizations/register",
                web::post().to(organization_handlers::register),
            )
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/logout", web::post().to(auth_handlers::logout))
                    .route("/me", web::get().to(auth_handlers::me))
                    // Jobs — literal segments BEFORE /jobs/{id}/{action}
                    .route("/jobs", web::post().to(job_handlers::create))
                    .route("/jobs", web::get().to(job_handlers::list))
                    .route("/jobs/{id}/transitions", web::get().to(job_handlers::transitions))
                    .route(
                        "/jobs/{id}/applications",
                        web::post().to(application_handlers::create),
                    )
                    .route("/jobs/{id}/enrich", web::post().to(job_handlers::enrich))
                    .route(
                        "/jobs/{id}/final_verify",
                        web::post().to(job_handlers::final_verify),
                    )
                    .route("/jobs/{id}/{action}", web::post().to(job_handlers::transition))
                    .route("/jobs/{id}", web::get().to(job_handlers::detail))
                    // Applications
                    .route("/applications", web::get().to(application_handlers::list))
                    .route(
                        "/applications/{id}/transitions",
                        web::get().to(application_handlers::transitions),
                    )
                    .route(
                        "/applications/{id}/status",
                        web::post().to(application_handlers::update_status),
                    )
                    .route(
                        "/applications/{id}/decision",
                        web::post().to(application_handlers::decision),
                    )
                    .route("/applications/{id}", web::get().to(application_handlers::detail))
                    // Organizations — reject BEFORE /organizations/{id}/{action}
                    .route("/organizations", web::get().to(organization_handlers::list))
                    .route(
                        "/organizations/{id}/transitions",
                        web::get().to(organization_handlers::transitions),
                    )
                    .route(
                        "/organizations/{id}/reject",
                        web::post().to(organization_handlers::reject),
                    )
                    .route(
                        "/organizations/{id}/{action}",
                        web::post().to(organization_handlers::transition),
                    )
                    .route("/organizations/{id}", web::get().to(organization_handlers::detail))
                    // Notifications
                    .route(
                        "/notifications/{category}/unread",
                        web::get().to(notification_handlers::unread),
                    )
                    .route(
                        "/notifications/{category}/{id}/read",
                        web::post().to(notification_handlers::mark_read),
                    ),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
