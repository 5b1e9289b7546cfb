use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presensi_backend::{
    config::Config,
    db::connection::create_pool,
    handlers,
    middleware::{auth, subscription},
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presensi_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        time_zone = %config.time_zone,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let public_routes = Router::new().route("/api/v1/auth/login", post(handlers::auth::login));

    // Mutating punch/request endpoints sit behind the tenant subscription
    // gate; read endpoints stay available while a subscription has lapsed.
    let gated_routes = Router::new()
        .route(
            "/api/v1/attendance/clock-in",
            post(handlers::attendance::clock_in),
        )
        .route(
            "/api/v1/attendance/clock-out",
            post(handlers::attendance::clock_out),
        )
        .route(
            "/api/v1/leave/requests",
            post(handlers::leave::create_leave_request),
        )
        .route(
            "/api/v1/leave/requests/{id}",
            put(handlers::leave::update_leave_request)
                .delete(handlers::leave::cancel_leave_request),
        )
        .route(
            "/api/v1/overtime/requests",
            post(handlers::overtime::create_overtime_request),
        )
        .route(
            "/api/v1/overtime/requests/{id}",
            delete(handlers::overtime::cancel_overtime_request),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            subscription::subscription_gate,
        ));

    let user_routes = Router::new()
        .route(
            "/api/v1/attendance/current-status",
            get(handlers::attendance::current_status),
        )
        .route(
            "/api/v1/attendance/history",
            get(handlers::attendance::history),
        )
        .route("/api/v1/leave-types", get(handlers::leave::list_leave_types))
        .route(
            "/api/v1/leave-balances",
            get(handlers::leave::list_leave_balances),
        )
        .route(
            "/api/v1/leave/requests",
            get(handlers::leave::list_leave_requests),
        )
        .route(
            "/api/v1/leave/requests/{id}/approve-supervisor",
            put(handlers::leave::approve_leave_supervisor),
        )
        .route(
            "/api/v1/leave/requests/{id}/approve-manager",
            put(handlers::leave::approve_leave_manager),
        )
        .route(
            "/api/v1/leave/requests/{id}/approve-hr",
            put(handlers::leave::approve_leave_hr),
        )
        .route(
            "/api/v1/leave/requests/{id}/reject",
            put(handlers::leave::reject_leave),
        )
        .route(
            "/api/v1/overtime/requests",
            get(handlers::overtime::list_overtime_requests),
        )
        .route(
            "/api/v1/overtime/requests/{id}/approve-supervisor",
            put(handlers::overtime::approve_overtime_supervisor),
        )
        .route(
            "/api/v1/overtime/requests/{id}/approve-manager",
            put(handlers::overtime::approve_overtime_manager),
        )
        .route(
            "/api/v1/overtime/requests/{id}/approve-hr",
            put(handlers::overtime::approve_overtime_hr),
        )
        .route(
            "/api/v1/overtime/requests/{id}/reject",
            put(handlers::overtime::reject_overtime),
        )
        .route("/api/v1/admin/shifts", get(handlers::admin::list_shifts))
        .route(
            "/api/v1/admin/shifts/{id}",
            put(handlers::admin::update_shift).delete(handlers::admin::delete_shift),
        );

    // Auth wraps both groups; the subscription gate only wraps the gated
    // group and runs after authentication.
    let protected = gated_routes.merge(user_routes).route_layer(
        axum_middleware::from_fn_with_state((pool.clone(), config.clone()), auth::auth),
    );

    let app = Router::new()
        .merge(public_routes)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state((pool, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
