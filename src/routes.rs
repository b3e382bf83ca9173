use crate::{
    api::{admin_attendance, attendance, attendance_request, office_location},
    attendance::{MySqlSessionStore, store::SessionStore},
    auth::middleware::auth_middleware,
    config::Config,
    utils::validation::{json_config, query_config},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter allowing `requests_per_min` with a full-minute burst.
pub fn build_limiter(requests_per_min: u32) -> Limiter {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let clock_limiter = Arc::new(build_limiter(config.rate_clock_per_min));

    cfg.app_data(json_config()).app_data(query_config());

    // Everything below requires a bearer token
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/app")
                    .configure(|cfg| app_routes::<MySqlSessionStore>(cfg, clock_limiter)),
            )
            .service(web::scope("/admin").configure(admin_routes)),
    );
}

/// Employee self-service routes. Clock-in/out get their own, tighter limiter.
pub fn app_routes<S: SessionStore + 'static>(
    cfg: &mut web::ServiceConfig,
    clock_limiter: Arc<Limiter>,
) {
    cfg.service(
        web::scope("/attendance")
            // /attendance/start
            .service(
                web::resource("/start")
                    .wrap(clock_limiter.clone())
                    .route(web::post().to(attendance::clock_in::<S>)),
            )
            // /attendance/end
            .service(
                web::resource("/end")
                    .wrap(clock_limiter)
                    .route(web::post().to(attendance::clock_out::<S>)),
            )
            .service(web::resource("/status").route(web::get().to(attendance::status::<S>)))
            .service(web::resource("/history").route(web::get().to(attendance::history::<S>)))
            // /attendance/request
            .service(
                web::resource("/request")
                    .route(web::get().to(attendance_request::my_requests))
                    .route(web::post().to(attendance_request::create_request)),
            ),
    );
}

/// HR/Admin routes; each handler checks the role itself.
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .service(web::resource("").route(web::get().to(admin_attendance::list_sessions)))
            .service(web::resource("/{id}").route(web::get().to(admin_attendance::get_session))),
    )
    .service(
        web::scope("/attendance-requests")
            .service(
                web::resource("").route(web::get().to(attendance_request::list_requests)),
            )
            .service(
                web::resource("/status").route(web::put().to(attendance_request::update_status)),
            ),
    )
    .service(
        web::scope("/office-locations")
            // /office-locations
            .service(
                web::resource("")
                    .route(web::get().to(office_location::list_offices))
                    .route(web::post().to(office_location::create_office)),
            )
            // /office-locations/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(office_location::update_office))
                    .route(web::delete().to(office_location::delete_office)),
            ),
    );
}
