use crate::{
    api::{leave_balance, leave_request},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

/// Leave endpoints without rate limiting. Handlers authenticate through
/// the `AuthUser` extractor.
pub fn leave_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::leave_list))
                    .route(web::post().to(leave_request::create_leave)),
            )
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            .service(
                web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
            )
            .service(
                web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
            )
            .service(
                web::resource("/{id}/cancel").route(web::put().to(leave_request::cancel_leave)),
            )
            .service(
                web::resource("/{id}/substitutes")
                    .route(web::get().to(leave_request::list_substitutes)),
            )
            .service(
                web::resource("/{id}/substitute")
                    .route(web::get().to(leave_request::get_coverage))
                    .route(web::put().to(leave_request::bind_substitute)),
            ),
    )
    .service(
        web::scope("/leave-balance")
            .service(web::resource("").route(web::post().to(leave_balance::open_balance)))
            .service(
                web::resource("/{employee_id}").route(web::get().to(leave_balance::get_balance)),
            ),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    match build_limiter(config.rate_protected_per_min) {
        Some(protected_limiter) => {
            cfg.service(
                web::scope(&config.api_prefix)
                    .wrap(protected_limiter) // rate limiting
                    .configure(leave_routes),
            );
        }
        None => {
            tracing::warn!(
                rate = config.rate_protected_per_min,
                "Rate limiter config rejected, serving without limits"
            );
            cfg.service(web::scope(&config.api_prefix).configure(leave_routes));
        }
    }
}
