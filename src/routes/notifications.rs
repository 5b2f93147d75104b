use actix_web::web;

use crate::handlers::notifications;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::get_notifications))
            .route(
                "/dispatch",
                web::post().to(notifications::dispatch_notifications),
            ),
    );
}
