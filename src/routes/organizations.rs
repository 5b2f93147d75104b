use actix_web::web;

use crate::handlers::organizations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/organizations")
            .route("/{id}", web::get().to(organizations::get_organization)),
    );
}
