use actix_web::web;

pub mod auth;
pub mod notifications;
pub mod organizations;
pub mod requests;
pub mod shifts;

use crate::handlers::{health, hello};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello).service(health).service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(organizations::configure)
            .configure(shifts::configure)
            .configure(requests::configure)
            .configure(notifications::configure),
    );
}
