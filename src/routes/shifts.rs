use actix_web::web;

use crate::handlers::shifts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::post().to(shifts::create_shift))
            .route("", web::get().to(shifts::get_shifts))
            // fixed segments ahead of "/{id}"
            .route("/pending", web::get().to(shifts::get_pending_shifts))
            .route("/history", web::get().to(shifts::get_history))
            .route("/{id}", web::get().to(shifts::get_shift))
            .route("/{id}", web::put().to(shifts::update_shift))
            .route("/{id}", web::delete().to(shifts::delete_shift))
            .route("/{id}/requests", web::post().to(shifts::submit_request))
            .route("/{id}/requests", web::get().to(shifts::get_shift_requests))
            .route(
                "/{id}/requests/{request_id}/approve",
                web::post().to(shifts::approve_request),
            ),
    );
}
