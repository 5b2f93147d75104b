use actix_web::web;

use crate::handlers::requests;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/requests").route("/{id}", web::get().to(requests::get_request)));
}
