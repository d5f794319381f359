pub mod set_intake_status;
pub mod sync_instances;

use actix_web::web;
use set_intake_status::set_intake_status_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/instance/{instance_id}/status",
        web::put().to(set_intake_status_controller),
    );
}
