pub mod create_medicine;
pub mod delete_medicine;
mod get_medicines;
mod subscribers;
pub mod update_medicine;

use actix_web::web;
use create_medicine::create_medicine_controller;
use delete_medicine::delete_medicine_controller;
use get_medicines::get_medicines_controller;
use update_medicine::update_medicine_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/medicine", web::post().to(create_medicine_controller));
    cfg.route("/medicine", web::get().to(get_medicines_controller));
    cfg.route(
        "/medicine/{medicine_id}",
        web::put().to(update_medicine_controller),
    );
    cfg.route(
        "/medicine/{medicine_id}",
        web::delete().to(delete_medicine_controller),
    );
}
