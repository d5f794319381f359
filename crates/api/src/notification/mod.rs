mod register_channel;
mod remove_channel;
pub mod send_due_notifications;

use actix_web::web;
use register_channel::register_channel_controller;
use remove_channel::remove_channel_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/channel", web::post().to(register_channel_controller));
    cfg.route(
        "/channel/{channel_id}",
        web::delete().to(remove_channel_controller),
    );
}
