pub mod get_day_detail;
pub mod get_month_indicator;

use actix_web::web;
use get_day_detail::get_day_detail_controller;
use get_month_indicator::get_month_indicator_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/calendar/day/{date}", web::get().to(get_day_detail_controller));
    cfg.route(
        "/calendar/{year_month}",
        web::get().to(get_month_indicator_controller),
    );
}
