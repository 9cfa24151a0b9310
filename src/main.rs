#[macro_use]
extern crate rocket;

use log::info;
use rocket::fairing::AdHoc;
use std::env;

mod agent;
mod config;
mod debug_logger;
mod distance;
mod engine;
mod grid;
mod handler;
mod loop_guard;
mod state;
mod types;

#[launch]
fn rocket() -> _ {
    // Hosting services usually hand out the port via the `PORT` environment
    // variable, while Rocket looks at `ROCKET_PORT`; bridge the two.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // Default to 'info' level logging unless `RUST_LOG` is already set.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting gridviper agent server...");

    // Load configuration once at startup
    let config = config::Config::load_or_default();
    let debug = debug_logger::DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);
    let service = agent::AgentService::new(config, debug);

    rocket::build()
        .manage(service)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "gridviper");
            })
        }))
        .mount(
            "/",
            routes![handler::index, handler::start, handler::get_move, handler::end],
        )
}
