// HTTP handler bindings for the arena bridge endpoints
//
// Thin wrappers that bind Rocket routes to the AgentService. Handlers only
// deserialize requests, delegate, and serialize responses; every decision
// lives behind the service.

use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::Value;

use crate::agent::AgentService;
use crate::types::{ArenaInit, Observation};

/// GET / endpoint
/// Returns agent metadata
#[get("/")]
pub fn index(service: &rocket::State<AgentService>) -> Json<Value> {
    Json(service.info())
}

/// POST /start endpoint
/// Carries the arena handshake (dimensions, starting map)
#[post("/start", format = "json", data = "<init>")]
pub fn start(service: &rocket::State<AgentService>, init: Json<ArenaInit>) -> Status {
    service.start(&init);
    Status::Ok
}

/// POST /move endpoint
/// Called each tick with the observation; returns the key command
#[post("/move", format = "json", data = "<obs>")]
pub fn get_move(service: &rocket::State<AgentService>, obs: Json<Observation>) -> Json<Value> {
    Json(service.tick(&obs))
}

/// POST /end endpoint
/// Called when a game ends
#[post("/end")]
pub fn end(service: &rocket::State<AgentService>) -> Status {
    service.end();
    Status::Ok
}
