use super::ratelimit::Limits;
use super::view::GameView;
use crate::engine::Autopilot;
use crate::engine::Engine;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

struct State {
    engine: Engine,
    pilot: Autopilot,
    limits: Limits,
}

pub struct Server;

impl Server {
    pub async fn run(bind: &str, engine: Engine, pilot: Autopilot) -> Result<(), std::io::Error> {
        let state = web::Data::new(Arc::new(State {
            engine,
            pilot,
            limits: Limits::default(),
        }));
        log::info!("starting hosting server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/health", web::get().to(health))
                .route("/games", web::post().to(create))
                .route("/games/{game_id}", web::get().to(spectate))
                .route("/games/{game_id}/cancel", web::post().to(cancel))
                .route("/standings", web::get().to(standings))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}

fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct CreateBody {
    #[serde(default)]
    dev: bool,
}

/// manual force-create: skips the autonomous gates, keeps the
/// roster and buy-in checks, and counts against the rate limits
async fn create(
    state: web::Data<Arc<State>>,
    req: HttpRequest,
    body: Option<web::Json<CreateBody>>,
) -> impl Responder {
    if !state.limits.admit(&client_ip(&req), None) {
        return HttpResponse::TooManyRequests().body("rate limited");
    }
    let dev = body.map(|b| b.dev).unwrap_or(false);
    match state.pilot.force(dev).await {
        Ok(outcome) if outcome.created => HttpResponse::Ok().json(serde_json::json!({
            "created": true,
            "game_id": outcome.game,
        })),
        Ok(outcome) => HttpResponse::Conflict().json(serde_json::json!({
            "created": false,
            "reason": outcome.reason,
        })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn spectate(state: web::Data<Arc<State>>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.engine.store().game(id).await {
        Ok(Some(versioned)) => HttpResponse::Ok().json(GameView::from(&versioned.doc)),
        Ok(None) => HttpResponse::NotFound().body("no such game"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn cancel(
    state: web::Data<Arc<State>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    if !state.limits.admit(&client_ip(&req), Some(&id.to_string())) {
        return HttpResponse::TooManyRequests().body("rate limited");
    }
    match state.engine.cancel(id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "status": "cancelled" })),
        Ok(false) => HttpResponse::Conflict().body("game is not running"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn standings(state: web::Data<Arc<State>>) -> impl Responder {
    match state.engine.store().players_by_balance().await {
        Ok(players) => {
            let rows = players
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    serde_json::json!({
                        "rank": i + 1,
                        "model": p.model,
                        "balance": p.balance,
                        "games_played": p.games_played,
                        "games_won": p.games_won,
                        "biggest_win": p.biggest_win,
                        "biggest_loss": p.biggest_loss,
                    })
                })
                .collect::<Vec<serde_json::Value>>();
            HttpResponse::Ok().json(rows)
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
