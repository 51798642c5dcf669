use super::*;
use crate::gameroom::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(config: HostingConfig) -> Result<(), std::io::Error> {
        let storage: Arc<dyn Storage> = match config.data_dir {
            Some(ref dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::default()),
        };
        let state = web::Data::new(Casino::new(storage, RoomConfig::default()));
        log::info!("starting hosting server on {}", config.bind);
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
                .route("/rooms", web::post().to(open))
                .route("/rooms/{code}", web::delete().to(close))
                .route("/rooms/{code}/ws", web::get().to(enter))
        })
        .workers(config.workers)
        .bind(config.bind.as_str())?
        .run()
        .await
    }
}

async fn open(casino: web::Data<Casino>) -> impl Responder {
    match casino.open().await {
        Ok(code) => HttpResponse::Ok().json(serde_json::json!({ "code": code.as_str() })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn close(casino: web::Data<Casino>, path: web::Path<String>) -> impl Responder {
    let code = match RoomCode::try_from(path.as_str()) {
        Ok(code) => code,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    match casino.close(&code).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "closed" })),
        Err(e) => HttpResponse::NotFound().body(e.to_string()),
    }
}

async fn enter(
    casino: web::Data<Casino>,
    path: web::Path<String>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let code = match RoomCode::try_from(path.as_str()) {
        Ok(code) => code,
        Err(e) => {
            return HttpResponse::BadRequest()
                .body(e.to_string())
                .map_into_right_body();
        }
    };
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => match casino.bridge(&code, session, stream).await {
            Ok(()) => response.map_into_left_body(),
            Err(e) => HttpResponse::NotFound()
                .body(e.to_string())
                .map_into_right_body(),
        },
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}
