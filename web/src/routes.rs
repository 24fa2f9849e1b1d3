use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, Responder};
use credit_client::{ApiClient, ClientState, PredictionForm};
use log::{info, warn};

use crate::envelope::{ApiResponse, Health};
use crate::page;
use crate::session::{SessionStore, SESSION_COOKIE};

pub struct AppState {
    pub client: ApiClient,
    pub sessions: SessionStore,
}

fn session(req: &HttpRequest, app: &AppState) -> (String, bool) {
    let cookie = req.cookie(SESSION_COOKIE);
    app.sessions.resolve(cookie.as_ref().map(|c| c.value()))
}

fn remember(builder: &mut HttpResponseBuilder, id: &str, created: bool) {
    if created {
        builder.cookie(
            Cookie::build(SESSION_COOKIE, id.to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish(),
        );
    }
}

fn back_to_page(id: &str, created: bool) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, "/"));
    remember(&mut builder, id, created);
    builder.finish()
}

pub async fn index(req: HttpRequest, app: web::Data<AppState>) -> impl Responder {
    let (id, created) = session(&req, &app);
    let html = app.sessions.with(&id, |state| page::render(state));

    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    remember(&mut builder, &id, created);
    builder.body(html)
}

pub async fn train(req: HttpRequest, app: web::Data<AppState>) -> impl Responder {
    let (id, created) = session(&req, &app);
    let token = app.sessions.with(&id, ClientState::begin_training);

    info!("Training requested");
    let result = app.client.train().await;
    if let Err(e) = &result {
        warn!("Training failed: {e}");
    }
    app.sessions.with(&id, |state| state.finish_training(token, result));

    back_to_page(&id, created)
}

pub async fn predict(
    req: HttpRequest,
    app: web::Data<AppState>,
    form: web::Form<PredictionForm>,
) -> impl Responder {
    let (id, created) = session(&req, &app);
    let form = form.into_inner();
    let submission = app.sessions.with(&id, |state| {
        state.form = form;
        state.submit_prediction()
    });

    match submission {
        Some((token, request)) => {
            let result = app.client.predict(&request).await;
            if let Err(e) = &result {
                warn!("Prediction failed: {e}");
            }
            app.sessions.with(&id, |state| state.finish_prediction(token, result));
        }
        None => info!("Prediction form rejected before sending"),
    }

    back_to_page(&id, created)
}

pub async fn health(app: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(Health {
        status: "ok",
        backend: app.client.config().base_url.clone(),
        sessions: app.sessions.len(),
    }))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ApiResponse::<String>::error("Endpoint not found"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/train", web::post().to(train))
        .route("/predict", web::post().to(predict))
        .route("/health", web::get().to(health));
}
