use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use skilldex_core::{Error, QueryHandler};
use std::sync::Arc;

const NO_TEXT: &str = "No text provided";

/// Where and how the HTTP server listens
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; actix picks one per core when unset
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: None,
        }
    }
}

#[derive(Deserialize)]
struct GetSkillsRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SkillsResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<String>,
    skills: Vec<String>,
}

impl SkillsResponse {
    fn success(input: String, skills: Vec<String>) -> Self {
        Self {
            status: "success",
            message: "Skills fetched successfully".to_string(),
            input: Some(input),
            skills,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            input: None,
            skills: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    rows: usize,
    model: String,
    dim: usize,
    version: &'static str,
}

pub struct RestApi;

impl RestApi {
    /// Serve until the server is stopped. The handler must be fully loaded.
    pub async fn start(handler: Arc<QueryHandler>, config: ServerConfig) -> std::io::Result<()> {
        tracing::info!(host = %config.host, port = config.port, "starting HTTP server");

        let mut server = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(handler.clone()))
                .configure(Self::configure)
        });
        if let Some(workers) = config.workers {
            server = server.workers(workers);
        }

        server.bind((config.host.as_str(), config.port))?.run().await
    }

    /// Register the routes; expects `web::Data<Arc<QueryHandler>>` in app data.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/get_skills", web::post().to(get_skills))
            .route("/get_skills", web::method(Method::OPTIONS).to(allow_get_skills))
            .route("/health", web::get().to(health));
    }
}

async fn get_skills(
    handler: web::Data<Arc<QueryHandler>>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    // Anything that is not a JSON object with a usable `text` is a missing text.
    let req: GetSkillsRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable get_skills body");
            return Ok(HttpResponse::BadRequest().json(SkillsResponse::error(NO_TEXT)));
        }
    };

    let text = match req.text {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(HttpResponse::BadRequest().json(SkillsResponse::error(NO_TEXT))),
    };
    let k = req.top_k.unwrap_or(handler.config().top_k);
    if k == 0 {
        return Ok(HttpResponse::BadRequest().json(SkillsResponse::error(NO_TEXT)));
    }

    let handler = handler.get_ref().clone();
    let input = text.clone();
    let result = web::block(move || handler.handle_with_k(&text, k)).await;

    match result {
        Ok(Ok(skills)) => {
            tracing::debug!(k, tokens = skills.len(), "skills fetched");
            Ok(HttpResponse::Ok().json(SkillsResponse::success(input, skills)))
        }
        Ok(Err(Error::InvalidInput(message))) => {
            Ok(HttpResponse::BadRequest().json(SkillsResponse::error(message)))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "skill lookup failed");
            Ok(HttpResponse::InternalServerError().json(SkillsResponse::error(e.to_string())))
        }
        Err(e) => {
            tracing::error!(error = %e, "blocking pool unavailable");
            Ok(HttpResponse::InternalServerError().json(SkillsResponse::error(e.to_string())))
        }
    }
}

/// Plain OPTIONS without CORS preflight headers; preflights are answered by `Cors`.
async fn allow_get_skills() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ALLOW, "POST, OPTIONS"))
        .finish()
}

async fn health(handler: web::Data<Arc<QueryHandler>>) -> ActixResult<HttpResponse> {
    let context = handler.context();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        rows: context.corpus().len(),
        model: context.encoder().model_id().to_string(),
        dim: context.encoder().dim(),
        version: env!("CARGO_PKG_VERSION"),
    }))
}
