use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use dexsim_core::{Distance, Error};
use dexsim_similarity::{CategoryLabels, Family, GroupWeights, QueryEngine, SimilarEntry};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_SINGLE_K: i64 = 25;
const DEFAULT_COMBINED_K: i64 = 10;

fn default_single_k() -> i64 {
    DEFAULT_SINGLE_K
}

#[derive(Deserialize)]
struct FindSimilarRequest {
    pokemon: String,
    #[serde(default = "default_single_k")]
    k: i64,
    family: Option<String>,
}

#[derive(Deserialize)]
struct CombinedRequest {
    pokemon: String,
    k: Option<i64>,
    algorithm: Option<String>,
    #[serde(default)]
    explain: bool,
    #[serde(flatten)]
    weights: GroupWeights,
}

/// Shared, read-only state behind every handler
#[derive(Clone)]
pub struct AppState {
    engine: Arc<QueryEngine>,
    labels: Arc<CategoryLabels>,
}

impl AppState {
    pub fn new(engine: QueryEngine, labels: CategoryLabels) -> Self {
        Self {
            engine: Arc::new(engine),
            labels: Arc::new(labels),
        }
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: AppState, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(RestApi::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register every route on `cfg`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/find_similar", web::post().to(find_similar))
            .route("/find_similar/combined", web::post().to(find_similar_combined))
            .route("/vectors/strengths", web::get().to(default_strengths))
            .route("/pokemon", web::get().to(list_pokemon))
            .route("/constants", web::get().to(constants));
    }
}

/// Lookup key as the catalog stores it
fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn clamp_k(k: i64) -> usize {
    usize::try_from(k).unwrap_or(0)
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": message.to_string()
    }))
}

fn error_response(err: Error, pokemon: &str) -> HttpResponse {
    match err {
        Error::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": err.to_string(),
            "pokemon": pokemon
        })),
        Error::EmptyCandidateSet(_) => HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": err.to_string()
        })),
        Error::InvalidConfig(_) => bad_request(err),
        other => {
            tracing::error!("Query for {} failed: {}", pokemon, other);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": other.to_string()
            }))
        }
    }
}

fn respond(result: dexsim_core::Result<Vec<SimilarEntry>>, pokemon: &str) -> HttpResponse {
    match result {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => error_response(e, pokemon),
    }
}

async fn find_similar(
    state: web::Data<AppState>,
    req: web::Json<FindSimilarRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let pokemon = normalize_name(&req.pokemon);
    let family = match req.family.as_deref().map(str::parse::<Family>) {
        None => Family::default(),
        Some(Ok(family)) => family,
        Some(Err(e)) => return Ok(bad_request(e)),
    };

    let result = state.engine.find_similar(&pokemon, clamp_k(req.k), family);
    Ok(respond(result, &pokemon))
}

async fn find_similar_combined(
    state: web::Data<AppState>,
    req: web::Json<CombinedRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let pokemon = normalize_name(&req.pokemon);
    let distance = match req.algorithm.as_deref().map(str::parse::<Distance>) {
        None => Distance::default(),
        Some(Ok(distance)) => distance,
        Some(Err(e)) => return Ok(bad_request(e)),
    };
    let k = clamp_k(req.k.unwrap_or(DEFAULT_COMBINED_K));

    tracing::debug!(
        "Combined query for {} (k={}, {}, explain={})",
        pokemon,
        k,
        distance,
        req.explain
    );

    // Building the composite space is CPU-bound
    let engine = Arc::clone(&state.engine);
    let name = pokemon.clone();
    let weights = req.weights;
    let explain = req.explain;
    let result = web::block(move || {
        if explain {
            engine.find_similar_combined_explained(&name, k, distance, &weights)
        } else {
            engine.find_similar_combined(&name, k, distance, &weights)
        }
    })
    .await;

    match result {
        Ok(result) => Ok(respond(result, &pokemon)),
        Err(e) => {
            tracing::error!("Combined query worker failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "query worker failed"
            })))
        }
    }
}

async fn default_strengths(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.engine.default_weights()))
}

async fn list_pokemon(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.engine.catalog().records()))
}

async fn constants(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "types": state.labels.types,
        "egg_groups": state.labels.egg_groups,
        "colors": state.labels.colors,
        "habitats": state.labels.habitats,
        "shapes": state.labels.shapes,
        "normalization": state.engine.constants(),
    })))
}
