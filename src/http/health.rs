use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub(crate) async fn readiness_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok", "version": crate::VERSION }))
}
