use crate::services::RefreshProcessor;
use crate::types::RefreshOutcome;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use std::sync::Arc;

pub(crate) async fn run_refresh(refresh_processor: Data<Arc<RefreshProcessor>>) -> impl Responder {
    let outcome = RefreshOutcome::from(refresh_processor.run().await);
    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(outcome.body)
}
