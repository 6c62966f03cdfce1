//! HTTP handlers and route configuration.

mod auth;
mod todo;

#[cfg(test)]
mod tests;

use actix_web::web;
use todolist_shared::dto::INVALID_INPUT;

use crate::middleware::auth::{AuthGate, AuthMiddleware};
use crate::middleware::error::AppError;

/// Body extractor config that answers malformed JSON with a 400.
/// `message` replaces the parser's own text when given.
fn json_config(message: Option<&'static str>) -> web::JsonConfig {
    web::JsonConfig::default().error_handler(move |err, _req| {
        tracing::error!(error = %err, "Rejected request body");
        let detail = message.map_or_else(|| err.to_string(), str::to_owned);
        AppError::BadRequest(detail).into()
    })
}

/// Configure all application routes. `gate` guards everything under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, gate: AuthGate) {
    cfg.app_data(json_config(None))
        // Protected routes
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware::new(gate))
                .route("/find_all_todolist", web::get().to(todo::find_all))
                .route("/find_by_id_todolist/{id}", web::get().to(todo::find_by_id))
                .service(
                    web::resource("/create_todolist")
                        .app_data(json_config(Some(INVALID_INPUT)))
                        .route(web::post().to(todo::create)),
                )
                .route("/update_todolist/{id}", web::put().to(todo::update))
                .route("/delete_todolist/{id}", web::delete().to(todo::delete)),
        )
        // Public routes
        .service(
            web::resource("/register")
                .app_data(json_config(Some("failed to create user")))
                .route(web::post().to(auth::register)),
        )
        .route("/login", web::post().to(auth::login));
}
