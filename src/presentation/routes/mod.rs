//! 路由配置模块
//!
//! 组织和配置所有HTTP路由

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::business::services::{SharedDonationService, SharedNotificationService};
use crate::infrastructure::EventBus;
use crate::presentation::handlers;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub donations: SharedDonationService,
    pub notifications: SharedNotificationService,
    pub bus: EventBus,
}

/// 创建应用路由
pub fn create_routes(state: AppState) -> Router {
    let donation_routes = Router::new()
        .route(
            "/",
            get(handlers::donations::list_donations).post(handlers::donations::create_donation),
        )
        .route("/check-availability", get(handlers::donations::check_availability))
        .route("/download/excel", post(handlers::exports::download_excel))
        .route("/send-emails", post(handlers::emails::send_emails))
        .route("/:id", put(handlers::donations::update_donation))
        .route("/:id/delete", put(handlers::donations::soft_delete_donation))
        .route("/:id/complete", put(handlers::donations::complete_donation))
        .route("/:id/restore", put(handlers::donations::restore_donation));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/socket", get(handlers::socket::socket_handler))
        .nest("/api/donations", donation_routes)
        .with_state(state)
        // 全局中间件
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
