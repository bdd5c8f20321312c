//! Dashboard, routed screens and queued notices

use axum::{extract::Path, Json};
use shared::{DashboardSummary, Notice};

use crate::middleware::UserSession;
use crate::services::views::{RenderedView, ViewService};

pub async fn get_dashboard(UserSession(session): UserSession) -> Json<DashboardSummary> {
    Json(ViewService::new(session).dashboard())
}

pub async fn render_view(
    UserSession(session): UserSession,
    Path(view_id): Path<String>,
) -> Json<RenderedView> {
    Json(ViewService::new(session).render(&view_id).await)
}

/// Drain notices raised by background subscriptions
pub async fn drain_notifications(UserSession(session): UserSession) -> Json<Vec<Notice>> {
    Json(session.drain_notices())
}
