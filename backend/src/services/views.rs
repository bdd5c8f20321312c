//! Dashboard and screen rendering

use std::sync::Arc;

use serde::Serialize;
use shared::{render, DashboardSummary, Screen, View};

use crate::session::Session;

/// A routed screen with its navigation metadata
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub view: View,
    pub label: &'static str,
    pub screen: Screen,
}

#[derive(Clone)]
pub struct ViewService {
    session: Arc<Session>,
}

impl ViewService {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.session.read())
    }

    /// Unknown ids render the dashboard
    pub async fn render(&self, view_id: &str) -> RenderedView {
        let view = View::from_id(view_id);
        let status = self.session.status();
        let draft = self.session.draft.lock().await.clone();
        let screen = render(view, status, &self.session.read(), &draft);
        RenderedView {
            view,
            label: view.label_es(),
            screen,
        }
    }
}
