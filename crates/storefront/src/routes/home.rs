//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use matgar_core::UiText;
use tracing::instrument;

use crate::routes::Layout;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Home page template: the product listing.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub ui: &'static UiText,
    pub products: Vec<ProductView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings();
    HomeTemplate {
        layout: Layout::new(settings),
        ui: settings.locale.ui_text(),
        products: state
            .catalog()
            .products()
            .iter()
            .map(|product| ProductView::new(product, settings.locale))
            .collect(),
    }
}
