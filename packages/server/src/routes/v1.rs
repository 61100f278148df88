use utoipa_axum::router::OpenApiRouter;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/blueprints", handlers::blueprint::routes())
}
