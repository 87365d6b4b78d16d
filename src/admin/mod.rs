use crate::state::AppState;
use axum::Router;

mod colleges;
mod dto;
mod experiences;
mod stats;
mod users;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(stats::routes())
        .merge(users::routes())
        .merge(colleges::routes())
        .merge(experiences::routes())
}
