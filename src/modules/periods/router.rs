use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::periods::controller::{
    create_period, delete_period, get_period, get_periods, update_period,
};
use crate::state::AppState;

pub fn init_periods_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_period).get(get_periods))
        .route(
            "/{id}",
            get(get_period)
                .put(update_period)
                .patch(update_period)
                .delete(delete_period),
        )
}
