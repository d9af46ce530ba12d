use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::fees::controller::{
    create_fee, delete_fee, get_fee, get_fees, preview_fee, update_fee,
};
use crate::state::AppState;

pub fn init_fees_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_fee).get(get_fees))
        .route("/preview", post(preview_fee))
        .route(
            "/{id}",
            get(get_fee)
                .put(update_fee)
                .patch(update_fee)
                .delete(delete_fee),
        )
}
