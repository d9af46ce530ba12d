use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::payments::controller::{
    delete_payment, get_payment, get_payments, record_payment,
};
use crate::state::AppState;

pub fn init_payments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_payment).get(get_payments))
        .route("/{id}", get(get_payment).delete(delete_payment))
}
