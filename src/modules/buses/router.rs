use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::buses::controller::{
    create_bus, delete_bus, get_bus, get_bus_students, get_buses, update_bus,
};
use crate::state::AppState;

pub fn init_buses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_bus).get(get_buses))
        .route(
            "/{id}",
            get(get_bus)
                .put(update_bus)
                .patch(update_bus)
                .delete(delete_bus),
        )
        .route("/{id}/students", get(get_bus_students))
}
