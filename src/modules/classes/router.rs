use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::classes::controller::{
    create_class, create_class_section, create_section, delete_class, delete_section, get_class,
    get_class_sections, get_classes, get_section, get_sections, update_class, update_section,
};
use crate::state::AppState;

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class).get(get_classes))
        .route(
            "/{id}",
            get(get_class)
                .put(update_class)
                .patch(update_class)
                .delete(delete_class),
        )
        .route(
            "/{id}/sections",
            get(get_class_sections).post(create_class_section),
        )
}

pub fn init_sections_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_section).get(get_sections))
        .route(
            "/{id}",
            get(get_section)
                .put(update_section)
                .patch(update_section)
                .delete(delete_section),
        )
}
