use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::modules::schedules::controller::{
    bulk_update_schedules, create_schedule, delete_schedule, get_schedule, get_schedules,
    get_timetable, update_schedule, update_schedule_status, validate_schedules,
};
use crate::state::AppState;

pub fn init_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_schedule).get(get_schedules))
        .route("/bulk", patch(bulk_update_schedules))
        .route("/validate", post(validate_schedules))
        .route("/timetable", get(get_timetable))
        .route(
            "/{id}",
            get(get_schedule)
                .put(update_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        )
        .route("/{id}/status", patch(update_schedule_status))
}
