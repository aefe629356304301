use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{auth, bookings, locations, tours};
use crate::AppState;

/// Gallery uploads carry up to five 5 MiB images plus form fields.
const UPLOAD_BODY_LIMIT: usize = 30 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile));

    // Booking creation is the public booking form; everything else is the
    // admin dashboard. Admin access is enforced by the claim extractors.
    let booking_routes = Router::new()
        .route("/", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/statistics", get(bookings::booking_statistics))
        .route(
            "/{id}",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route(
            "/{id}/send-notification",
            post(bookings::send_booking_notification),
        );

    let location_routes = Router::new()
        .route(
            "/",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/{id}",
            patch(locations::update_location).delete(locations::delete_location),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let tour_routes = Router::new()
        .route("/", get(tours::list_tours).post(tours::create_tour))
        .route("/upcoming", get(tours::upcoming_tours))
        .route(
            "/{id}",
            get(tours::get_tour)
                .patch(tours::update_tour)
                .delete(tours::delete_tour),
        )
        .route("/{id}/update-capacity", post(tours::update_tour_capacity));

    let media_dir = ServeDir::new(state.config.media_root.clone());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/tours", tour_routes)
        .nest_service("/media", media_dir)
        .with_state(state)
}
