pub mod auth;

pub mod courses;

pub mod enrollments;

pub use auth::configure_auth_routes;
pub use courses::configure_courses_routes;
pub use enrollments::configure_enrollments_routes;
