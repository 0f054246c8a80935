pub mod auth;
pub mod courses;
pub mod enrollments;

pub use auth::AuthService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
