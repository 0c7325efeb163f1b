mod handler;
mod model;

pub use handler::{get_career, get_course, get_internship, list_careers};
pub use model::CareerResponse;
