use serde::Serialize;

use crate::catalog::{CareerDetail, Course, Internship};

/// 职业详情，附带关联的课程和实习
#[derive(Debug, Serialize)]
pub struct CareerResponse {
    #[serde(flatten)]
    pub career: CareerDetail,
    pub related_courses: Vec<&'static Course>,
    pub related_internships: Vec<&'static Internship>,
}

impl From<CareerDetail> for CareerResponse {
    fn from(career: CareerDetail) -> Self {
        Self {
            related_courses: career.related_courses(),
            related_internships: career.related_internships(),
            career,
        }
    }
}
