//! 职业探索目录
//!
//! 数据在编译期固定，查询结果都是 `'static` 引用。

mod data;

use serde::Serialize;

pub use data::{COURSES, DOMAINS, INTERNSHIPS};

#[derive(Debug, Serialize)]
pub struct Career {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub subjects: &'static [&'static str],
    pub skills: &'static [&'static str],
    pub courses: &'static [&'static str],
    pub internships: &'static [&'static str],
}

/// 职业领域，例如 Technology、Medicine
#[derive(Debug, Serialize)]
pub struct Domain {
    pub name: &'static str,
    pub careers: &'static [Career],
}

#[derive(Debug, Serialize)]
pub struct Course {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub level: &'static str,
    pub duration: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub skills_gained: &'static [&'static str],
    pub related_careers: &'static [&'static str],
    pub link: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Internship {
    pub id: &'static str,
    pub name: &'static str,
    pub domain: &'static str,
    pub company: &'static str,
    pub duration: &'static str,
    pub location: &'static str,
    pub skills_required: &'static [&'static str],
    pub eligibility: &'static str,
    pub description: &'static str,
    pub how_to_apply: &'static str,
}

/// 带所属领域的职业
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CareerDetail {
    #[serde(flatten)]
    pub career: &'static Career,
    pub domain: &'static str,
}

impl CareerDetail {
    pub fn related_courses(&self) -> Vec<&'static Course> {
        self.career.courses.iter().filter_map(|id| course_by_id(id)).collect()
    }

    pub fn related_internships(&self) -> Vec<&'static Internship> {
        self.career
            .internships
            .iter()
            .filter_map(|id| internship_by_id(id))
            .collect()
    }
}

pub fn careers_by_domain() -> &'static [Domain] {
    DOMAINS
}

pub fn career_by_id(career_id: &str) -> Option<CareerDetail> {
    DOMAINS.iter().find_map(|domain| {
        domain
            .careers
            .iter()
            .find(|career| career.id == career_id)
            .map(|career| CareerDetail {
                career,
                domain: domain.name,
            })
    })
}

pub fn course_by_id(course_id: &str) -> Option<&'static Course> {
    COURSES.iter().find(|course| course.id == course_id)
}

pub fn internship_by_id(internship_id: &str) -> Option<&'static Internship> {
    INTERNSHIPS.iter().find(|internship| internship.id == internship_id)
}
