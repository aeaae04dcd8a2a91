//! The department's static course catalog.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::account::Level;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub code: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub level: Level,
    /// `first` or `second`.
    pub semester: Cow<'static, str>,
}

macro_rules! course {
    ($code:literal, $name:literal, $level:literal, $semester:literal) => {
        Course {
            code: Cow::Borrowed($code),
            name: Cow::Borrowed($name),
            level: Level($level),
            semester: Cow::Borrowed($semester),
        }
    };
}

pub static COURSES: &[Course] = &[
    // 100 level, first semester
    course!("GST 111", "Communication in English", 100, "first"),
    course!("LIB 101", "Use of library, Study skills and information communication technology", 100, "first"),
    course!("GEL 101", "Principles and practices of excellent living", 100, "first"),
    course!("ECO 101", "Principles of Economics", 100, "first"),
    course!("BUI-ACC 105", "Business Law", 100, "first"),
    course!("ACC 101", "Introduction to Financial Accounting I", 100, "first"),
    course!("AMS 101", "Principles of Management", 100, "first"),
    course!("AMS 103", "Introduction to Computing", 100, "first"),

    // 100 level, second semester
    course!("GEL 102", "Public Speaking Essentials", 100, "second"),
    course!("AMS 102", "Basic Mathematics", 100, "second"),
    course!("AMS 104", "Principles of Project Management", 100, "second"),
    course!("BUI-ACC 104", "Basic Cost Accounting", 100, "second"),
    course!("BUI-ACC 106", "Business Communications", 100, "second"),
    course!("BUI-ACC 108", "Introduction to Financial Systems I", 100, "second"),
    course!("ACC 102", "Introduction to Financial Accounting II", 100, "second"),
    course!("GST 112", "Nigerian people and culture", 100, "second"),
    course!("EES 101", "Fundamentals of Entrepreneurship", 100, "second"),

    // 200 level, first semester
    course!("ACC 201", "Financial Accounting I", 200, "first"),
    course!("ACC 203", "Cooperate Governance and Accounting Ethics", 200, "first"),
    course!("ENT 211", "Entrepreneurship and Innovation", 200, "first"),
    course!("BUI-ACC 205", "Public Sector Accounting and Reporting I", 200, "first"),
    course!("BUI-ACC 207", "Management Information System", 200, "first"),
    course!("BUI-GEL 203", "Principles and Fundamentals of Godly Living", 200, "first"),
    course!("BUI-ITC 201", "Information Technology Certificate I", 200, "first"),
    course!("BUA 205", "Leadership and Governance", 200, "first"),

    // 200 level, second semester
    course!("ACC 202", "Financial Accounting II", 200, "second"),
    course!("ACC 204", "Cost Accounting", 200, "second"),
    course!("ACC 206", "Accounting Laboratory", 200, "second"),
    course!("GST 212", "Philosophy, Logic and Human Existence", 200, "second"),
    course!("BUI-GEL 202", "Godly Disposition", 200, "second"),
    course!("BUI-EES 203", "Knowledge Acquisition", 200, "second"),
    course!("BUI-ITC 202", "Information Technology II", 200, "second"),
    course!("BUA 218", "Green Management", 200, "second"),

    // 300 level, first semester
    course!("ACC 301", "Financial Reporting I", 300, "first"),
    course!("ACC 303", "Management Accounting I", 300, "first"),
    course!("ACC 305", "Taxation I", 300, "first"),
    course!("ACC 307", "Audit and Assurance I", 300, "first"),
    course!("BUI-ACC 309", "Financial Management I", 300, "first"),
    course!("ACC 311", "Entrepreneurship in Accounting", 300, "first"),
    course!("BUI-GEL 303", "Sustainable Leadership, Governance and Development", 300, "first"),
    course!("BUI-EES 301", "Knowledge Application", 300, "first"),
    course!("ITC 303", "Analysing Data with Power BI", 300, "first"),
    course!("BUA 313", "Innovation Management", 300, "first"),

    // 300 level, second semester
    course!("ACC 302", "Financial Reporting II", 300, "second"),
    course!("ACC 308", "Public Accounting Sector and Reporting II", 300, "second"),
    course!("GST 312", "Peace and Conflict Resolution", 300, "second"),
    course!("ENT 312", "Venture Creation", 300, "second"),
    course!("BUI-ACC 304", "Accounting Research Methodology I", 300, "second"),
    course!("BUI-GEL 304", "Leadership Imperative Enquiry", 300, "second"),
    course!("BUA 312", "Small Business Management", 300, "second"),

    // 400 level, first semester
    course!("ACC 401", "Management Accounting I", 400, "first"),
    course!("ACC 403", "Financial Regulatory Framework and Ethics", 400, "first"),
    course!("ACC 405", "International Accounting", 400, "first"),
    course!("ACC 407", "Advanced Financial Accounting I", 400, "first"),
    course!("ACC 409", "Strategic Financial Management", 400, "first"),
    course!("ACC 431", "Management Information System", 400, "first"),
    course!("BUS 401", "Business Policy and Strategy 1", 400, "first"),
    course!("EES 401", "Strategies for Improving Employability", 400, "first"),
    course!("GEL 401", "Godly Family", 400, "first"),

    // 400 level, second semester
    course!("ACC 402", "Management Accounting II", 400, "second"),
    course!("ACC 404", "Taxation and Fiscal Policy II", 400, "second"),
    course!("ACC 406", "Auditing and Assurance", 400, "second"),
    course!("ACC 408", "Advanced Financial Accounting II", 400, "second"),
    course!("ACC 432", "Public Sector Accounting and Finance II", 400, "second"),
    course!("ACC 434", "Research Project", 400, "second"),
    course!("EES 402", "Unveiling Entrepreneurs", 400, "second"),
];

/// Courses of the given level.
pub fn by_level(level: u16) -> impl Iterator<Item = &'static Course> {
    COURSES.iter().filter(move |c| c.level.get() == level)
}

/// Courses of the given level and semester.
pub fn by_level_and_semester<'a>(
    level: u16,
    semester: &'a str,
) -> impl Iterator<Item = &'static Course> + 'a {
    by_level(level).filter(move |c| c.semester == semester)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_both_semesters() {
        for level in Level::ALL {
            assert!(by_level_and_semester(level.get(), "first").count() > 0);
            assert!(by_level_and_semester(level.get(), "second").count() > 0);
        }
    }

    #[test]
    fn filters_are_exact() {
        assert!(by_level(300).all(|c| c.level.get() == 300));
        assert_eq!(by_level(300).count(), 17);
        assert_eq!(by_level_and_semester(300, "first").count(), 10);
        assert_eq!(by_level(250).count(), 0);
        assert_eq!(by_level_and_semester(100, "third").count(), 0);
    }
}
