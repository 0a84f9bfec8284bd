//! The academic progression engine.
//!
//! Nothing positional is stored: year, semester, and roll numbers are
//! derived from the academic calendar on demand, while CGPA, backlog counts,
//! and pass-out years are recomputed from report cards on every card save.

pub mod calendar;
pub mod progression;
pub mod report_card;
pub mod repository;
pub mod router;
pub mod service;

pub use calendar::{AcademicCalendar, AcademicHalf};
pub use progression::{fill_missing_cards, recompute_profile};
pub use report_card::{
    SemesterReportCard, SemesterReportCardTemplate, Subject, TemplateSubject, UNGRADED,
};
pub use repository::AcademicsStore;
pub use router::academics_router;
pub use service::{AcademicsService, ManualCgpa, UpdateReportCard};
