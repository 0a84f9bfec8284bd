//! Profile aggregate recomputation.
//!
//! Report cards are the source of truth for CGPA, backlog counts, and
//! passed-semester tallies unless the profile opted into manual figures.

use crate::profiles::StudentProfile;

use super::calendar::AcademicCalendar;
use super::report_card::{round2, SemesterReportCard};

/// Recompute every derived aggregate on the profile from its report cards.
///
/// The pass-out year is only ever written on the save that clears the last
/// backlog of a student who has already finished all semesters and has not
/// dropped out. Any other save that starts from a recorded backlog wipes
/// the year again. Students who never had a backlog on record keep `None`.
pub fn recompute_profile(
    profile: &mut StudentProfile,
    cards: &[SemesterReportCard],
    calendar: &AcademicCalendar,
) {
    if profile.manually_specify_cgpa {
        return;
    }

    let previous_backlogs = profile.backlog_count;

    let complete_credits: f64 = cards
        .iter()
        .filter(|card| card.is_complete)
        .map(|card| card.total_credits)
        .sum();
    let weighted: f64 = cards
        .iter()
        .filter(|card| card.is_complete)
        .map(|card| card.sgpa * card.total_credits)
        .sum();
    profile.cgpa = if complete_credits > 0.0 {
        round2(weighted / complete_credits)
    } else {
        0.0
    };

    profile.backlog_count = cards.iter().map(|card| card.backlogs).sum();
    profile.passed_semesters = cards.iter().filter(|card| card.passed).count() as u32;

    if previous_backlogs > 0 {
        if profile.backlog_count == 0 && profile.passed_out() && !profile.dropped_out {
            profile.pass_out_year = Some(calendar.year);
        } else {
            profile.pass_out_year = None;
        }
    }
}

/// Extend the card list up to `semester`, synthesizing missing slots from
/// the template bank (or as empty cards when no template exists). Returns
/// how many cards were added.
pub fn fill_missing_cards<F>(
    cards: &mut Vec<SemesterReportCard>,
    semester: u32,
    year_of_exam: i32,
    template_for: F,
) -> usize
where
    F: Fn(u32) -> Option<SemesterReportCard>,
{
    let mut added = 0;
    while (cards.len() as u32) < semester {
        let slot = cards.len() as u32 + 1;
        let card = template_for(slot)
            .unwrap_or_else(|| SemesterReportCard::empty(slot, year_of_exam));
        cards.push(card);
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::academics::calendar::AcademicHalf;
    use crate::academics::report_card::Subject;
    use crate::identity::UserId;
    use crate::profiles::Course;

    fn card(semester: u32, credit: f64, grade: &str, points: f64, complete: bool) -> SemesterReportCard {
        let mut card = SemesterReportCard::empty(semester, 2024);
        card.subjects = vec![Subject {
            name: "Subject".into(),
            code: "CS000".into(),
            credit,
            letter_grade: grade.into(),
            passing_grade_point: 4.0,
            grade_point: points,
        }];
        card.is_complete = complete;
        card.recompute();
        card
    }

    fn calendar() -> AcademicCalendar {
        AcademicCalendar::new(2024, AcademicHalf::Odd)
    }

    #[test]
    fn cgpa_is_credit_weighted_over_complete_cards() {
        let mut profile = StudentProfile::new(UserId(1), 20210001001, Course::BTech, 1);
        let cards = vec![
            card(1, 4.0, "A", 8.0, true),
            card(2, 2.0, "B", 5.0, true),
            card(3, 9.0, "A", 9.0, false),
        ];
        recompute_profile(&mut profile, &cards, &calendar());
        // (8*4 + 5*2) / 6
        assert_eq!(profile.cgpa, 7.0);
        assert_eq!(profile.passed_semesters, 2);
    }

    #[test]
    fn manual_profiles_are_left_alone() {
        let mut profile = StudentProfile::new(UserId(1), 20210001001, Course::BTech, 1);
        profile.manually_specify_cgpa = true;
        profile.cgpa = 9.9;
        recompute_profile(&mut profile, &[card(1, 4.0, "F", 0.0, true)], &calendar());
        assert_eq!(profile.cgpa, 9.9);
        assert_eq!(profile.backlog_count, 0);
    }

    #[test]
    fn pass_out_year_needs_a_recorded_backlog_clearing() {
        let mut profile = StudentProfile::new(UserId(1), 20190001001, Course::MTech, 1);
        let clean: Vec<SemesterReportCard> = (1..=4).map(|s| card(s, 4.0, "A", 8.0, true)).collect();

        // straight-through students never get the year stamped
        recompute_profile(&mut profile, &clean, &calendar());
        assert!(profile.passed_out());
        assert_eq!(profile.pass_out_year, None);

        // a recorded backlog that later clears does
        let mut with_backlog = clean.clone();
        with_backlog[3] = card(4, 4.0, "F", 0.0, true);
        recompute_profile(&mut profile, &with_backlog, &calendar());
        assert_eq!(profile.backlog_count, 1);
        assert_eq!(profile.pass_out_year, None);

        recompute_profile(&mut profile, &clean, &calendar());
        assert_eq!(profile.backlog_count, 0);
        assert_eq!(profile.pass_out_year, Some(2024));
    }

    #[test]
    fn reappearing_backlogs_wipe_the_pass_out_year() {
        let mut profile = StudentProfile::new(UserId(1), 20190001001, Course::MTech, 1);
        let clean: Vec<SemesterReportCard> = (1..=4).map(|s| card(s, 4.0, "A", 8.0, true)).collect();
        let mut with_backlog = clean.clone();
        with_backlog[3] = card(4, 4.0, "F", 0.0, true);

        recompute_profile(&mut profile, &with_backlog, &calendar());
        recompute_profile(&mut profile, &clean, &calendar());
        assert_eq!(profile.pass_out_year, Some(2024));

        // a corrected card that reintroduces the backlog takes the year back
        recompute_profile(&mut profile, &with_backlog, &calendar());
        recompute_profile(&mut profile, &with_backlog, &calendar());
        assert_eq!(profile.pass_out_year, None);
    }

    #[test]
    fn missing_cards_are_synthesized_up_to_the_semester() {
        let mut cards = vec![card(1, 4.0, "A", 8.0, true)];
        let added = fill_missing_cards(&mut cards, 4, 2024, |_| None);
        assert_eq!(added, 3);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[3].semester, 4);
        assert!(cards[3].subjects.is_empty());
    }
}
