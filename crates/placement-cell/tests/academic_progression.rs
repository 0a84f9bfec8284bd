//! Integration tests for academic standing: derived calendar
//! fields, report card entry, and the aggregates they drive.

mod common {
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};

    use placement_cell::academics::AcademicsService;
    use placement_cell::config::{AcademicsConfig, VerificationConfig};
    use placement_cell::identity::{IdentityService, IdentityStore, RegisterUser, Role, UserId};
    use placement_cell::mailer::MemoryMailer;
    use placement_cell::profiles::{Course, NewStudentProfile, ProfileService};
    use placement_cell::settings::{MemorySettings, SettingsStore};
    use placement_cell::store::MemoryStore;

    pub(super) struct Env {
        pub(super) store: Arc<MemoryStore>,
        pub(super) mailer: Arc<MemoryMailer>,
        pub(super) identity: IdentityService<MemoryStore, MemoryMailer>,
        pub(super) profiles: ProfileService<MemoryStore>,
        pub(super) academics: AcademicsService<MemoryStore>,
    }

    pub(super) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 15).expect("valid date")
    }

    pub(super) fn env() -> Env {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::seeded(&AcademicsConfig {
            academic_half: "odd".to_string(),
        }));
        Env {
            identity: IdentityService::new(
                store.clone(),
                mailer.clone(),
                &VerificationConfig { ttl_minutes: 15 },
            ),
            profiles: ProfileService::new(store.clone(), settings.clone()),
            academics: AcademicsService::new(store.clone(), settings),
            store,
            mailer,
        }
    }

    pub(super) fn admin(env: &Env) -> UserId {
        let mut user = env
            .store
            .create_user("Priya".to_string(), "Nair".to_string(), Role::Staff);
        user.is_superuser = true;
        user.is_approved = true;
        env.store.save_user(user).expect("save admin").id
    }

    pub(super) fn student(
        env: &Env,
        admin: UserId,
        first: &str,
        registration_number: u64,
    ) -> UserId {
        let user = env
            .identity
            .register(RegisterUser {
                first_name: first.to_string(),
                last_name: "Kulkarni".to_string(),
                role: Role::Student,
            })
            .expect("register");
        let now = Utc::now();
        let email = env
            .identity
            .add_email(
                user.id,
                user.id,
                format!("{}@campus.edu", first.to_lowercase()),
            )
            .expect("email");
        env.identity
            .request_verification(user.id, email.id, now)
            .expect("code");
        let code = env.mailer.sent().last().expect("sent").code.clone();
        env.identity
            .verify_email(user.id, email.id, &code, now)
            .expect("verify");
        env.identity.approve(admin, user.id).expect("approve");
        env.profiles
            .create_student(
                admin,
                user.id,
                NewStudentProfile {
                    registration_number,
                    course: Course::BTech,
                    id_number: 21,
                },
            )
            .expect("profile");
        user.id
    }
}

mod calendar_fields {
    use super::common::*;

    #[test]
    fn year_and_semester_follow_the_academic_calendar() {
        let env = env();
        let admin = admin(&env);
        // Registered in 2023, viewed in the odd half of 2026: third year.
        let user = student(&env, admin, "Asha", 20_230_456_789);

        let view = env
            .profiles
            .student_view(admin, user, today())
            .expect("view");
        assert_eq!(view.profile.registration_year, 2023);
        assert_eq!(view.year, 3);
        assert_eq!(view.semester, 5);
        assert_eq!(view.roll_number, "52623");
    }

    #[test]
    fn year_is_clamped_to_the_course_duration() {
        let env = env();
        let admin = admin(&env);
        // Registered in 2019: a BTech runs four years, not seven.
        let user = student(&env, admin, "Bela", 20_190_456_789);

        let view = env
            .profiles
            .student_view(admin, user, today())
            .expect("view");
        assert_eq!(view.year, 4);
        assert_eq!(view.semester, 7);
    }
}

mod grades {
    use super::common::*;
    use placement_cell::academics::{Subject, UpdateReportCard};

    fn subject(code: &str, credit: f64, grade: &str, points: f64, passing: f64) -> Subject {
        Subject {
            name: code.to_string(),
            code: code.to_string(),
            credit,
            letter_grade: grade.to_string(),
            passing_grade_point: passing,
            grade_point: points,
        }
    }

    #[test]
    fn failed_subjects_contribute_their_passing_points_to_the_sgpa() {
        let env = env();
        let admin = admin(&env);
        let user = student(&env, admin, "Chitra", 20_250_456_789);

        let profile = env
            .academics
            .update_report_card(
                admin,
                user,
                1,
                UpdateReportCard {
                    year_of_exam: 2026,
                    subjects: vec![
                        subject("MA101", 4.0, "F", 0.0, 6.0),
                        subject("CS101", 4.0, "A", 9.0, 4.0),
                    ],
                    is_complete: true,
                },
                today(),
            )
            .expect("save card");

        // (4*6 + 4*9) / 8
        let cards = env
            .academics
            .report_cards(admin, user, today())
            .expect("cards");
        assert_eq!(cards[0].sgpa, 7.5);
        assert_eq!(cards[0].backlogs, 1);
        assert!(!cards[0].passed);
        assert_eq!(profile.backlog_count, 1);
        assert_eq!(profile.passed_semesters, 0);
    }

    #[test]
    fn incomplete_semesters_stay_out_of_the_cgpa() {
        let env = env();
        let admin = admin(&env);
        let user = student(&env, admin, "Divya", 20_250_456_790);

        env.academics
            .update_report_card(
                admin,
                user,
                1,
                UpdateReportCard {
                    year_of_exam: 2026,
                    subjects: vec![subject("MA101", 4.0, "A", 8.0, 4.0)],
                    is_complete: true,
                },
                today(),
            )
            .expect("complete card");
        let profile = env
            .academics
            .update_report_card(
                admin,
                user,
                2,
                UpdateReportCard {
                    year_of_exam: 2026,
                    subjects: vec![subject("CS102", 4.0, "O", 10.0, 4.0)],
                    is_complete: false,
                },
                today(),
            )
            .expect("partial card");

        assert_eq!(profile.cgpa, 8.0);
        assert_eq!(profile.passed_semesters, 1);
    }

    #[test]
    fn clearing_the_last_backlog_stamps_the_pass_out_year() {
        let env = env();
        let admin = admin(&env);
        let user = student(&env, admin, "Esha", 20_210_456_789);

        // Seven clean semesters, then a final semester with one backlog.
        for semester in 1..=7 {
            env.academics
                .update_report_card(
                    admin,
                    user,
                    semester,
                    UpdateReportCard {
                        year_of_exam: 2021 + (semester as i32 - 1) / 2,
                        subjects: vec![subject("CS100", 4.0, "A", 8.0, 4.0)],
                        is_complete: true,
                    },
                    today(),
                )
                .expect("clean semester");
        }
        let with_backlog = env
            .academics
            .update_report_card(
                admin,
                user,
                8,
                UpdateReportCard {
                    year_of_exam: 2025,
                    subjects: vec![subject("MA401", 4.0, "F", 0.0, 6.0)],
                    is_complete: true,
                },
                today(),
            )
            .expect("backlog recorded");
        assert_eq!(with_backlog.backlog_count, 1);
        assert_eq!(with_backlog.passed_semesters, 7);
        assert_eq!(with_backlog.pass_out_year, None);

        let cleared = env
            .academics
            .update_report_card(
                admin,
                user,
                8,
                UpdateReportCard {
                    year_of_exam: 2026,
                    subjects: vec![subject("MA401", 4.0, "C", 6.0, 6.0)],
                    is_complete: true,
                },
                today(),
            )
            .expect("backlog cleared");
        assert_eq!(cleared.backlog_count, 0);
        assert_eq!(cleared.passed_semesters, 8);
        assert_eq!(cleared.pass_out_year, Some(2026));
    }

    #[test]
    fn manual_figures_replace_the_card_pipeline() {
        use placement_cell::academics::ManualCgpa;

        let env = env();
        let admin = admin(&env);
        let user = student(&env, admin, "Farah", 20_250_456_791);
        env.academics
            .update_report_card(
                admin,
                user,
                1,
                UpdateReportCard {
                    year_of_exam: 2026,
                    subjects: vec![subject("MA101", 4.0, "A", 8.0, 4.0)],
                    is_complete: true,
                },
                today(),
            )
            .expect("card");

        let profile = env
            .academics
            .set_manual_cgpa(
                admin,
                user,
                ManualCgpa {
                    cgpa: 8.8,
                    backlog_count: 0,
                    passed_semesters: 6,
                },
            )
            .expect("manual figures");

        assert!(profile.manually_specify_cgpa);
        assert_eq!(profile.cgpa, 8.8);
        assert_eq!(profile.passed_semesters, 6);
    }
}

mod templates {
    use super::common::*;
    use placement_cell::academics::{SemesterReportCardTemplate, TemplateSubject, UNGRADED};
    use placement_cell::profiles::Course;

    #[test]
    fn missing_cards_are_synthesized_from_the_template_bank() {
        let env = env();
        let admin = admin(&env);
        env.academics
            .upsert_template(
                admin,
                SemesterReportCardTemplate {
                    course: Course::BTech,
                    semester: 1,
                    subjects: vec![TemplateSubject {
                        name: "Mathematics I".to_string(),
                        code: "MA101".to_string(),
                        credit: 4.0,
                        passing_grade_point: 4.0,
                    }],
                },
            )
            .expect("template");

        let user = student(&env, admin, "Gita", 20_260_456_789);
        let cards = env
            .academics
            .report_cards(admin, user, today())
            .expect("cards");

        assert!(!cards.is_empty());
        assert_eq!(cards[0].subjects.len(), 1);
        assert_eq!(cards[0].subjects[0].letter_grade, UNGRADED);
        assert!(!cards[0].is_complete);
    }
}
