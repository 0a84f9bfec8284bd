use crate::infra::Portal;
use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use clap::Args;
use placement_cell::academics::{Subject, UpdateReportCard};
use placement_cell::board::{AnnouncementPayload, NewQuote};
use placement_cell::config::AppConfig;
use placement_cell::error::AppError;
use placement_cell::identity::{IdentityStore, RegisterUser, Role, UserId};
use placement_cell::profiles::{
    Course, NewRecruiterProfile, NewStaffProfile, NewStudentProfile, Qualification,
    StaffDesignation,
};
use placement_cell::recruitment::{
    ApplicantFilter, ApplicantSort, JobType, NewApplication, OutcomeInstructions, PostPayload,
    SalaryType, StartDate, WorkplaceType,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the walkthrough date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Console walkthrough of one recruitment season: accounts, profiles, a
/// posting, an application moving through the pipeline, and first-semester
/// results.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = Utc::now();
    let portal = Portal::new(&config);

    println!("== Placement cell walkthrough ({today}) ==\n");

    // Bootstrap one superuser directly; everything after goes through the
    // services.
    let mut admin = portal
        .store
        .create_user("Meera".into(), "Iyer".into(), Role::Staff);
    admin.is_superuser = true;
    admin.is_approved = true;
    let admin = portal.store.save_user(admin)?;
    portal.profiles.create_staff(
        admin.id,
        admin.id,
        NewStaffProfile {
            qualification: Qualification::Phd,
            designation: StaffDesignation::Professor,
            id_number: Some("FAC-014".into()),
        },
    )?;
    portal.profiles.make_tpc_head(admin.id, admin.id)?;
    println!("seeded superuser {} ({})", admin.full_name, admin.id);

    let verify_email = |owner: UserId, address: &str| -> Result<(), AppError> {
        let email = portal.identity.add_email(owner, owner, address.into())?;
        portal.identity.request_verification(owner, email.id, now)?;
        let code = portal
            .mailer
            .sent()
            .last()
            .map(|mail| mail.code.clone())
            .unwrap_or_default();
        portal.identity.verify_email(owner, email.id, &code, now)?;
        Ok(())
    };

    // A student registers, verifies an email, and gets a profile.
    let student = portal.identity.register(RegisterUser {
        first_name: "Asha".into(),
        last_name: "Verma".into(),
        role: Role::Student,
    })?;
    verify_email(student.id, "asha.verma@campus.edu")?;
    portal.identity.approve(admin.id, student.id)?;
    portal.profiles.create_student(
        admin.id,
        student.id,
        NewStudentProfile {
            registration_number: 20_230_456_789,
            course: Course::BTech,
            id_number: 42,
        },
    )?;
    for skill in ["Rust", "SQL", "Data Structures"] {
        portal.identity.add_skill(student.id, student.id, skill)?;
    }
    let view = portal.profiles.student_view(admin.id, student.id, today)?;
    println!(
        "registered student {} (roll {}, id card {})",
        student.full_name, view.roll_number, view.id_card
    );

    // A recruiter posts an opening.
    let recruiter = portal.identity.register(RegisterUser {
        first_name: "Rohan".into(),
        last_name: "Mehta".into(),
        role: Role::Recruiter,
    })?;
    verify_email(recruiter.id, "rohan.mehta@helios.example")?;
    portal.identity.approve(admin.id, recruiter.id)?;
    portal.profiles.create_recruiter(
        admin.id,
        recruiter.id,
        NewRecruiterProfile {
            company_name: "Helios Systems".into(),
            designation: "Engineering Manager".into(),
        },
    )?;
    let post = portal.recruitment.create_post(
        recruiter.id,
        PostPayload {
            title: "Backend Engineering Intern".into(),
            company: "Helios Systems".into(),
            location: Some("Bengaluru".into()),
            job_type: JobType::Internship,
            workplace_type: WorkplaceType::Hybrid,
            salary_type: SalaryType::Specified,
            salary_currency: "INR".into(),
            salary: 40_000,
            application_fee: 0,
            experience_years: 0,
            start_date: StartDate::Immediately,
            description: "Six month internship on the storage team.".into(),
            requirements: "Comfort with systems programming.".into(),
            required_documents: vec!["Resume".into()],
            questionnaire: vec!["Why this team?".into()],
            apply_by: today + Duration::days(14),
            instructions: OutcomeInstructions {
                pending: "We review applications weekly.".into(),
                shortlisted: "Expect an interview invite within three days.".into(),
                selected: "Congratulations! Offer letter follows by mail.".into(),
                rejected: "Thank you for applying.".into(),
            },
        },
        today,
    )?;
    for skill in ["Rust", "Distributed Systems"] {
        portal.recruitment.add_post_skill(recruiter.id, post.id, skill)?;
    }
    println!("recruiter {} posted \"{}\"", recruiter.full_name, post.title);

    // The student applies and the recruiter works the pipeline.
    let application = portal.recruitment.apply(
        student.id,
        post.id,
        NewApplication {
            cover_letter: "I have shipped two Rust side projects.".into(),
            answers: vec!["The storage problems look hard and interesting.".into()],
        },
        today,
    )?;
    println!(
        "application {} submitted ({})",
        application.application.id.0, application.instructions
    );

    let rows = portal.recruitment.applicants(
        recruiter.id,
        post.id,
        &ApplicantFilter::default(),
        ApplicantSort::default(),
        false,
    )?;
    for row in &rows {
        println!(
            "  applicant {} matches {} required skills ({} others)",
            row.name, row.skill_matches, row.other_skills_count
        );
    }

    let shortlisted = portal
        .recruitment
        .shortlist(recruiter.id, application.application.id)?;
    println!("shortlisted: {}", shortlisted.instructions);
    // Outcomes only move back through pending.
    portal
        .recruitment
        .reset(recruiter.id, application.application.id)?;
    let selected = portal
        .recruitment
        .select(recruiter.id, application.application.id)?;
    println!("selected: {}", selected.instructions);

    // First-semester results land.
    let profile = portal.academics.update_report_card(
        admin.id,
        student.id,
        1,
        UpdateReportCard {
            year_of_exam: today.year(),
            subjects: vec![
                Subject {
                    name: "Mathematics I".into(),
                    code: "MA101".into(),
                    credit: 4.0,
                    letter_grade: "A".into(),
                    passing_grade_point: 4.0,
                    grade_point: 9.0,
                },
                Subject {
                    name: "Programming Fundamentals".into(),
                    code: "CS101".into(),
                    credit: 4.0,
                    letter_grade: "O".into(),
                    passing_grade_point: 4.0,
                    grade_point: 10.0,
                },
            ],
            is_complete: true,
        },
        today,
    )?;
    println!(
        "semester 1 recorded: cgpa {:.2}, backlogs {}",
        profile.cgpa, profile.backlog_count
    );

    // The board carries the news.
    portal.board.create_notice(
        admin.id,
        AnnouncementPayload {
            title: "Helios Systems internship results".into(),
            body: "Selected candidates have been notified by email.".into(),
        },
    )?;
    portal.board.add_quote(
        admin.id,
        NewQuote {
            quote: "Opportunities multiply as they are seized.".into(),
            author: "Sun Tzu".into(),
            source: Some("The Art of War".into()),
            fictional: false,
        },
    )?;
    let landing = portal.board.landing();
    println!("\nlanding page:");
    println!("  hod says: {}", landing.message_from_hod);
    println!("  tpc head says: {}", landing.message_from_tpc_head);
    for notice in &landing.notices {
        println!("  notice: {}", notice.title);
    }
    if let Some(quote) = &landing.quote {
        println!("  quote of the day: \"{}\" - {}", quote.quote, quote.author);
    }

    let dashboard = portal.recruitment.dashboard(today);
    println!(
        "\ndashboard: {} posts ({} active), {} applications ({} selected)",
        dashboard.total_posts,
        dashboard.active_posts,
        dashboard.total_applications,
        dashboard.selected
    );

    Ok(())
}
