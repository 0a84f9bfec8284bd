//! Integration tests for accounts, contact books, verification,
//! and the chair roles that hang off staff profiles.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};

    use placement_cell::config::{AcademicsConfig, VerificationConfig};
    use placement_cell::identity::{
        Email, IdentityService, IdentityStore, RegisterUser, Role, User, UserId,
    };
    use placement_cell::mailer::MemoryMailer;
    use placement_cell::profiles::ProfileService;
    use placement_cell::settings::{MemorySettings, SettingsStore};
    use placement_cell::store::MemoryStore;

    pub(super) const TTL_MINUTES: i64 = 15;

    pub(super) struct Env {
        pub(super) store: Arc<MemoryStore>,
        pub(super) mailer: Arc<MemoryMailer>,
        pub(super) identity: IdentityService<MemoryStore, MemoryMailer>,
        pub(super) profiles: ProfileService<MemoryStore>,
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
                &VerificationConfig {
                    ttl_minutes: TTL_MINUTES,
                },
            ),
            profiles: ProfileService::new(store.clone(), settings),
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

    pub(super) fn register(env: &Env, first: &str, role: Role) -> User {
        env.identity
            .register(RegisterUser {
                first_name: first.to_string(),
                last_name: "Menon".to_string(),
                role,
            })
            .expect("register")
    }

    pub(super) fn sent_code(env: &Env) -> String {
        env.mailer.sent().last().expect("code sent").code.clone()
    }

    pub(super) fn verified_email(env: &Env, owner: UserId, address: &str, now: DateTime<Utc>) -> Email {
        let email = env
            .identity
            .add_email(owner, owner, address.to_string())
            .expect("add email");
        env.identity
            .request_verification(owner, email.id, now)
            .expect("request code");
        env.identity
            .verify_email(owner, email.id, &sent_code(env), now)
            .expect("verify")
    }
}

mod verification {
    use super::common::*;
    use chrono::{Duration, Utc};
    use placement_cell::error::PortalError;
    use placement_cell::identity::Role;

    #[test]
    fn approval_waits_for_a_verified_primary_email() {
        let env = env();
        let admin = admin(&env);
        let user = register(&env, "Asha", Role::Student);

        assert!(matches!(
            env.identity.approve(admin, user.id),
            Err(PortalError::PermissionDenied { .. })
        ));

        verified_email(&env, user.id, "asha@campus.edu", Utc::now());
        let approved = env.identity.approve(admin, user.id).expect("approve");
        assert!(approved.is_approved);
    }

    #[test]
    fn stale_codes_no_longer_verify() {
        let env = env();
        let user = register(&env, "Bina", Role::Student);
        let now = Utc::now();
        let email = env
            .identity
            .add_email(user.id, user.id, "bina@campus.edu".to_string())
            .expect("add email");
        env.identity
            .request_verification(user.id, email.id, now)
            .expect("request code");
        let code = sent_code(&env);

        let late = now + Duration::minutes(TTL_MINUTES + 1);
        assert!(matches!(
            env.identity.verify_email(user.id, email.id, &code, late),
            Err(PortalError::Conflict(_))
        ));
    }

    #[test]
    fn wrong_codes_are_rejected() {
        let env = env();
        let user = register(&env, "Charu", Role::Student);
        let now = Utc::now();
        let email = env
            .identity
            .add_email(user.id, user.id, "charu@campus.edu".to_string())
            .expect("add email");
        env.identity
            .request_verification(user.id, email.id, now)
            .expect("request code");

        assert!(matches!(
            env.identity
                .verify_email(user.id, email.id, "000000", now),
            Err(PortalError::Conflict(_))
        ));
    }

    #[test]
    fn rejection_removes_the_unapproved_account() {
        let env = env();
        let admin = admin(&env);
        let user = register(&env, "Devak", Role::Recruiter);

        env.identity.reject(admin, user.id).expect("reject");
        assert!(matches!(
            env.identity.get_user(admin, user.id),
            Err(PortalError::NotFound { .. })
        ));
    }
}

mod contacts {
    use super::common::*;
    use chrono::Utc;
    use placement_cell::error::PortalError;
    use placement_cell::identity::Role;

    #[test]
    fn the_first_phone_becomes_primary_and_cannot_be_deleted() {
        let env = env();
        let user = register(&env, "Esha", Role::Student);

        let first = env
            .identity
            .add_phone(user.id, user.id, 91, "9876543210".to_string())
            .expect("first phone");
        let second = env
            .identity
            .add_phone(user.id, user.id, 91, "9123456780".to_string())
            .expect("second phone");

        let account = env
            .identity
            .get_user(user.id, user.id)
            .expect("own account");
        assert_eq!(account.primary_phone, Some(first.id));

        assert!(matches!(
            env.identity.delete_phone(user.id, first.id),
            Err(PortalError::PermissionDenied { .. })
        ));

        env.identity
            .set_primary_phone(user.id, user.id, second.id)
            .expect("switch primary");
        env.identity
            .delete_phone(user.id, first.id)
            .expect("old primary now deletable");
    }

    #[test]
    fn strangers_cannot_edit_someone_elses_contact_book() {
        let env = env();
        let owner = register(&env, "Farah", Role::Student);
        let stranger = register(&env, "Girish", Role::Student);

        assert!(matches!(
            env.identity
                .add_email(stranger.id, owner.id, "spoof@campus.edu".to_string()),
            Err(PortalError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn verified_addresses_never_request_codes_again() {
        let env = env();
        let user = register(&env, "Hema", Role::Student);
        let now = Utc::now();
        let email = verified_email(&env, user.id, "hema@campus.edu", now);

        assert!(matches!(
            env.identity.request_verification(user.id, email.id, now),
            Err(PortalError::PermissionDenied { .. })
        ));
    }
}

mod chairs {
    use super::common::*;
    use chrono::Utc;
    use placement_cell::identity::Role;
    use placement_cell::profiles::{
        Course, NewStaffProfile, NewStudentProfile, Qualification, StaffDesignation,
    };

    fn staff(env: &Env, admin: placement_cell::identity::UserId, first: &str) -> placement_cell::identity::UserId {
        let user = register(env, first, Role::Staff);
        env.profiles
            .create_staff(
                admin,
                user.id,
                NewStaffProfile {
                    qualification: Qualification::Phd,
                    designation: StaffDesignation::AssistantProfessor,
                    id_number: None,
                },
            )
            .expect("staff profile");
        user.id
    }

    #[test]
    fn the_hod_chair_moves_in_one_step() {
        let env = env();
        let admin = admin(&env);
        let first = staff(&env, admin, "Indira");
        let second = staff(&env, admin, "Jagan");

        env.profiles.make_hod(admin, first).expect("seat first");
        let moved = env.profiles.make_hod(admin, second).expect("move chair");
        assert!(moved.is_hod);

        let vacated = env.profiles.get_staff(admin, first).expect("old holder");
        assert!(!vacated.is_hod);
        let account = env.identity.get_user(admin, second).expect("new holder");
        assert!(account.is_coordinator);
    }

    #[test]
    fn doctoral_staff_pick_up_the_honorific() {
        let env = env();
        let admin = admin(&env);
        let id = staff(&env, admin, "Kavita");
        let account = env.identity.get_user(admin, id).expect("account");
        assert!(account.is_doctor);
        assert_eq!(account.full_name, "Dr. Kavita Menon");
    }

    #[test]
    fn granting_cr_approves_the_account() {
        let env = env();
        let admin = admin(&env);
        let user = register(&env, "Lata", Role::Student);
        verified_email(&env, user.id, "lata@campus.edu", Utc::now());
        env.profiles
            .create_student(
                admin,
                user.id,
                NewStudentProfile {
                    registration_number: 20_260_456_789,
                    course: Course::BTech,
                    id_number: 31,
                },
            )
            .expect("profile");

        let profile = env.profiles.make_cr(admin, user.id).expect("grant cr");
        assert!(profile.is_cr);
        let account = env.identity.get_user(admin, user.id).expect("account");
        assert!(account.is_approved);
    }
}
