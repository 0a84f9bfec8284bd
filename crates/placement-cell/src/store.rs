//! The in-memory store backing every domain repository trait.
//!
//! One mutex guards the whole state, so multi-record operations (primary
//! reassignment, chair steals, card saves with aggregate recomputation) are
//! atomic: no reader ever observes them half-applied.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::academics::{fill_missing_cards, recompute_profile, AcademicCalendar};
use crate::academics::{AcademicsStore, SemesterReportCard, SemesterReportCardTemplate};
use crate::authz::Directory;
use crate::board::{Announcement, AnnouncementId, AnnouncementKind, ContactMessage, MessageId};
use crate::board::{BoardStore, Quote, QuoteId};
use crate::catalog::{normalized, Language, LanguageId, Skill, SkillId};
use crate::error::PortalError;
use crate::identity::{
    Address, AddressId, Email, EmailId, IdentityStore, Link, LinkId, Phone, PhoneId, Role, User,
    UserId, VerificationState,
};
use crate::profiles::{
    Course, ProfileStore, RecruiterProfile, StaffProfile, StudentProfile,
};
use crate::recruitment::{
    ApplicationId, PostId, RecruitmentApplication, RecruitmentPost, RecruitmentStore,
};

#[derive(Default)]
struct State {
    next_id: u64,
    users: BTreeMap<UserId, User>,
    emails: BTreeMap<EmailId, Email>,
    phones: BTreeMap<PhoneId, Phone>,
    addresses: BTreeMap<AddressId, Address>,
    links: BTreeMap<LinkId, Link>,
    students: BTreeMap<UserId, StudentProfile>,
    staff: BTreeMap<UserId, StaffProfile>,
    recruiters: BTreeMap<UserId, RecruiterProfile>,
    report_cards: BTreeMap<UserId, Vec<SemesterReportCard>>,
    templates: BTreeMap<(Course, u32), SemesterReportCardTemplate>,
    skills: BTreeMap<SkillId, Skill>,
    languages: BTreeMap<LanguageId, Language>,
    user_skills: BTreeMap<UserId, BTreeSet<SkillId>>,
    user_languages: BTreeMap<UserId, BTreeSet<LanguageId>>,
    posts: BTreeMap<PostId, RecruitmentPost>,
    applications: BTreeMap<ApplicationId, RecruitmentApplication>,
    announcements: BTreeMap<AnnouncementId, Announcement>,
    quotes: BTreeMap<QuoteId, Quote>,
    messages: BTreeMap<MessageId, ContactMessage>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Re-derive the display names and doctoral flag from the current staff
    /// record.
    fn refresh_user(&mut self, id: UserId) {
        let is_doctor = self
            .staff
            .get(&id)
            .map(|staff| staff.qualification.is_doctoral())
            .unwrap_or(false);
        if let Some(user) = self.users.get_mut(&id) {
            user.refresh_derived(is_doctor);
        }
    }

    fn get_or_create_skill(&mut self, name: &str) -> Skill {
        let wanted = normalized(name);
        if let Some(existing) = self
            .skills
            .values()
            .find(|skill| normalized(&skill.name) == wanted)
        {
            return existing.clone();
        }
        let skill = Skill {
            id: SkillId(self.next_id()),
            name: name.trim().to_string(),
        };
        self.skills.insert(skill.id, skill.clone());
        skill
    }

    fn get_or_create_language(&mut self, name: &str) -> Language {
        let wanted = normalized(name);
        if let Some(existing) = self
            .languages
            .values()
            .find(|language| normalized(&language.name) == wanted)
        {
            return existing.clone();
        }
        let language = Language {
            id: LanguageId(self.next_id()),
            name: name.trim().to_string(),
        };
        self.languages.insert(language.id, language.clone());
        language
    }
}

/// The concrete store shared by all services.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }
}

impl Directory for MemoryStore {
    fn user(&self, id: UserId) -> Option<User> {
        self.state().users.get(&id).cloned()
    }

    fn superusers(&self) -> Vec<UserId> {
        self.state()
            .users
            .values()
            .filter(|user| user.is_superuser)
            .map(|user| user.id)
            .collect()
    }

    fn coordinators(&self) -> Vec<UserId> {
        self.state()
            .users
            .values()
            .filter(|user| user.is_coordinator)
            .map(|user| user.id)
            .collect()
    }

    fn hod_holder(&self) -> Option<UserId> {
        self.state()
            .staff
            .values()
            .find(|staff| staff.is_hod)
            .map(|staff| staff.user)
    }

    fn tpc_head_holder(&self) -> Option<UserId> {
        self.state()
            .staff
            .values()
            .find(|staff| staff.is_tpc_head)
            .map(|staff| staff.user)
    }

    fn course_crs(&self, course: Course) -> Vec<UserId> {
        self.state()
            .students
            .values()
            .filter(|student| student.is_cr && student.course == course)
            .map(|student| student.user)
            .collect()
    }

    fn primary_email_verified(&self, user: UserId) -> bool {
        let state = self.state();
        state
            .users
            .get(&user)
            .and_then(|user| user.primary_email)
            .and_then(|id| state.emails.get(&id))
            .map(|email| email.verification.is_verified())
            .unwrap_or(false)
    }
}

impl IdentityStore for MemoryStore {
    fn create_user(&self, first_name: String, last_name: String, role: Role) -> User {
        let mut state = self.state();
        let user = User::new(UserId(state.next_id()), first_name, last_name, role);
        state.users.insert(user.id, user.clone());
        user
    }

    fn users(&self) -> Vec<User> {
        self.state().users.values().cloned().collect()
    }

    fn save_user(&self, user: User) -> Result<User, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user.id) {
            return Err(PortalError::not_found("user", user.id.0));
        }
        let id = user.id;
        state.users.insert(id, user);
        state.refresh_user(id);
        Ok(state.users[&id].clone())
    }

    fn delete_user(&self, id: UserId) -> Result<(), PortalError> {
        let mut state = self.state();
        if state.users.remove(&id).is_none() {
            return Err(PortalError::not_found("user", id.0));
        }
        state.emails.retain(|_, email| email.user != id);
        state.phones.retain(|_, phone| phone.user != id);
        state.addresses.retain(|_, address| address.user != id);
        state.links.retain(|_, link| link.user != id);
        state.students.remove(&id);
        state.staff.remove(&id);
        state.recruiters.remove(&id);
        state.report_cards.remove(&id);
        state.user_skills.remove(&id);
        state.user_languages.remove(&id);
        for post in state.posts.values_mut() {
            if post.owner == Some(id) {
                post.owner = None;
            }
        }
        for application in state.applications.values_mut() {
            if application.user == Some(id) {
                application.user = None;
            }
        }
        for announcement in state.announcements.values_mut() {
            if announcement.author == Some(id) {
                announcement.author = None;
            }
        }
        Ok(())
    }

    fn add_email(&self, user: UserId, address: String) -> Result<Email, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found("user", user.0));
        }
        let wanted = normalized(&address);
        if state
            .emails
            .values()
            .any(|email| normalized(&email.address) == wanted)
        {
            return Err(PortalError::conflict("email address already registered"));
        }
        let email = Email {
            id: EmailId(state.next_id()),
            user,
            address,
            verification: VerificationState::Unverified,
        };
        state.emails.insert(email.id, email.clone());
        let owner = state.users.get_mut(&user).expect("owner checked above");
        if owner.primary_email.is_none() {
            owner.primary_email = Some(email.id);
        }
        Ok(email)
    }

    fn email(&self, id: EmailId) -> Option<Email> {
        self.state().emails.get(&id).cloned()
    }

    fn save_email(&self, email: Email) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.emails.contains_key(&email.id) {
            return Err(PortalError::not_found("email", email.id.0));
        }
        state.emails.insert(email.id, email);
        Ok(())
    }

    fn delete_email(&self, id: EmailId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .emails
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("email", id.0))
    }

    fn emails_of(&self, user: UserId) -> Vec<Email> {
        self.state()
            .emails
            .values()
            .filter(|email| email.user == user)
            .cloned()
            .collect()
    }

    fn set_primary_email(&self, user: UserId, email: EmailId) -> Result<(), PortalError> {
        let mut state = self.state();
        match state.emails.get(&email) {
            None => return Err(PortalError::not_found("email", email.0)),
            Some(record) if record.user != user => {
                return Err(PortalError::conflict("email belongs to another user"))
            }
            Some(_) => {}
        }
        let owner = state
            .users
            .get_mut(&user)
            .ok_or(PortalError::not_found("user", user.0))?;
        owner.primary_email = Some(email);
        Ok(())
    }

    fn add_phone(
        &self,
        user: UserId,
        country_code: u16,
        number: String,
    ) -> Result<Phone, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found("user", user.0));
        }
        let phone = Phone {
            id: PhoneId(state.next_id()),
            user,
            country_code,
            number,
        };
        state.phones.insert(phone.id, phone.clone());
        let owner = state.users.get_mut(&user).expect("owner checked above");
        if owner.primary_phone.is_none() {
            owner.primary_phone = Some(phone.id);
        }
        Ok(phone)
    }

    fn phone(&self, id: PhoneId) -> Option<Phone> {
        self.state().phones.get(&id).cloned()
    }

    fn delete_phone(&self, id: PhoneId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .phones
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("phone", id.0))
    }

    fn phones_of(&self, user: UserId) -> Vec<Phone> {
        self.state()
            .phones
            .values()
            .filter(|phone| phone.user == user)
            .cloned()
            .collect()
    }

    fn set_primary_phone(&self, user: UserId, phone: PhoneId) -> Result<(), PortalError> {
        let mut state = self.state();
        match state.phones.get(&phone) {
            None => return Err(PortalError::not_found("phone", phone.0)),
            Some(record) if record.user != user => {
                return Err(PortalError::conflict("phone belongs to another user"))
            }
            Some(_) => {}
        }
        let owner = state
            .users
            .get_mut(&user)
            .ok_or(PortalError::not_found("user", user.0))?;
        owner.primary_phone = Some(phone);
        Ok(())
    }

    fn add_address(&self, address: Address) -> Result<Address, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&address.user) {
            return Err(PortalError::not_found("user", address.user.0));
        }
        let address = Address {
            id: AddressId(state.next_id()),
            ..address
        };
        state.addresses.insert(address.id, address.clone());
        let owner = state
            .users
            .get_mut(&address.user)
            .expect("owner checked above");
        if owner.primary_address.is_none() {
            owner.primary_address = Some(address.id);
        }
        Ok(address)
    }

    fn address(&self, id: AddressId) -> Option<Address> {
        self.state().addresses.get(&id).cloned()
    }

    fn delete_address(&self, id: AddressId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .addresses
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("address", id.0))
    }

    fn addresses_of(&self, user: UserId) -> Vec<Address> {
        self.state()
            .addresses
            .values()
            .filter(|address| address.user == user)
            .cloned()
            .collect()
    }

    fn set_primary_address(&self, user: UserId, address: AddressId) -> Result<(), PortalError> {
        let mut state = self.state();
        match state.addresses.get(&address) {
            None => return Err(PortalError::not_found("address", address.0)),
            Some(record) if record.user != user => {
                return Err(PortalError::conflict("address belongs to another user"))
            }
            Some(_) => {}
        }
        let owner = state
            .users
            .get_mut(&user)
            .ok_or(PortalError::not_found("user", user.0))?;
        owner.primary_address = Some(address);
        Ok(())
    }

    fn add_link(&self, user: UserId, title: String, url: String) -> Result<Link, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found("user", user.0));
        }
        let link = Link {
            id: LinkId(state.next_id()),
            user,
            title,
            url,
        };
        state.links.insert(link.id, link.clone());
        Ok(link)
    }

    fn link(&self, id: LinkId) -> Option<Link> {
        self.state().links.get(&id).cloned()
    }

    fn delete_link(&self, id: LinkId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .links
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("link", id.0))
    }

    fn links_of(&self, user: UserId) -> Vec<Link> {
        self.state()
            .links
            .values()
            .filter(|link| link.user == user)
            .cloned()
            .collect()
    }

    fn add_user_skill(&self, user: UserId, name: &str) -> Result<Skill, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found("user", user.0));
        }
        let skill = state.get_or_create_skill(name);
        state.user_skills.entry(user).or_default().insert(skill.id);
        Ok(skill)
    }

    fn remove_user_skill(&self, user: UserId, skill: SkillId) -> Result<(), PortalError> {
        let mut state = self.state();
        let attached = state
            .user_skills
            .get_mut(&user)
            .map(|set| set.remove(&skill))
            .unwrap_or(false);
        if attached {
            Ok(())
        } else {
            Err(PortalError::not_found("skill", skill.0))
        }
    }

    fn user_skills(&self, user: UserId) -> Vec<Skill> {
        let state = self.state();
        state
            .user_skills
            .get(&user)
            .map(|set| {
                set.iter()
                    .filter_map(|id| state.skills.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_user_language(&self, user: UserId, name: &str) -> Result<Language, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found("user", user.0));
        }
        let language = state.get_or_create_language(name);
        state
            .user_languages
            .entry(user)
            .or_default()
            .insert(language.id);
        Ok(language)
    }

    fn remove_user_language(&self, user: UserId, language: LanguageId) -> Result<(), PortalError> {
        let mut state = self.state();
        let attached = state
            .user_languages
            .get_mut(&user)
            .map(|set| set.remove(&language))
            .unwrap_or(false);
        if attached {
            Ok(())
        } else {
            Err(PortalError::not_found("language", language.0))
        }
    }

    fn user_languages(&self, user: UserId) -> Vec<Language> {
        let state = self.state();
        state
            .user_languages
            .get(&user)
            .map(|set| {
                set.iter()
                    .filter_map(|id| state.languages.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ProfileStore for MemoryStore {
    fn create_student_profile(
        &self,
        profile: StudentProfile,
    ) -> Result<StudentProfile, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&profile.user) {
            return Err(PortalError::not_found("user", profile.user.0));
        }
        if state.students.contains_key(&profile.user) {
            return Err(PortalError::conflict("user already has a student profile"));
        }
        if state
            .students
            .values()
            .any(|existing| existing.registration_number == profile.registration_number)
        {
            return Err(PortalError::conflict("registration number already taken"));
        }
        state.students.insert(profile.user, profile.clone());
        Ok(profile)
    }

    fn student(&self, user: UserId) -> Option<StudentProfile> {
        self.state().students.get(&user).cloned()
    }

    fn save_student(&self, profile: StudentProfile) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.students.contains_key(&profile.user) {
            return Err(PortalError::not_found("student profile", profile.user.0));
        }
        state.students.insert(profile.user, profile);
        Ok(())
    }

    fn students(&self) -> Vec<StudentProfile> {
        self.state().students.values().cloned().collect()
    }

    fn set_cr(&self, user: UserId, value: bool) -> Result<StudentProfile, PortalError> {
        let mut state = self.state();
        let profile = state
            .students
            .get_mut(&user)
            .ok_or(PortalError::not_found("student profile", user.0))?;
        profile.is_cr = value;
        let profile = profile.clone();
        if value {
            if let Some(account) = state.users.get_mut(&user) {
                account.is_approved = true;
            }
        }
        Ok(profile)
    }

    fn create_staff_profile(&self, profile: StaffProfile) -> Result<StaffProfile, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&profile.user) {
            return Err(PortalError::not_found("user", profile.user.0));
        }
        if state.staff.contains_key(&profile.user) {
            return Err(PortalError::conflict("user already has a staff profile"));
        }
        let user = profile.user;
        state.staff.insert(user, profile.clone());
        state.refresh_user(user);
        Ok(profile)
    }

    fn staff(&self, user: UserId) -> Option<StaffProfile> {
        self.state().staff.get(&user).cloned()
    }

    fn save_staff(&self, profile: StaffProfile) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.staff.contains_key(&profile.user) {
            return Err(PortalError::not_found("staff profile", profile.user.0));
        }
        let user = profile.user;
        state.staff.insert(user, profile);
        state.refresh_user(user);
        Ok(())
    }

    fn set_hod(&self, user: UserId) -> Result<StaffProfile, PortalError> {
        let mut state = self.state();
        if !state.staff.contains_key(&user) {
            return Err(PortalError::not_found("staff profile", user.0));
        }
        for staff in state.staff.values_mut() {
            staff.is_hod = staff.user == user;
        }
        if let Some(account) = state.users.get_mut(&user) {
            account.is_coordinator = true;
        }
        Ok(state.staff[&user].clone())
    }

    fn set_tpc_head(&self, user: UserId) -> Result<StaffProfile, PortalError> {
        let mut state = self.state();
        if !state.staff.contains_key(&user) {
            return Err(PortalError::not_found("staff profile", user.0));
        }
        for staff in state.staff.values_mut() {
            staff.is_tpc_head = staff.user == user;
        }
        if let Some(account) = state.users.get_mut(&user) {
            account.is_coordinator = true;
        }
        Ok(state.staff[&user].clone())
    }

    fn create_recruiter_profile(
        &self,
        profile: RecruiterProfile,
    ) -> Result<RecruiterProfile, PortalError> {
        let mut state = self.state();
        if !state.users.contains_key(&profile.user) {
            return Err(PortalError::not_found("user", profile.user.0));
        }
        if state.recruiters.contains_key(&profile.user) {
            return Err(PortalError::conflict("user already has a recruiter profile"));
        }
        state.recruiters.insert(profile.user, profile.clone());
        Ok(profile)
    }

    fn recruiter(&self, user: UserId) -> Option<RecruiterProfile> {
        self.state().recruiters.get(&user).cloned()
    }

    fn save_recruiter(&self, profile: RecruiterProfile) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.recruiters.contains_key(&profile.user) {
            return Err(PortalError::not_found("recruiter profile", profile.user.0));
        }
        state.recruiters.insert(profile.user, profile);
        Ok(())
    }
}

impl AcademicsStore for MemoryStore {
    fn student(&self, user: UserId) -> Option<StudentProfile> {
        self.state().students.get(&user).cloned()
    }

    fn report_cards(&self, user: UserId) -> Vec<SemesterReportCard> {
        self.state()
            .report_cards
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    fn sync_report_cards(
        &self,
        user: UserId,
        semester: u32,
        calendar: &AcademicCalendar,
    ) -> Result<Vec<SemesterReportCard>, PortalError> {
        let mut state = self.state();
        let course = state
            .students
            .get(&user)
            .ok_or(PortalError::not_found("student profile", user.0))?
            .course;
        let templates: BTreeMap<u32, SemesterReportCard> = state
            .templates
            .values()
            .filter(|template| template.course == course)
            .map(|template| (template.semester, template.instantiate(calendar.year)))
            .collect();
        let cards = state.report_cards.entry(user).or_default();
        fill_missing_cards(cards, semester, calendar.year, |slot| {
            templates.get(&slot).cloned()
        });
        Ok(cards.clone())
    }

    fn save_report_card(
        &self,
        user: UserId,
        card: SemesterReportCard,
        calendar: &AcademicCalendar,
    ) -> Result<StudentProfile, PortalError> {
        let mut state = self.state();
        let mut profile = state
            .students
            .get(&user)
            .cloned()
            .ok_or(PortalError::not_found("student profile", user.0))?;

        let semester = card.semester;
        let cards = state.report_cards.entry(user).or_default();
        fill_missing_cards(cards, semester, card.year_of_exam, |_| None);
        cards[(semester - 1) as usize] = card;
        let snapshot = cards.clone();

        recompute_profile(&mut profile, &snapshot, calendar);
        state.students.insert(user, profile.clone());
        Ok(profile)
    }

    fn set_manual_cgpa(
        &self,
        user: UserId,
        cgpa: f64,
        backlog_count: u32,
        passed_semesters: u32,
    ) -> Result<StudentProfile, PortalError> {
        let mut state = self.state();
        let profile = state
            .students
            .get_mut(&user)
            .ok_or(PortalError::not_found("student profile", user.0))?;
        profile.manually_specify_cgpa = true;
        profile.cgpa = cgpa;
        profile.backlog_count = backlog_count;
        profile.passed_semesters = passed_semesters;
        let profile = profile.clone();
        state.report_cards.remove(&user);
        Ok(profile)
    }

    fn template(&self, course: Course, semester: u32) -> Option<SemesterReportCardTemplate> {
        self.state().templates.get(&(course, semester)).cloned()
    }

    fn templates(&self) -> Vec<SemesterReportCardTemplate> {
        self.state().templates.values().cloned().collect()
    }

    fn save_template(
        &self,
        template: SemesterReportCardTemplate,
    ) -> Result<SemesterReportCardTemplate, PortalError> {
        let mut state = self.state();
        state
            .templates
            .insert((template.course, template.semester), template.clone());
        Ok(template)
    }

    fn delete_template(&self, course: Course, semester: u32) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .templates
            .remove(&(course, semester))
            .map(|_| ())
            .ok_or(PortalError::not_found(
                "report card template",
                u64::from(semester),
            ))
    }
}

impl RecruitmentStore for MemoryStore {
    fn insert_post(&self, post: RecruitmentPost) -> RecruitmentPost {
        let mut state = self.state();
        let post = RecruitmentPost {
            id: PostId(state.next_id()),
            ..post
        };
        state.posts.insert(post.id, post.clone());
        post
    }

    fn post(&self, id: PostId) -> Option<RecruitmentPost> {
        self.state().posts.get(&id).cloned()
    }

    fn save_post(&self, post: RecruitmentPost) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.posts.contains_key(&post.id) {
            return Err(PortalError::not_found("recruitment post", post.id.0));
        }
        state.posts.insert(post.id, post);
        Ok(())
    }

    fn delete_post(&self, id: PostId) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.posts.contains_key(&id) {
            return Err(PortalError::not_found("recruitment post", id.0));
        }
        if state
            .applications
            .values()
            .any(|application| application.post == id)
        {
            return Err(PortalError::conflict(
                "post has applications and cannot be deleted",
            ));
        }
        state.posts.remove(&id);
        state.announcements.retain(|_, announcement| {
            !matches!(announcement.kind, AnnouncementKind::PostUpdate { post } if post == id)
        });
        Ok(())
    }

    fn posts(&self) -> Vec<RecruitmentPost> {
        self.state().posts.values().cloned().collect()
    }

    fn add_post_skill(&self, post: PostId, name: &str) -> Result<Skill, PortalError> {
        let mut state = self.state();
        if !state.posts.contains_key(&post) {
            return Err(PortalError::not_found("recruitment post", post.0));
        }
        let skill = state.get_or_create_skill(name);
        state
            .posts
            .get_mut(&post)
            .expect("post checked above")
            .skills
            .insert(skill.id);
        Ok(skill)
    }

    fn remove_post_skill(&self, post: PostId, skill: SkillId) -> Result<(), PortalError> {
        let mut state = self.state();
        let removed = state
            .posts
            .get_mut(&post)
            .ok_or(PortalError::not_found("recruitment post", post.0))?
            .skills
            .remove(&skill);
        if removed {
            Ok(())
        } else {
            Err(PortalError::not_found("skill", skill.0))
        }
    }

    fn skill(&self, id: SkillId) -> Option<Skill> {
        self.state().skills.get(&id).cloned()
    }

    fn insert_application(
        &self,
        application: RecruitmentApplication,
    ) -> Result<RecruitmentApplication, PortalError> {
        let mut state = self.state();
        if state.applications.values().any(|existing| {
            existing.post == application.post && existing.user == application.user
        }) {
            return Err(PortalError::conflict("already applied to this post"));
        }
        let application = RecruitmentApplication {
            id: ApplicationId(state.next_id()),
            ..application
        };
        state.applications.insert(application.id, application.clone());
        Ok(application)
    }

    fn application(&self, id: ApplicationId) -> Option<RecruitmentApplication> {
        self.state().applications.get(&id).cloned()
    }

    fn save_application(&self, application: RecruitmentApplication) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.applications.contains_key(&application.id) {
            return Err(PortalError::not_found("application", application.id.0));
        }
        state.applications.insert(application.id, application);
        Ok(())
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .applications
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("application", id.0))
    }

    fn post_applications(&self, post: PostId) -> Vec<RecruitmentApplication> {
        self.state()
            .applications
            .values()
            .filter(|application| application.post == post)
            .cloned()
            .collect()
    }

    fn user_applications(&self, user: UserId) -> Vec<RecruitmentApplication> {
        self.state()
            .applications
            .values()
            .filter(|application| application.user == Some(user))
            .cloned()
            .collect()
    }

    fn user_skill_ids(&self, user: UserId) -> BTreeSet<SkillId> {
        self.state()
            .user_skills
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    fn student(&self, user: UserId) -> Option<StudentProfile> {
        self.state().students.get(&user).cloned()
    }
}

impl BoardStore for MemoryStore {
    fn insert_announcement(&self, announcement: Announcement) -> Announcement {
        let mut state = self.state();
        let announcement = Announcement {
            id: AnnouncementId(state.next_id()),
            ..announcement
        };
        state
            .announcements
            .insert(announcement.id, announcement.clone());
        announcement
    }

    fn announcement(&self, id: AnnouncementId) -> Option<Announcement> {
        self.state().announcements.get(&id).cloned()
    }

    fn save_announcement(&self, announcement: Announcement) -> Result<(), PortalError> {
        let mut state = self.state();
        if !state.announcements.contains_key(&announcement.id) {
            return Err(PortalError::not_found("announcement", announcement.id.0));
        }
        state.announcements.insert(announcement.id, announcement);
        Ok(())
    }

    fn delete_announcement(&self, id: AnnouncementId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .announcements
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("announcement", id.0))
    }

    fn announcements(&self) -> Vec<Announcement> {
        self.state().announcements.values().cloned().collect()
    }

    fn post(&self, id: PostId) -> Option<RecruitmentPost> {
        self.state().posts.get(&id).cloned()
    }

    fn insert_quote(&self, quote: Quote) -> Result<Quote, PortalError> {
        let mut state = self.state();
        let wanted = normalized(&quote.quote);
        if state
            .quotes
            .values()
            .any(|existing| normalized(&existing.quote) == wanted)
        {
            return Err(PortalError::conflict("quote already in the bank"));
        }
        let quote = Quote {
            id: QuoteId(state.next_id()),
            ..quote
        };
        state.quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    fn quotes(&self) -> Vec<Quote> {
        self.state().quotes.values().cloned().collect()
    }

    fn delete_quote(&self, id: QuoteId) -> Result<(), PortalError> {
        let mut state = self.state();
        state
            .quotes
            .remove(&id)
            .map(|_| ())
            .ok_or(PortalError::not_found("quote", id.0))
    }

    fn insert_message(&self, message: ContactMessage) -> ContactMessage {
        let mut state = self.state();
        let message = ContactMessage {
            id: MessageId(state.next_id()),
            ..message
        };
        state.messages.insert(message.id, message.clone());
        message
    }

    fn messages(&self) -> Vec<ContactMessage> {
        self.state().messages.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::academics::AcademicHalf;
    use crate::profiles::{Qualification, StaffDesignation};

    fn store_with_user(role: Role) -> (MemoryStore, UserId) {
        let store = MemoryStore::new();
        let user = store.create_user("Asha".into(), "Verma".into(), role);
        (store, user.id)
    }

    #[test]
    fn first_email_becomes_primary_and_cannot_collide() {
        let (store, user) = store_with_user(Role::Student);
        let first = store.add_email(user, "a@campus.edu".into()).unwrap();
        store.add_email(user, "b@campus.edu".into()).unwrap();

        let account = Directory::user(&store, user).unwrap();
        assert_eq!(account.primary_email, Some(first.id));

        let clash = store.add_email(user, "A@Campus.EDU".into());
        assert!(matches!(clash, Err(PortalError::Conflict(_))));
    }

    #[test]
    fn skills_are_deduplicated_case_insensitively() {
        let (store, user) = store_with_user(Role::Student);
        let first = store.add_user_skill(user, "Python").unwrap();
        let again = store.add_user_skill(user, "python").unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(IdentityStore::user_skills(&store, user).len(), 1);
    }

    #[test]
    fn hod_chair_moves_atomically() {
        let store = MemoryStore::new();
        let a = store.create_user("A".into(), "One".into(), Role::Staff).id;
        let b = store.create_user("B".into(), "Two".into(), Role::Staff).id;
        for id in [a, b] {
            store
                .create_staff_profile(StaffProfile::new(
                    id,
                    Qualification::Phd,
                    StaffDesignation::Professor,
                ))
                .unwrap();
        }

        store.set_hod(a).unwrap();
        assert_eq!(store.hod_holder(), Some(a));

        store.set_hod(b).unwrap();
        assert_eq!(store.hod_holder(), Some(b));
        assert!(!ProfileStore::staff(&store, a).unwrap().is_hod);
        assert!(Directory::user(&store, b).unwrap().is_coordinator);
    }

    #[test]
    fn doctoral_staff_profile_refreshes_display_names() {
        let (store, user) = store_with_user(Role::Staff);
        store
            .create_staff_profile(StaffProfile::new(
                user,
                Qualification::Phd,
                StaffDesignation::Professor,
            ))
            .unwrap();
        let account = Directory::user(&store, user).unwrap();
        assert!(account.is_doctor);
        assert_eq!(account.full_name, "Dr. Asha Verma");
    }

    #[test]
    fn card_save_refreshes_aggregates_in_the_same_step() {
        let (store, user) = store_with_user(Role::Student);
        ProfileStore::create_student_profile(
            &store,
            StudentProfile::new(user, 20210001001, Course::BTech, 1),
        )
        .unwrap();

        let mut card = SemesterReportCard::empty(1, 2024);
        card.subjects = vec![crate::academics::Subject {
            name: "Maths".into(),
            code: "MA101".into(),
            credit: 4.0,
            letter_grade: "F".into(),
            passing_grade_point: 4.0,
            grade_point: 0.0,
        }];
        card.is_complete = true;
        card.recompute();

        let calendar = AcademicCalendar::new(2024, AcademicHalf::Odd);
        let profile = store.save_report_card(user, card, &calendar).unwrap();
        assert_eq!(profile.backlog_count, 1);
        assert_eq!(AcademicsStore::report_cards(&store, user).len(), 1);
    }

    #[test]
    fn duplicate_applications_conflict() {
        use crate::recruitment::{ApplicationStatus, JobType, SalaryType, StartDate, WorkplaceType};
        use chrono::{NaiveDate, Utc};

        let (store, user) = store_with_user(Role::Student);
        let post = store.insert_post(RecruitmentPost {
            id: PostId(0),
            owner: None,
            title: "Intern".into(),
            company: "Acme".into(),
            location: None,
            job_type: JobType::Internship,
            workplace_type: WorkplaceType::Remote,
            salary_type: SalaryType::Specified,
            salary_currency: "INR".into(),
            salary: 20_000,
            application_fee: 0,
            experience_years: 0,
            start_date: StartDate::Immediately,
            description: String::new(),
            requirements: String::new(),
            required_documents: Vec::new(),
            questionnaire: Vec::new(),
            apply_by: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            posted_on: Utc::now(),
            edited_on: Utc::now(),
            skills: BTreeSet::new(),
            instructions: Default::default(),
        });

        let application = RecruitmentApplication {
            id: ApplicationId(0),
            post: post.id,
            user: Some(user),
            cover_letter: String::new(),
            answers: Vec::new(),
            applied_on: Utc::now(),
            status: ApplicationStatus::Pending,
        };
        store.insert_application(application.clone()).unwrap();
        assert!(matches!(
            store.insert_application(application),
            Err(PortalError::Conflict(_))
        ));
    }

    #[test]
    fn deleting_a_user_detaches_posts_and_applications() {
        let (store, user) = store_with_user(Role::Recruiter);
        let post = store.insert_post(RecruitmentPost {
            id: PostId(0),
            owner: Some(user),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: None,
            job_type: crate::recruitment::JobType::FullTime,
            workplace_type: crate::recruitment::WorkplaceType::OnSite,
            salary_type: crate::recruitment::SalaryType::Specified,
            salary_currency: "INR".into(),
            salary: 0,
            application_fee: 0,
            experience_years: 0,
            start_date: crate::recruitment::StartDate::Immediately,
            description: String::new(),
            requirements: String::new(),
            required_documents: Vec::new(),
            questionnaire: Vec::new(),
            apply_by: chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            posted_on: chrono::Utc::now(),
            edited_on: chrono::Utc::now(),
            skills: BTreeSet::new(),
            instructions: Default::default(),
        });

        store.delete_user(user).unwrap();
        assert_eq!(RecruitmentStore::post(&store, post.id).unwrap().owner, None);
    }

    #[test]
    fn quotes_keep_their_source_and_deduplicate_by_text() {
        let store = MemoryStore::new();
        let quote = store
            .insert_quote(Quote {
                id: QuoteId(0),
                quote: "Opportunities multiply as they are seized.".into(),
                author: "Sun Tzu".into(),
                source: Some("The Art of War".into()),
                fictional: false,
            })
            .unwrap();
        assert_eq!(quote.source.as_deref(), Some("The Art of War"));

        let clash = store.insert_quote(Quote {
            id: QuoteId(0),
            quote: "OPPORTUNITIES MULTIPLY AS THEY ARE SEIZED.".into(),
            author: "Anonymous".into(),
            source: None,
            fictional: true,
        });
        assert!(matches!(clash, Err(PortalError::Conflict(_))));
    }
}
