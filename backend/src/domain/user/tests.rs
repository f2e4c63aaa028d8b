//! Tests for the user aggregate.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

const PASSWORD: &str = "correct horse";

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn user(now: DateTime<Utc>) -> User {
    User::create("ada@example.com", PASSWORD, "Ada", now).expect("valid user")
}

#[rstest]
fn create_normalises_email_and_hashes_password(now: DateTime<Utc>) {
    let user = User::create("  Ada@Example.COM ", PASSWORD, "Ada", now).expect("valid user");

    assert_eq!(user.email().as_ref(), "ada@example.com");
    assert_eq!(user.name().as_ref(), "Ada");
    assert_ne!(user.password_hash().as_str(), PASSWORD);
    assert!(user.password_hash().as_str().starts_with("$2"));
    assert_eq!(user.created_at(), now);
    assert_eq!(user.updated_at(), now);
}

#[rstest]
#[case("not-an-email", PASSWORD, "Ada", UserValidationError::InvalidEmail)]
#[case("ada@example", PASSWORD, "Ada", UserValidationError::InvalidEmail)]
#[case("ada@example.c", PASSWORD, "Ada", UserValidationError::InvalidEmail)]
#[case("", PASSWORD, "Ada", UserValidationError::InvalidEmail)]
#[case("ada@example.com", "short", "Ada", UserValidationError::InvalidPassword { min: PASSWORD_MIN_LEN })]
#[case("ada@example.com", PASSWORD, "   ", UserValidationError::InvalidName)]
#[case("bad", "short", "", UserValidationError::InvalidEmail)]
#[case("ada@example.com", "short", "", UserValidationError::InvalidPassword { min: PASSWORD_MIN_LEN })]
fn create_reports_first_violation(
    now: DateTime<Utc>,
    #[case] email: &str,
    #[case] password: &str,
    #[case] name: &str,
    #[case] expected: UserValidationError,
) {
    let err = User::create(email, password, name, now).expect_err("invalid input must fail");
    assert_eq!(err, UserError::Validation(expected));
}

#[rstest]
fn password_of_exactly_minimum_length_is_accepted(now: DateTime<Utc>) {
    let password = "a".repeat(PASSWORD_MIN_LEN);
    assert!(User::create("ada@example.com", &password, "Ada", now).is_ok());
}

#[rstest]
fn verify_password_matches_only_original(user: User) {
    assert!(user.verify_password(PASSWORD));
    assert!(!user.verify_password("wrong password"));
    assert!(!user.verify_password(""));
}

#[rstest]
fn malformed_hash_never_verifies() {
    let hash = PasswordHash("not-a-bcrypt-hash".to_owned());
    assert!(!hash.verify(PASSWORD));
}

#[rstest]
fn update_password_rehashes_and_touches_timestamp(mut user: User, now: DateTime<Utc>) {
    let later = now + Duration::minutes(5);
    user.update_password("another secret", later)
        .expect("valid password");

    assert!(user.verify_password("another secret"));
    assert!(!user.verify_password(PASSWORD));
    assert_eq!(user.updated_at(), later);
    assert_eq!(user.created_at(), now);
}

#[rstest]
fn update_password_rejects_short_password_without_mutation(mut user: User, now: DateTime<Utc>) {
    let before = user.clone();
    let err = user
        .update_password("short", now + Duration::minutes(1))
        .expect_err("short password must fail");

    assert!(matches!(
        err,
        UserError::Validation(UserValidationError::InvalidPassword { .. })
    ));
    assert_eq!(user, before);
}

#[rstest]
fn password_hash_debug_is_redacted(user: User) {
    let rendered = format!("{user:?}");
    assert!(!rendered.contains(user.password_hash().as_str()));
    assert!(rendered.contains("<redacted>"));
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn user_id_round_trips_through_serde() {
    let id = UserId::random();
    let json = serde_json::to_string(&id).expect("serialise id");
    let parsed: UserId = serde_json::from_str(&json).expect("deserialise id");
    assert_eq!(parsed, id);
}

#[rstest]
fn random_ids_are_distinct() {
    assert_ne!(UserId::random(), UserId::random());
}

#[rstest]
fn decoy_hash_uses_the_configured_cost() {
    let decoy = decoy_hash().expect("decoy hash is built");
    assert!(decoy.as_str().starts_with(&format!("$2b${BCRYPT_COST:02}$")));
    assert!(decoy.verify("voiceline-decoy-password"));
    assert!(!decoy.verify(PASSWORD));
}
