use chrono::Utc;

use tavola_server::domain::password::hash_secret;
use tavola_server::domain::types::{RECOVERY_TTL_SECS, Recovery};
use tavola_server::error::ApiError;
use tavola_server::usecase::recovery::{
    RequestRecoveryInput, RequestRecoveryUseCase, VerifyAndResetInput, VerifyAndResetUseCase,
};

use crate::helpers::{MockCredentialRepo, MockMailer, MockRecoveryRepo, MockUserRepo, test_user};

struct Setup {
    users: MockUserRepo,
    recoveries: MockRecoveryRepo,
    mailer: MockMailer,
}

fn setup() -> Setup {
    Setup {
        users: MockUserRepo::with_users(vec![test_user("alice", "alice@example.com")]),
        recoveries: MockRecoveryRepo::empty(),
        mailer: MockMailer::working(),
    }
}

impl Setup {
    fn request_uc(&self) -> RequestRecoveryUseCase<MockUserRepo, MockRecoveryRepo, MockMailer> {
        RequestRecoveryUseCase {
            users: self.users.clone(),
            recoveries: self.recoveries.clone(),
            mailer: self.mailer.clone(),
        }
    }

    fn verify_uc(&self) -> VerifyAndResetUseCase<MockUserRepo, MockRecoveryRepo, MockCredentialRepo>
    {
        VerifyAndResetUseCase {
            users: self.users.clone(),
            recoveries: self.recoveries.clone(),
            credentials: MockCredentialRepo {
                credentials: self.users.credentials.clone(),
            },
        }
    }

    async fn request(&self, key: &str) -> Result<(), ApiError> {
        self.request_uc()
            .execute(RequestRecoveryInput {
                username_or_email: key.to_owned(),
            })
            .await
            .map(|_| ())
    }

    async fn verify(&self, code: &str, new_password: &str) -> Result<(), ApiError> {
        self.verify_uc()
            .execute(VerifyAndResetInput {
                username: "alice".to_owned(),
                code: code.to_owned(),
                new_password: new_password.to_owned(),
            })
            .await
            .map(|_| ())
    }
}

#[tokio::test]
async fn should_consume_a_matching_code_exactly_once() {
    let s = setup();
    s.request("alice").await.unwrap();
    let code = s.mailer.last_code();

    s.verify(&code, "new-password-1").await.unwrap();

    // Replay of the same code must fail: the record was consumed.
    let replay = s.verify(&code, "new-password-2").await;
    assert!(
        matches!(replay, Err(ApiError::RecoveryNotFound)),
        "expected RecoveryNotFound, got {replay:?}"
    );
}

#[tokio::test]
async fn should_invalidate_prior_code_when_a_new_one_is_requested() {
    let s = setup();
    s.request("alice").await.unwrap();
    let first_code = s.mailer.last_code();
    s.request("alice").await.unwrap();
    let second_code = s.mailer.last_code();

    // Only the most recently issued code is ever valid.
    let stale = s.verify(&first_code, "new-password-1").await;
    if first_code != second_code {
        assert!(
            matches!(stale, Err(ApiError::CodeMismatch)),
            "expected CodeMismatch, got {stale:?}"
        );
    }
    s.verify(&second_code, "new-password-1").await.unwrap();
}

#[tokio::test]
async fn should_delete_the_record_when_expired() {
    let s = setup();
    // Plant a record issued 16 minutes ago.
    s.recoveries.rows.lock().unwrap().insert(
        "alice".to_owned(),
        Recovery {
            username: "alice".to_owned(),
            code_hash: hash_secret("A1B2C3").unwrap(),
            updated_at: Utc::now() - chrono::Duration::seconds(RECOVERY_TTL_SECS + 60),
        },
    );

    let result = s.verify("A1B2C3", "new-password-1").await;
    assert!(
        matches!(result, Err(ApiError::RecoveryExpired)),
        "expected RecoveryExpired, got {result:?}"
    );
    // Expired codes are never left active.
    assert!(s.recoveries.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_verify_codes_case_insensitively() {
    let s = setup();
    // Plant a known uppercase code and submit it lowercased.
    s.recoveries.rows.lock().unwrap().insert(
        "alice".to_owned(),
        Recovery {
            username: "alice".to_owned(),
            code_hash: hash_secret("A1B2C3").unwrap(),
            updated_at: Utc::now(),
        },
    );

    s.verify("a1b2c3", "new-password-1").await.unwrap();
}

#[tokio::test]
async fn should_leave_the_record_intact_on_mismatch() {
    let s = setup();
    s.request("alice").await.unwrap();

    let result = s.verify("WRONG1", "new-password-1").await;
    assert!(
        matches!(result, Err(ApiError::CodeMismatch)),
        "expected CodeMismatch, got {result:?}"
    );
    // Retry within the TTL is allowed, so the row must survive.
    assert_eq!(s.recoveries.rows.lock().unwrap().len(), 1);

    let code = s.mailer.last_code();
    s.verify(&code, "new-password-1").await.unwrap();
}

#[tokio::test]
async fn should_fail_with_field_error_for_unknown_user() {
    let s = setup();
    let result = s.request("nobody@example.com").await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
    assert!(s.recoveries.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_surface_mail_failure_as_fatal_service_error() {
    let s = Setup {
        mailer: MockMailer::broken(),
        ..setup()
    };
    let result = s.request("alice").await;
    assert!(
        matches!(result, Err(ApiError::Service(_))),
        "expected Service, got {result:?}"
    );
}

#[tokio::test]
async fn should_mask_the_email_in_the_receipt() {
    let s = setup();
    let receipt = s
        .request_uc()
        .execute(RequestRecoveryInput {
            username_or_email: "alice@example.com".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.username, "alice");
    assert_eq!(receipt.masked_email, "al***@example.com");
    // Plaintext never leaves via the receipt; it only travels in the mail.
    assert_ne!(receipt.masked_email, "alice@example.com");
}

#[tokio::test]
async fn should_recover_end_to_end_and_rotate_the_password() {
    use tavola_server::usecase::account::{
        LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    };

    let users = MockUserRepo::empty();
    let credentials = MockCredentialRepo {
        credentials: users.credentials.clone(),
    };

    // Register alice with her original password.
    RegisterUseCase {
        users: users.clone(),
    }
    .execute(RegisterInput {
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
        display_name: None,
        password: "original-pw".to_owned(),
    })
    .await
    .unwrap();

    let s = Setup {
        users: users.clone(),
        recoveries: MockRecoveryRepo::empty(),
        mailer: MockMailer::working(),
    };

    // Request recovery by email and capture the code from the mail stub.
    s.request("alice@example.com").await.unwrap();
    {
        let sent = s.mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].subject.contains("recovery code"));
    }
    let code = s.mailer.last_code();

    // Reset establishes the new password and returns the user for a session.
    let user = s
        .verify_uc()
        .execute(VerifyAndResetInput {
            username: "alice".to_owned(),
            code,
            new_password: "rotated-pw".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(user.username, "alice");

    // New password logs in; the old one no longer does.
    let login = LoginUseCase {
        users: users.clone(),
        credentials: credentials.clone(),
    };
    login
        .execute(LoginInput {
            username: "alice".to_owned(),
            password: "rotated-pw".to_owned(),
        })
        .await
        .unwrap();

    let old = LoginUseCase {
        users,
        credentials,
    }
    .execute(LoginInput {
        username: "alice".to_owned(),
        password: "original-pw".to_owned(),
    })
    .await;
    assert!(
        matches!(old, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {old:?}"
    );
}
