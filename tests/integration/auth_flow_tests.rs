use std::sync::Arc;
use std::time::Duration;

use auth_core::auth::AuthService;
use auth_core::config::Settings;
use auth_core::error::AuthError;
use auth_core::mailer::{OutboundEmail, RecordingMailer};
use auth_core::store::MemoryUserStore;

fn test_service() -> (AuthService<MemoryUserStore>, RecordingMailer) {
    let mailer = RecordingMailer::new();
    let service = AuthService::new(
        MemoryUserStore::new(),
        Arc::new(mailer.clone()),
        &Settings::default(),
    );
    (service, mailer)
}

/// Email dispatch is fire-and-forget; poll the recorder briefly.
async fn wait_for_mail(mailer: &RecordingMailer, count: usize) -> Vec<OutboundEmail> {
    for _ in 0..200 {
        let sent = mailer.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {count} dispatched emails");
}

fn token_from_body(body: &str) -> &str {
    body.split_once("?token=")
        .expect("reset email must embed the token in the redirect URL")
        .1
}

#[tokio::test]
async fn test_sign_up_session_is_immediately_valid() {
    let (service, _mailer) = test_service();

    let (user, session) = service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    assert_eq!(service.validate_session(&session.token).await.unwrap(), user.id);
}

#[tokio::test]
async fn test_sign_up_duplicate_email_is_case_insensitive() {
    let (service, _mailer) = test_service();

    service
        .sign_up("Jane", "Foo@Example.com", "secret1".to_string())
        .await
        .unwrap();

    let err = service
        .sign_up("Other Jane", "foo@example.com", "different2".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateEmail));
}

#[tokio::test]
async fn test_sign_up_rejects_weak_password_before_storage() {
    let (service, _mailer) = test_service();

    let err = service
        .sign_up("Jane", "jane@x.com", "short".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    // the email was never registered
    let (_, session) = service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();
    assert!(service.validate_session(&session.token).await.is_ok());
}

#[tokio::test]
async fn test_sign_in_errors_do_not_reveal_account_existence() {
    let (service, _mailer) = test_service();

    service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    let wrong_password = service
        .sign_in("jane@x.com", "wrong-password".to_string())
        .await
        .unwrap_err();
    let unknown_email = service
        .sign_in("nobody@x.com", "secret1".to_string())
        .await
        .unwrap_err();

    // identical error for both failure modes
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(
        wrong_password.sanitized_message(),
        unknown_email.sanitized_message()
    );
    assert_eq!(wrong_password.error_code(), unknown_email.error_code());
}

#[tokio::test]
async fn test_forgot_password_unknown_email_reports_success() {
    let (service, mailer) = test_service();

    service
        .forgot_password("nobody@x.com", "https://app.example.com/reset")
        .await
        .unwrap();

    // no dispatch happened
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_second_reset_token_invalidates_first() {
    let (service, mailer) = test_service();

    service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    let base = "https://app.example.com/reset";
    service.forgot_password("jane@x.com", base).await.unwrap();
    // wait for the first dispatch so the recorded order matches issue order
    wait_for_mail(&mailer, 1).await;
    service.forgot_password("jane@x.com", base).await.unwrap();

    let sent = wait_for_mail(&mailer, 2).await;
    let first_token = token_from_body(&sent[0].body).to_string();
    let second_token = token_from_body(&sent[1].body).to_string();
    assert_ne!(first_token, second_token);

    let err = service
        .reset_password(&first_token, "secret2".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::InvalidToken | AuthError::TokenExpired
    ));

    service
        .reset_password(&second_token, "secret2".to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_full_recovery_scenario() {
    let (service, mailer) = test_service();

    // sign-up issues a live session
    let (user, s1) = service
        .sign_up("Jane", "Jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    // case-insensitive sign-in issues a second session
    let s2 = service
        .sign_in("jane@x.com", "secret1".to_string())
        .await
        .unwrap();
    assert_eq!(s2.user_id, user.id);

    // recovery: exactly one dispatch, token embedded in the redirect URL
    service
        .forgot_password("jane@x.com", "https://app.example.com/reset")
        .await
        .unwrap();
    let sent = wait_for_mail(&mailer, 1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@x.com");
    assert_eq!(sent[0].subject, "Reset your password");
    assert!(sent[0]
        .body
        .contains("https://app.example.com/reset?token="));

    let token = token_from_body(&sent[0].body).to_string();
    service
        .reset_password(&token, "secret2".to_string())
        .await
        .unwrap();

    // every pre-reset session is revoked
    assert!(matches!(
        service.validate_session(&s1.token).await.unwrap_err(),
        AuthError::SessionRevoked
    ));
    assert!(matches!(
        service.validate_session(&s2.token).await.unwrap_err(),
        AuthError::SessionRevoked
    ));

    // old password no longer signs in, new one does
    assert!(matches!(
        service
            .sign_in("jane@x.com", "secret1".to_string())
            .await
            .unwrap_err(),
        AuthError::InvalidCredentials
    ));
    let s3 = service
        .sign_in("jane@x.com", "secret2".to_string())
        .await
        .unwrap();
    assert!(service.validate_session(&s3.token).await.is_ok());

    // the token was consumed by the successful redemption
    let err = service
        .reset_password(&token, "secret3".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenConsumed));

    // and the failed second redemption changed nothing
    assert!(service
        .sign_in("jane@x.com", "secret2".to_string())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_sign_out_revokes_the_session() {
    let (service, _mailer) = test_service();

    let (_, session) = service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    service.sign_out(&session.token).await.unwrap();

    assert!(matches!(
        service.validate_session(&session.token).await.unwrap_err(),
        AuthError::SessionRevoked
    ));
}

#[tokio::test]
async fn test_rate_limiter_locks_out_repeated_failures() {
    let (service, _mailer) = test_service();

    service
        .sign_up("Jane", "jane@x.com", "secret1".to_string())
        .await
        .unwrap();

    for _ in 0..5 {
        let err = service
            .sign_in("jane@x.com", "wrong-password".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // the sixth attempt is refused before any verification work,
    // even with the correct password
    let err = service
        .sign_in("jane@x.com", "secret1".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RateLimited));
}
