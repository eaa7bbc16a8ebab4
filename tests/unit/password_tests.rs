use auth_core::auth::password::{hash_password, verify_password, PasswordPolicy};

#[test]
fn test_password_hashing_and_verification() {
    let password = "SecureP@ssw0rd";
    let hash = hash_password(password).unwrap();

    // Hash is a PHC record, not the password
    assert_ne!(password, hash);
    assert!(hash.starts_with("$scrypt$"));

    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "wrong-password"));
}

#[test]
fn test_salts_are_per_call() {
    // Two hashes of the same password differ because each call draws a
    // fresh random salt.
    let first = hash_password("secret1").unwrap();
    let second = hash_password("secret1").unwrap();
    assert_ne!(first, second);

    // Both still verify
    assert!(verify_password(&first, "secret1"));
    assert!(verify_password(&second, "secret1"));
}

#[test]
fn test_malformed_hash_record() {
    // Garbage hash records fail verification instead of erroring
    assert!(!verify_password("garbage", "secret1"));
    assert!(!verify_password("$argon2id$half-a-record", "secret1"));
}

#[test]
fn test_password_policy() {
    let policy = PasswordPolicy::default();
    assert_eq!(policy.min_length, 6);
    assert!(policy.check("secret1"));
    assert!(!policy.check("nope"));

    let strict = PasswordPolicy { min_length: 12 };
    assert!(!strict.check("secret1"));
    assert!(strict.check("a-much-longer-password"));
}
