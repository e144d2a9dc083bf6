use rand::distributions::Alphanumeric;
use rand::Rng;

/// Random alphanumeric string, used for generated group names.
pub fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Random password satisfying the default pool policy (upper, lower, digit,
/// symbol). Used when clearing FORCE_CHANGE_PASSWORD state.
pub fn random_password() -> String {
    format!("{}aZ2!", random_string(16))
}

/// Local part of an email address: the substring before '@'. Returns the
/// whole input when no '@' is present.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
