//! Field-level validation for the auth payloads.
//! Rules mirror the signup/login forms: name 3-255, email 5-255 and shaped
//! like an address, phone 7-15 digits, password 8-255.

pub fn validate_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if !(3..=255).contains(&len) {
        return Err("name must be between 3 and 255 characters".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let len = email.chars().count();
    if !(5..=255).contains(&len) {
        return Err("email must be between 5 and 255 characters".to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("email is not a valid address".to_string());
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
        return Err("email is not a valid address".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("email is not a valid address".to_string());
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    if !(7..=15).contains(&phone.len()) || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err("phone must be 7 to 15 digits".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(8..=255).contains(&len) {
        return Err("password must be between 8 and 255 characters".to_string());
    }
    Ok(())
}
