use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{7,15}$").expect("valid phone regex"))
}

/// 校验邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    if !email_regex().is_match(email) {
        return Err(AppError::ValidationError("Invalid email format".to_string()));
    }
    Ok(())
}

/// 校验手机号：可选 + 号，7-15 位数字
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if !phone_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected 7-15 digits with optional leading +".to_string(),
        ));
    }
    Ok(())
}

/// 去掉空格、横线和括号
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

/// 邮箱统一小写存储
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane.doe@gym.io").is_ok());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+12345678901").is_ok());
        assert!(validate_phone("5551234").is_ok());
        assert!(validate_phone("12ab").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_phone("(234) 567-8901"), "2345678901");
        assert_eq!(normalize_email("  Jane@Gym.IO "), "jane@gym.io");
    }
}
