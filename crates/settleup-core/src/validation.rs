//! Client-side form validation.
//!
//! Runs before anything is sent. A form that fails here is never submitted,
//! so these errors are kept apart from server-reported [`AuthFailure`]s.
//!
//! [`AuthFailure`]: crate::AuthFailure

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use settleup_shared::dto::{LoginRequest, RegisterRequest};

use crate::domain::Field;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;
pub const CODE_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Per-field messages for a form that failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Normalize and check an email address. Returns the lower-cased address.
pub fn check_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required");
    }
    if !EMAIL_RE.is_match(&email) {
        return Err("Please enter a valid email address");
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validate the email step of the verification flow.
pub fn validate_email(email: &str) -> Result<String, ValidationErrors> {
    check_email(email).map_err(|message| {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Email, message);
        errors
    })
}

/// Login screen input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = check_email(&self.email).unwrap_or_else(|message| {
            errors.add(Field::Email, message);
            String::new()
        });
        if let Err(message) = check_password(&self.password) {
            errors.add(Field::Password, message);
        }

        errors.into_result(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

/// Signup screen input.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add(Field::Name, "Full name is required");
        } else if name.chars().count() < MIN_NAME_LEN {
            errors.add(Field::Name, "Full name must be at least 2 characters");
        }

        let email = check_email(&self.email).unwrap_or_else(|message| {
            errors.add(Field::Email, message);
            String::new()
        });

        if let Err(message) = check_password(&self.password) {
            errors.add(Field::Password, message);
        }

        if self.confirm_password.is_empty() {
            errors.add(Field::ConfirmPassword, "Please confirm your password");
        } else if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, "Passwords do not match");
        }

        errors.into_result(RegisterRequest {
            name: name.to_string(),
            email,
            password: self.password.clone(),
        })
    }
}

/// A six-digit email verification code. Only constructible from valid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(input: &str) -> Result<Self, ValidationErrors> {
        let code = input.trim();
        let mut errors = ValidationErrors::new();

        if code.chars().count() != CODE_LEN {
            errors.add(
                Field::Code,
                "Please enter the complete 6-digit verification code",
            );
        } else if !code.chars().all(|c| c.is_ascii_digit()) {
            errors.add(Field::Code, "Verification code must contain only numbers");
        }

        errors.into_result(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
