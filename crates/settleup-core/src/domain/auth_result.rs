use std::collections::BTreeMap;
use std::fmt;

use settleup_shared::ApiFieldError;

use super::User;

/// Form fields an error can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Code,
    Avatar,
}

impl Field {
    /// Field name as it appears in request bodies and error paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Code => "code",
            Self::Avatar => "avatar",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "confirmPassword" => Some(Self::ConfirmPassword),
            "code" => Some(Self::Code),
            "avatar" => Some(Self::Avatar),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an operation that signs a user in or changes their profile.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthResult {
    Success { user: User, token: String },
    Failure(AuthFailure),
}

impl AuthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl From<AuthFailure> for AuthResult {
    fn from(failure: AuthFailure) -> Self {
        Self::Failure(failure)
    }
}

/// A failed operation, shaped for display next to a form.
///
/// Errors the server attached to a field the form knows about land in
/// `field_errors`; everything else lands in `unclassified`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthFailure {
    pub message: String,
    pub field_errors: BTreeMap<Field, String>,
    pub unclassified: Vec<String>,
}

impl AuthFailure {
    /// A failure produced on this side of the wire; never carries field errors.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Build a failure from a server-reported error list, keeping only the
    /// fields in `accepted` as field errors.
    pub fn from_server(
        message: impl Into<String>,
        errors: &[ApiFieldError],
        accepted: &[Field],
    ) -> Self {
        let mut failure = Self::local(message);

        for error in errors {
            let field = error
                .field()
                .and_then(Field::parse)
                .filter(|field| accepted.contains(field));

            match field {
                // First error reported for a field wins, matching what a form shows.
                Some(field) => {
                    failure
                        .field_errors
                        .entry(field)
                        .or_insert_with(|| error.message.clone());
                }
                None => failure.unclassified.push(error.message.clone()),
            }
        }

        failure
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_known_fields_and_collects_the_rest() {
        let errors = vec![
            ApiFieldError::new("email", "X"),
            ApiFieldError::new("email", "second email error"),
            ApiFieldError::new("name", "not accepted by this form"),
            ApiFieldError::new("shoeSize", "unknown field"),
            ApiFieldError::general("Something else"),
        ];

        let failure =
            AuthFailure::from_server("Validation failed", &errors, &[Field::Email, Field::Password]);

        assert_eq!(failure.message, "Validation failed");
        assert_eq!(failure.field(Field::Email), Some("X"));
        assert_eq!(failure.field(Field::Password), None);
        assert_eq!(failure.field_errors.len(), 1);
        assert_eq!(
            failure.unclassified,
            vec!["not accepted by this form", "unknown field", "Something else"]
        );
    }

    #[test]
    fn test_local_failure_has_no_field_errors() {
        let failure = AuthFailure::local("Network error");
        assert!(failure.field_errors.is_empty());
        assert!(failure.unclassified.is_empty());
        assert_eq!(failure.to_string(), "Network error");
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in [
            Field::Name,
            Field::Email,
            Field::Password,
            Field::ConfirmPassword,
            Field::Code,
            Field::Avatar,
        ] {
            assert_eq!(Field::parse(field.as_str()), Some(field));
        }
        assert_eq!(Field::parse("Email"), None);
    }
}
