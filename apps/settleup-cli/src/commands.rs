//! Command-line surface and dispatch.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use settleup_core::validation::{LoginForm, SignupForm, ValidationErrors, VerificationCode, validate_email};
use settleup_core::{AuthFailure, AuthResult, AuthState, Route, User};
use settleup_shared::dto::UpdateProfileRequest;

use crate::state::AppState;

/// Exit code for input rejected before any request was sent.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "settleup")]
#[command(version)]
#[command(about = "Settle Up account client")]
pub struct Cli {
    /// Log debug output from the client to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SETTLEUP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account; sign in separately once the email is verified
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SETTLEUP_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Mail a verification code to an address
    SendCode {
        #[arg(long)]
        email: String,
    },

    /// Verify an address with the 6-digit code
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },

    /// Clear the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Update the signed-in user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

pub async fn run(command: Command, state: &AppState) -> ExitCode {
    match command {
        Command::Login { email, password } => {
            let form = LoginForm { email, password };
            let request = match form.validate() {
                Ok(request) => request,
                Err(errors) => return invalid(&errors),
            };
            report(state.auth.login(&request.email, &request.password).await, |user, _| {
                println!("Signed in as {} <{}>", user.name, user.email);
            })
        }

        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = SignupForm {
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            let request = match form.validate() {
                Ok(request) => request,
                Err(errors) => return invalid(&errors),
            };
            let result = state
                .auth
                .register(&request.name, &request.email, &request.password)
                .await;
            report(result, |user, _| {
                println!("Account created for {}", user.email);
                println!("Run `settleup verify --email {} --code <code>` with the code from your inbox, then log in.", user.email);
            })
        }

        Command::SendCode { email } => {
            let email = match validate_email(&email) {
                Ok(email) => email,
                Err(errors) => return invalid(&errors),
            };
            match state.auth.request_verification_code(&email).await {
                Ok(()) => {
                    println!("Verification code sent to {email}");
                    ExitCode::SUCCESS
                }
                Err(failure) => fail(&failure),
            }
        }

        Command::Verify { email, code } => {
            let email = match validate_email(&email) {
                Ok(email) => email,
                Err(errors) => return invalid(&errors),
            };
            let code = match VerificationCode::parse(&code) {
                Ok(code) => code,
                Err(errors) => return invalid(&errors),
            };
            match state.auth.confirm_verification_code(&email, &code).await {
                Ok(()) => {
                    println!("Email verified. You can now log in.");
                    ExitCode::SUCCESS
                }
                Err(failure) => fail(&failure),
            }
        }

        Command::Logout => {
            state.auth.logout().await;
            println!("Signed out");
            ExitCode::SUCCESS
        }

        Command::Status => {
            print_status(&state.auth.auth_state().await);
            ExitCode::SUCCESS
        }

        Command::Profile { name, avatar } => {
            let update = UpdateProfileRequest {
                name: name.map(|n| n.trim().to_string()),
                avatar,
            };
            report(state.auth.update_profile(update).await, |user, _| {
                println!("Profile updated: {} <{}>", user.name, user.email);
            })
        }
    }
}

fn report(result: AuthResult, on_success: impl FnOnce(&User, &str)) -> ExitCode {
    match result {
        AuthResult::Success { user, token } => {
            on_success(&user, &token);
            ExitCode::SUCCESS
        }
        AuthResult::Failure(failure) => fail(&failure),
    }
}

fn fail(failure: &AuthFailure) -> ExitCode {
    eprintln!("Error: {}", failure.message);
    for (field, message) in &failure.field_errors {
        eprintln!("  {field}: {message}");
    }
    for message in &failure.unclassified {
        eprintln!("  {message}");
    }
    ExitCode::FAILURE
}

fn invalid(errors: &ValidationErrors) -> ExitCode {
    tracing::debug!(%errors, "Input rejected before sending");
    for (field, message) in errors.iter() {
        eprintln!("{field}: {message}");
    }
    ExitCode::from(EXIT_INVALID_INPUT)
}

fn print_status(state: &AuthState) {
    match (state.route(), &state.user) {
        (Route::Dashboard, Some(user)) => {
            println!("Signed in");
            println!("  [{}] {} <{}>", user.initials(), user.name, user.email);
            if !user.email_verified {
                println!("  Email not verified");
            }
        }
        _ => println!("Not signed in"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_parses_optional_confirmation() {
        let cli = Cli::try_parse_from([
            "settleup", "register", "--name", "Ada", "--email", "a@b.com", "--password", "secret1",
        ])
        .unwrap();

        match cli.command {
            Command::Register {
                confirm_password, ..
            } => assert_eq!(confirm_password, None),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["settleup", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_verify_requires_code() {
        assert!(Cli::try_parse_from(["settleup", "verify", "--email", "a@b.com"]).is_err());
    }
}
