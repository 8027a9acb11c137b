use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use review_client::{AuthApi, LoginOutcome};
use review_core::session::Session;
use std::path::Path;

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Sign in and save the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REVIEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the saved session token
    Logout,

    /// Complete a login that asked for a second factor
    Mfa {
        /// MFA token returned by `review login`
        #[arg(long)]
        token: String,
        /// One-time code
        #[arg(long)]
        code: String,
        /// Recorded with the session
        #[arg(long)]
        email: Option<String>,
    },

    /// Request a password-reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// Confirm an email address with the emailed token
    VerifyEmail {
        #[arg(long)]
        token: String,
    },
}

pub fn run(
    root: &Path,
    api_url: Option<&str>,
    subcmd: AuthCommand,
    json: bool,
) -> anyhow::Result<()> {
    if let AuthCommand::Logout = subcmd {
        let removed = Session::clear(root).context("failed to clear session")?;
        if json {
            print_json(&serde_json::json!({ "logged_out": removed }))?;
        } else if removed {
            println!("Logged out.");
        } else {
            println!("No saved session.");
        }
        return Ok(());
    }

    let config = super::load_config(root, api_url)?;
    let client = super::client(root, &config)?;
    let rt = super::runtime()?;

    match subcmd {
        AuthCommand::Login { email, password } => {
            let outcome = rt.block_on(client.login(&email, &password))?;
            if let LoginOutcome::Authenticated { access_token } = &outcome {
                save_session(root, access_token, Some(email))?;
            }
            if json {
                // Never echo the bearer token.
                let value = match &outcome {
                    LoginOutcome::Authenticated { .. } => {
                        serde_json::json!({ "kind": "authenticated" })
                    }
                    LoginOutcome::MfaRequired { mfa_token } => {
                        serde_json::json!({ "kind": "mfa_required", "mfa_token": mfa_token })
                    }
                };
                print_json(&value)?;
            } else {
                match &outcome {
                    LoginOutcome::Authenticated { .. } => println!("Logged in."),
                    LoginOutcome::MfaRequired { mfa_token } => println!(
                        "Second factor required. Run: review mfa --token {mfa_token} --code <CODE>"
                    ),
                }
            }
        }
        AuthCommand::Mfa { token, code, email } => {
            let access_token = rt.block_on(client.verify_mfa(&token, &code))?;
            save_session(root, &access_token, email)?;
            println!("Logged in.");
        }
        AuthCommand::ResetPassword { email } => {
            rt.block_on(client.request_password_reset(&email))?;
            println!("If {email} has an account, a reset link is on its way.");
        }
        AuthCommand::VerifyEmail { token } => {
            rt.block_on(client.verify_email(&token))?;
            println!("Email verified.");
        }
        AuthCommand::Logout => {}
    }
    Ok(())
}

fn save_session(root: &Path, access_token: &str, email: Option<String>) -> anyhow::Result<()> {
    Session::new(access_token, email)
        .save(root)
        .context("failed to save session")
}
