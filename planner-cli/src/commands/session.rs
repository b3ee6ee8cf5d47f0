use std::io::{self, Write};

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use client::{AuthState, Planner};
use rpassword::prompt_password;
use shared::{
    form::{FormState, LoginForm, RegisterForm},
    models::AuthenticatedUser,
};

use super::hint;

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Sign in and store the session
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long, short, help = "Account email (prompted when omitted)")]
    pub email: Option<String>,

    #[arg(long, short, help = "Password (prompted without echo when omitted)")]
    pub password: Option<String>,

    #[arg(long, help = "Page to continue to after signing in (e.g., /trips)")]
    pub return_to: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long, short, help = "Display name")]
    pub name: String,

    #[arg(long, short, help = "Account email")]
    pub email: String,

    #[arg(long, short, help = "Password (prompted twice without echo when omitted)")]
    pub password: Option<String>,
}

/// Runs a `session` subcommand.
///
/// # Errors
/// Returns an error if the input is invalid or the backend rejects it.
pub async fn run(planner: &Planner, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login(args) => login(planner, args).await,
        SessionCommand::Register(args) => register(planner, args).await,
        SessionCommand::Logout => {
            let was_signed_in = planner.session().is_authenticated();
            planner.logout();
            if was_signed_in {
                println!("Signed out.");
            } else {
                println!("No active session.");
            }
            Ok(())
        }
        SessionCommand::Whoami => {
            match planner.session().state() {
                AuthState::Authenticated(user) => print_user(&user),
                _ => println!("Not signed in."),
            }
            Ok(())
        }
    }
}

async fn login(planner: &Planner, args: LoginArgs) -> Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };

    let request = FormState::<LoginForm>::new()
        .with("email", email)?
        .with("password", password)?
        .submit()?;
    let user = planner
        .login(&request, args.return_to.as_deref())
        .await
        .map_err(|err| match err {
            client::ClientError::Unauthorized { .. } => {
                anyhow::anyhow!("login failed: invalid email or password")
            }
            err => hint(err),
        })?;

    print_user(&user);
    println!("continue at {}", planner.navigator().current_path());
    Ok(())
}

async fn register(planner: &Planner, args: RegisterArgs) -> Result<()> {
    let (password, confirmation) = match args.password {
        Some(password) => (password.clone(), password),
        None => (
            prompt_password("Password: ")?,
            prompt_password("Confirm password: ")?,
        ),
    };

    let request = FormState::<RegisterForm>::new()
        .with("name", args.name)?
        .with("email", args.email)?
        .with("password", password)?
        .with("confirmPassword", confirmation)?
        .submit()?;
    let user = planner.register(&request).await.map_err(hint)?;
    println!("Account created.");
    print_user(&user);
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

fn print_user(user: &AuthenticatedUser) {
    println!("Signed in as {} <{}>", user.name, user.email);
    println!("user id: {}", user.id);
    println!("role: {}", user.role);
}
