use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use client::Planner;
use shared::{
    form::{FormState, ProfileForm},
    models::UserProfile,
};

use super::{hint, loaded};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show your profile
    Show,
    /// Change profile fields; anything not given stays as it is
    Update(UpdateProfileArgs),
}

#[derive(Args, Debug)]
pub struct UpdateProfileArgs {
    #[arg(long, short, help = "Display name")]
    pub name: Option<String>,
    #[arg(long, help = "Phone number")]
    pub phone: Option<String>,
    #[arg(long, help = "Postal address")]
    pub address: Option<String>,
    #[arg(long, help = "Preferred language code (e.g., en)")]
    pub language: Option<String>,
    #[arg(long, help = "Preferred currency (three letters, e.g., EUR)")]
    pub currency: Option<String>,
    #[arg(long, help = "Email notifications: on or off")]
    pub notifications: Option<String>,
}

/// Runs a `profile` subcommand.
///
/// # Errors
/// Returns an error if nobody is signed in, the input is invalid, or the
/// request fails.
pub async fn run(planner: &Planner, command: ProfileCommand) -> Result<()> {
    if !planner.session().is_authenticated() {
        bail!("not signed in. run `planner session login` first");
    }
    match command {
        ProfileCommand::Show => {
            let profile = loaded(planner.profile().await)?;
            print_profile(&profile);
        }
        ProfileCommand::Update(args) => {
            let current = loaded(planner.profile().await)?;
            let mut form =
                FormState::with_model(ProfileForm::with_preferences(current.preferences.clone()));
            form.set_opt("name", args.name)?
                .set_opt("phone", args.phone)?
                .set_opt("address", args.address)?
                .set_opt("language", args.language)?
                .set_opt("currency", args.currency)?
                .set_opt("notifications", args.notifications)?;
            let update = form.submit()?;
            let profile = planner.update_profile(&update).await.map_err(hint)?;
            println!("Profile updated.");
            print_profile(&profile);
        }
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("{} <{}>", profile.name, profile.email);
    if let Some(phone) = &profile.phone {
        println!("phone: {phone}");
    }
    if let Some(address) = &profile.address {
        println!("address: {address}");
    }
    if let Some(preferences) = &profile.preferences {
        println!(
            "language: {}, currency: {}, notifications: {}",
            preferences.language,
            preferences.currency,
            if preferences.notifications { "on" } else { "off" }
        );
    }
}
