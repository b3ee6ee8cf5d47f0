use anyhow::Result;
use clap::Subcommand;
use client::Planner;
use shared::{
    form::{FormState, WeatherForm},
    models::WeatherQuery,
};

use super::loaded;

#[derive(Subcommand, Debug)]
pub enum WeatherCommand {
    /// Current conditions in a city
    Current {
        #[arg(help = "City name")]
        city: String,
    },
    /// Daily forecast for a city
    Forecast {
        #[arg(help = "City name")]
        city: String,

        #[arg(long, short, help = "Number of days (defaults to 5)")]
        days: Option<String>,
    },
}

fn lookup(city: String, days: Option<String>) -> Result<WeatherQuery> {
    let mut form = FormState::<WeatherForm>::new();
    form.set("city", city)?.set_opt("days", days)?;
    Ok(form.submit()?)
}

/// Runs a `weather` subcommand. No sign-in needed.
///
/// # Errors
/// Returns an error if the city is blank or the lookup fails.
pub async fn run(planner: &Planner, command: WeatherCommand) -> Result<()> {
    match command {
        WeatherCommand::Current { city } => {
            let query = lookup(city, None)?;
            let weather = loaded(planner.current_weather(&query).await)?;
            let place = if weather.country.is_empty() {
                weather.city_name.clone()
            } else {
                format!("{}, {}", weather.city_name, weather.country)
            };
            println!("{place}: {:.1}°C, {}", weather.temperature, weather.description);
            println!(
                "feels like {:.1}°C, humidity {:.0}%, wind {:.1} m/s",
                weather.feels_like, weather.humidity, weather.wind_speed
            );
        }
        WeatherCommand::Forecast { city, days } => {
            let query = lookup(city, days)?;
            let forecast = loaded(planner.forecast(&query).await)?;
            println!("{}-day forecast for {}", query.days(), forecast.city_name);
            for day in &forecast.daily_forecasts {
                let label = if day.date_text.is_empty() {
                    day.timestamp.to_string()
                } else {
                    day.date_text.clone()
                };
                println!("{label:<12} {:>5.1}°C {}", day.temperature, day.description);
            }
        }
    }
    Ok(())
}
