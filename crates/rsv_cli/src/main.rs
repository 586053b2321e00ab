//! Command line front end for the practice room reservation portal.
//! Credentials come from `USER_ID` / `USER_PW` (a `.env` file is honoured).

mod config;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tcmrsv::date::parse_date;
use tcmrsv::validation::is_id_valid;
use tcmrsv::*;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "tcmrsv",
    about = "Check, book and cancel practice rooms",
    version
)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogued rooms (no login needed)
    Rooms(RoomsArgs),

    /// Show free slots per room for one campus and day
    Availability {
        /// Campus: ikebukuro, nakameguro, or the site code 1/2
        #[arg(long)]
        campus: Campus,

        /// Day to check (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// List your reservations
    Reservations,

    /// Book a room
    Reserve {
        /// Campus: ikebukuro, nakameguro, or the site code 1/2
        #[arg(long)]
        campus: Campus,

        /// Room name as printed by the site, or its identifier
        #[arg(long)]
        room: String,

        /// Day to book (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Start time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        from: (u32, u32),

        /// End time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        to: (u32, u32),
    },

    /// Cancel a reservation
    Cancel {
        /// Reservation identifier, as shown by `reservations`
        #[arg(long)]
        id: String,

        /// Reason sent with the cancellation
        #[arg(long)]
        comment: String,
    },
}

#[derive(Args)]
struct RoomsArgs {
    /// Only rooms on this campus
    #[arg(long)]
    campus: Option<Campus>,

    /// Only rooms whose name contains this text
    #[arg(long)]
    name: Option<String>,

    /// Only rooms on this floor (negative for basements)
    #[arg(long, allow_negative_numbers = true)]
    floor: Option<i32>,

    /// Only rooms with a grand piano
    #[arg(long, conflicts_with = "upright")]
    grand: bool,

    /// Only rooms with an upright piano
    #[arg(long)]
    upright: bool,
}

impl RoomsArgs {
    fn filter(&self) -> RoomFilter {
        let mut piano_types = Vec::new();
        if self.grand {
            piano_types.push(PianoType::Grand);
        }
        if self.upright {
            piano_types.push(PianoType::Upright);
        }

        RoomFilter {
            name: self.name.clone(),
            piano_types,
            floors: self.floor.into_iter().collect(),
            campuses: self.campus.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Parse `HH:MM` into `(hour, minute)`
fn parse_clock(text: &str) -> Result<(u32, u32), String> {
    let (hour, minute) = text
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{}'", text))?;
    let hour = hour.parse().map_err(|_| format!("invalid hour in '{}'", text))?;
    let minute = minute.parse().map_err(|_| format!("invalid minute in '{}'", text))?;
    Ok((hour, minute))
}

/// Resolve `--room` to a catalog identifier
fn resolve_room_id(room: &str, campus: Campus) -> Result<String> {
    if is_id_valid(room) {
        return Ok(room.to_string());
    }
    find_by_name(room, campus)
        .map(|r| r.id.clone())
        .ok_or_else(|| anyhow!("Unknown room '{}'; see `tcmrsv rooms`", room))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn logged_in_client(config: &Config) -> Result<RsvClient> {
    let credentials = config.credentials()?;
    let mut client = RsvClient::new(Some(config.client.clone()))?;
    client.login(&credentials).await.context("Login failed")?;
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    match cli.command {
        Commands::Rooms(args) => {
            let rooms = rooms_filtered(&args.filter());
            if cli.json {
                return print_json(&rooms);
            }
            for room in &rooms {
                println!("{}  {:<11}  {}", room.id, room.campus.to_string(), room.name);
            }
        }
        Commands::Availability { campus, date } => {
            let mut client = logged_in_client(&config).await?;
            let availabilities = client
                .get_room_availability(&GetRoomAvailabilityParams { campus, date })
                .await
                .context("Could not read availability")?;
            if cli.json {
                return print_json(&availabilities);
            }
            if availabilities.is_empty() {
                println!("No free rooms at {} on {}", campus, date);
            }
            for availability in &availabilities {
                let times: Vec<String> = availability
                    .available_times
                    .iter()
                    .map(|t| format!("{:02}:{:02}", t.hour, t.minute))
                    .collect();
                println!("{}: {}", availability.room.name, times.join(" "));
            }
        }
        Commands::Reservations => {
            let mut client = logged_in_client(&config).await?;
            let reservations = client
                .get_my_reservations()
                .await
                .context("Could not read reservations")?;
            if cli.json {
                return print_json(&reservations);
            }
            if reservations.is_empty() {
                println!("No reservations");
            }
            for r in &reservations {
                let date = r.date.map(|d| d.to_string()).unwrap_or_else(|| "????-??-??".to_string());
                println!("{}  {}  {}  {}  {}", r.id, date, r.time_range(), r.campus_name, r.room_name);
            }
        }
        Commands::Reserve { campus, room, date, from, to } => {
            let room_id = resolve_room_id(&room, campus)?;
            let mut client = logged_in_client(&config).await?;
            client
                .reserve(&ReserveParams {
                    campus,
                    room_id,
                    date,
                    from_hour: from.0,
                    from_minute: from.1,
                    to_hour: to.0,
                    to_minute: to.1,
                })
                .await
                .context("Reservation failed")?;
            println!(
                "Reserved {} on {} {:02}:{:02}-{:02}:{:02}",
                room, date, from.0, from.1, to.0, to.1
            );
        }
        Commands::Cancel { id, comment } => {
            let mut client = logged_in_client(&config).await?;
            client
                .cancel_reservation(&CancelReservationParams {
                    reservation_id: id.clone(),
                    comment,
                })
                .await
                .context("Cancellation failed")?;
            println!("Cancelled reservation {}", id);
        }
    }

    log::debug!("Done");
    Ok(())
}
