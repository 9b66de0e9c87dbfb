use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    daemon::{
        storage::{
            tally::DailyTally,
            tally_store::{TallyStore, TallyStoreImpl},
        },
        TALLY_FILE_NAME,
    },
    utils::{
        dir::create_application_default_path,
        time::{date_key, format_hms},
    },
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct TodayCommand {
    #[arg(
        long = "date",
        short,
        help = "Day to report instead of today. Examples are \"yesterday\", \"15/03/2025\", \"last friday\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print the raw number of seconds")]
    raw: bool,
}

/// Command to process `today` command. Prints the accumulated active seconds
/// for the requested day. The daemon only ever keeps the latest day on disk,
/// so any other date reads as zero.
pub async fn process_today_command(
    TodayCommand {
        date,
        date_style,
        raw,
    }: TodayCommand,
) -> Result<()> {
    let requested = match parse_requested_date(date, date_style) {
        Ok(value) => value,
        Err(value) => return Err(value),
    };

    let store = TallyStoreImpl::new(create_application_default_path()?.join(TALLY_FILE_NAME))?;

    let tally = store
        .load()
        .await?
        .filter(|tally| tally.date == requested)
        .unwrap_or_else(|| DailyTally::fresh(requested));

    if raw {
        println!("{}", tally.seconds);
    } else {
        println!("{}\t{}", date_key(tally.date), format_hms(tally.seconds));
    }
    Ok(())
}

fn parse_requested_date(date: Option<String>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    let dialect: chrono_english::Dialect = date_style.into();
    match date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => Ok(v.with_timezone(&Local).date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}
