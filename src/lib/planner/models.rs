use std::{collections::BTreeSet, fmt, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use super::{error::ParseDayError, result_window::PAGE_SIZE};

pub mod lecture_model;

/// Wall-clock labels of the instructional periods, indexed by `period - 1`.
pub const TIME_SLOTS: [&str; 24] = [
    "09:00~09:30",
    "09:30~10:00",
    "10:00~10:30",
    "10:30~11:00",
    "11:00~11:30",
    "11:30~12:00",
    "12:00~12:30",
    "12:30~13:00",
    "13:00~13:30",
    "13:30~14:00",
    "14:00~14:30",
    "14:30~15:00",
    "15:00~15:30",
    "15:30~16:00",
    "16:00~16:30",
    "16:30~17:00",
    "17:00~17:30",
    "17:30~18:00",
    "18:00~18:50",
    "18:55~19:45",
    "19:50~20:40",
    "20:45~21:35",
    "21:40~22:30",
    "22:35~23:25",
];

/// Highest period a slot may occupy.
pub const LAST_PERIOD: u8 = TIME_SLOTS.len() as u8;

/// Weekdays a lecture can be scheduled on, in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "월")]
    Mon,
    #[serde(rename = "화")]
    Tue,
    #[serde(rename = "수")]
    Wed,
    #[serde(rename = "목")]
    Thu,
    #[serde(rename = "금")]
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "월",
            Day::Tue => "화",
            Day::Wed => "수",
            Day::Thu => "목",
            Day::Fri => "금",
        }
    }

    /// Position of the day in [`Day::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day `delta` columns away, or `None` when that falls off the grid.
    pub fn offset(self, delta: i32) -> Option<Day> {
        let target = i32::try_from(self.index()).ok()?.checked_add(delta)?;
        usize::try_from(target)
            .ok()
            .and_then(|index| Day::ALL.get(index).copied())
    }

    pub fn from_token(token: char) -> Option<Day> {
        Day::ALL
            .into_iter()
            .find(|day| day.label().starts_with(token))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let english = ["mon", "tue", "wed", "thu", "fri"];
        Day::ALL
            .into_iter()
            .zip(english)
            .find(|(day, abbr)| trimmed == day.label() || trimmed.eq_ignore_ascii_case(abbr))
            .map(|(day, _)| day)
            .ok_or_else(|| ParseDayError(trimmed.to_owned()))
    }
}

/// Current state of the search filters. Empty collections mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: String,
    pub grades: BTreeSet<u8>,
    pub days: BTreeSet<Day>,
    pub times: BTreeSet<u8>,
    pub majors: BTreeSet<String>,
    /// `Some(0)` is the "all credits" choice and constrains nothing.
    pub credits: Option<u8>,
}

/// Table the search was opened for, plus the grid cell it was opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    pub table_id: String,
    pub day: Option<Day>,
    pub time: Option<u8>,
}

impl SearchInfo {
    pub fn for_table(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            day: None,
            time: None,
        }
    }
}

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json, that contains the catalog location and search tuning.
/// 2. Path to tables.json, that holds the timetables between launches.
/// 3. The action to perform.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "tables.json")]
    pub tables_json_path: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the catalog and print the visible page of results
    Search(SearchArgs),
    /// Add a lecture from the catalog to a table
    Add {
        #[arg(long)]
        table: String,
        #[arg(long, value_name = "LECTURE_ID")]
        lecture: String,
    },
    /// Copy a table under a new id
    Duplicate {
        #[arg(long)]
        table: String,
    },
    /// Delete a table, unless it is the last one
    RemoveTable {
        #[arg(long)]
        table: String,
    },
    /// Delete every slot of a table covering the given day and period
    RemoveSchedule {
        #[arg(long)]
        table: String,
        #[arg(long)]
        day: Day,
        #[arg(long)]
        period: u8,
    },
    /// Shift a slot by whole days and periods
    Move {
        #[arg(long)]
        table: String,
        #[arg(long)]
        index: usize,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        day_delta: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        time_delta: i32,
    },
    /// List the tables and their slots
    Tables,
}

#[derive(clap::Args, Debug, Default)]
pub struct SearchArgs {
    /// Substring of the lecture title or code
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long = "grade")]
    pub grades: Vec<u8>,
    #[arg(long = "day")]
    pub days: Vec<Day>,
    #[arg(long = "time")]
    pub times: Vec<u8>,
    #[arg(long = "major")]
    pub majors: Vec<String>,
    #[arg(long)]
    pub credits: Option<u8>,
    /// How many times the end of the result list is scrolled into view
    #[arg(long, default_value_t = 0)]
    pub scrolls: usize,
}

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Base URL the catalog files are served from
/// 2. File names of the majors and liberal-arts catalogs
/// 3. Rows revealed per page of results
/// 4. Quiet period before typed search text is applied
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_majors_resource")]
    pub majors_resource: String,
    #[serde(default = "default_liberal_arts_resource")]
    pub liberal_arts_resource: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Config {
    pub fn resource_url(&self, resource: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, resource)
        } else {
            format!("{}/{}", self.base_url, resource)
        }
    }
}

fn default_majors_resource() -> String {
    "schedules-majors.json".to_owned()
}

fn default_liberal_arts_resource() -> String {
    "schedules-liberal-arts.json".to_owned()
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    300
}
