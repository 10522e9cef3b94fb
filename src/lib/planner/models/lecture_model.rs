//! Module with lecture model compatible with the published catalog JSON files
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::planner::{models::Day, schedule_parser::parse_schedule};

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub credits: String,
    /// May hold several majors joined with `<p>`.
    pub major: String,
    #[serde(default)]
    pub schedule: String,
    pub grade: u8,
}

impl Lecture {
    /// Major as shown to a user, with `<p>` separators turned into spaces.
    pub fn major_label(&self) -> String {
        self.major.replace("<p>", " ").replace("<P>", " ")
    }
}

/// One day and contiguous block of periods occupied by a lecture in a table.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub lecture: Arc<Lecture>,
    pub day: Day,
    pub range: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl ScheduleSlot {
    /// Places a lecture on the grid, one slot per contiguous block of its schedule.
    pub fn expand(lecture: &Arc<Lecture>) -> Vec<ScheduleSlot> {
        parse_schedule(&lecture.schedule)
            .into_iter()
            .map(|spec| ScheduleSlot {
                lecture: Arc::clone(lecture),
                day: spec.day,
                range: spec.range,
                room: spec.room,
            })
            .collect()
    }

    pub fn covers(&self, day: Day, period: u8) -> bool {
        self.day == day && self.range.contains(&period)
    }
}
