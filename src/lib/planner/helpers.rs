use std::{error::Error, fs::File, io::BufReader};

use log::{debug, info};

use super::{
    models::{
        lecture_model::{Lecture, ScheduleSlot},
        Args, SearchArgs, SearchOptions, TIME_SLOTS,
    },
    timetable_store::{TableMap, TimetableStore},
};

pub fn log_all_tables(store: &TimetableStore) -> () {
    for (table_id, slots) in store.tables() {
        debug!("Table {} holds {} slots", table_id, slots.len());
    }
}

pub fn get_tables(args: &Args) -> Result<TimetableStore, Box<dyn Error>> {
    info!(
        "Reading tables from {}",
        std::path::absolute(&args.tables_json_path)?.display()
    );
    if args.tables_json_path.exists() {
        let tables_file = BufReader::new(File::open(&args.tables_json_path)?);
        let tables: TableMap = serde_json::from_reader(tables_file)?;
        let store = TimetableStore::from_tables(tables)?;
        log_all_tables(&store);
        Ok(store)
    } else {
        Ok(TimetableStore::new())
    }
}

pub fn write_tables(args: &Args, store: &TimetableStore) -> Result<(), Box<dyn Error>> {
    info!(
        "Writing {} tables to a {}",
        store.len(),
        std::path::absolute(&args.tables_json_path)?.display()
    );

    let tables_file = File::create(&args.tables_json_path)?;

    Ok(serde_json::to_writer_pretty(tables_file, store.tables())?)
}

/// Filters picked on the command line. The query is left out, it goes
/// through the typing path instead.
pub fn search_options_from_args(search: &SearchArgs) -> SearchOptions {
    SearchOptions {
        query: String::new(),
        grades: search.grades.iter().copied().collect(),
        days: search.days.iter().copied().collect(),
        times: search.times.iter().copied().collect(),
        majors: search.majors.iter().cloned().collect(),
        credits: search.credits,
    }
}

/* wall-clock span of a block of periods, e.g. "10:00~11:00" */
pub fn period_span(range: &[u8]) -> Option<String> {
    let label = |period: u8| TIME_SLOTS.get(usize::from(period).checked_sub(1)?);
    let first = label(*range.first()?)?;
    let last = label(*range.last()?)?;
    let start = first.split('~').next()?;
    let end = last.split('~').nth(1)?;
    Some(format!("{}~{}", start, end))
}

pub fn format_lecture_row(lecture: &Lecture) -> String {
    format!(
        "{} | {}학년 | {} | {}학점 | {} | {}",
        lecture.id,
        lecture.grade,
        lecture.title,
        lecture.credits,
        lecture.major_label(),
        lecture.schedule
    )
}

pub fn format_slot(index: usize, slot: &ScheduleSlot) -> String {
    let periods = match (slot.range.first(), slot.range.last()) {
        (Some(first), Some(last)) if first != last => format!("{}~{}교시", first, last),
        (Some(first), _) => format!("{}교시", first),
        _ => String::new(),
    };
    let mut row = format!(
        "[{}] {} {} {} {} {}",
        index,
        slot.day,
        periods,
        period_span(&slot.range).unwrap_or_default(),
        slot.lecture.id,
        slot.lecture.title
    );
    if let Some(room) = &slot.room {
        row.push_str(&format!(" ({})", room));
    }
    row
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
