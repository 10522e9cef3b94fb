use std::sync::Arc;

use log::debug;

use super::{
    models::{lecture_model::Lecture, SearchOptions},
    schedule_parser::{parse_schedule, SlotSpec},
};

/// Shared, immutable list of lectures. Identity of the `Arc` is what
/// memoization and the result window key on.
pub type Lectures = Arc<Vec<Arc<Lecture>>>;

/// Narrows `lectures` to the ones matching every constrained field of `options`,
/// keeping catalog order.
pub fn filter_lectures(lectures: &[Arc<Lecture>], options: &SearchOptions) -> Vec<Arc<Lecture>> {
    let query = options.query.to_lowercase();
    let credits = options
        .credits
        .filter(|&credits| credits != 0)
        .map(|credits| credits.to_string());

    lectures
        .iter()
        .filter(|lecture| {
            query.is_empty()
                || lecture.title.to_lowercase().contains(&query)
                || lecture.id.to_lowercase().contains(&query)
        })
        .filter(|lecture| options.grades.is_empty() || options.grades.contains(&lecture.grade))
        .filter(|lecture| options.majors.is_empty() || options.majors.contains(&lecture.major))
        .filter(|lecture| {
            credits
                .as_deref()
                .map_or(true, |credits| lecture.credits.starts_with(credits))
        })
        .filter(|lecture| matches_schedule(lecture, options))
        .cloned()
        .collect()
}

/* day and time predicates, parsing the schedule only when one of them is active */
fn matches_schedule(lecture: &Lecture, options: &SearchOptions) -> bool {
    if options.days.is_empty() && options.times.is_empty() {
        return true;
    }
    let slots: Vec<SlotSpec> = parse_schedule(&lecture.schedule);
    let day_ok = options.days.is_empty() || slots.iter().any(|s| options.days.contains(&s.day));
    let time_ok = options.times.is_empty()
        || slots
            .iter()
            .any(|s| s.range.iter().any(|period| options.times.contains(period)));
    day_ok && time_ok
}

/// Remembers the last filter pass so unchanged inputs hand back the very same result.
#[derive(Default)]
pub struct LectureFilter {
    memo: Option<Memo>,
}

struct Memo {
    lectures: Lectures,
    options: SearchOptions,
    result: Lectures,
}

impl LectureFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, lectures: &Lectures, options: &SearchOptions) -> Lectures {
        if let Some(memo) = &self.memo {
            if Arc::ptr_eq(&memo.lectures, lectures) && memo.options == *options {
                return Arc::clone(&memo.result);
            }
        }

        let result: Lectures = Arc::new(filter_lectures(lectures, options));
        debug!(
            "Filtered {} lectures down to {}",
            lectures.len(),
            result.len()
        );
        self.memo = Some(Memo {
            lectures: Arc::clone(lectures),
            options: options.clone(),
            result: Arc::clone(&result),
        });
        result
    }
}
