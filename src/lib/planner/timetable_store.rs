use std::{
    collections::BTreeMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, info};

use super::{
    error::StoreError,
    models::{
        lecture_model::{Lecture, ScheduleSlot},
        Day, LAST_PERIOD,
    },
};

pub type TableMap = BTreeMap<String, Vec<ScheduleSlot>>;

pub const DEFAULT_TABLE_ID: &str = "schedule-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Notify = Box<dyn FnMut(&TableMap)>;

/// Every timetable, keyed by table id. There is always at least one table.
///
/// Mutations validate before touching anything, so a rejected call leaves the
/// store exactly as it was. Readers subscribe to a value derived from the tables
/// and hear about it only when that value changes.
pub struct TimetableStore {
    tables: TableMap,
    subscribers: Vec<(SubscriptionId, Notify)>,
    next_subscription: u64,
}

impl TimetableStore {
    pub fn new() -> Self {
        let mut tables = TableMap::new();
        tables.insert(DEFAULT_TABLE_ID.to_owned(), Vec::new());
        Self {
            tables,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Seeds the store with saved tables; with none, starts with one empty table.
    /// Every slot must cover a non-empty run of consecutive periods within
    /// `1..=LAST_PERIOD`.
    pub fn from_tables(tables: TableMap) -> Result<Self, StoreError> {
        for (table_id, slots) in &tables {
            for (index, slot) in slots.iter().enumerate() {
                if !is_valid_range(&slot.range) {
                    return Err(StoreError::InvalidSlot {
                        table: table_id.to_owned(),
                        index,
                        range: slot.range.clone(),
                    });
                }
            }
        }
        if tables.is_empty() {
            return Ok(Self::new());
        }
        Ok(Self {
            tables,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn tables(&self) -> &TableMap {
        &self.tables
    }

    pub fn table(&self, table_id: &str) -> Option<&[ScheduleSlot]> {
        self.tables.get(table_id).map(Vec::as_slice)
    }

    pub fn table_ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registers `listener` for the value `selector` derives from the tables.
    /// The listener runs after a mutation only if the derived value changed.
    pub fn subscribe<T, S, L>(&mut self, selector: S, mut listener: L) -> SubscriptionId
    where
        T: PartialEq + 'static,
        S: Fn(&TableMap) -> T + 'static,
        L: FnMut(&T) + 'static,
    {
        let mut last = selector(&self.tables);
        let notify = move |tables: &TableMap| {
            let next = selector(tables);
            if next != last {
                listener(&next);
                last = next;
            }
        };

        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(notify)));
        id
    }

    pub fn subscribe_table_ids<L>(&mut self, listener: L) -> SubscriptionId
    where
        L: FnMut(&Vec<String>) + 'static,
    {
        self.subscribe(|tables| tables.keys().cloned().collect::<Vec<_>>(), listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != self.subscribers.len()
    }

    /// Copies a table under a fresh `schedule-<millis>` id and returns that id.
    pub fn duplicate_table(&mut self, table_id: &str) -> Result<String, StoreError> {
        let copy = self.slots(table_id)?.clone();
        let new_id = self.fresh_table_id();
        info!("Duplicated {} into {}", table_id, new_id);
        self.tables.insert(new_id.clone(), copy);
        self.notify();
        Ok(new_id)
    }

    pub fn remove_table(&mut self, table_id: &str) -> Result<(), StoreError> {
        self.slots(table_id)?;
        if self.tables.len() == 1 {
            return Err(StoreError::LastTable(table_id.to_owned()));
        }
        self.tables.remove(table_id);
        info!("Removed table {}", table_id);
        self.notify();
        Ok(())
    }

    /// Places every block of the lecture's schedule on the table.
    /// Returns how many slots were added.
    pub fn add_schedule(&mut self, table_id: &str, lecture: &Arc<Lecture>) -> Result<usize, StoreError> {
        self.slots(table_id)?;
        let added = ScheduleSlot::expand(lecture);
        let count = added.len();
        debug!("Adding {} slot(s) of {} to {}", count, lecture.id, table_id);
        self.slots_mut(table_id)?.extend(added);
        self.notify();
        Ok(count)
    }

    /// Drops every slot on `day` whose periods include `period`.
    /// Returns how many slots were removed.
    pub fn remove_schedule(&mut self, table_id: &str, day: Day, period: u8) -> Result<usize, StoreError> {
        let slots = self.slots_mut(table_id)?;
        let before = slots.len();
        slots.retain(|slot| !slot.covers(day, period));
        let removed = before - slots.len();
        debug!("Removed {} slot(s) at {}{} from {}", removed, day, period, table_id);
        self.notify();
        Ok(removed)
    }

    /// Shifts the slot at `index` by whole days and periods.
    pub fn move_schedule(
        &mut self,
        table_id: &str,
        index: usize,
        day_delta: i32,
        time_delta: i32,
    ) -> Result<(), StoreError> {
        let slots = self.slots(table_id)?;
        let slot = slots.get(index).ok_or_else(|| StoreError::SlotIndexOutOfRange {
            table: table_id.to_owned(),
            index,
            len: slots.len(),
        })?;

        let day = slot.day.offset(day_delta).ok_or(StoreError::DayOutOfRange {
            day: slot.day,
            delta: day_delta,
        })?;
        let range = slot
            .range
            .iter()
            .map(|&period| shift_period(period, time_delta))
            .collect::<Option<Vec<u8>>>()
            .ok_or(StoreError::PeriodOutOfRange {
                delta: time_delta,
                last: LAST_PERIOD,
            })?;

        debug!(
            "Moving slot {} of {} to {}{:?}",
            index, table_id, day, range
        );
        let slot = &mut self.slots_mut(table_id)?[index];
        slot.day = day;
        slot.range = range;
        self.notify();
        Ok(())
    }

    fn slots(&self, table_id: &str) -> Result<&Vec<ScheduleSlot>, StoreError> {
        self.tables
            .get(table_id)
            .ok_or_else(|| StoreError::UnknownTable(table_id.to_owned()))
    }

    fn slots_mut(&mut self, table_id: &str) -> Result<&mut Vec<ScheduleSlot>, StoreError> {
        self.tables
            .get_mut(table_id)
            .ok_or_else(|| StoreError::UnknownTable(table_id.to_owned()))
    }

    fn fresh_table_id(&self) -> String {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        loop {
            let candidate = format!("schedule-{}", millis);
            if !self.tables.contains_key(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    fn notify(&mut self) {
        for (_, notify) in self.subscribers.iter_mut() {
            notify(&self.tables);
        }
    }
}

impl Default for TimetableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_range(range: &[u8]) -> bool {
    !range.is_empty()
        && range.iter().all(|period| (1..=LAST_PERIOD).contains(period))
        && range.windows(2).all(|pair| pair[0].checked_add(1) == Some(pair[1]))
}

fn shift_period(period: u8, delta: i32) -> Option<u8> {
    let shifted = i32::from(period).checked_add(delta)?;
    u8::try_from(shifted)
        .ok()
        .filter(|shifted| (1..=LAST_PERIOD).contains(shifted))
}
