use std::{collections::BTreeSet, sync::Arc, time::Duration};

use log::{debug, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{
    debouncer::Debouncer,
    error::StoreError,
    lecture_filter::{LectureFilter, Lectures},
    models::{lecture_model::Lecture, Config, SearchInfo, SearchOptions},
    result_window::ResultWindow,
    timetable_store::TimetableStore,
};

/// State behind the lecture search: the loaded catalog, the filters, the table
/// the search was opened for, and the slice of results currently revealed.
pub struct SearchSession {
    lectures: Lectures,
    majors: Vec<String>,
    options: SearchOptions,
    target: Option<SearchInfo>,
    filter: LectureFilter,
    filtered: Lectures,
    window: ResultWindow,
    debouncer: Debouncer,
    debounce_delay: Duration,
    committed_tx: UnboundedSender<String>,
    committed_rx: UnboundedReceiver<String>,
}

impl SearchSession {
    pub fn new(config: &Config) -> Self {
        Self::with_settings(config.page_size, Duration::from_millis(config.debounce_ms))
    }

    pub fn with_settings(page_size: usize, debounce_delay: Duration) -> Self {
        let (committed_tx, committed_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            lectures: Arc::new(Vec::new()),
            majors: Vec::new(),
            options: SearchOptions::default(),
            target: None,
            filter: LectureFilter::new(),
            filtered: Arc::new(Vec::new()),
            window: ResultWindow::new(page_size),
            debouncer: Debouncer::new(),
            debounce_delay,
            committed_tx,
            committed_rx,
        };
        session.refresh();
        session
    }

    /// Replaces the catalog, e.g. once the fetch completes.
    pub fn load_lectures(&mut self, lectures: Lectures) {
        let mut seen = BTreeSet::new();
        self.majors = lectures
            .iter()
            .filter(|lecture| seen.insert(lecture.major.as_str()))
            .map(|lecture| lecture.major.clone())
            .collect();
        info!(
            "Search has {} lectures across {} majors",
            lectures.len(),
            self.majors.len()
        );
        self.lectures = lectures;
        self.refresh();
    }

    /// Starts a search for `info.table_id`. The day and time filters follow
    /// the grid cell the search was opened from; other filters are kept.
    pub fn open(&mut self, info: SearchInfo) {
        self.options.days = info.day.into_iter().collect();
        self.options.times = info.time.into_iter().collect();
        self.target = Some(info);
        self.refresh();
    }

    pub fn close(&mut self) {
        self.target = None;
        self.debouncer.cancel();
    }

    pub fn target(&self) -> Option<&SearchInfo> {
        self.target.as_ref()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn update_options(&mut self, change: impl FnOnce(&mut SearchOptions)) {
        change(&mut self.options);
        self.refresh();
    }

    /// Records typed search text. It reaches the filters only after the quiet
    /// period passes without another keystroke. Must be called from within a
    /// tokio runtime.
    pub fn type_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        let tx = self.committed_tx.clone();
        self.debouncer.schedule(
            move || {
                let _ = tx.send(text);
            },
            self.debounce_delay,
        );
    }

    /// Applies every query committed so far without waiting.
    /// Returns whether the query changed.
    pub fn apply_committed_queries(&mut self) -> bool {
        let mut latest = None;
        while let Ok(query) = self.committed_rx.try_recv() {
            latest = Some(query);
        }
        match latest {
            Some(query) => self.commit_query(query),
            None => false,
        }
    }

    /// Waits for the next committed query and applies it.
    pub async fn wait_for_query(&mut self) -> Option<String> {
        let query = self.committed_rx.recv().await?;
        self.commit_query(query.clone());
        Some(query)
    }

    pub fn lectures(&self) -> &Lectures {
        &self.lectures
    }

    /// Distinct majors in catalog order.
    pub fn all_majors(&self) -> &[String] {
        &self.majors
    }

    pub fn find_lecture(&self, id: &str) -> Option<&Arc<Lecture>> {
        self.lectures.iter().find(|lecture| lecture.id == id)
    }

    pub fn results(&self) -> &Lectures {
        &self.filtered
    }

    pub fn result_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible(&self) -> &[Arc<Lecture>] {
        self.window.visible()
    }

    pub fn window(&self) -> &ResultWindow {
        &self.window
    }

    pub fn on_sentinel_visible(&mut self) {
        self.window.on_sentinel_visible();
    }

    pub fn take_scroll_reset(&mut self) -> bool {
        self.window.take_scroll_reset()
    }

    /// Adds the lecture to the table the search was opened for and closes the
    /// search. Without an open search nothing happens and `None` is returned.
    pub fn add_to_table(
        &mut self,
        store: &mut TimetableStore,
        lecture: &Arc<Lecture>,
    ) -> Result<Option<usize>, StoreError> {
        let Some(target) = &self.target else {
            return Ok(None);
        };
        let added = store.add_schedule(&target.table_id, lecture)?;
        self.close();
        Ok(Some(added))
    }

    fn commit_query(&mut self, query: String) -> bool {
        if self.options.query == query {
            return false;
        }
        debug!("Search query is now {:?}", query);
        self.options.query = query;
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        let filtered = self.filter.apply(&self.lectures, &self.options);
        self.window.sync(&filtered);
        self.filtered = filtered;
    }
}
