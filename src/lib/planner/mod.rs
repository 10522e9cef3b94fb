//! Lecture search and timetable planning.
pub mod catalog_cache;
pub mod catalog_getter;
pub mod debouncer;
pub mod error;
pub mod helpers;
pub mod lecture_filter;
pub mod models;
pub mod result_window;
pub mod run_tool;
pub mod schedule_parser;
pub mod search_session;
pub mod timetable_store;
