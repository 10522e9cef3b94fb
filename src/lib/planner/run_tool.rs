use std::{error::Error, io::Write};

use log::info;

use super::{
    catalog_cache::Catalog,
    catalog_getter::CatalogGetter,
    helpers::{format_lecture_row, format_slot, get_tables, search_options_from_args, write_tables},
    models::{Args, Command, Config, SearchArgs, SearchInfo},
    search_session::SearchSession,
    timetable_store::TimetableStore,
};

/// Performs the command from `args` against the saved tables, fetching the
/// catalog through `catalog_getter` when the command needs it.
pub async fn run<CG: CatalogGetter + 'static, W: Write>(
    catalog_getter: CG,
    args: &Args,
    config: Config,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let mut store = get_tables(args)?;
    info!("Found {} tables", store.len());

    match &args.command {
        Command::Search(search) => {
            let mut session = load_session(catalog_getter, &config).await?;
            search_catalog(&mut session, search, out).await?;
        }
        Command::Add { table, lecture } => {
            let mut session = load_session(catalog_getter, &config).await?;
            let found = session
                .find_lecture(lecture)
                .cloned()
                .ok_or_else(|| format!("No lecture {} in the catalog", lecture))?;
            session.open(SearchInfo::for_table(table.as_str()));
            let added = session.add_to_table(&mut store, &found)?.unwrap_or_default();
            writeln!(out, "{}: {}개 시간 추가", table, added)?;
            write_tables(args, &store)?;
        }
        Command::Duplicate { table } => {
            let new_id = store.duplicate_table(table)?;
            writeln!(out, "{}", new_id)?;
            write_tables(args, &store)?;
        }
        Command::RemoveTable { table } => {
            store.remove_table(table)?;
            write_tables(args, &store)?;
        }
        Command::RemoveSchedule { table, day, period } => {
            let removed = store.remove_schedule(table, *day, *period)?;
            writeln!(out, "{}: {}개 시간 삭제", table, removed)?;
            write_tables(args, &store)?;
        }
        Command::Move {
            table,
            index,
            day_delta,
            time_delta,
        } => {
            store.move_schedule(table, *index, *day_delta, *time_delta)?;
            write_tables(args, &store)?;
        }
        Command::Tables => print_tables(&store, out)?,
    }

    Ok(())
}

async fn load_session<CG: CatalogGetter + 'static>(
    catalog_getter: CG,
    config: &Config,
) -> Result<SearchSession, Box<dyn Error>> {
    let catalog = Catalog::new(catalog_getter, config);
    let lectures = catalog.fetch_all_lectures().await?;
    let mut session = SearchSession::new(config);
    session.load_lectures(lectures);
    Ok(session)
}

async fn search_catalog<W: Write>(
    session: &mut SearchSession,
    search: &SearchArgs,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let options = search_options_from_args(search);
    session.update_options(|current| *current = options);
    if let Some(query) = &search.query {
        session.type_query(query.as_str());
        session.wait_for_query().await;
    }
    for _ in 0..search.scrolls {
        session.on_sentinel_visible();
    }

    writeln!(out, "검색결과: {}개", session.result_count())?;
    for lecture in session.visible() {
        writeln!(out, "{}", format_lecture_row(lecture))?;
    }
    let window = session.window();
    writeln!(out, "({}/{})", window.page(), window.last_page())?;
    Ok(())
}

fn print_tables<W: Write>(store: &TimetableStore, out: &mut W) -> Result<(), Box<dyn Error>> {
    for (table_id, slots) in store.tables() {
        writeln!(out, "{} ({})", table_id, slots.len())?;
        for (index, slot) in slots.iter().enumerate() {
            writeln!(out, "  {}", format_slot(index, slot))?;
        }
    }
    Ok(())
}
