use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::Figment;
use lib::planner::catalog_getter::CatalogGetter;
use lib::planner::error::{CatalogError, StoreError};
use lib::planner::helpers::get_tables;
use lib::planner::models::lecture_model::Lecture;
use lib::planner::models::{Args, Command, Config, Day, SearchArgs};
use lib::planner::run_tool::run;

pub struct TestGetter {
    pub majors_path: String,
    pub liberal_arts_path: String,
}

impl TestGetter {
    fn from_fixtures() -> Self {
        TestGetter {
            majors_path: "tests/test.majors.json".to_string(),
            liberal_arts_path: "tests/test.liberal_arts.json".to_string(),
        }
    }
}

impl CatalogGetter for TestGetter {
    async fn get_lectures(&self, url: &str) -> Result<Vec<Lecture>, CatalogError> {
        let path = if url.ends_with("schedules-majors.json") {
            &self.majors_path
        } else {
            &self.liberal_arts_path
        };
        let file = BufReader::new(File::open(path).unwrap());
        Ok(serde_json::from_reader(file).unwrap())
    }
}

pub struct FailingGetter;

impl CatalogGetter for FailingGetter {
    async fn get_lectures(&self, url: &str) -> Result<Vec<Lecture>, CatalogError> {
        Err(CatalogError::Status {
            url: url.to_owned(),
            status: 503,
        })
    }
}

fn config() -> Config {
    Figment::new()
        .merge(Json::file("example.config.json"))
        .merge(Env::prefixed("PLANNER_"))
        .extract()
        .unwrap()
}

// every test works on its own copy of the tables fixture
fn scratch_tables(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "lecture-planner-it-{}-{}.json",
        name,
        std::process::id()
    ));
    std::fs::copy("tests/test.tables.json", &path).unwrap();
    path
}

fn args(tables_json_path: &PathBuf, command: Command) -> Args {
    Args {
        config_json_path: PathBuf::from("example.config.json"),
        tables_json_path: tables_json_path.clone(),
        command,
    }
}

async fn run_to_string<CG: CatalogGetter + 'static>(
    getter: CG,
    args: &Args,
) -> Result<String, String> {
    let mut out = Vec::new();
    run(getter, args, config(), &mut out)
        .await
        .map_err(|err| err.to_string())?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn search_by_query_across_both_catalogs() {
    let tables = scratch_tables("search-query");
    let args = args(
        &tables,
        Command::Search(SearchArgs {
            query: Some("자료".to_owned()),
            ..SearchArgs::default()
        }),
    );

    let output = run_to_string(TestGetter::from_fixtures(), &args).await.unwrap();
    std::fs::remove_file(&tables).unwrap();
    assert_eq!(
        output,
        "검색결과: 2개\n\
         CSE2010 | 2학년 | 자료구조 | 3학점 | 컴퓨터공학과 | 월3~4(IT-201)<p>수3~4(IT-201)\n\
         GEN2044 | 1학년 | 자료와 사회 | 1학점 | 교양 핵심교양 | 수3(본관-101)\n\
         (1/1)\n"
    );
}

#[tokio::test]
async fn search_by_day_and_credits() {
    let tables = scratch_tables("search-filters");
    let args = args(
        &tables,
        Command::Search(SearchArgs {
            days: vec![Day::Wed],
            credits: Some(1),
            ..SearchArgs::default()
        }),
    );

    let output = run_to_string(TestGetter::from_fixtures(), &args).await.unwrap();
    std::fs::remove_file(&tables).unwrap();
    assert!(output.starts_with("검색결과: 1개\nGEN2044 |"));
}

#[tokio::test]
async fn add_lecture_to_table_and_save() {
    let tables = scratch_tables("add");
    let args = args(
        &tables,
        Command::Add {
            table: "schedule-1".to_owned(),
            lecture: "MAT1010".to_owned(),
        },
    );

    let output = run_to_string(TestGetter::from_fixtures(), &args).await.unwrap();
    assert_eq!(output, "schedule-1: 2개 시간 추가\n");

    let store = get_tables(&args).unwrap();
    std::fs::remove_file(&tables).unwrap();
    let slots = store.table("schedule-1").unwrap();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[2].lecture.id, "MAT1010");
    assert_eq!((slots[2].day, slots[2].range.clone()), (Day::Mon, vec![1, 2]));
    assert_eq!((slots[3].day, slots[3].range.clone()), (Day::Thu, vec![1, 2]));
}

#[tokio::test]
async fn add_unknown_lecture_leaves_tables_alone() {
    let tables = scratch_tables("add-unknown");
    let args = args(
        &tables,
        Command::Add {
            table: "schedule-1".to_owned(),
            lecture: "NOPE0000".to_owned(),
        },
    );

    let err = run_to_string(TestGetter::from_fixtures(), &args)
        .await
        .unwrap_err();
    assert!(err.contains("NOPE0000"));

    let store = get_tables(&args).unwrap();
    std::fs::remove_file(&tables).unwrap();
    assert_eq!(store.table("schedule-1").unwrap().len(), 2);
}

#[tokio::test]
async fn failed_catalog_fetch_is_reported() {
    let tables = scratch_tables("fetch-fails");
    let args = args(&tables, Command::Search(SearchArgs::default()));

    let err = run_to_string(FailingGetter, &args).await.unwrap_err();
    std::fs::remove_file(&tables).unwrap();
    assert!(err.contains("503"));
}

#[tokio::test]
async fn table_commands_do_not_fetch_the_catalog() {
    let tables = scratch_tables("table-commands");

    let output = run_to_string(
        FailingGetter,
        &args(&tables, Command::Duplicate { table: "schedule-1700000000000".to_owned() }),
    )
    .await
    .unwrap();
    let copy_id = output.trim().to_owned();
    assert!(copy_id.starts_with("schedule-"));

    run_to_string(
        FailingGetter,
        &args(
            &tables,
            Command::Move {
                table: copy_id.clone(),
                index: 0,
                day_delta: -4,
                time_delta: -4,
            },
        ),
    )
    .await
    .unwrap();

    run_to_string(
        FailingGetter,
        &args(
            &tables,
            Command::RemoveSchedule {
                table: "schedule-1".to_owned(),
                day: Day::Mon,
                period: 4,
            },
        ),
    )
    .await
    .unwrap();

    run_to_string(
        FailingGetter,
        &args(&tables, Command::RemoveTable { table: "schedule-1700000000000".to_owned() }),
    )
    .await
    .unwrap();

    let output = run_to_string(FailingGetter, &args(&tables, Command::Tables))
        .await
        .unwrap();
    std::fs::remove_file(&tables).unwrap();
    assert_eq!(
        output,
        format!(
            "schedule-1 (1)\n  \
             [0] 수 3~4교시 10:00~11:00 CSE2010 자료구조 (IT-201)\n\
             {} (1)\n  \
             [0] 월 1교시 09:00~09:30 GEN1001 글쓰기\n",
            copy_id
        )
    );
}

#[tokio::test]
async fn invalid_table_commands_fail_without_saving() {
    let tables = scratch_tables("invalid");

    let err = run_to_string(
        FailingGetter,
        &args(
            &tables,
            Command::Move {
                table: "schedule-1".to_owned(),
                index: 0,
                day_delta: 0,
                time_delta: 30,
            },
        ),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        StoreError::PeriodOutOfRange { delta: 30, last: 24 }.to_string()
    );

    let store = get_tables(&args(&tables, Command::Tables)).unwrap();
    std::fs::remove_file(&tables).unwrap();
    let first = &store.table("schedule-1").unwrap()[0];
    assert_eq!((first.day, first.range.clone()), (Day::Mon, vec![3, 4]));
}
