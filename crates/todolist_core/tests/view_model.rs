use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use todolist_core::db::open_db_in_memory;
use todolist_core::{
    Coordinate, FixedClock, Priority, RepoError, SortCriteria, SqliteTaskRepository, TaskDraft,
    TaskViewModel, WeatherClient, WeatherError, WeatherOutcome, WeatherResult, WeatherSnapshot,
};

/// Returns queued results in order; errors with `Unknown` once drained.
#[derive(Default)]
struct ScriptedWeather {
    results: Mutex<Vec<WeatherResult<WeatherSnapshot>>>,
    calls: AtomicUsize,
}

impl ScriptedWeather {
    fn new(results: Vec<WeatherResult<WeatherSnapshot>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().rev().collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl WeatherClient for ScriptedWeather {
    fn fetch(&self, _coordinate: Coordinate) -> WeatherResult<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(WeatherError::Unknown))
    }
}

fn snapshot(location: &str, condition: &str, temperature: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: location.to_string(),
        condition_text: condition.to_string(),
        temperature_celsius: temperature,
    }
}

fn titles(tasks: &[todolist_core::Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn add_then_load_roundtrips_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();

    let due = 1_721_300_000_000;
    let id = vm
        .add(TaskDraft::new("Buy milk", Priority::High, Some(due)))
        .unwrap();
    assert_eq!(vm.tasks().len(), 1);
    assert_eq!(vm.filtered_tasks().len(), 1);

    vm.load().unwrap();
    let task = &vm.tasks()[0];
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.due_at, Some(due));
    assert!(task.description.is_none());
    assert!(task.attachment_paths.is_empty());
    assert!(!task.is_completed);
}

#[test]
fn initial_construction_loads_existing_tasks() {
    let conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteTaskRepository::new(&conn);
        let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();
        vm.add(TaskDraft::new("persisted", Priority::Low, None))
            .unwrap();
    }

    let vm = TaskViewModel::new(SqliteTaskRepository::new(&conn), ScriptedWeather::default())
        .unwrap();
    assert_eq!(titles(vm.tasks()), vec!["persisted"]);
    assert_eq!(titles(vm.filtered_tasks()), vec!["persisted"]);
}

#[test]
fn update_does_not_refresh_cached_lists_until_reload() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();

    let id = vm
        .add(TaskDraft::new("old title", Priority::Low, None))
        .unwrap();
    vm.update(id, &TaskDraft::new("new title", Priority::High, Some(9)))
        .unwrap();

    assert_eq!(titles(vm.tasks()), vec!["old title"]);
    assert_eq!(titles(vm.filtered_tasks()), vec!["old title"]);

    vm.load().unwrap();
    assert_eq!(titles(vm.tasks()), vec!["new title"]);
    assert_eq!(vm.tasks()[0].priority, Priority::High);
}

#[test]
fn toggle_twice_restores_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();

    let id = vm
        .add(TaskDraft::new("flip me", Priority::Medium, None))
        .unwrap();

    assert!(vm.toggle_completion(id).unwrap());
    vm.load().unwrap();
    assert_eq!(titles(&vm.completed_tasks()), vec!["flip me"]);
    assert!(vm.uncompleted_tasks().is_empty());

    assert!(!vm.toggle_completion(id).unwrap());
    vm.load().unwrap();
    assert!(!vm.tasks()[0].is_completed);
}

#[test]
fn delete_reloads_and_clears_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();

    let milk = vm
        .add(TaskDraft::new("Buy milk", Priority::Low, None))
        .unwrap();
    vm.add(TaskDraft::new("Walk dog", Priority::Low, None))
        .unwrap();
    vm.add(TaskDraft::new("Milk the cow", Priority::Low, None))
        .unwrap();

    vm.search("milk");
    assert_eq!(titles(vm.filtered_tasks()), vec!["Buy milk", "Milk the cow"]);

    vm.delete(milk).unwrap();
    assert_eq!(titles(vm.tasks()), vec!["Walk dog", "Milk the cow"]);
    assert_eq!(titles(vm.filtered_tasks()), vec!["Walk dog", "Milk the cow"]);
}

#[test]
fn missing_task_errors_propagate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        vm.toggle_completion(missing),
        Err(RepoError::NotFound(_))
    ));
    assert!(matches!(vm.delete(missing), Err(RepoError::NotFound(_))));
}

#[test]
fn search_and_sort_never_touch_tasks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm =
        TaskViewModel::with_clock(repo, ScriptedWeather::default(), FixedClock(150)).unwrap();

    vm.add(TaskDraft::new("b-low", Priority::Low, Some(300)))
        .unwrap();
    vm.add(TaskDraft::new("a-undated", Priority::Medium, None))
        .unwrap();
    vm.add(TaskDraft::new("c-high", Priority::High, Some(100)))
        .unwrap();
    let original = vm.tasks().to_vec();

    vm.sort(SortCriteria::DueDate);
    assert_eq!(
        titles(vm.filtered_tasks()),
        vec!["c-high", "a-undated", "b-low"]
    );

    vm.sort(SortCriteria::Priority);
    assert_eq!(
        titles(vm.filtered_tasks()),
        vec!["c-high", "b-low", "a-undated"]
    );

    vm.search("");
    assert_eq!(vm.filtered_tasks(), original.as_slice());
    assert_eq!(vm.tasks(), original.as_slice());
}

#[test]
fn weather_success_updates_fields_and_clears_loading() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let client = ScriptedWeather::new(vec![Ok(snapshot("Chennai", "Mist", 31.0))]);
    let mut vm = TaskViewModel::new(repo, client).unwrap();

    assert_eq!(vm.weather_description(), "");
    assert_eq!(vm.temperature(), 0.0);
    assert_eq!(vm.location_name(), "");

    let outcome = vm.fetch_weather(Coordinate::new(13.08, 80.27));
    assert!(matches!(outcome, WeatherOutcome::Applied(_)));
    assert_eq!(vm.location_name(), "Chennai");
    assert_eq!(vm.weather_description(), "Mist");
    assert_eq!(vm.temperature(), 31.0);
    assert!(!vm.is_loading());
}

#[test]
fn weather_failure_keeps_prior_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let client = ScriptedWeather::new(vec![
        Ok(snapshot("Delhi", "Haze", 35.5)),
        Err(WeatherError::NotFound),
        Err(WeatherError::Parse {
            reason: "expected value".to_string(),
        }),
    ]);
    let mut vm = TaskViewModel::new(repo, client).unwrap();
    let here = Coordinate::new(28.6, 77.2);

    vm.fetch_weather(here);
    assert_eq!(
        vm.fetch_weather(here),
        WeatherOutcome::Failed(WeatherError::NotFound)
    );
    assert!(matches!(
        vm.fetch_weather(here),
        WeatherOutcome::Failed(WeatherError::Parse { .. })
    ));

    assert_eq!(vm.location_name(), "Delhi");
    assert_eq!(vm.weather_description(), "Haze");
    assert_eq!(vm.temperature(), 35.5);
    assert!(!vm.is_loading());
}

#[test]
fn stale_completion_is_dropped_and_loading_tracks_in_flight() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut vm = TaskViewModel::new(repo, ScriptedWeather::default()).unwrap();

    let older = vm.begin_weather_fetch();
    let newer = vm.begin_weather_fetch();
    assert!(vm.is_loading());

    let applied = vm.complete_weather_fetch(newer, Ok(snapshot("New", "Clear", 20.0)));
    assert!(matches!(applied, WeatherOutcome::Applied(_)));
    assert!(vm.is_loading());

    let stale = vm.complete_weather_fetch(older, Ok(snapshot("Old", "Rain", 10.0)));
    assert!(matches!(stale, WeatherOutcome::Stale { .. }));
    assert!(!vm.is_loading());
    assert_eq!(vm.location_name(), "New");
}

#[test]
fn spawned_fetch_completes_on_owner_thread() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let client = Arc::new(ScriptedWeather::new(vec![Ok(snapshot(
        "Kochi", "Rain", 27.0,
    ))]));
    let mut vm = TaskViewModel::new(repo, Arc::clone(&client)).unwrap();

    let pending = vm.spawn_weather_fetch(Coordinate::new(9.93, 76.26));
    assert!(vm.is_loading());

    let completion = pending.wait();
    let outcome = vm.complete_weather_fetch(completion.ticket, completion.result);

    assert_eq!(outcome, WeatherOutcome::Applied(snapshot("Kochi", "Rain", 27.0)));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert!(!vm.is_loading());
}

#[test]
fn abandoned_fetches_do_not_pin_loading() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let client = Arc::new(ScriptedWeather::new(vec![
        Ok(snapshot("Goa", "Sunny", 29.0)),
        Ok(snapshot("Agra", "Dust", 38.0)),
    ]));
    let mut vm = TaskViewModel::new(repo, Arc::clone(&client)).unwrap();

    let pending = vm.spawn_weather_fetch(Coordinate::new(15.3, 74.1));
    assert!(vm.is_loading());
    drop(pending);

    let outcome = vm.fetch_weather(Coordinate::new(27.2, 78.0));
    assert!(matches!(outcome, WeatherOutcome::Applied(_)));
    assert!(!vm.is_loading());
    assert!(!vm.state().is_loading);

    let ticket = vm.begin_weather_fetch();
    assert!(vm.is_loading());
    drop(ticket);
    assert!(!vm.is_loading());
}
