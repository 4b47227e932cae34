use clap::Parser;
use driftwatch::cli::{Cli, Command, CompareArgs, DeleteArgs, ExportArgs, SnapArgs, WatchArgs};
use driftwatch::collect;
use driftwatch::config::Config;
use driftwatch::report;
use driftwatch::snapshot::{self, SnapshotRecord};
use driftwatch::store::diff;
use driftwatch::store::Store;
use driftwatch::util::format_timestamp;

// three-way outcome: success, success-with-differences, failure
const EXIT_OK: i32 = 0;
const EXIT_DIFFERENCES: i32 = 1;
const EXIT_FAILURE: i32 = 2;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let code = match cli.command {
        Command::Snap(args) => run_snap(&args, &config),
        Command::List => run_list(&config),
        Command::Compare(args) => run_compare(&args, &config),
        Command::Delete(args) => run_delete(&args, &config),
        Command::Export(args) => run_export(&args, &config),
        Command::Watch(args) => run_watch(&args, &config),
    };

    std::process::exit(code);
}

fn open_store(config: &Config) -> Result<Store, i32> {
    Store::open(config.storage.as_deref()).map_err(|e| {
        eprintln!("Error opening snapshot store: {e}");
        EXIT_FAILURE
    })
}

fn run_snap(args: &SnapArgs, config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let collectors = collect::default_collectors();
    let record = snapshot::capture(&collectors, config, args.name.as_deref());

    if let Err(e) = store.save(&record) {
        eprintln!("Error saving snapshot: {e}");
        return EXIT_FAILURE;
    }

    println!("Snapshot '{}' created", record.id);
    print!("{}", report::table::render_summary(&record));
    EXIT_OK
}

fn run_list(config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.list() {
        Ok(snapshots) => {
            print!("{}", report::table::render_list(&snapshots));
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error listing snapshots: {e}");
            EXIT_FAILURE
        }
    }
}

fn load_snapshot(store: &Store, id_or_name: &str) -> Result<SnapshotRecord, i32> {
    match store.get(id_or_name) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => {
            eprintln!("Snapshot '{id_or_name}' not found");
            Err(EXIT_FAILURE)
        }
        Err(e) => {
            eprintln!("Error loading snapshot '{id_or_name}': {e}");
            Err(EXIT_FAILURE)
        }
    }
}

fn run_compare(args: &CompareArgs, config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let from = match load_snapshot(&store, &args.from) {
        Ok(record) => record,
        Err(code) => return code,
    };

    // second operand defaults to a fresh capture of the live state
    let to = match &args.to {
        Some(name) => match load_snapshot(&store, name) {
            Ok(record) => record,
            Err(code) => return code,
        },
        None => {
            let collectors = collect::default_collectors();
            snapshot::capture(&collectors, config, Some("current"))
        }
    };

    let changes = diff::diff_records(&from, &to);

    if args.json {
        match serde_json::to_string_pretty(&changes) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error encoding change set: {e}");
                return EXIT_FAILURE;
            }
        }
    } else {
        print!("{}", report::changes::render(&changes, &from.id, &to.id));
    }

    if diff::has_changes(&changes) {
        EXIT_DIFFERENCES
    } else {
        EXIT_OK
    }
}

fn run_delete(args: &DeleteArgs, config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.delete(&args.name) {
        Ok(true) => {
            println!("Snapshot '{}' deleted", args.name);
            EXIT_OK
        }
        Ok(false) => {
            eprintln!("Snapshot '{}' not found", args.name);
            EXIT_FAILURE
        }
        Err(e) => {
            eprintln!("Error deleting snapshot '{}': {e}", args.name);
            EXIT_FAILURE
        }
    }
}

fn run_export(args: &ExportArgs, config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let record = match load_snapshot(&store, &args.name) {
        Ok(record) => record,
        Err(code) => return code,
    };

    match serde_json::to_string_pretty(&record) {
        Ok(json) => {
            println!("{json}");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error encoding snapshot: {e}");
            EXIT_FAILURE
        }
    }
}

fn run_watch(args: &WatchArgs, config: &Config) -> i32 {
    let interval = match &args.interval {
        Some(text) => match humantime::parse_duration(text) {
            Ok(duration) => duration,
            Err(e) => {
                eprintln!("Invalid interval '{text}': {e}");
                return EXIT_FAILURE;
            }
        },
        None => config.interval,
    };

    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let collectors = collect::default_collectors();

    println!(
        "Starting continuous monitoring (interval: {})",
        humantime::format_duration(interval)
    );
    println!("Press Ctrl+C to stop");

    let baseline = snapshot::capture(&collectors, config, Some("watch-baseline"));
    if let Err(e) = store.save(&baseline) {
        eprintln!("Error saving baseline snapshot: {e}");
        return EXIT_FAILURE;
    }
    println!("Baseline snapshot '{}' created", baseline.id);

    // every baseline is saved before the sleep, so killing the process at
    // the sleep boundary loses nothing
    let mut last = baseline;
    loop {
        std::thread::sleep(interval);

        let current = snapshot::capture(
            &collectors,
            config,
            Some(&format!("watch-{}", chrono::Utc::now().timestamp())),
        );

        let changes = diff::diff_records(&last, &current);
        if !diff::has_changes(&changes) {
            continue;
        }

        println!(
            "Changes detected at {}",
            format_timestamp(current.timestamp)
        );
        print!("{}", report::changes::render(&changes, &last.id, &current.id));

        // a failed save is logged and the loop keeps its old baseline, so
        // the next cycle re-reports against the last state actually stored
        match store.save(&current) {
            Ok(()) => last = current,
            Err(e) => eprintln!("Error saving snapshot: {e}"),
        }
    }
}
