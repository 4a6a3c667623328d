//! Merge CLI
//!
//! Boundary binary for the remote-execution collaborator: runs one merge
//! against a local database path and reports through the one-line protocol.
//!
//! Usage:
//!   xuihub_merge <db_path> <target_id> <src_id,src_id,...> [output_path]
//!   xuihub_merge <target_id> <src_id,src_id,...>          (db from DATABASE_URL)
//!
//! With an output path the database is not mutated; a merged standalone copy
//! is written there instead. Prints `OK_MODE=... OK_ADDED=... BEFORE=...
//! AFTER=...` or `ERR_<REASON>` and exits with the reason's numeric code.

use std::env;
use std::path::PathBuf;
use std::process;

use dotenv::dotenv;

use xuihub_engine::models::MergeRequest;
use xuihub_engine::{config, merge, merge_to_file, report};

fn main() {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (db_path, target_raw, sources_raw, output) = match split_args(&args) {
        Some(parts) => parts,
        None => {
            eprintln!(
                "usage: xuihub_merge [<db_path>] <target_id> <src_id,src_id,...> [output_path]"
            );
            process::exit(2);
        }
    };

    let target_id = match target_raw.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("target id must be an integer, got '{}'", target_raw);
            process::exit(2);
        }
    };
    let source_ids = match parse_id_list(&sources_raw) {
        Ok(ids) => ids,
        Err(bad) => {
            eprintln!("source ids must be a comma-separated integer list, got '{}'", bad);
            process::exit(2);
        }
    };

    let request = MergeRequest::new(target_id, source_ids);
    let outcome = match &output {
        Some(out) => merge_to_file(&db_path, &request, out),
        None => merge(&db_path, &request),
    };

    match outcome {
        Ok(result) => {
            println!("{}", report::success_line(&result));
        }
        Err(error) => {
            log::error!("[Merge] {}", error);
            println!("{}", report::error_line(&error));
            process::exit(report::exit_code(&error));
        }
    }
}

/// Figure out which of the optional positions were given. A leading integer
/// means the database path was omitted and comes from the environment.
fn split_args(args: &[String]) -> Option<(PathBuf, String, String, Option<PathBuf>)> {
    match args {
        [target, sources] if target.parse::<i64>().is_ok() => Some((
            PathBuf::from(config::database_url()),
            target.clone(),
            sources.clone(),
            None,
        )),
        [db, target, sources] => Some((PathBuf::from(db), target.clone(), sources.clone(), None)),
        [db, target, sources, output] => Some((
            PathBuf::from(db),
            target.clone(),
            sources.clone(),
            Some(PathBuf::from(output)),
        )),
        _ => None,
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, String> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => return Err(part.to_string()),
        }
    }
    Ok(ids)
}
