//! CLI smoke and ops entry point.
//!
//! # Responsibility
//! - Verify `gamesoc_core` linkage (`ping`).
//! - Preview a pasted recipient list before it is used for dispatch.
//! - Print a committee's members in display order from a local database.
//! - Send one bulk message to a pasted recipient list.

use gamesoc_core::db::open_db;
use gamesoc_core::{
    build_recipient_set, init_logging, AppConfig, CommitteeService, DispatchOptions, Dispatcher,
    HttpBatchSender, RecipientSources, SqliteCommitteeRepository,
};
use std::process::ExitCode;
use uuid::Uuid;

const USAGE: &str = "usage: gamesoc_cli <command>
  ping
  recipients <file>
  members <db> <committee_id>
  send <config.toml> <recipients_file> <subject> <body_file>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();

    let result = match args.as_slice() {
        [] | ["ping"] => {
            println!("gamesoc_core ping={}", gamesoc_core::ping());
            println!("gamesoc_core version={}", gamesoc_core::core_version());
            Ok(())
        }
        ["recipients", path] => print_recipients(path),
        ["members", db_path, committee_id] => print_members(db_path, committee_id),
        ["send", config_path, recipients_path, subject, body_path] => {
            send(config_path, recipients_path, subject, body_path)
        }
        _ => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("failed to read `{path}`: {err}"))
}

fn print_recipients(path: &str) -> Result<(), String> {
    let set = build_recipient_set(&RecipientSources {
        pasted_text: Some(read_file(path)?),
        ..RecipientSources::default()
    });

    for recipient in set.recipients() {
        println!("{}\t{}", recipient.name, recipient.email);
    }
    for error in set.errors() {
        eprintln!("{error}");
    }
    println!(
        "recipients={} duplicates={} errors={}",
        set.len(),
        set.duplicates(),
        set.errors().len()
    );
    Ok(())
}

fn print_members(db_path: &str, committee_id: &str) -> Result<(), String> {
    let committee_id = Uuid::parse_str(committee_id)
        .map_err(|err| format!("invalid committee id `{committee_id}`: {err}"))?;
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteCommitteeRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = CommitteeService::new(repo);

    let members = service
        .list_members(committee_id)
        .map_err(|err| err.to_string())?;
    for member in members {
        println!("{}\t{}\t{}", member.order_index, member.name, member.role);
    }
    Ok(())
}

fn send(
    config_path: &str,
    recipients_path: &str,
    subject: &str,
    body_path: &str,
) -> Result<(), String> {
    let config = AppConfig::load(config_path).map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let set = build_recipient_set(&RecipientSources {
        pasted_text: Some(read_file(recipients_path)?),
        ..RecipientSources::default()
    });
    for error in set.errors() {
        eprintln!("skipped {error}");
    }
    let body = read_file(body_path)?;

    let sender = HttpBatchSender::new(&config.dispatch).map_err(|err| err.to_string())?;
    let dispatcher = Dispatcher::with_options(sender, DispatchOptions::from(&config.dispatch));
    let progress = dispatcher
        .dispatch_with_progress(&set.selected(), subject, &body, |progress| {
            println!(
                "sent={} failed={} total={}",
                progress.sent, progress.failed, progress.total
            );
        })
        .map_err(|err| err.to_string())?;

    if progress.failed > 0 {
        return Err(format!(
            "{} of {} messages failed",
            progress.failed, progress.total
        ));
    }
    Ok(())
}
