#[macro_use]
extern crate clap;
use clap::{App, Arg, ArgMatches, SubCommand};

#[macro_use]
extern crate failure;
use failure::Error;

use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::Path;

mod batch_processor;
mod catalog;
mod cli_utils;
mod lookup;
mod query_log;
mod render;

use catalog::Catalog;
use lookup::{LookupEngine, LookupError, MatcherConfig};
use query_log::QueryLog;

use chrono::offset::Local;
use chrono::NaiveDate;

#[derive(Debug, Fail)]
pub enum MainError {
    #[fail(display = "Delimiter must be a single ASCII character, got {:?}", _0)]
    InvalidDelimiter(String),
    #[fail(display = "Invalid date {:?}, expected YYYY-MM-DD", _0)]
    InvalidDate(String),
}

fn main() {
    let matches = build_cli().get_matches();

    let local_time = Local::now();
    let time_offset = local_time.offset();
    let level = match matches.is_present("verbose") {
        true => simplelog::LevelFilter::Debug,
        false => simplelog::LevelFilter::Info,
    };
    // Configure logging
    simplelog::TermLogger::init(
        level,
        simplelog::Config {
            offset: time_offset.clone(),
            ..simplelog::Config::default()
        },
        simplelog::TerminalMode::Stderr,
    )
    .ok();

    match do_main(&matches) {
        Ok(_) => info!("Process finished OK"),
        Err(err) => {
            error!("Process finished with an error: {}", err);
            std::process::exit(1);
        }
    };
}

fn build_cli() -> App<'static, 'static> {
    App::new("leasing-tariffs")
        .version("0.1.0")
        .author("Gustavo Ajzenman")
        .about("Insurance tariff statistics for leased property")
        .arg(Arg::with_name("catalog")
            .short("c")
            .long("catalog")
            .help("Path of the ';'-separated tariff catalog")
            .takes_value(true)
            .default_value("tariffs_online.csv")
        )
        .arg(Arg::with_name("delimiter")
            .short("d")
            .long("delimiter")
            .help("Delimiter for catalog and report fields")
            .takes_value(true)
            .default_value(";")
        )
        .arg(Arg::with_name("threshold")
            .long("threshold")
            .help("Minimum similarity for fuzzy matches, between 0 and 1")
            .takes_value(true)
            .default_value("0.62")
        )
        .arg(Arg::with_name("top")
            .long("top")
            .help("Maximum number of distinct names kept by fuzzy matching")
            .takes_value(true)
            .default_value("5")
        )
        .arg(Arg::with_name("log-file")
            .long("log-file")
            .help("Query log used by chat and digest")
            .takes_value(true)
            .default_value("user_queries.log")
        )
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("Log matching details")
        )
        .subcommand(
            SubCommand::with_name("info")
                .about("Print the welcome phrase with the catalog size")
        )
        .subcommand(
            SubCommand::with_name("lookup")
                .about("Look up one leased property")
                .arg(Arg::with_name("json")
                    .long("json")
                    .help("Print the result as JSON instead of Markdown")
                )
                .arg(Arg::with_name("query")
                    .multiple(true)
                    .help("Property name to look up")
                )
        )
        .subcommand(
            SubCommand::with_name("chat")
                .about("Answer queries typed on stdin, one per line")
                .arg(Arg::with_name("user-id")
                    .long("user-id")
                    .help("User id written to the query log")
                    .takes_value(true)
                    .default_value("0")
                )
                .arg(Arg::with_name("user")
                    .short("u")
                    .long("user")
                    .help("Username written to the query log")
                    .takes_value(true)
                    .default_value("cli")
                )
        )
        .subcommand(
            SubCommand::with_name("digest")
                .about("Print the digest of logged queries for one day")
                .arg(Arg::with_name("date")
                    .long("date")
                    .help("Day to report, YYYY-MM-DD. Defaults to today.")
                    .takes_value(true)
                )
        )
        .subcommand(
            SubCommand::with_name("batch")
                .about("Look up every line of a file and write a CSV report")
                .arg(Arg::with_name("input")
                    .short("i")
                    .long("input")
                    .help("Sets the input file to use. If omitted, stdin will be used.")
                    .takes_value(true)
                )
                .arg(Arg::with_name("output")
                    .short("o")
                    .long("output")
                    .help("Sets the output file to create. If omitted, stdout will be used.")
                    .takes_value(true)
                )
                .arg(Arg::with_name("quiet")
                    .short("q")
                    .long("quiet")
                    .help("Hide the progress bar")
                )
        )
}

fn parse_delimiter(matches: &ArgMatches) -> Result<u8, MainError> {
    // Should be exactly one character.
    let delimiter = matches
        .value_of("delimiter")
        .unwrap_or_default()
        .replace("\\t", "\t");
    match delimiter.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(MainError::InvalidDelimiter(delimiter)),
    }
}

fn load_catalog(path: &Path, delimiter: u8) -> Result<Catalog, Error> {
    let spinner = cli_utils::create_spinner(false, "Loading catalog...");
    let result = Catalog::load(path, delimiter);
    spinner.finish_and_clear();

    Ok(result?)
}

fn info_command(catalog: &Catalog) -> Result<(), Error> {
    println!("{}", render::welcome_phrase(catalog.len()));
    Ok(())
}

fn lookup_command(engine: &LookupEngine, query: &str, as_json: bool) -> Result<(), Error> {
    let outcome = engine.lookup(query);

    match (outcome, as_json) {
        (Ok(result), true) => println!("{}", serde_json::to_string_pretty(&result)?),
        (Ok(result), false) => println!("{}", render::render_result(&result)),
        (Err(LookupError::InvalidQuery(query)), true) => println!(
            "{}",
            serde_json::json!({ "status": "invalid_query", "query": query })
        ),
        (Err(LookupError::InvalidQuery(_)), false) => println!("{}", render::INVALID_QUERY_PROMPT),
    }

    Ok(())
}

fn reply_to(engine: &LookupEngine, message: &str) -> String {
    match message {
        "/start" => render::welcome_phrase(engine.catalog().len()),
        "/help" => render::help_text(),
        query => match engine.lookup(query) {
            Ok(result) => render::render_result(&result),
            Err(LookupError::InvalidQuery(_)) => render::INVALID_QUERY_PROMPT.to_owned(),
        },
    }
}

fn chat_command(engine: &LookupEngine, query_log: &QueryLog, user_id: &str, username: &str) -> Result<(), Error> {
    info!("Reading queries from stdin, one per line. Ctrl-D to quit.");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let message = line.trim();

        if let Err(err) = query_log.append(user_id, username, message) {
            warn!("Unable to log query to {}: {}", query_log.path().display(), err);
        }

        writeln!(out, "{}\n", reply_to(engine, message))?;
        out.flush()?;
    }

    Ok(())
}

fn digest_command(query_log: &QueryLog, day: NaiveDate) -> Result<(), Error> {
    let lines = query_log.lines()?;
    info!("Composing digest for {} from {} logged queries", day, lines.len());
    println!("{}", query_log::compose_digest(&lines, day));
    Ok(())
}

fn batch_command(engine: &LookupEngine, matches: &ArgMatches, delimiter: u8) -> Result<(), Error> {
    let stdin = io::stdin();
    let (mut input_file, input_file_size): (Box<dyn io::Read>, Option<u64>) = match matches.value_of("input") {
        Some(path) => {
            let input_file = std::fs::File::open(path)?;
            let file_size = input_file.metadata()?.len();
            (Box::new(input_file), Some(file_size))
        }
        None => {
            info!("Reading from stdin");
            (Box::new(stdin.lock()), None)
        }
    };

    let stdout = io::stdout();
    let mut output_file: Box<dyn io::Write> = match matches.value_of("output") {
        Some(path) => {
            info!("Writing to file {}.", path);
            Box::new(std::fs::File::create(path)?)
        }
        None => Box::new(stdout.lock()),
    };

    let stats = batch_processor::batch_lookup(
        engine,
        input_file.as_mut(),
        input_file_size,
        output_file.as_mut(),
        delimiter,
        matches.is_present("quiet"),
    )?;

    info!(
        "Stats: {} queries, {} not found, {} invalid",
        stats.total_lines, stats.not_found_lines, stats.invalid_lines
    );
    Ok(())
}

fn do_main(matches: &ArgMatches) -> Result<(), Error> {
    let query_log = QueryLog::new(matches.value_of("log-file").unwrap_or_default());

    // The digest only needs the query log.
    if let Some(digest_matches) = matches.subcommand_matches("digest") {
        let day = match digest_matches.value_of("date") {
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| MainError::InvalidDate(text.to_owned()))?,
            None => Local::now().naive_local().date(),
        };
        return digest_command(&query_log, day);
    }

    let delimiter = parse_delimiter(matches)?;
    let config = MatcherConfig {
        threshold: value_t!(matches, "threshold", f64).unwrap_or_else(|e| e.exit()),
        top_n: value_t!(matches, "top", usize).unwrap_or_else(|e| e.exit()),
    };

    let catalog_path = Path::new(matches.value_of("catalog").unwrap_or_default());
    let catalog = load_catalog(catalog_path, delimiter)?;
    let engine = LookupEngine::new(&catalog, config);

    match matches.subcommand() {
        ("info", _) => info_command(&catalog),
        ("lookup", Some(lookup_matches)) => {
            let query = lookup_matches
                .values_of("query")
                .map(|words| words.collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            lookup_command(&engine, &query, lookup_matches.is_present("json"))
        }
        ("chat", Some(chat_matches)) => chat_command(
            &engine,
            &query_log,
            chat_matches.value_of("user-id").unwrap_or_default(),
            chat_matches.value_of("user").unwrap_or_default(),
        ),
        ("batch", Some(batch_matches)) => batch_command(&engine, batch_matches, delimiter),
        _ => info_command(&catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CATALOG_STR: &str = include_str!("catalog/test_resources/tariffs_sample.csv");

    #[test]
    fn it_should_accept_single_character_delimiters() {
        let matches = build_cli().get_matches_from(vec!["leasing-tariffs", "-d", "\\t", "info"]);
        assert_eq!(parse_delimiter(&matches).unwrap(), b'\t');

        let matches = build_cli().get_matches_from(vec!["leasing-tariffs", "info"]);
        assert_eq!(parse_delimiter(&matches).unwrap(), b';');
    }

    #[test]
    fn it_should_reject_long_delimiters() {
        let matches = build_cli().get_matches_from(vec!["leasing-tariffs", "-d", ";;", "info"]);

        match parse_delimiter(&matches) {
            Err(MainError::InvalidDelimiter(_)) => {}
            _ => panic!("Wrong Error"),
        }
    }

    #[test]
    fn it_should_answer_chat_commands_and_queries() {
        let catalog = Catalog::from_reader(SAMPLE_CATALOG_STR.as_bytes(), b';').unwrap();
        let engine = LookupEngine::new(&catalog, MatcherConfig::default());

        assert!(reply_to(&engine, "/start").contains("Сейчас в базе 12 записей"));
        assert!(reply_to(&engine, "/help").starts_with("Доступные команды:"));
        assert_eq!(reply_to(&engine, ""), render::INVALID_QUERY_PROMPT);
        assert!(reply_to(&engine, "toyota camry").contains("Найдено *1* запись"));
        assert!(reply_to(&engine, "zzzzzz").contains("не найден"));
    }
}
