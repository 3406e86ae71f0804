//! sort-page: sort a delimited text table by named columns and print one page
//!
//! The first line of the input names the columns. Sort columns are given in
//! precedence order with `-s FIELD[,asc|desc]`; later columns break ties.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

use sort_paginate::{
    args::PageArgs,
    config::{KeyMode, PaginateConfig, TableConfig, DEFAULT_PARALLEL_THRESHOLD},
    error::{SortError, SortResult},
    page::{PageRequest, PageResult, DEFAULT_PAGE_SIZE},
    paginate::Paginator,
    plan::SortPlan,
    request::SortRequest,
    table::Table,
    EXIT_FAILURE, EXIT_SUCCESS,
};

/// Everything parsed from the command line
#[derive(Debug, Clone, Default)]
struct Options {
    args: PageArgs,
    table: TableConfig,
    paginate: PaginateConfig,
}

fn main() {
    let result = run();
    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("sort-page: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run() -> SortResult<i32> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("debug"));

    let options = parse_config_from_matches(&matches)?;
    configure_thread_pool(&options.paginate)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let exit_code = execute(&options, &mut out, &mut io::stderr())?;
    out.flush()?;
    Ok(exit_code)
}

fn build_cli() -> Command {
    Command::new("sort-page")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("sort-page [OPTION]... [FILE]")
        .about("Sort a table by named columns and print one page of it")
        .long_about("Sort a table by named columns and print one page of it.\n\nThe first non-blank line of FILE (or standard input) is a header naming the columns. Each --sort names a column and an optional direction; the first one is the primary key and later ones break ties. Records that tie on every column keep their input order.")

        // Input
        .arg(Arg::new("file")
            .help("Input table (use '-' or omit for stdin)")
            .value_name("FILE"))
        .arg(Arg::new("field-separator")
            .short('t')
            .long("field-separator")
            .help("Use SEP instead of runs of whitespace to split fields")
            .value_name("SEP"))

        // Sorting
        .arg(Arg::new("sort")
            .short('s')
            .long("sort")
            .help("Sort by FIELD, ascending unless DIR is desc; repeat for tie-breakers")
            .value_name("FIELD[,DIR]")
            .action(ArgAction::Append))
        .arg(Arg::new("mode")
            .long("mode")
            .help("Default comparison for all columns")
            .value_name("MODE")
            .value_parser(["lexicographic", "ignore-case", "numeric"]))
        .arg(Arg::new("ignore-case")
            .short('f')
            .long("ignore-case")
            .help("Fold case when comparing columns (same as --mode ignore-case)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("numeric")
            .short('n')
            .long("numeric")
            .help("Compare COLUMN by general numeric value")
            .value_name("COLUMN")
            .action(ArgAction::Append))
        .arg(Arg::new("check")
            .short('c')
            .long("check")
            .help("Check whether the input is already sorted; do not page")
            .action(ArgAction::SetTrue))

        // Paging
        .arg(Arg::new("offset")
            .short('o')
            .long("offset")
            .help("Skip the first N sorted records")
            .value_name("N"))
        .arg(Arg::new("page")
            .short('p')
            .long("page")
            .help("Zero-based page number (offset = N * limit)")
            .value_name("N"))
        .arg(Arg::new("limit")
            .short('l')
            .long("limit")
            .help("Records per page")
            .value_name("N"))
        .arg(Arg::new("max-page-size")
            .long("max-page-size")
            .help("Clamp the page size to at most N records")
            .value_name("N"))

        // Output
        .arg(Arg::new("json")
            .long("json")
            .help("Print the page as JSON")
            .action(ArgAction::SetTrue))

        // Performance options
        .arg(Arg::new("parallel")
            .long("parallel")
            .help("Sort on N threads once the table is large enough")
            .value_name("N"))
        .arg(Arg::new("parallel-threshold")
            .long("parallel-threshold")
            .help("Minimum number of records before sorting in parallel")
            .value_name("N"))

        .arg(Arg::new("debug")
            .long("debug")
            .help("Log sort plans and timings to stderr")
            .action(ArgAction::SetTrue))
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_count(matches: &clap::ArgMatches, name: &str) -> SortResult<Option<usize>> {
    matches
        .get_one::<String>(name)
        .map(|value| {
            value
                .parse::<usize>()
                .map_err(|_| SortError::parse_error(&format!("invalid {}: {}", name, value)))
        })
        .transpose()
}

/// Parse configuration from command line matches
fn parse_config_from_matches(matches: &clap::ArgMatches) -> SortResult<Options> {
    let mut options = Options::default();

    options.args.file = matches.get_one::<String>("file").cloned();
    options.args.json = matches.get_flag("json");
    options.args.check = matches.get_flag("check");
    options.args.sort = matches
        .get_many::<String>("sort")
        .unwrap_or_default()
        .cloned()
        .collect();

    // Paging
    let limit = parse_count(matches, "limit")?.unwrap_or(DEFAULT_PAGE_SIZE);
    options.args.page = match (parse_count(matches, "offset")?, parse_count(matches, "page")?) {
        (Some(_), Some(_)) => {
            return Err(SortError::conflicting_options(
                "cannot use both --offset and --page",
            ))
        }
        (Some(offset), None) => PageRequest::new(offset, limit),
        (None, Some(page)) => PageRequest::of(page, limit),
        (None, None) => PageRequest::of_size(limit),
    };

    if options.args.check && options.args.json {
        return Err(SortError::conflicting_options(
            "--check is incompatible with --json",
        ));
    }

    // Key modes
    let mode = matches
        .get_one::<String>("mode")
        .map(|mode| mode.parse::<KeyMode>())
        .transpose()?;
    options.table.default_mode = match (mode, matches.get_flag("ignore-case")) {
        (Some(mode), true) if mode != KeyMode::IgnoreCase => {
            return Err(SortError::conflicting_options(&format!(
                "--ignore-case conflicts with --mode {}",
                mode
            )))
        }
        (Some(mode), _) => mode,
        (None, true) => KeyMode::IgnoreCase,
        (None, false) => KeyMode::Lexicographic,
    };
    for column in matches.get_many::<String>("numeric").unwrap_or_default() {
        options
            .table
            .column_modes
            .insert(column.clone(), KeyMode::Numeric);
    }

    if let Some(sep_str) = matches.get_one::<String>("field-separator") {
        let mut chars = sep_str.chars();
        match (chars.next(), chars.next()) {
            (Some(sep), None) => options.table.field_separator = Some(sep),
            _ => return Err(SortError::invalid_field_separator(sep_str)),
        }
    }
    options.table.validate()?;

    // Performance
    options.paginate.max_page_size = parse_count(matches, "max-page-size")?;
    options.paginate.parallel_threads = parse_count(matches, "parallel")?;
    options.paginate.parallel_threshold = parse_count(matches, "parallel-threshold")?;
    if options.paginate.parallel_threads.is_some() && options.paginate.parallel_threshold.is_none() {
        options.paginate.parallel_threshold = Some(DEFAULT_PARALLEL_THRESHOLD);
    }
    options.paginate.validate()?;

    Ok(options)
}

fn configure_thread_pool(config: &PaginateConfig) -> SortResult<()> {
    if config.parallel_threshold.is_none() {
        return Ok(());
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_thread_count())
        .build_global()
        .map_err(|e| SortError::thread_pool_error(&e.to_string()))
}

fn load_table(args: &PageArgs, config: &TableConfig) -> SortResult<Table> {
    match args.file.as_deref() {
        Some(file) if !args.reading_from_stdin() => Table::open(Path::new(file), config),
        _ => Table::from_reader(io::stdin().lock(), config),
    }
}

/// One-line description of where a page sits in the dataset
fn summary<T>(page: &PageResult<T>) -> String {
    let request = page.page_request();
    if page.has_content() {
        format!(
            "records {}-{} of {} (page {} of {})",
            request.offset() + 1,
            request.offset() + page.number_of_elements(),
            page.total_elements(),
            page.page_number() + 1,
            page.total_pages()
        )
    } else {
        format!("no records on this page; {} in total", page.total_elements())
    }
}

/// Sort and page the table; rows go to `out`, diagnostics to `err`
fn execute<W: Write, E: Write>(options: &Options, out: &mut W, err: &mut E) -> SortResult<i32> {
    let table = load_table(&options.args, &options.table)?;
    let columns = table.column_map(&options.table);
    let request = SortRequest::from_specs(&options.args.sort)?;

    if options.args.check {
        let plan = SortPlan::resolve(&request, &columns)?;
        return match plan.first_unsorted(table.records()) {
            None => Ok(EXIT_SUCCESS),
            Some(index) => {
                writeln!(err, "sort-page: disorder at record {}", index + 1)?;
                Ok(EXIT_FAILURE)
            }
        };
    }

    let paginator = Paginator::new(options.paginate.clone());
    let page = paginator.paginate(table.records(), &request, &columns, options.args.page)?;
    writeln!(err, "sort-page: {}", summary(&page))?;

    if options.args.json {
        serde_json::to_writer_pretty(&mut *out, &table.page_to_json(page))?;
        writeln!(out)?;
    } else {
        table.write_page(&page, out)?;
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PEOPLE: &str = "name,age,city,country\n\
                          Charlie,30,New York,USA\n\
                          Alice,25,Paris,France\n\
                          Bob,20,Los Angeles,USA\n\
                          David,35,Los Angeles,USA\n\
                          Eva,28,Paris,France\n";

    fn options_for(argv: &[&str]) -> Options {
        let matches = build_cli()
            .try_get_matches_from(argv)
            .expect("Failed to parse test arguments");
        parse_config_from_matches(&matches).expect("Failed to parse test config")
    }

    fn run_on(input: &str, argv: &[&str]) -> SortResult<(i32, String, String)> {
        let temp_dir = TempDir::new()?;
        let input_file = temp_dir.path().join("people.csv");
        fs::write(&input_file, input)?;

        let mut full_argv = argv.to_vec();
        let path = input_file.to_string_lossy().to_string();
        full_argv.push(&path);

        let options = options_for(&full_argv);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute(&options, &mut out, &mut err)?;
        Ok((
            code,
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&err).into_owned(),
        ))
    }

    #[test]
    fn test_parse_basic_config() {
        let options = options_for(&["sort-page", "-s", "age", "-s", "city,desc", "-l", "3"]);
        assert_eq!(options.args.sort, ["age", "city,desc"]);
        assert_eq!(options.args.page, PageRequest::new(0, 3));
        assert!(options.args.reading_from_stdin());
        assert_eq!(options.table.default_mode, KeyMode::Lexicographic);
    }

    #[test]
    fn test_parse_page_and_modes() {
        let options = options_for(&[
            "sort-page", "-p", "2", "-l", "5", "-n", "age", "-f", "-t", ",", "people.csv",
        ]);
        assert_eq!(options.args.page, PageRequest::new(10, 5));
        assert_eq!(options.table.mode_for("age"), KeyMode::Numeric);
        assert_eq!(options.table.mode_for("name"), KeyMode::IgnoreCase);
        assert_eq!(options.table.field_separator, Some(','));
        assert_eq!(options.args.file.as_deref(), Some("people.csv"));
    }

    #[test]
    fn test_parallel_flag_enables_threshold() {
        let options = options_for(&["sort-page", "--parallel", "4"]);
        assert_eq!(options.paginate.parallel_threads, Some(4));
        assert_eq!(
            options.paginate.parallel_threshold,
            Some(DEFAULT_PARALLEL_THRESHOLD)
        );
    }

    #[test]
    fn test_conflicting_options() {
        let app = build_cli();
        for argv in [
            &["sort-page", "-o", "1", "-p", "1"][..],
            &["sort-page", "--mode", "numeric", "-f"][..],
            &["sort-page", "-t", "ab"][..],
            &["sort-page", "-l", "many"][..],
            &["sort-page", "--parallel", "0"][..],
        ] {
            let matches = app
                .clone()
                .try_get_matches_from(argv)
                .expect("Failed to parse test arguments");
            assert!(parse_config_from_matches(&matches).is_err(), "{argv:?}");
        }
    }

    #[test]
    fn test_execute_sorts_and_pages() -> SortResult<()> {
        let (code, out, err) = run_on(
            PEOPLE,
            &["sort-page", "-t", ",", "-n", "age", "-s", "age", "-s", "city", "-l", "3"],
        )?;

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(
            out,
            "name,age,city,country\n\
             Bob,20,Los Angeles,USA\n\
             Alice,25,Paris,France\n\
             Eva,28,Paris,France\n"
        );
        assert_eq!(err, "sort-page: records 1-3 of 5 (page 1 of 2)\n");

        Ok(())
    }

    #[test]
    fn test_execute_offset_past_end() -> SortResult<()> {
        let (code, out, err) = run_on(PEOPLE, &["sort-page", "-t", ",", "-s", "name", "-o", "10"])?;

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "name,age,city,country\n");
        assert_eq!(err, "sort-page: no records on this page; 5 in total\n");

        Ok(())
    }

    #[test]
    fn test_execute_json_output() -> SortResult<()> {
        let (_, out, _) = run_on(
            PEOPLE,
            &["sort-page", "-t", ",", "-s", "country,desc", "-s", "name", "-l", "2", "--json"],
        )?;

        let json: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(json["totalElements"], 5);
        assert_eq!(json["content"][0]["name"], "Bob");
        assert_eq!(json["content"][1]["name"], "Charlie");
        assert_eq!(json["page"]["limit"], 2);

        Ok(())
    }

    #[test]
    fn test_execute_unknown_column() {
        let err = run_on(PEOPLE, &["sort-page", "-t", ",", "-s", "salary"]).unwrap_err();
        assert_eq!(err.column(), Some("salary"));
        assert_eq!(
            err.to_string(),
            "Invalid sorting column name: salary. Available columns: [age, city, country, name]"
        );
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_execute_check_mode() -> SortResult<()> {
        let (code, out, err) = run_on(PEOPLE, &["sort-page", "-t", ",", "-c", "-s", "name"])?;
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(err, "sort-page: disorder at record 2\n");

        let (code, _, _) = run_on(
            PEOPLE,
            &["sort-page", "-t", ",", "-c", "-s", "country,desc", "-s", "age,desc"],
        )?;
        assert_eq!(code, EXIT_FAILURE);

        let sorted = "name,age\nann,1\nben,2\ncat,2\n";
        let (code, _, _) = run_on(sorted, &["sort-page", "-t", ",", "-c", "-s", "age"])?;
        assert_eq!(code, EXIT_SUCCESS);

        Ok(())
    }

    #[test]
    fn test_summary_text() {
        let page = PageResult::new(vec![1, 2], PageRequest::new(4, 2), 7);
        assert_eq!(summary(&page), "records 5-6 of 7 (page 3 of 4)");
    }
}
