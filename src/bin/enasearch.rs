use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ena_search::app::{App, Retrieved};
use ena_search::catalog::Catalog;
use ena_search::client::EnaHttpClient;
use ena_search::config::{ConfigLoader, ResolvedConfig};
use ena_search::domain::{SequenceFormat, SubsequenceRange};
use ena_search::error::EnaError;
use ena_search::output::{JsonOutput, OutputMode, TextOutput};
use ena_search::request::{RetrieveParams, SearchParams, TaxonParams};
use ena_search::url::UrlBuilder;
use ena_search::validate::Validator;

#[derive(Parser)]
#[command(name = "enasearch")]
#[command(about = "Search and retrieve data from the European Nucleotide Archive (ENA)")]
#[command(version, author)]
struct Cli {
    /// Path to an enasearch.json config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results and listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Get list of results", alias = "get_results")]
    GetResults,
    #[command(about = "Get list of taxonomy results", alias = "get_taxonomy_results")]
    GetTaxonomyResults,
    #[command(about = "Get filter fields of a result", alias = "get_filter_fields")]
    GetFilterFields(ResultArgs),
    #[command(about = "Get returnable fields of a result", alias = "get_returnable_fields")]
    GetReturnableFields(ResultArgs),
    #[command(about = "Get returnable fields for a run report", alias = "get_run_fields")]
    GetRunFields,
    #[command(
        about = "Get returnable fields for an analysis report",
        alias = "get_analysis_fields"
    )]
    GetAnalysisFields,
    #[command(about = "Get sortable fields of a result", alias = "get_sortable_fields")]
    GetSortableFields(ResultArgs),
    #[command(about = "Get filter types usable in a query", alias = "get_filter_types")]
    GetFilterTypes,
    #[command(about = "Get display options", alias = "get_display_options")]
    GetDisplayOptions,
    #[command(about = "Get download options", alias = "get_download_options")]
    GetDownloadOptions,
    #[command(about = "Count the results of a query", alias = "get_result_count")]
    GetResultCount(CountArgs),
    #[command(about = "Search data given a query", alias = "search_data")]
    SearchData(SearchArgs),
    #[command(about = "Retrieve ENA records (other than taxons)", alias = "retrieve_data")]
    RetrieveData(RetrieveArgs),
    #[command(about = "Retrieve ENA taxon data", alias = "retrieve_taxons")]
    RetrieveTaxons(TaxonArgs),
    #[command(about = "Retrieve run report", alias = "retrieve_run_report")]
    RetrieveRunReport(ReportArgs),
    #[command(about = "Retrieve analysis report", alias = "retrieve_analysis_report")]
    RetrieveAnalysisReport(ReportArgs),
}

#[derive(Args)]
struct ResultArgs {
    /// Id of a result (see get-results)
    #[arg(long)]
    result: String,
}

#[derive(Args)]
struct CountArgs {
    #[arg(long)]
    free_text_search: bool,
    #[arg(long)]
    query: String,
    #[arg(long)]
    result: String,
}

#[derive(Args)]
struct SearchArgs {
    /// Use free text search, otherwise the data warehouse is used
    #[arg(long)]
    free_text_search: bool,
    /// Filter conditions joined by AND, OR and NOT
    #[arg(long)]
    query: String,
    #[arg(long)]
    result: String,
    #[arg(long)]
    display: String,
    #[arg(long)]
    download: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    /// Fields to return [multiple or comma-separated]
    #[arg(long)]
    fields: Vec<String>,
    /// Fields to sort the results [multiple or comma-separated]
    #[arg(long)]
    sortfields: Vec<String>,
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
    /// Number of records to retrieve, 0 for no limit
    #[arg(long, allow_negative_numbers = true)]
    length: Option<i64>,
}

#[derive(Args)]
struct RetrieveArgs {
    /// Record ids [multiple or comma-separated]
    #[arg(long, required = true)]
    ids: Vec<String>,
    #[arg(long)]
    display: String,
    #[arg(long)]
    download: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    length: Option<i64>,
    /// Subsequence range as start-stop (1-based, inclusive)
    #[arg(long)]
    subseq_range: Option<String>,
    /// Expand CON records
    #[arg(long)]
    expanded: bool,
    /// Only the header of each record
    #[arg(long)]
    header: bool,
}

#[derive(Args)]
struct TaxonArgs {
    #[command(flatten)]
    retrieve: RetrieveArgs,
    /// Taxonomy result (see get-taxonomy-results)
    #[arg(long)]
    result: Option<String>,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    accession: String,
    /// Fields to return [multiple or comma-separated]
    #[arg(long)]
    fields: Vec<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<EnaError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EnaError) -> u8 {
    if error.is_validation() {
        2
    } else if error.is_upstream() {
        3
    } else {
        1
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let catalog = config.load_catalog()?;

    match cli.command {
        Commands::GetResults => list(mode, catalog.results(), |out| {
            TextOutput::write_results(out, &catalog)
        }),
        Commands::GetTaxonomyResults => list(mode, catalog.taxonomy_results(), |out| {
            TextOutput::write_descriptions(out, catalog.taxonomy_results())
        }),
        Commands::GetFilterFields(args) | Commands::GetSortableFields(args) => {
            let result = Validator::new(&catalog).check_result(&args.result)?;
            let fields = catalog.filter_fields(&result).cloned().unwrap_or_default();
            list(mode, &fields, |out| {
                TextOutput::write_filter_fields(out, &catalog, &fields)
            })
        }
        Commands::GetReturnableFields(args) => returnable_fields(mode, &catalog, &args.result),
        Commands::GetRunFields => returnable_fields(mode, &catalog, "read_run"),
        Commands::GetAnalysisFields => returnable_fields(mode, &catalog, "analysis"),
        Commands::GetFilterTypes => {
            let types = serde_json::json!({
                "filter_types": catalog.filter_types(),
                "special_filters": catalog.special_filters(),
            });
            list(mode, &types, |out| TextOutput::write_filter_types(out, &catalog))
        }
        Commands::GetDisplayOptions => list(mode, catalog.display_options(), |out| {
            TextOutput::write_descriptions(out, catalog.display_options())
        }),
        Commands::GetDownloadOptions => list(mode, catalog.download_options(), |out| {
            TextOutput::write_descriptions(out, catalog.download_options())
        }),
        Commands::GetResultCount(args) => {
            let app = build_app(&config, catalog)?;
            let total = app.count(&args.query, &args.result, args.free_text_search)?;
            match mode {
                OutputMode::Json => {
                    JsonOutput::print(&serde_json::json!({ "count": total })).into_diagnostic()
                }
                OutputMode::Text => {
                    println!("{total}");
                    Ok(())
                }
            }
        }
        Commands::SearchData(args) => {
            let app = build_app(&config, catalog)?;
            run_search(&app, args, mode)
        }
        Commands::RetrieveData(args) => {
            let app = build_app(&config, catalog)?;
            let file = args.file.clone();
            let params = retrieve_params(args)?;
            let retrieved = app.retrieve_data(&params, file.as_deref())?;
            print_retrieved(&retrieved, mode)
        }
        Commands::RetrieveTaxons(args) => {
            let app = build_app(&config, catalog)?;
            let file = args.retrieve.file.clone();
            let base = retrieve_params(args.retrieve)?;
            let params = TaxonParams {
                ids: base.ids,
                display: base.display,
                result: args.result,
                download: base.download,
                offset: base.offset,
                length: base.length,
                range_start: base.range_start,
                range_stop: base.range_stop,
                expanded: base.expanded,
                header: base.header,
            };
            let retrieved = app.retrieve_taxons(&params, file.as_deref())?;
            print_retrieved(&retrieved, mode)
        }
        Commands::RetrieveRunReport(args) => {
            let app = build_app(&config, catalog)?;
            let retrieved =
                app.retrieve_run_report(&args.accession, non_empty(args.fields), args.file.as_deref())?;
            print_retrieved(&retrieved, mode)
        }
        Commands::RetrieveAnalysisReport(args) => {
            let app = build_app(&config, catalog)?;
            let retrieved = app.retrieve_analysis_report(
                &args.accession,
                non_empty(args.fields),
                args.file.as_deref(),
            )?;
            print_retrieved(&retrieved, mode)
        }
    }
}

fn build_app(config: &ResolvedConfig, catalog: Catalog) -> miette::Result<App<EnaHttpClient>> {
    let client = EnaHttpClient::new(config)?;
    Ok(App::new(catalog, UrlBuilder::new(config.base_url()), client))
}

/// FASTA/FASTQ searches without explicit paging fetch every page.
fn run_search(app: &App<EnaHttpClient>, args: SearchArgs, mode: OutputMode) -> miette::Result<()> {
    let fetch_all = SequenceFormat::from_display(&args.display).is_some()
        && args.offset.is_none()
        && args.length.is_none();
    let params = SearchParams {
        query: args.query,
        result: args.result,
        display: args.display,
        free_text: args.free_text_search,
        fields: non_empty(args.fields),
        sort_fields: non_empty(args.sortfields),
        download: args.download,
        offset: args.offset,
        length: args.length,
    };
    let retrieved = if fetch_all {
        app.search_all(&params, args.file.as_deref())?
    } else {
        app.search(&params, args.file.as_deref())?
    };
    print_retrieved(&retrieved, mode)
}

fn retrieve_params(args: RetrieveArgs) -> Result<RetrieveParams, EnaError> {
    let range = args
        .subseq_range
        .as_deref()
        .map(str::parse::<SubsequenceRange>)
        .transpose()?;
    Ok(RetrieveParams {
        ids: args.ids,
        display: args.display,
        download: args.download,
        offset: args.offset,
        length: args.length,
        range_start: range.map(|range| range.start() as i64),
        range_stop: range.map(|range| range.stop() as i64),
        expanded: args.expanded,
        header: args.header,
    })
}

fn returnable_fields(mode: OutputMode, catalog: &Catalog, result: &str) -> miette::Result<()> {
    let result = Validator::new(catalog).check_result(result)?;
    let fields = catalog.returnable_fields(&result);
    list(mode, &fields, |out| TextOutput::write_list(out, fields))
}

fn list<T, F>(mode: OutputMode, value: &T, text: F) -> miette::Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => JsonOutput::print(value).into_diagnostic(),
        OutputMode::Text => {
            let mut stdout = io::stdout().lock();
            text(&mut stdout).into_diagnostic()?;
            stdout.flush().into_diagnostic()
        }
    }
}

fn print_retrieved(retrieved: &Retrieved, mode: OutputMode) -> miette::Result<()> {
    match mode {
        OutputMode::Json => JsonOutput::print(retrieved).into_diagnostic(),
        OutputMode::Text => {
            let mut stdout = io::stdout().lock();
            TextOutput::write_retrieved(&mut stdout, retrieved).into_diagnostic()?;
            stdout.flush().into_diagnostic()
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}
