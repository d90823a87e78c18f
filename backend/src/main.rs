//! CoursePilot CLI - course catalog from student review exports
//!
//! # Main Commands
//!
//! ```bash
//! coursepilot serve                      # Start HTTP server (port 3000)
//! coursepilot ingest                     # Live sheet → course list (JSON)
//! coursepilot ingest export.csv --format csv --sort name_asc
//! coursepilot summary "Linear Algebra"   # AI summary of a course
//! coursepilot ask CS101 "Is attendance mandatory?"
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! coursepilot parse export.csv           # Just tokenize to JSON rows
//! coursepilot fields                     # Show the built-in field map
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use coursepilot::{
    ingest_file, AppConfig, CatalogData, CatalogError, CatalogService, CatalogStore,
    CourseAdvisor, CourseEntry, CourseQuery, FieldMap, ParsedSheet, RecordMapper, SortKey,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "coursepilot")]
#[command(about = "Browse elective courses built from student review exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: COURSEPILOT_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve a local export instead of the published sheet
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Tokenize an export and output its rows as JSON
    Parse {
        /// Input CSV export
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: export → reviews → courses
    Ingest {
        /// Local CSV export (default: fetch the live sheet)
        input: Option<PathBuf>,

        /// Field map JSON overriding the built-in one
        #[arg(long)]
        fields: Option<PathBuf>,

        /// Case-insensitive search over name, code and instructor
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only this department
        #[arg(short, long, default_value = "")]
        department: String,

        /// rating_desc, difficulty_asc, difficulty_desc, dept_asc or name_asc
        #[arg(long, default_value_t = SortKey::EasinessDesc)]
        sort: SortKey,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output reviews instead of courses
        #[arg(long)]
        reviews: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the built-in field map
    Fields,

    /// AI summary of a course's reviews
    Summary {
        /// Course id or name
        course: String,

        /// Local CSV export (default: fetch the live sheet)
        input: Option<PathBuf>,
    },

    /// Ask a question answered from a course's reviews
    Ask {
        /// Course id or name
        course: String,

        /// The question
        question: String,

        /// Local CSV export (default: fetch the live sheet)
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, file } => cmd_serve(port, file).await,

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Ingest {
            input,
            fields,
            search,
            department,
            sort,
            format,
            reviews,
            output,
        } => {
            let query = CourseQuery {
                search,
                department,
                sort,
            };
            cmd_ingest(
                input.as_deref(),
                fields,
                &query,
                format,
                reviews,
                output.as_deref(),
            )
            .await
        }

        Commands::Fields => cmd_fields(),

        Commands::Summary { course, input } => cmd_summary(&course, input.as_deref()).await,

        Commands::Ask {
            course,
            question,
            input,
        } => cmd_ask(&course, &question, input.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>, file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if file.is_some() {
        config.sheet_file = file;
    }

    coursepilot::server::start_server(config).await?;
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing export: {}", input.display());

    let decoded = coursepilot::parser::read_export_file(input)?;
    let sheet = ParsedSheet::parse(&decoded.text);

    eprintln!("   Encoding: {}", decoded.encoding);
    eprintln!("   Columns: {}", sheet.headers().join(", "));
    eprintln!("✅ Parsed {} rows", sheet.len());

    let rows: Vec<Value> = sheet
        .rows()
        .map(|row| {
            let object: Map<String, Value> = row
                .named_columns()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            Value::Object(object)
        })
        .collect();

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

/// Catalog from a local export, or from the live sheet with fallback.
async fn load_catalog(input: Option<&Path>, fields: Option<PathBuf>) -> Result<CatalogData, Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    if fields.is_some() {
        config.fields_path = fields;
    }
    let mapper = RecordMapper::new(config.field_map()?);

    if let Some(path) = input {
        let result = ingest_file(path, &mapper)?;
        eprintln!(
            "   Encoding: {}, rows: {}, skipped: {}",
            result.info.encoding, result.info.row_count, result.info.discarded
        );
        return Ok(result.data);
    }

    let store = CatalogStore::new(CatalogService::new(config.sheet_source(), mapper));
    let outcome = store.refresh().await;
    eprintln!("   Refresh: {:?}", outcome);

    Ok(store.snapshot().await.data.clone())
}

async fn cmd_ingest(
    input: Option<&Path>,
    fields: Option<PathBuf>,
    query: &CourseQuery,
    format: OutputFormat,
    reviews: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_catalog(input, fields).await?;
    let courses: Vec<&CourseEntry> = query.apply(&data.courses);
    eprintln!(
        "📚 {} of {} courses, {} reviews",
        courses.len(),
        data.courses.len(),
        data.reviews.len()
    );

    let content = if reviews {
        let selected: Vec<_> = courses
            .iter()
            .flat_map(|c| data.reviews_for(&c.id))
            .collect();
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(&selected)?,
            OutputFormat::Csv => to_csv(&selected)?,
        }
    } else {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(&courses)?,
            OutputFormat::Csv => to_csv(&courses)?,
        }
    };

    write_output(&content, output)?;
    Ok(())
}

fn to_csv<T: serde::Serialize>(records: &[T]) -> Result<String, CatalogError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CatalogError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CatalogError::Export(e.to_string()))
}

fn cmd_fields() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", FieldMap::builtin().to_json()?);
    Ok(())
}

/// Match by id first, then by case-insensitive name.
fn find_course<'a>(data: &'a CatalogData, key: &str) -> Result<&'a CourseEntry, CatalogError> {
    data.course(key)
        .or_else(|| {
            data.courses
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(key.trim()))
        })
        .ok_or_else(|| CatalogError::CourseNotFound(key.to_string()))
}

fn advisor() -> Result<CourseAdvisor, Box<dyn std::error::Error>> {
    Ok(AppConfig::from_env()?.advisor())
}

async fn cmd_summary(course: &str, input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_catalog(input, None).await?;
    let course = find_course(&data, course)?;
    let reviews = data.reviews_for(&course.id);

    eprintln!("🧠 Summarizing {} review(s) of {}", reviews.len(), course.name);
    println!("{}", advisor()?.summarize(course, &reviews).await);
    Ok(())
}

async fn cmd_ask(course: &str, question: &str, input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_catalog(input, None).await?;
    let course = find_course(&data, course)?;
    let reviews = data.reviews_for(&course.id);

    println!("{}", advisor()?.ask(question, course, &reviews).await);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
