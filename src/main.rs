use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use htmledit::core::{ensure_zip_extension, EditorError, EditorResult, ScanOptions};
use htmledit::env::{self, EnvVar};
use htmledit::translation::{ConfigManager, HttpTranslator, TranslationConfig};
use htmledit::workspace::DEFAULT_EXPORT_NAME;
use htmledit::{EntrySummary, ParseOptions, Workspace};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "htmledit")]
#[command(about = "Edit and translate the visible text of HTML files and ZIP bundles")]
#[command(version)]
struct Cli {
    /// Translation config file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// HTML files (.html, .htm) or ZIP bundles
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Include title, alt and aria-label attributes
    #[arg(long)]
    attrs: bool,

    /// Keep snippets shorter than 3 characters
    #[arg(long)]
    show_short: bool,

    /// Skip load-time cleanup of stray literal \n sequences
    #[arg(long)]
    no_sanitize: bool,

    /// Charset label used to decode input files
    #[arg(short = 'E', long)]
    encoding: Option<String>,
}

impl InputArgs {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include_attributes: self.attrs,
            hide_short: !self.show_short,
        }
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            sanitize: !self.no_sanitize && env::core::Sanitize::get_or_default(true),
            encoding: self.encoding.clone(),
        }
    }

    fn open(&self) -> EditorResult<Workspace> {
        let mut workspace = Workspace::new(self.scan_options(), self.parse_options());
        for path in &self.files {
            workspace.open_path(path)?;
        }
        workspace.set_all_mode(true);
        Ok(workspace)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List editable entries
    Scan {
        #[command(flatten)]
        input: InputArgs,

        /// Only show entries containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Literal replace-all across every file, then save
    Replace {
        #[command(flatten)]
        input: InputArgs,

        /// Text to find
        #[arg(long)]
        find: String,

        /// Replacement text
        #[arg(long = "replace")]
        replacement: String,

        /// Write results into this directory instead of overwriting sources
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate every entry through the translation endpoint, then save
    Translate {
        #[command(flatten)]
        input: InputArgs,

        /// Target language name
        #[arg(short, long)]
        lang: Option<String>,

        /// Translation endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Texts per request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Write results into this directory instead of overwriting sources
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pack every opened document into one flat ZIP
    ExportZip {
        #[command(flatten)]
        input: InputArgs,

        /// Output archive
        #[arg(short, long, default_value = DEFAULT_EXPORT_NAME)]
        output: String,
    },

    /// Write an example translation config file
    InitConfig {
        #[arg(default_value = "htmledit.toml")]
        path: String,
    },

    /// Print supported environment variables
    EnvDocs {
        /// Also print the values currently in effect
        #[arg(long)]
        summary: bool,
    },
}

fn init_logging() {
    let level = env::core::LogLevel::get_or_default("info".to_string());
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(io::stderr)
        .with_ansi(env::color_enabled() && atty::is(atty::Stream::Stderr))
        .init();
}

fn print_error_message(text: &str) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let colored = env::color_enabled() && atty::is(atty::Stream::Stderr);

    if colored {
        let _ = writeln!(handle, "{}{}{}", ANSI_COLOR_RED, text, ANSI_COLOR_RESET);
    } else {
        let _ = writeln!(handle, "{}", text);
    }
}

fn print_saved(paths: &[PathBuf]) {
    if paths.is_empty() {
        println!("没有需要保存的修改");
    }
    for path in paths {
        println!("已保存 {}", path.display());
    }
}

fn ensure_output_dir(output: Option<&Path>) -> EditorResult<()> {
    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn load_translation_config(config_path: Option<&str>) -> EditorResult<TranslationConfig> {
    let manager = match config_path {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    if let Some(source) = manager.source() {
        tracing::debug!("翻译配置来自 {}", source);
    }
    Ok(manager.into_config())
}

fn run_scan(input: &InputArgs, search: Option<&str>, json: bool) -> EditorResult<()> {
    let workspace = input.open()?;
    let found = workspace.search(search.unwrap_or(""));

    if json {
        let mut files = Vec::new();
        for (index, session) in workspace.files().iter().enumerate() {
            let entries: Vec<EntrySummary> = found
                .iter()
                .filter(|(i, _)| *i == index)
                .map(|(_, entry)| EntrySummary::from(*entry))
                .collect();
            files.push(serde_json::json!({ "file": session.name(), "entries": entries }));
        }
        let output = serde_json::to_string_pretty(&files)
            .map_err(|e| EditorError::invalid_input(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    for (index, entry) in &found {
        let name = workspace.file(*index).map(|s| s.name()).unwrap_or_default();
        let kind = match entry.attr_key() {
            Some(key) => format!("attr:{}", key),
            None => entry.kind.as_str().to_string(),
        };
        println!(
            "{}\t#{}\t{}\t{}\t{}\t{}",
            name,
            entry.id,
            kind,
            entry.len(),
            entry.selector,
            entry.snippet()
        );
    }
    println!("共 {} 个条目", found.len());
    Ok(())
}

fn run_replace(
    input: &InputArgs,
    find: &str,
    replacement: &str,
    output: Option<&Path>,
) -> EditorResult<()> {
    let mut workspace = input.open()?;
    let changed = workspace.replace_all_files(find, replacement)?;
    println!("替换了 {} 个条目", changed);

    ensure_output_dir(output)?;
    print_saved(&workspace.save_all(output)?);
    Ok(())
}

struct TranslateArgs<'a> {
    lang: Option<&'a str>,
    endpoint: Option<&'a str>,
    batch_size: Option<usize>,
    timeout: Option<u64>,
    output: Option<&'a Path>,
}

fn run_translate(
    input: &InputArgs,
    config_path: Option<&str>,
    args: TranslateArgs<'_>,
) -> EditorResult<()> {
    let mut config = load_translation_config(config_path)?;
    if let Some(lang) = args.lang {
        config.target_lang = lang.to_string();
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint_url = endpoint.to_string();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    config.validate()?;

    let translator = HttpTranslator::from_config(&config)?;
    let mut workspace = input.open()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let reports = runtime.block_on(workspace.translate_all(
        &translator,
        &config.target_lang,
        config.batch_size,
    ))?;

    for report in &reports {
        println!(
            "{}: 翻译了 {} 个条目 ({} 个批次)",
            report.file, report.entries, report.batches
        );
    }

    ensure_output_dir(args.output)?;
    print_saved(&workspace.save_all(args.output)?);
    Ok(())
}

fn run_export(input: &InputArgs, output: &str) -> EditorResult<()> {
    let workspace = input.open()?;
    let bytes = workspace.export_flat_zip()?;
    let target = ensure_zip_extension(output);
    fs::write(&target, bytes)?;
    println!("已导出 {} 个文件到 {}", workspace.files().len(), target);
    Ok(())
}

fn run(cli: Cli) -> EditorResult<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scan {
            input,
            search,
            json,
        } => run_scan(&input, search.as_deref(), json),
        Commands::Replace {
            input,
            find,
            replacement,
            output,
        } => run_replace(&input, &find, &replacement, output.as_deref()),
        Commands::Translate {
            input,
            lang,
            endpoint,
            batch_size,
            timeout,
            output,
        } => run_translate(
            &input,
            config_path,
            TranslateArgs {
                lang: lang.as_deref(),
                endpoint: endpoint.as_deref(),
                batch_size,
                timeout,
                output: output.as_deref(),
            },
        ),
        Commands::ExportZip { input, output } => run_export(&input, &output),
        Commands::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("已写入示例配置 {}", path);
            Ok(())
        }
        Commands::EnvDocs { summary } => {
            print!("{}", env::generate_env_docs());
            if summary {
                println!();
                env::EnvConfig::from_env()
                    .map_err(|e| EditorError::invalid_input(e.to_string()))?
                    .print_summary();
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            ExitCode::FAILURE
        }
    }
}
