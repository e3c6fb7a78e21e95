// crates/form-schema-cli/src/main.rs
// ============================================================================
// Module: Form Schema CLI Entry Point
// Description: Command dispatcher for offline form schema workflows.
// Purpose: Compile, fingerprint, validate, and evaluate forms from files.
// Dependencies: clap, form-schema-config, form-schema-core, serde, serde_jcs, thiserror.
// ============================================================================

//! ## Overview
//! The form-schema CLI drives the compiler against definition and data files
//! on disk. All user-facing strings are routed through the i18n catalog.
//! Inputs are untrusted: every file is read with a hard size limit and
//! parsed strictly.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use form_schema_cli::audit::audit_sink_for;
use form_schema_cli::i18n::Locale;
use form_schema_cli::i18n::set_locale;
use form_schema_cli::t;
use form_schema_config::CONFIG_ENV_VAR;
use form_schema_config::DEFAULT_CONFIG_NAME;
use form_schema_config::FormSchemaConfig;
use form_schema_config::config_toml_example;
use form_schema_core::CompiledForm;
use form_schema_core::FieldId;
use form_schema_core::Fingerprint;
use form_schema_core::FormCompiler;
use form_schema_core::FormDefinition;
use form_schema_core::FormValues;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "FORM_SCHEMA_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "form-schema", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `FORM_SCHEMA_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a form definition and report its fingerprint or errors.
    Compile(CompileCommand),
    /// Print the structural fingerprint of a form definition.
    Fingerprint(FingerprintCommand),
    /// Validate submission data against a form definition.
    Validate(ValidateCommand),
    /// Compute per-field visibility for a value snapshot.
    Visibility(VisibilityCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a form-schema configuration file.
    Validate(ConfigValidateCommand),
    /// Print a canonical example configuration.
    Example,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

/// Arguments shared by commands that read a definition.
#[derive(Args, Debug)]
struct DefinitionArgs {
    /// Form definition JSON file.
    #[arg(long, value_name = "PATH")]
    definition: PathBuf,
    /// Optional config file path (defaults to form-schema.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for compilation.
#[derive(Args, Debug)]
struct CompileCommand {
    /// Definition and config inputs.
    #[command(flatten)]
    input: DefinitionArgs,
}

/// Arguments for fingerprinting.
#[derive(Args, Debug)]
struct FingerprintCommand {
    /// Definition and config inputs.
    #[command(flatten)]
    input: DefinitionArgs,
}

/// Arguments for validation.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Definition and config inputs.
    #[command(flatten)]
    input: DefinitionArgs,
    /// Submission data JSON object keyed by field name.
    #[arg(long, value_name = "PATH")]
    data: PathBuf,
    /// Restrict validation to these field ids (comma-separated).
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    fields: Option<Vec<String>>,
}

/// Arguments for visibility evaluation.
#[derive(Args, Debug)]
struct VisibilityCommand {
    /// Definition and config inputs.
    #[command(flatten)]
    input: DefinitionArgs,
    /// Value snapshot JSON object keyed by field name.
    #[arg(long, value_name = "PATH")]
    values: PathBuf,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to form-schema.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Compile(command) => command_compile(&command),
        Commands::Fingerprint(command) => command_fingerprint(&command),
        Commands::Validate(command) => command_validate(&command),
        Commands::Visibility(command) => command_visibility(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Form Commands
// ============================================================================

/// Executes the `compile` command.
fn command_compile(command: &CompileCommand) -> CliResult<ExitCode> {
    let session = Session::open(command.input.config.as_deref())?;
    let definition = session.read_definition(&command.input.definition)?;
    match session.compiler.compile_form(&definition) {
        Ok(form) => {
            write_stdout_line(&t!(
                "compile.ok",
                version = form.version(),
                count = form.field_count(),
                fingerprint = form.fingerprint()
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            let mut lines = vec![t!("compile.failed", count = errors.len())];
            lines.extend(errors.iter().map(|error| t!("compile.error_item", error = error)));
            write_stderr_line(&lines.join("\n"))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `fingerprint` command.
fn command_fingerprint(command: &FingerprintCommand) -> CliResult<ExitCode> {
    let session = Session::open(command.input.config.as_deref())?;
    let definition = session.read_definition(&command.input.definition)?;
    let fingerprint = Fingerprint::of(&definition)
        .map_err(|err| CliError::new(t!("fingerprint.failed", error = err)))?;
    write_stdout_line(&fingerprint.to_string())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let session = Session::open(command.input.config.as_deref())?;
    let form = session.compile(&command.input.definition)?;
    let data = session.read_values(&command.data, &t!("input.kind.data"))?;
    let result = match &command.fields {
        Some(fields) => form.validate_partial(&data, &parse_field_ids(fields)),
        None => form.validate(&data),
    };
    write_canonical_json(&result)?;
    Ok(if result.is_valid() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `visibility` command.
fn command_visibility(command: &VisibilityCommand) -> CliResult<ExitCode> {
    let session = Session::open(command.input.config.as_deref())?;
    let form = session.compile(&command.input.definition)?;
    let values = session.read_values(&command.values, &t!("input.kind.values"))?;
    write_canonical_json(&form.compute_visibility(&values))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = FormSchemaConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Configured compiler plus input limits for one invocation.
struct Session {
    /// Compiler wired to the configured audit sink.
    compiler: FormCompiler,
    /// Maximum size of any JSON input.
    max_input_bytes: usize,
}

impl Session {
    /// Loads configuration and builds the compiler.
    fn open(config_path: Option<&Path>) -> CliResult<Self> {
        let config = load_optional_config(config_path)?;
        let audit = audit_sink_for(&config.audit)
            .map_err(|err| CliError::new(t!("audit.init_failed", error = err)))?;
        Ok(Self {
            compiler: FormCompiler::new(config.compiler_config()).with_audit_sink(audit),
            max_input_bytes: config.limits.max_definition_bytes,
        })
    }

    /// Reads a form definition from disk.
    fn read_definition(&self, path: &Path) -> CliResult<FormDefinition> {
        read_json_input(path, &t!("input.kind.definition"), self.max_input_bytes)
    }

    /// Reads and compiles a form definition, folding compile errors into one message.
    fn compile(&self, path: &Path) -> CliResult<Arc<CompiledForm>> {
        let definition = self.read_definition(path)?;
        self.compiler
            .compile_form(&definition)
            .map_err(|errors| CliError::new(t!("compile.rejected", error = errors)))
    }

    /// Reads a JSON object of values keyed by field name.
    fn read_values(&self, path: &Path, kind: &str) -> CliResult<FormValues> {
        match read_json_input::<Value>(path, kind, self.max_input_bytes)? {
            Value::Object(values) => Ok(values),
            _ => Err(CliError::new(t!("input.not_object", kind = kind, path = path.display()))),
        }
    }
}

/// Loads configuration when one is named or discoverable, else defaults.
fn load_optional_config(path: Option<&Path>) -> CliResult<FormSchemaConfig> {
    let discoverable =
        env::var_os(CONFIG_ENV_VAR).is_some() || Path::new(DEFAULT_CONFIG_NAME).exists();
    if path.is_none() && !discoverable {
        return Ok(FormSchemaConfig::default());
    }
    FormSchemaConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Converts `--fields` values into field ids, ignoring blanks.
fn parse_field_ids(fields: &[String]) -> BTreeSet<FieldId> {
    fields
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .map(FieldId::from)
        .collect()
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Converts CLI language selections into locales.
impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors raised by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and parses a JSON input file with a size limit.
fn read_json_input<T: DeserializeOwned>(path: &Path, kind: &str, max_bytes: usize) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value to stdout as canonical JSON.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = canonical_output_bytes(value)?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Computes canonical JSON bytes for output rendering.
fn canonical_output_bytes<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    serde_jcs::to_vec(value).map_err(|err| CliError::new(t!("output.json_failed", error = err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
