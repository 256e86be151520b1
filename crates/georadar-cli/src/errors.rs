use console::style;
use georadar_core::GeoradarError;
use std::fmt;

/// Error with context and suggestions, rendered for humans
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// A coordinate given on the command line is out of range
pub fn invalid_coordinate(label: &str, details: &str) -> CliError {
    CliError::new(format!("Invalid {} coordinate", label))
        .with_context(details.to_string())
        .with_suggestion("Latitude must be within [-90, 90] and longitude within [-180, 180]")
        .with_suggestion("Pass negative values directly, e.g. --long -0.28784")
}

/// The signal catalog could not be read
pub fn catalog_unavailable(source: &str, error: &GeoradarError) -> CliError {
    CliError::new("Cannot load signals")
        .with_context(format!("Source: {}\n\nError: {}", source, error))
        .with_suggestion("Check that the catalog file exists and contains a JSON array of signals")
        .with_suggestion("Or check that the catalog service answers GET <url>/events")
        .with_suggestion("Or omit --catalog/--catalog-url to use the built-in demo signals")
        .with_help("Run: georadar check --help")
}

/// Polling or tracking could not be started
pub fn monitoring_failed(error: &GeoradarError) -> CliError {
    let cli_error = CliError::new(error.user_message()).with_context(error.to_string());

    let cli_error = match error {
        GeoradarError::PermissionDenied { should_open_settings: true, .. } => cli_error
            .with_suggestion("Open the system settings and grant continuous location access"),
        GeoradarError::LocationTimeout { .. } => cli_error
            .with_suggestion("Raise first_fix_timeout_ms in georadar.toml")
            .with_suggestion("Or set GEORADAR_FIRST_FIX_TIMEOUT_MS"),
        _ => cli_error,
    };
    cli_error.with_help("Run: georadar watch --help")
}

/// The resolved configuration cannot drive the engine
pub fn invalid_config(error: &GeoradarError) -> CliError {
    CliError::new("Invalid configuration")
        .with_context(error.to_string())
        .with_suggestion("Inspect the resolved values: georadar config")
        .with_suggestion("Check georadar.toml and GEORADAR_* environment variables")
        .with_help("Run: georadar config")
}
