use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the htmlpress binary.
#[derive(Debug, Parser)]
#[command(
    name = "htmlpress",
    version,
    about = "Render HTML to PDF or images through wkhtmltopdf and wkhtmltoimage"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "HTMLPRESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RendererOverrides {
    /// Path to the wkhtmltopdf executable (also used for /license and /version).
    #[arg(long = "wkhtmltopdf-path", env = "WKHTMLTOPDF_PATH", value_name = "PATH")]
    pub pdf_path: Option<PathBuf>,

    /// Path to the wkhtmltoimage executable.
    #[arg(
        long = "wkhtmltoimage-path",
        env = "WKHTMLTOIMAGE_PATH",
        value_name = "PATH"
    )]
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub renderer: RendererOverrides,

    /// Override the listener host.
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long = "port", env = "WKHTMLTOX_PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the maximum accepted HTML payload in bytes.
    #[arg(long = "max-body-bytes", value_name = "BYTES")]
    pub max_body_bytes: Option<u64>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}
