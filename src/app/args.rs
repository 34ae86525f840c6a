use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug, Clone)]
#[command(name = "error-relay")]
#[command(about = "Relays browser error reports into a rotating log")]
pub struct AppArgs {
    #[arg(long, env = "ERROR_RELAY_BIND", default_value = "0.0.0.0", help = "Address to listen on")]
    pub bind: String,

    #[arg(long, env = "ERROR_RELAY_PORT", default_value_t = 3000, help = "Port to listen on")]
    pub port: u16,

    #[arg(
        long,
        env = "ERROR_RELAY_SITE_DIR",
        default_value = "/untrusted",
        help = "Directory holding the served site"
    )]
    pub site_dir: PathBuf,

    #[arg(long, env = "ERROR_RELAY_INDEX", help = "HTML document served at / (default: <site-dir>/index.html)")]
    pub index: Option<PathBuf>,

    #[arg(long, env = "ERROR_RELAY_LOG_FILE", help = "Report log file (default: <site-dir>/app.log)")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        env = "ERROR_RELAY_LOG_LEVEL",
        default_value = "debug",
        help = "Minimum severity recorded in the report log"
    )]
    pub log_level: Level,

    #[arg(
        long,
        env = "ERROR_RELAY_MAX_LOG_BYTES",
        default_value_t = crate::logging::rotating::DEFAULT_MAX_BYTES,
        help = "Size after which the report log is rotated"
    )]
    pub max_log_bytes: usize,

    #[arg(
        long,
        env = "ERROR_RELAY_MAX_LOG_FILES",
        default_value_t = crate::logging::rotating::DEFAULT_MAX_FILES,
        help = "Number of rotated report logs to keep"
    )]
    pub max_log_files: usize,

    #[arg(long, env = "ERROR_RELAY_NO_INJECT", help = "Serve the page without injecting the capture script")]
    pub no_inject: bool,

    #[arg(long, env = "ERROR_RELAY_NO_COLOR", help = "Disable colored console output")]
    pub no_color: bool,

    #[arg(long, env = "ERROR_RELAY_NO_STATIC", help = "Do not serve other files from the site directory")]
    pub no_static: bool,
}

impl AppArgs {
    pub fn from_cli() -> Self {
        <Self as Parser>::parse()
    }

    pub fn index_path(&self) -> PathBuf {
        self.index
            .clone()
            .unwrap_or_else(|| self.site_dir.join("index.html"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.site_dir.join("app.log"))
    }
}
