use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONSOLE_FILTER: &str = "warn,web_request=warn,app_state=warn";
const FILE_FILTER: &str = "info,newsspace=debug,web_request=debug,app_state=debug,hyper=off";

pub fn configure_logging(log_dir: &str) {
    // Tables go to stdout, so console logging stays on stderr.
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(console_filter);

    let file_appender = rolling::daily(log_dir, "newsspace.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new(FILE_FILTER));

    let _ = tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .try_init();
}
