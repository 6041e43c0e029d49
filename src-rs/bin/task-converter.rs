use std::env;
use std::process;

use task_converter_rs::api::server::ConverterServer;
use task_converter_rs::helpers::{build_converter, config_from_env};
use task_converter_rs::injector::Injector;
use tracing::error;
use tracing_subscriber::EnvFilter;

// The converter owns a blocking HTTP client, which must be built outside the
// async runtime.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(8080);

    let converter = match build_converter(config_from_env()) {
        Ok(converter) => converter,
        Err(err) => {
            error!(error = %err, "failed to build converter");
            process::exit(1);
        }
    };
    let injector = match Injector::with_builtin_locators() {
        Ok(injector) => injector,
        Err(err) => {
            error!(error = %err, "invalid locator table");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start runtime");
            process::exit(1);
        }
    };
    let server = ConverterServer::new(port, converter, injector);
    if let Err(err) = runtime.block_on(server.start()) {
        error!(error = %err, "server error");
    }
}
