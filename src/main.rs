use tracing::info;

use http_profiler::config::Config;
use http_profiler::{logging, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    logging::init(&config.logging);
    info!("Starting http_profiler {}", VERSION);
    config.log_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

#[cfg(feature = "pprof")]
async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use http_profiler::demo::DemoApp;
    use http_profiler::profiler::{DotCommand, PprofSampler, ProfilerMiddleware};
    use http_profiler::server;

    let app = ProfilerMiddleware::new(
        DemoApp,
        config.profiler,
        PprofSampler::new(),
        DotCommand::new(),
    )?;

    server::serve(config.server.listen_addr, app, shutdown_signal()).await
}

#[cfg(not(feature = "pprof"))]
async fn async_main(_config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Err("http_profiler was built without a sampler; enable the `pprof` feature".into())
}

#[cfg(feature = "pprof")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
