use std::{error::Error, time::Duration};
use tracing::{info, warn};

mod app_metrics;
mod config;
mod hid_source;
mod udp_broadcaster;

use app_metrics::{AppMetrics, MetricsLogger};
use config::Config;
use hid_source::HidReportSource;
use udp_broadcaster::UdpBroadcaster;

use wmrx::{RecordHandler, RecordPipeline};

// ========== Logging Setup ==========

fn init_logging(log_config: &config::LogConfig) -> Result<(), Box<dyn Error>> {
    use tracing_appender::rolling;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&log_config.directory)?;

    // Create daily rolling file appender
    let file_appender = rolling::daily(&log_config.directory, &log_config.file_prefix);

    let timer = || {
        fmt::time::OffsetTime::local_rfc_3339().unwrap_or_else(|_| {
            fmt::time::OffsetTime::new(time::UtcOffset::UTC, time::format_description::well_known::Rfc3339)
        })
    };

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_timer(timer());

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_timer(timer());

    // Parse log level from config
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ========== Session ==========

/// Decode records from one opened device until the transport gives up.
fn run_session(
    source: HidReportSource,
    config: &Config,
    metrics: &mut AppMetrics,
    metrics_logger: &mut MetricsLogger,
    handlers: &mut [&mut dyn RecordHandler],
) {
    let mut pipeline = RecordPipeline::new(source, config.station.decoder_config());

    while let Some(result) = pipeline.next() {
        match result {
            Ok(record) => {
                info!("{}", record);
                for handler in handlers.iter_mut() {
                    handler.handle_record(&record);
                }
            }
            Err(e) => {
                metrics.transport_errors += 1;
                warn!("Station connection lost: {}", e);
            }
        }

        metrics.add_framer_stats(&pipeline.framer_mut().take_stats());
        metrics.add_decoder_stats(&pipeline.decoder_mut().take_stats());
        metrics_logger.check_and_log(metrics);
    }
}

// ========== Main Application ==========

fn main() -> Result<(), Box<dyn Error>> {
    // Check for command-line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for help flag
    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        println!("WMR-USB Logger");
        println!();
        println!("USAGE:");
        println!("    wmr_logger [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    --validate-config, --validate, -v    Validate configuration and exit");
        println!("    --help, -h                           Show this help message");
        println!();
        println!("Configuration file: config.json (in current directory)");
        std::process::exit(0);
    }

    let validate_only = args.contains(&"--validate-config".to_string())
        || args.contains(&"--validate".to_string())
        || args.contains(&"-v".to_string());

    // Altitude has no sensible default, so a missing config is fatal
    let config = match Config::from_file("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            if validate_only {
                eprintln!("✗ Configuration validation failed: {}", e);
            } else {
                eprintln!("Fatal configuration error: {}", e);
            }
            std::process::exit(1);
        }
    };

    if validate_only {
        println!("✓ Configuration validation successful");
        println!("  Altitude: {} m", config.station.altitude);
        println!("  Stale wind: {} s", config.station.stale_wind_seconds);
        println!("  Device: {}", config.device.path);
        println!(
            "  Timeout: {} s, retry wait: {} s, max tries: {}",
            config.device.timeout_seconds, config.device.wait_before_retry_seconds, config.device.max_tries
        );
        println!("  UDP: {} ({})", config.udp.enabled, config.udp.destination);
        std::process::exit(0);
    }

    // Initialize logging
    init_logging(&config.logging)?;
    info!("WMR-USB Logger starting...");
    info!("Loaded configuration");

    let mut broadcaster = UdpBroadcaster::new(config.udp.destination.clone(), config.udp.enabled);
    let mut handlers: [&mut dyn RecordHandler; 1] = [&mut broadcaster];

    // Application metrics tracking
    let mut metrics = AppMetrics::new();
    let mut metrics_logger = MetricsLogger::new(Duration::from_secs(60));

    // Each session starts from a freshly opened device and empty decoder state
    loop {
        info!("Opening station on {}", config.device.path);
        let source = HidReportSource::open_with_retry(&config.device);
        info!("Listening for station packets");

        run_session(
            source,
            &config,
            &mut metrics,
            &mut metrics_logger,
            &mut handlers,
        );

        warn!("Attempting to reconnect...");
        std::thread::sleep(config.device.wait_before_retry());
    }
}
