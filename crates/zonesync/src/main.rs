// # zonesync - one-shot zone sync
//
// Thin integration layer: reads configuration from environment variables,
// registers providers, builds the SyncEngine and runs it once. All record
// handling lives in zonesync-core and the provider crates.
//
// ## Configuration
//
// ### Zone
// - `ZONESYNC_DOMAIN`: Zone to synchronize (required)
//
// ### PowerDNS (source, and destination when writer type is pdns)
// - `ZONESYNC_PDNS_HOST`: API base URL, e.g. http://127.0.0.1:8081 (required)
// - `ZONESYNC_PDNS_SERVER_ID`: Server id (default: localhost)
// - `ZONESYNC_PDNS_API_KEY`: X-API-Key value (required)
//
// ### Writer
// - `ZONESYNC_WRITER_TYPE`: pdns or registrar (default: pdns)
// - `ZONESYNC_REGISTRAR_API_BASE`: Registrar API base URL (registrar only)
// - `ZONESYNC_REGISTRAR_API_KEY`: sso-key credential (registrar only)
// - `ZONESYNC_PRUNE_DELETED`: true to delete records the template removed
//
// ### Template
// - `ZONESYNC_TEMPLATE_FILE`: Overlay template JSON (default: passthrough)
// - `ZONESYNC_TEMPLATE_HOST`: Host label to apply the template under
// - `ZONESYNC_TEMPLATE_PARAMS`: Comma-separated key=value pairs
//
// ### Run
// - `ZONESYNC_MODE`: sync, dry-run or dump (default: sync)
// - `ZONESYNC_TIMEOUT_SECS`: HTTP timeout (default: 30)
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ZONESYNC_DOMAIN=example.org
// export ZONESYNC_PDNS_HOST=http://127.0.0.1:8081
// export ZONESYNC_PDNS_API_KEY=changeme
// export ZONESYNC_TEMPLATE_FILE=/etc/zonesync/gsuite.json
// export ZONESYNC_TEMPLATE_PARAMS=verifytxt=foo,spftxt=bar
//
// zonesync
// ```

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::DEFAULT_TIMEOUT_SECS;
use zonesync_core::{
    OverlayTemplate, PassthroughTemplate, PdnsConfig, ProviderRegistry, ReaderConfig,
    RegistrarConfig, SyncConfig, SyncEngine, TemplateConfig, TemplateEngine, TemplateParams,
    WriterConfig,
};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Sync completed, nothing rejected
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Read failed or records were rejected
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Read, apply, write
    Sync,
    /// Read and apply; log writes without sending them
    DryRun,
    /// Read and print the zone as generic records
    Dump,
}

/// Application configuration
struct Config {
    domain: String,
    pdns_host: String,
    pdns_server_id: String,
    pdns_api_key: String,
    writer_type: String,
    registrar_api_base: Option<String>,
    registrar_api_key: Option<String>,
    prune_deleted: bool,
    template_file: Option<PathBuf>,
    template_host: String,
    template_params: String,
    mode: String,
    timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            domain: env::var("ZONESYNC_DOMAIN")
                .map_err(|_| anyhow::anyhow!("ZONESYNC_DOMAIN is required"))?,
            pdns_host: env::var("ZONESYNC_PDNS_HOST")
                .map_err(|_| anyhow::anyhow!("ZONESYNC_PDNS_HOST is required"))?,
            pdns_server_id: env::var("ZONESYNC_PDNS_SERVER_ID")
                .unwrap_or_else(|_| "localhost".to_string()),
            pdns_api_key: env::var("ZONESYNC_PDNS_API_KEY")
                .map_err(|_| anyhow::anyhow!("ZONESYNC_PDNS_API_KEY is required"))?,
            writer_type: env::var("ZONESYNC_WRITER_TYPE").unwrap_or_else(|_| "pdns".to_string()),
            registrar_api_base: env::var("ZONESYNC_REGISTRAR_API_BASE").ok(),
            registrar_api_key: env::var("ZONESYNC_REGISTRAR_API_KEY").ok(),
            prune_deleted: env::var("ZONESYNC_PRUNE_DELETED")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            template_file: env::var("ZONESYNC_TEMPLATE_FILE").ok().map(PathBuf::from),
            template_host: env::var("ZONESYNC_TEMPLATE_HOST").unwrap_or_default(),
            template_params: env::var("ZONESYNC_TEMPLATE_PARAMS").unwrap_or_default(),
            mode: env::var("ZONESYNC_MODE").unwrap_or_else(|_| "sync".to_string()),
            timeout_secs: env::var("ZONESYNC_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("ZONESYNC_TIMEOUT_SECS is not a number: {}", e))?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Parse the run mode
    fn mode(&self) -> Result<Mode> {
        match self.mode.to_lowercase().as_str() {
            "sync" => Ok(Mode::Sync),
            "dry-run" => Ok(Mode::DryRun),
            "dump" => Ok(Mode::Dump),
            other => anyhow::bail!(
                "ZONESYNC_MODE '{}' is not valid. Valid modes: sync, dry-run, dump",
                other
            ),
        }
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the library configuration, validating everything on the way
    fn to_sync_config(&self) -> Result<SyncConfig> {
        let dry_run = self.mode()? == Mode::DryRun;

        let pdns = PdnsConfig::new(&self.pdns_host, &self.pdns_api_key)
            .with_server_id(&self.pdns_server_id)
            .with_timeout_secs(self.timeout_secs);

        let writer = match self.writer_type.as_str() {
            "pdns" => WriterConfig::Pdns(pdns.clone().with_dry_run(dry_run)),
            "registrar" => {
                let api_base = self.registrar_api_base.clone().ok_or_else(|| {
                    anyhow::anyhow!(
                        "ZONESYNC_REGISTRAR_API_BASE is required when ZONESYNC_WRITER_TYPE=registrar"
                    )
                })?;
                let api_key = self.registrar_api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!(
                        "ZONESYNC_REGISTRAR_API_KEY is required when ZONESYNC_WRITER_TYPE=registrar"
                    )
                })?;
                let mut registrar = RegistrarConfig::new(api_base, api_key).with_dry_run(dry_run);
                registrar.timeout_secs = self.timeout_secs;
                WriterConfig::Registrar(registrar)
            }
            other => anyhow::bail!(
                "ZONESYNC_WRITER_TYPE '{}' is not supported. \
                Supported writers: pdns, registrar",
                other
            ),
        };

        let config = SyncConfig {
            domain: self.domain.clone(),
            reader: ReaderConfig::Pdns(pdns),
            writer,
            template: TemplateConfig {
                host: self.template_host.clone(),
                params: parse_params(&self.template_params)?,
                overlay_path: self.template_file.clone(),
            },
            prune_deleted: self.prune_deleted,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parse `key=value,key=value` into template params
fn parse_params(raw: &str) -> Result<TemplateParams> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                anyhow::anyhow!("ZONESYNC_TEMPLATE_PARAMS entry '{}' is not key=value", pair)
            })?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let (mode, log_level, sync_config) =
        match (config.mode(), config.log_level(), config.to_sync_config()) {
            (Ok(mode), Ok(level), Ok(sync)) => (mode, level, sync),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                eprintln!("Configuration validation error: {}", e);
                return SyncExitCode::ConfigError.into();
            }
        };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!("Starting zonesync for {} [mode: {:?}]", sync_config.domain, mode);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(sync_config, mode).await {
            Ok(true) => SyncExitCode::Success,
            Ok(false) => SyncExitCode::RuntimeError,
            Err(e) => {
                error!("Sync failed: {}", e);
                SyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one sync; `Ok(false)` means some records were rejected
async fn run(config: SyncConfig, mode: Mode) -> Result<bool> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "pdns")]
    zonesync_provider_pdns::register(&registry);

    #[cfg(feature = "registrar")]
    zonesync_provider_registrar::register(&registry);

    let reader = registry.create_reader(&config.reader)?;
    let writer = registry.create_writer(&config.writer)?;

    let template: Box<dyn TemplateEngine> = match &config.template.overlay_path {
        Some(path) => Box::new(OverlayTemplate::from_file(path).await?),
        None => Box::new(PassthroughTemplate::new()),
    };

    let engine = SyncEngine::new(reader, template, writer, config)?;

    if mode == Mode::Dump {
        let records = engine.fetch_only().await?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(true);
    }

    let report = engine.run_once().await?;

    println!("{}", serde_json::to_string_pretty(&report.outcome.new_records)?);

    for entry in report.rejected() {
        error!(
            "Rejected: {} {} ({:?})",
            entry.name, entry.record_type, entry.outcome
        );
    }

    let deleted = report.deleted.as_ref();
    info!(
        "Sync finished: {} fetched, {} written, {} deleted, {} rejected",
        report.fetched,
        report.written.applied().count(),
        deleted.map_or(0, |d| d.applied().count()),
        report.rejected().count()
    );

    Ok(report.is_success())
}
