use clap::Parser;
use txt_audit::app::pipelines::{
    ClassifyPipeline, DiffPipeline, DomainMergePipeline, ExtractPipeline, ReportKind, ReportPipeline,
    StripPipeline, TimeseriesPipeline,
};
use txt_audit::config::{CliConfig, Command, LogFormat};
use txt_audit::utils::{logger, validation::Validate};
use txt_audit::{AuditEngine, AuditError, LocalStorage, Pipeline};

fn run_pipeline<P: Pipeline>(pipeline: P) -> Result<String, AuditError> {
    AuditEngine::new(pipeline).run()
}

fn run(config: CliConfig) -> Result<(), AuditError> {
    let storage = LocalStorage::new(config.base_dir.clone());

    match config.command.clone() {
        Command::Classify { input, output, mine } => {
            let pipeline = ClassifyPipeline::new(storage, config.classifier()?, input, output).with_mining(mine);
            let output_path = run_pipeline(pipeline)?;
            println!("📁 Snapshot saved to: {}", output_path);
        }
        Command::Diff {
            old,
            new,
            output,
            identity,
        } => {
            let pipeline = DiffPipeline::new(storage, old, new, output).with_identity(identity);
            let output_path = run_pipeline(pipeline)?;
            println!("📁 Change set saved to: {}", output_path);
        }
        Command::Timeseries {
            files,
            output_dir,
            source,
            orientation,
        } => {
            let pipeline = TimeseriesPipeline::new(storage, files, output_dir)
                .with_source(source)
                .with_orientation(orientation);
            let output_paths = run_pipeline(pipeline)?;
            println!("📁 Tables saved to: {}", output_paths);
        }
        Command::Merge { files, output } => {
            let output_path = run_pipeline(DomainMergePipeline::new(storage, files, output))?;
            println!("📁 Merged time series saved to: {}", output_path);
        }
        Command::Summary { snapshot } => {
            let pipeline = ReportPipeline::new(storage, config.classifier()?, snapshot, ReportKind::Summary);
            println!("{}", run_pipeline(pipeline)?);
        }
        Command::Mine { snapshot } => {
            let pipeline = ReportPipeline::new(storage, config.classifier()?, snapshot, ReportKind::Mine);
            println!("{}", run_pipeline(pipeline)?);
        }
        Command::Strip { snapshot, output } => {
            let output_path = run_pipeline(StripPipeline::new(storage, snapshot, output))?;
            println!("📁 Records saved to: {}", output_path);
        }
        Command::Extract {
            input,
            output,
            max_rrsets,
        } => {
            let pipeline = ExtractPipeline::new(storage, input, output).with_max_rrsets(max_rrsets);
            let output_path = run_pipeline(pipeline)?;
            println!("📁 Records saved to: {}", output_path);
        }
    }

    Ok(())
}

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Text => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting txt-audit CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(config) {
        tracing::error!("❌ txt-audit failed: {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}
