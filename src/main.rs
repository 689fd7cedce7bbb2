use clap::Parser;
use venue_scout::utils::error::VenueError;
use venue_scout::utils::{logger, validation::Validate};
use venue_scout::{CliArgs, FlowConfig, FlowEngine, InputData, LocalStorage, VenueWorkflow};

fn fail(stage: &str, e: &VenueError) -> ! {
    tracing::error!("❌ {} failed: {}", stage, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.severity().exit_code());
}

fn load_config(args: &CliArgs) -> venue_scout::Result<FlowConfig> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📋 Loading configuration from: {}", path);
            FlowConfig::from_file(path)?
        }
        None => FlowConfig::from_env(),
    };
    args.apply_overrides(&mut config);
    Ok(config)
}

fn print_plan(config: &FlowConfig, input: &InputData) {
    println!("🧪 Dry run: no API calls will be made");
    println!("📍 Address: {}", input.address);
    println!("📏 Radius: {} km", input.radius_km);
    println!("🔍 Search endpoint: {}", config.search.endpoint);
    println!("🤖 Model: {} at {}", config.llm.model, config.llm.endpoint);
    println!(
        "📊 Scoring up to {} venues, {} concurrent",
        config.search.num_results, config.scoring.concurrent_requests
    );
    println!(
        "📧 Up to {} emails for venues scoring at least {}",
        config.email.max_emails, config.email.min_score
    );
    println!("📁 Output path: {}", config.output.output_path);
    for (name, key) in [
        ("SERPER_API_KEY", config.search_api_key()),
        ("OPENAI_API_KEY", config.llm_api_key()),
    ] {
        let status = if key.is_ok() { "set" } else { "missing" };
        println!("🔑 {}: {}", name, status);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting venue-scout CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = load_config(&args).unwrap_or_else(|e| fail("Configuration loading", &e));
    tracing::info!(
        "📋 Flow: {} v{} - {}",
        config.flow.name,
        config.flow.version,
        config.flow.description
    );
    let input = args.input_data();

    // 驗證輸入與配置
    if let Err(e) = input.validate() {
        fail("Input validation", &e);
    }
    if let Err(e) = config.validate_settings() {
        fail("Configuration validation", &e);
    }

    if args.dry_run {
        print_plan(&config, &input);
        return Ok(());
    }

    if let Err(e) = config.validate() {
        fail("Configuration validation", &e);
    }

    if config.monitoring_enabled() {
        tracing::info!("🔍 Stage monitoring enabled");
    }

    let storage = LocalStorage::new(config.output.output_path.clone());
    let workflow = VenueWorkflow::from_config(&config, storage)
        .unwrap_or_else(|e| fail("Client setup", &e));
    let engine = FlowEngine::new_with_monitoring(workflow, config.monitoring_enabled());

    match engine.run(input).await {
        Ok((state, output)) => {
            tracing::info!("✅ Venue search completed successfully!");
            println!("✅ Venue search completed successfully!");
            println!(
                "🏢 {} venues found, {} scored, {} emails drafted",
                state.venues.len(),
                state.scored_venues.len(),
                state.emails.len()
            );
            println!("📁 Results: {}", output.results_path);
            println!("📄 Scored venues: {}", output.csv_path);
            println!("📈 Report: {}", output.report_path);
            for path in &output.email_paths {
                println!("📧 {}", path);
            }
            if let Some(archive) = &output.archive_path {
                println!("🗜️ Archive: {}", archive);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Venue search failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
