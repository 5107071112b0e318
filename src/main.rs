use clap::Parser;
use portfolio_loader::config::Command;
use portfolio_loader::core::auth::AdminSession;
use portfolio_loader::core::preferences::ThemePreference;
use portfolio_loader::domain::model::{ContactMessage, ContentDomain};
use portfolio_loader::domain::ports::{ConfigProvider, ContentApi};
use portfolio_loader::utils::{logger, validation::Validate};
use portfolio_loader::{
    CliConfig, ContentStore, FileDurableStore, HttpContentApi, LoadSettings, MemorySessionStore,
    PortfolioApp, SiteConfig, SiteError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.site_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.logging.format == "json" {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting portfolio loader against {}", config.api_base_url());
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let api: Arc<dyn ContentApi> = Arc::new(HttpContentApi::from_config(&config)?);
    let durable = Arc::new(FileDurableStore::new(&cli.state_dir));

    match cli.command.clone().unwrap_or(Command::Load) {
        Command::Load => {
            let app = mount_app(api, &config, cli.skip_welcome);
            app.start().await;
            let state = app.ready().await;
            println!("{}", serde_json::to_string_pretty(&state)?);
            app.teardown();
        }
        Command::Refresh { domain } => {
            let domain: ContentDomain = domain.parse().map_err(anyhow::Error::msg)?;
            let app = mount_app(api, &config, true);
            app.start().await;
            if !app.store().refresh(domain).await {
                tracing::warn!("Refresh of {} failed, showing previous data", domain);
            }
            println!("{}", serde_json::to_string_pretty(&app.store().snapshot().await)?);
        }
        Command::Project { id } => {
            let store = ContentStore::new(api, LoadSettings::from_config(&config));
            match store.project(&id).await {
                Some(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                None => {
                    eprintln!("Project '{}' is not available", id);
                    std::process::exit(2);
                }
            }
        }
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let store = ContentStore::new(api, LoadSettings::from_config(&config));
            let message = ContactMessage {
                name,
                email,
                subject,
                message,
            };
            match store.submit_contact(&message).await {
                Ok(ack) => println!("✅ {}", ack.message),
                Err(e) => exit_with(&e, 2),
            }
        }
        Command::Theme { toggle } => {
            let preference = ThemePreference::new(durable);
            let theme = if toggle {
                preference.toggle()?
            } else {
                preference.load()?
            };
            println!("{}", theme);
        }
        Command::Admin { token, sign_out } => {
            let session = AdminSession::new(api, durable).with_policy(config.critical_retry());
            if sign_out {
                session.sign_out()?;
                println!("Signed out");
                return Ok(());
            }
            if let Some(token) = token {
                session.sign_in(&token)?;
            }
            match session.verify().await {
                Ok(Some(identity)) => println!("✅ Signed in as {}", identity.username),
                Ok(None) => {
                    println!("Not signed in");
                    std::process::exit(3);
                }
                Err(e) => exit_with(&e, 2),
            }
        }
    }

    Ok(())
}

fn mount_app(
    api: Arc<dyn ContentApi>,
    config: &SiteConfig,
    skip_welcome: bool,
) -> PortfolioApp<MemorySessionStore> {
    let app = PortfolioApp::mount(api, config, Arc::new(MemorySessionStore::new()));
    if skip_welcome {
        app.on_welcome_complete();
    } else if app.show_welcome() {
        println!("👋 Welcome! Loading portfolio...");
    }
    app
}

fn exit_with(error: &SiteError, code: i32) -> ! {
    tracing::error!("❌ {}", error);
    eprintln!("❌ {}", error.user_friendly_message());
    std::process::exit(code);
}
