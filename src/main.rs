//! `taot` - command-line front end for the translation client.

mod cli;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Args, Commands};
use taot_translator::{
    ClientConfig, ClientEvent, HttpTransport, Language, ServiceFactory, ServiceKind, TomlSettings,
    TranslationClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::load_from_default_locations(),
    };
    if let Some(provider) = &args.provider {
        config.service.provider = provider.parse::<ServiceKind>()?;
    }

    match args.command {
        Commands::InitConfig { path } => {
            ClientConfig::generate_example_config(&path)?;
            println!("Wrote {}", path.display());
        }
        Commands::Languages { source } => {
            let (client, _events) = build_client(&config)?;
            match source {
                Some(code) => {
                    let source = client.service().language(&code);
                    let targets = client.service().target_languages(&source);
                    if targets.is_empty() {
                        println!("No targets for {}", describe(&source));
                    }
                    for lang in targets {
                        println!("{}", describe(&lang));
                    }
                }
                None => {
                    for lang in client.source_languages() {
                        println!("{}", describe(&lang));
                    }
                }
            }
        }
        Commands::Translate { from, to, text } => {
            let (mut client, mut events) = build_client(&config)?;
            if let Some(code) = from {
                let language = client.service().language(&code);
                client.set_source_language(language);
            }
            if let Some(code) = to {
                let language = client.service().language(&code);
                client.set_target_language(language);
            }
            client.set_source_text(text.join(" "));

            info!(
                "Translating {:?} -> {:?} with {}",
                client.source_language().code,
                client.target_language().code,
                client.service().display_name()
            );

            let dispatched = client.translate_source_text();
            let completion = if dispatched {
                client.next_completion().await
            } else {
                None
            };

            while let Ok(event) = events.try_recv() {
                debug!("{:?}", event);
                if let ClientEvent::Error(message) = event {
                    bail!(message);
                }
            }

            match completion {
                Some(Ok(result)) => {
                    if let Some(detected) = &result.detected_language {
                        eprintln!("Detected language: {}", describe(detected));
                    }
                    println!("{}", result.translated_text());
                }
                Some(Err(e)) => return Err(e.into()),
                None => bail!("Nothing to translate"),
            }
        }
    }

    Ok(())
}

fn build_client(
    config: &ClientConfig,
) -> Result<(TranslationClient, UnboundedReceiver<ClientEvent>)> {
    let service = ServiceFactory::create(&config.service)?;
    if service.source_languages().is_empty() {
        bail!(
            "{} is unusable: no language definitions in {}",
            service.display_name(),
            config.service.resource_dir.display()
        );
    }

    let transport = Arc::new(HttpTransport::new(&config.http));
    let settings = Box::new(TomlSettings::open(&config.settings.path));
    Ok(TranslationClient::new(service, transport, settings))
}

fn describe(language: &Language) -> String {
    if language.is_autodetect() {
        language.display_name.clone()
    } else {
        format!("{}\t{}", language.code, language.display_name)
    }
}

/// Setup console logging; `RUST_LOG` overrides the default level
fn setup_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taot_translator={0},taot={0}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
