// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowdraft CLI entrypoint.
//!
//! Runs the mock backend (`serve-mock`) or drives one editor session against the auto-saved
//! diagram in the configured store directory.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use flowdraft::config::EditorConfig;
use flowdraft::generate::GenerationClient;
use flowdraft::model::fixtures::sample_diagram;
use flowdraft::model::Diagram;
use flowdraft::server::{self, AppState, DEFAULT_PORT};
use flowdraft::session::EditorSession;
use flowdraft::store::{AutoSaver, FileStore, FsFileIo};

const LOG_ENV: &str = "FLOWDRAFT_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file>] [show] [--demo]\n  {program} [--config <file>] serve-mock [--port <port>]\n  {program} [--config <file>] generate <prompt>\n  {program} [--config <file>] export [--demo]\n  {program} [--config <file>] import <file>\n  {program} [--config <file>] clear --yes\n\nThe auto-saved diagram lives in the configured store directory (default `.flowdraft`).\n--demo starts from the built-in sample diagram instead and never writes it back.\nserve-mock listens on 127.0.0.1 (default port {DEFAULT_PORT}; 0 = ephemeral).\n\nSettings come from --config (JSON), then FLOWDRAFT_* environment variables.\nLog verbosity follows {LOG_ENV} (default `info`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum Command {
    #[default]
    Show,
    ServeMock,
    Generate(String),
    Export,
    Import(String),
    Clear,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Command,
    config: Option<String>,
    port: Option<u16>,
    demo: bool,
    yes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();
    let mut command: Option<String> = None;
    let mut operand: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.port = Some(raw.parse().map_err(|_| ())?);
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--yes" => {
                if options.yes {
                    return Err(());
                }
                options.yes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ if command.is_none() => command = Some(arg),
            _ => {
                if operand.is_some() {
                    return Err(());
                }
                operand = Some(arg);
            }
        }
    }

    options.command = match (command.as_deref(), operand) {
        (None | Some("show"), None) => Command::Show,
        (Some("serve-mock"), None) => Command::ServeMock,
        (Some("generate"), Some(prompt)) => Command::Generate(prompt),
        (Some("export"), None) => Command::Export,
        (Some("import"), Some(file)) => Command::Import(file),
        (Some("clear"), None) => Command::Clear,
        _ => return Err(()),
    };

    let takes_demo = matches!(options.command, Command::Show | Command::Export);
    if options.demo && !takes_demo {
        return Err(());
    }
    if options.port.is_some() && options.command != Command::ServeMock {
        return Err(());
    }
    if options.yes && options.command != Command::Clear {
        return Err(());
    }

    Ok(options)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn open_session(config: &EditorConfig, demo: bool) -> EditorSession {
    if demo {
        return EditorSession::new(sample_diagram());
    }
    let store = FileStore::new(&config.store_dir).with_durability(config.durability());
    let autosaver = AutoSaver::new(Arc::new(store), config.autosave_settings());
    let mut session = EditorSession::new(Diagram::new()).with_autosaver(autosaver);
    session.start();
    session
}

fn print_summary(session: &EditorSession) {
    let diagram = session.diagram();
    println!("nodes: {}", diagram.nodes().len());
    for node in diagram.nodes() {
        let name = match node.table_payload() {
            Some(table) => table.table_name.as_str(),
            None => node.label().unwrap_or_default(),
        };
        println!("  {} [{}] {name}", node.id, node.kind());
    }
    println!("edges: {}", diagram.edges().len());
    for edge in diagram.edges() {
        match edge.label.as_deref() {
            Some(label) => println!("  {} {} -> {} ({label})", edge.id, edge.source, edge.target),
            None => println!("  {} {} -> {}", edge.id, edge.source, edge.target),
        }
    }
    match session.page_layout() {
        Some(page) => println!("page: {}x{} {:?}", page.width, page.height, page.orientation),
        None => println!("page: no nodes to export"),
    }
}

async fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let config = EditorConfig::load(options.config.as_deref().map(Path::new))?;

    match options.command {
        Command::ServeMock => {
            let port = options.port.unwrap_or(DEFAULT_PORT);
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
            server::serve(listener, AppState::new(), async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutting down");
            })
            .await?;
        }
        Command::Show => print_summary(&open_session(&config, options.demo)),
        Command::Generate(prompt) => {
            let client = GenerationClient::new(config.generate_config())?;
            let mut session = open_session(&config, false);
            session.set_prompt(prompt);
            match session.generate(&client).await? {
                Some(_) => {
                    session.flush_autosave()?;
                    print_summary(&session);
                }
                None => eprintln!("flowdraft: empty prompt, nothing generated"),
            }
        }
        Command::Export => {
            let session = open_session(&config, options.demo);
            let io = FsFileIo::new(&config.export_dir).with_durability(config.durability());
            let path = session.export(&io, Utc::now())?;
            println!("{}", path.display());
        }
        Command::Import(file) => {
            let mut session = open_session(&config, false);
            let io = FsFileIo::new(&config.export_dir).with_import_path(file);
            if session.import(&io)?.is_some() {
                session.flush_autosave()?;
            }
            print_summary(&session);
        }
        Command::Clear => {
            let mut session = open_session(&config, false);
            if session.clear_autosave(|| options.yes)? {
                println!("cleared auto-saved diagram");
            }
        }
    }
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "flowdraft".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging();
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(run(options))
    })();

    if let Err(err) = result {
        eprintln!("flowdraft: {err}");
        std::process::exit(1);
    }
}
