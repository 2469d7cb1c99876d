mod app;
mod cli;
mod input;
mod model;
mod profiles;
mod ui;
mod workspace;

use anyhow::{Context, Result, bail};
use app::{App, AppCommand, CatalogRefresh};
use clap::Parser;
use cli::{CliArgs, CliCommand};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use model::WorkspaceProfile;
use profiles::ProfileStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use workspace::WorkspaceGateway;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let store = ProfileStore::from_default_location()?;
    match args.command {
        Some(CliCommand::Login) => login(&store),
        Some(CliCommand::Use { name }) => use_workspace(&store, &name),
        Some(CliCommand::Delete { name }) => delete_workspace(&store, &name),
        None => run_session(store).await,
    }
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    // The TUI owns the terminal, so log output goes nowhere by default.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::sink)
        .try_init();

    Ok(())
}

fn login(store: &ProfileStore) -> Result<()> {
    let name = prompt("Workspace name: ")?;
    let host = prompt("Workspace host URL: ")?;
    let token = prompt("Access token: ")?;
    let warehouse_id = prompt("SQL warehouse id (optional): ")?;

    if name.is_empty() || host.is_empty() || token.is_empty() {
        bail!("name, host and token are required");
    }

    store.add_profile(WorkspaceProfile {
        name: name.clone(),
        host,
        token,
        warehouse_id: (!warehouse_id.is_empty()).then_some(warehouse_id),
    })?;
    store.set_active(&name)?;
    println!("Saved workspace '{name}'");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("failed to flush prompt")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim().to_string())
}

fn use_workspace(store: &ProfileStore, name: &str) -> Result<()> {
    if !store.set_active(name)? {
        bail!("workspace not found: {name}");
    }
    println!("Active workspace: {name}");
    Ok(())
}

fn delete_workspace(store: &ProfileStore, name: &str) -> Result<()> {
    if !store.remove_profile(name)? {
        bail!("workspace not found: {name}");
    }
    println!("Deleted workspace '{name}'");
    Ok(())
}

async fn run_session(store: ProfileStore) -> Result<()> {
    let gateway = WorkspaceGateway::new()?;
    let mut app = App::new(&store.load());

    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, &mut app, &store, &gateway).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    store: &ProfileStore,
    gateway: &WorkspaceGateway,
) -> Result<()> {
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<CatalogRefresh>();
    start_catalog_refresh(app, gateway, &refresh_tx);

    let mut reader = EventStream::new();
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(key) {
                            debug!("action={action:?}");
                            let command = app.apply_action(action);
                            execute_app_command(app, store, gateway, &refresh_tx, command);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                    }
                    None => break,
                }
            }
            maybe_refresh = refresh_rx.recv() => {
                if let Some(refresh) = maybe_refresh {
                    app.finish_refresh(refresh);
                }
            }
        }
    }

    Ok(())
}

fn execute_app_command(
    app: &mut App,
    store: &ProfileStore,
    gateway: &WorkspaceGateway,
    refresh_tx: &mpsc::UnboundedSender<CatalogRefresh>,
    command: AppCommand,
) {
    match command {
        AppCommand::None => {}
        AppCommand::Refresh => start_catalog_refresh(app, gateway, refresh_tx),
        AppCommand::Activate { name } => match store.set_active(&name) {
            Ok(true) => {
                app.sync_profiles(&store.load());
                app.set_status(format!("Active workspace: {name}"));
                start_catalog_refresh(app, gateway, refresh_tx);
            }
            Ok(false) => {
                // The store drifted on disk under our snapshot.
                app.sync_profiles(&store.load());
                app.set_status(format!("Workspace not found: {name}"));
            }
            Err(error) => {
                app.set_status(format!(
                    "Failed saving active workspace: {}",
                    compact_error(&error)
                ));
            }
        },
        AppCommand::Delete { name } => match store.remove_profile(&name) {
            Ok(true) => {
                app.sync_profiles(&store.load());
                app.set_status(format!("Deleted workspace '{name}'"));
                start_catalog_refresh(app, gateway, refresh_tx);
            }
            Ok(false) => {
                app.sync_profiles(&store.load());
                app.set_status(format!("Workspace not found: {name}"));
            }
            Err(error) => {
                app.set_status(format!(
                    "Failed deleting workspace '{name}': {}",
                    compact_error(&error)
                ));
            }
        },
    }
}

/// Kick off one catalog refresh for the profile under the cursor. The
/// request runs on the runtime so the keyboard stays responsive; the
/// completion lands in the loop through `refresh_tx`, tagged with its
/// generation so superseded refreshes are dropped instead of overwriting
/// newer results.
fn start_catalog_refresh(
    app: &mut App,
    gateway: &WorkspaceGateway,
    refresh_tx: &mpsc::UnboundedSender<CatalogRefresh>,
) {
    let Some((generation, profile)) = app.begin_refresh() else {
        return;
    };

    let gateway = gateway.clone();
    let tx = refresh_tx.clone();
    tokio::spawn(async move {
        let result = gateway
            .list_catalogs(&profile)
            .await
            .map_err(|error| compact_error(&error));
        let _ = tx.send(CatalogRefresh {
            generation,
            workspace: profile.name,
            result,
        });
    });
}

fn compact_error(error: &anyhow::Error) -> String {
    let mut out = Vec::new();
    for (index, cause) in error.chain().enumerate() {
        if index == 0 {
            out.push(cause.to_string());
        } else if index <= 2 {
            out.push(format!("caused by: {cause}"));
        } else {
            break;
        }
    }

    out.join("\n")
}
