use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::PathBuf;
use vimview::commands::{CursorQuery, Parameter};
use vimview::config::{Config, FollowMode, OpenMode, ProcessEnvironment};
use vimview::debugger::{Breakpoint, BreakpointLocation, DebuggerHost, FrameError, FrameLocation};
use vimview::services::follow::Trigger;
use vimview::services::remote::{OpenOptions, RemoteEditorSession};
use vimview::services::tracing_setup;
use vimview::VimView;

/// Drive a vim server the same way the debugger bridge does
#[derive(Parser, Debug)]
#[command(name = "vimview")]
#[command(about = "Show source locations in a running vim server", long_about = None)]
#[command(version)]
struct Args {
    /// Vim server name (default: $VIMSERVER, then the config file, then "gdb")
    #[arg(long, value_name = "NAME")]
    server: Option<String>,

    /// Vim executable
    #[arg(long, value_name = "PROGRAM")]
    command: Option<String>,

    /// Open files in tabs instead of the current window
    #[arg(long)]
    tabs: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log every command line sent to vim
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the JSON schema of the configuration file and exit
    #[arg(long)]
    dump_schema: bool,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Open FILE[:LINE] in vim
    Open {
        #[arg(value_name = "FILE[:LINE]")]
        location: String,

        /// Open even if vim was last sent to the same place
        #[arg(long)]
        reopen: bool,

        /// Also open paths that do not exist yet
        #[arg(long)]
        any: bool,
    },

    /// Evaluate a vim expression and print the result
    Eval { expression: String },

    /// Print a value from the vim cursor: vw, ve, vf, vl or vfl
    Cursor { name: String },

    /// Read FILE:LINE stop locations from stdin and follow each one
    Follow {
        /// Skip locations equal to the previous one
        #[arg(long)]
        dedup: bool,
    },
}

/// Stand-in debugger for the driver: the frame is whatever was read last
#[derive(Default)]
struct ConsoleHost {
    frame: Option<FrameLocation>,
}

impl DebuggerHost for ConsoleHost {
    fn selected_frame_location(&self) -> Result<FrameLocation, FrameError> {
        self.frame.clone().ok_or(FrameError::NoFrameSelected)
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        Vec::new()
    }

    fn create_breakpoint(&mut self, location: &str) -> Result<(), String> {
        Err(format!("no debugger attached, cannot break at {}", location))
    }

    fn write(&mut self, text: &str) {
        eprint!("{}", text);
    }
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };

    let mut config = config.with_environment(&ProcessEnvironment);
    if let Some(server) = args.server.clone().filter(|s| !s.is_empty()) {
        config.server_name = server;
    }
    if let Some(command) = args.command.clone().filter(|s| !s.is_empty()) {
        config.executable = command;
    }
    if args.tabs {
        config.open_mode = OpenMode::Tab;
    }
    Ok(config)
}

fn follow_stdin(view: &mut VimView, dedup: bool) -> AnyhowResult<()> {
    let trigger = if dedup { Trigger::Prompt } else { Trigger::Stop };
    view.set_follow(trigger, FollowMode::On);

    let mut host = ConsoleHost::default();
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let location = BreakpointLocation::parse(line);
        host.frame = location
            .line
            .map(|l| FrameLocation::new(location.path.clone(), l));
        tracing::debug!("stop at {:?}", host.frame);

        match trigger {
            Trigger::Stop => view.on_stop(&mut host),
            Trigger::Prompt => view.before_prompt(&mut host, ""),
        };
    }
    Ok(())
}

fn run(args: Args) -> AnyhowResult<()> {
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if args.dump_schema {
        println!("{}", serde_json::to_string_pretty(&Config::json_schema())?);
        return Ok(());
    }

    let mut view = VimView::from_config(
        &config,
        RemoteEditorSession::new(),
        Box::new(ProcessEnvironment),
    );
    tracing::info!(
        "vim server \"{}\" via {}",
        config.server_name,
        config.executable
    );

    let Some(action) = args.action else {
        for parameter in Parameter::ALL {
            println!("{}", view.show_parameter(parameter));
        }
        return Ok(());
    };

    match action {
        Action::Open {
            location,
            reopen,
            any,
        } => {
            let location = BreakpointLocation::parse(&location);
            let options = OpenOptions {
                existing_only: !any,
                reopen,
            };
            let opened = view
                .session_mut()
                .open_file(&location.path, location.line, options)?;
            if !opened {
                anyhow::bail!("cannot open file \"{}\"", location.path.display());
            }
        }
        Action::Eval { expression } => {
            let eval = view.session().evaluate(&expression)?;
            if !eval.is_ok() {
                anyhow::bail!("{}", eval.error.trim_end());
            }
            print!("{}", eval.output);
        }
        Action::Cursor { name } => {
            let query = CursorQuery::from_name(&name)
                .with_context(|| format!("unknown cursor value \"{}\"", name))?;
            let mut host = ConsoleHost::default();
            println!("{}", view.cursor_value(query, &mut host));
        }
        Action::Follow { dedup } => follow_stdin(&mut view, dedup)?,
    }
    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    tracing_setup::init_global(&log_file, args.verbose);

    run(args)
}
