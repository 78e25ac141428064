//! The bridge object a debugger adapter talks to
//!
//! [`VimView`] owns the remote session, the hook registry and the follow
//! controller. The adapter creates one at startup, forwards debugger events
//! to [`VimView::on_stop`] / [`VimView::before_prompt`], and routes user
//! commands, convenience variables and parameters through it.

use crate::commands::{on_off, Command, CursorQuery, Parameter, ParameterError, ParameterValue};
use crate::config::{Config, ConnectionUpdate, Environment, FollowMode, OpenMode};
use crate::debugger::{BreakpointLocation, DebuggerHost};
use crate::services::follow::{AutoFollowController, Trigger};
use crate::services::hooks::{HookArgs, HookContext, HookRegistry};
use crate::services::remote::{OpenOptions, RemoteEditorSession};

pub struct VimView {
    session: RemoteEditorSession,
    hooks: HookRegistry,
    follow: AutoFollowController,
    env: Box<dyn Environment>,
}

impl VimView {
    /// Create the bridge around `session`, taking the server name from the
    /// environment when it is set there.
    pub fn new(mut session: RemoteEditorSession, env: Box<dyn Environment>) -> Self {
        if let Some(name) = env.server_name() {
            session.configure(ConnectionUpdate::server_name(name));
        }
        Self {
            session,
            hooks: HookRegistry::new(),
            follow: AutoFollowController::new(),
            env,
        }
    }

    /// Create the bridge and apply a fully layered config.
    ///
    /// Values in `config` win over the environment, so callers layer
    /// [`Config::with_environment`] in before any overrides of their own.
    pub fn from_config(
        config: &Config,
        session: RemoteEditorSession,
        env: Box<dyn Environment>,
    ) -> Self {
        let mut view = Self::new(session, env);
        view.session.configure(config.connection_update());
        view.set_follow(Trigger::Stop, config.follow_on_stop);
        view.set_follow(Trigger::Prompt, config.follow_on_prompt);
        view
    }

    pub fn session(&self) -> &RemoteEditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut RemoteEditorSession {
        &mut self.session
    }

    /// Registry shared with other subscribers of the same debugger events
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn follow(&self) -> &AutoFollowController {
        &self.follow
    }

    /// Print the server name picked up from the environment, if any
    pub fn announce_server(&self, host: &mut dyn DebuggerHost) {
        if self.env.server_name().is_some() {
            host.write_line(&self.show_parameter(Parameter::ServerName));
        }
    }

    pub fn set_follow(&mut self, trigger: Trigger, mode: FollowMode) -> bool {
        self.follow
            .set_mode(trigger, mode, &mut self.hooks, self.env.as_ref())
    }

    /// The debugger stopped
    pub fn on_stop(&mut self, host: &mut dyn DebuggerHost) -> bool {
        self.dispatch(&HookArgs::Stop, host)
    }

    /// The debugger is about to show `prompt`
    pub fn before_prompt(&mut self, host: &mut dyn DebuggerHost, prompt: &str) -> bool {
        let args = HookArgs::BeforePrompt {
            prompt: prompt.to_string(),
        };
        self.dispatch(&args, host)
    }

    fn dispatch(&mut self, args: &HookArgs, host: &mut dyn DebuggerHost) -> bool {
        let mut ctx = HookContext {
            session: &mut self.session,
            host,
        };
        self.hooks.run_hooks(args, &mut ctx)
    }

    /// Run a user command
    pub fn execute(&mut self, command: &Command, host: &mut dyn DebuggerHost) {
        match command {
            Command::View => self.view(host),
            Command::Break(None) => self.break_at_cursor(host),
            Command::Break(Some(arg)) => match arg.trim().parse::<i64>() {
                Ok(number) => self.show_breakpoint(number, host),
                Err(_) => host.write_line(&format!("expected breakpoint number, got \"{}\"", arg)),
            },
        }
    }

    /// Show the selected frame, even if it is where the editor already is
    pub fn view(&mut self, host: &mut dyn DebuggerHost) {
        if let Err(e) = self
            .session
            .request_current_location(host, true, OpenOptions::reopen())
        {
            host.write_line(&format!("error: {}", e));
        }
    }

    /// Create a breakpoint at the vim cursor
    pub fn break_at_cursor(&mut self, host: &mut dyn DebuggerHost) {
        let eval = match self.session.evaluate(CursorQuery::FileLine.expression()) {
            Ok(eval) => eval,
            Err(e) => {
                host.write_line(&format!("error: {}", e));
                return;
            }
        };

        if !eval.is_ok() {
            host.write(&format!("error: {}", eval.error));
            return;
        }

        let location = eval.output.trim_end();
        if let Err(e) = host.create_breakpoint(location) {
            host.write_line(&e);
        }
    }

    /// Show breakpoint `number` in the editor
    pub fn show_breakpoint(&mut self, number: i64, host: &mut dyn DebuggerHost) {
        let Some(breakpoint) = host
            .breakpoints()
            .into_iter()
            .find(|b| i64::from(b.number) == number)
        else {
            host.write_line(&format!("no breakpoint number {}", number));
            return;
        };

        // TODO: resolve function and address breakpoints to their source location
        let location = BreakpointLocation::parse(&breakpoint.location);
        match self
            .session
            .open_file(&location.path, location.line, OpenOptions::reopen())
        {
            Ok(true) => {}
            Ok(false) => host.write_line(&format!(
                "cannot open file \"{}\"",
                location.path.display()
            )),
            Err(e) => host.write_line(&format!("error: {}", e)),
        }
    }

    /// Value of a cursor convenience variable; empty on error
    pub fn cursor_value(&self, query: CursorQuery, host: &mut dyn DebuggerHost) -> String {
        match self.session.evaluate(query.expression()) {
            Ok(eval) if eval.is_ok() => eval.output.trim_end().to_string(),
            Ok(eval) => {
                host.write(&format!("error: {}", eval.error));
                String::new()
            }
            Err(e) => {
                host.write_line(&format!("error: {}", e));
                String::new()
            }
        }
    }

    /// Set a parameter and return its show string
    pub fn set_parameter(
        &mut self,
        parameter: Parameter,
        value: &str,
    ) -> Result<String, ParameterError> {
        match (parameter, parameter.parse_value(value)?) {
            (Parameter::FollowOnStop, ParameterValue::Follow(mode)) => {
                self.set_follow(Trigger::Stop, mode);
            }
            (Parameter::FollowOnPrompt, ParameterValue::Follow(mode)) => {
                self.set_follow(Trigger::Prompt, mode);
            }
            (Parameter::ServerName, ParameterValue::Text(name)) => {
                self.session.configure(ConnectionUpdate::server_name(name));
            }
            (Parameter::Executable, ParameterValue::Text(exe)) => {
                self.session.configure(ConnectionUpdate::executable(exe));
            }
            (Parameter::UseTabs, ParameterValue::Flag(tabs)) => {
                self.session
                    .configure(ConnectionUpdate::open_mode(OpenMode::from_use_tabs(tabs)));
            }
            (parameter, value) => {
                tracing::error!("{:?} cannot take {:?}", parameter, value);
            }
        }
        Ok(self.show_parameter(parameter))
    }

    /// Set a parameter by its debugger name
    pub fn set_parameter_by_name(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<String, ParameterError> {
        self.set_parameter(Parameter::from_name(name)?, value)
    }

    pub fn show_parameter(&self, parameter: Parameter) -> String {
        let config = self.session.config();
        match parameter {
            Parameter::FollowOnStop => {
                format!("Vim follows frame on stop: {}", self.follow_state(Trigger::Stop))
            }
            Parameter::FollowOnPrompt => {
                format!("Vim follows frame on prompt: {}", self.follow_state(Trigger::Prompt))
            }
            Parameter::ServerName => format!("Vim server name: \"{}\"", config.server_name()),
            Parameter::Executable => format!("Vim executable name: \"{}\"", config.executable()),
            Parameter::UseTabs => format!(
                "Open files in tabs: {}",
                on_off(config.open_mode().uses_tabs())
            ),
        }
    }

    fn follow_state(&self, trigger: Trigger) -> String {
        let policy = self.follow.policy(trigger);
        match policy.effective() {
            Some(enabled) => on_off(enabled).to_string(),
            None => policy.mode().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SERVER_ENV_VAR;
    use std::collections::HashMap;

    fn view_with_env(vars: &[(&str, &str)]) -> VimView {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VimView::new(RemoteEditorSession::new(), Box::new(env))
    }

    #[test]
    fn test_server_name_from_environment() {
        let view = view_with_env(&[(SERVER_ENV_VAR, "work")]);
        assert_eq!(view.session().config().server_name(), "work");

        let view = view_with_env(&[]);
        assert_eq!(view.session().config().server_name(), "gdb");
    }

    #[test]
    fn test_parameter_show_strings() {
        let mut view = view_with_env(&[]);

        assert_eq!(
            view.show_parameter(Parameter::FollowOnStop),
            "Vim follows frame on stop: off"
        );
        assert_eq!(
            view.set_parameter(Parameter::FollowOnPrompt, "on").unwrap(),
            "Vim follows frame on prompt: on"
        );
        assert_eq!(
            view.set_parameter(Parameter::ServerName, "work").unwrap(),
            "Vim server name: \"work\""
        );
        assert_eq!(
            view.set_parameter(Parameter::Executable, "gvim").unwrap(),
            "Vim executable name: \"gvim\""
        );
        assert_eq!(
            view.set_parameter(Parameter::UseTabs, "on").unwrap(),
            "Open files in tabs: on"
        );
        assert_eq!(view.session().config().open_mode(), OpenMode::Tab);
    }

    #[test]
    fn test_empty_server_name_keeps_previous() {
        let mut view = view_with_env(&[]);
        assert_eq!(
            view.set_parameter_by_name("vimview-server", "").unwrap(),
            "Vim server name: \"gdb\""
        );
    }

    #[test]
    fn test_auto_follow_shows_resolved_value() {
        let mut view = view_with_env(&[(SERVER_ENV_VAR, "gdb")]);
        assert_eq!(
            view.set_parameter(Parameter::FollowOnStop, "auto").unwrap(),
            "Vim follows frame on stop: on"
        );
        assert!(view.follow().is_hooked(Trigger::Stop));
    }

    #[test]
    fn test_invalid_parameter_value() {
        let mut view = view_with_env(&[]);
        assert!(view.set_parameter(Parameter::UseTabs, "maybe").is_err());
        assert!(view.set_parameter_by_name("vimview-colour", "on").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            server_name: "cfg".to_string(),
            executable: "nvim".to_string(),
            open_mode: OpenMode::Tab,
            follow_on_stop: FollowMode::On,
            follow_on_prompt: FollowMode::Auto,
        };
        let view = VimView::from_config(
            &config,
            RemoteEditorSession::new(),
            Box::new(HashMap::<String, String>::new()),
        );

        assert_eq!(view.session().config().server_name(), "cfg");
        assert_eq!(view.session().config().executable(), "nvim");
        assert!(view.follow().is_hooked(Trigger::Stop));
        assert!(!view.follow().is_hooked(Trigger::Prompt));
    }
}
