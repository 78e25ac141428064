//! Automatic frame following
//!
//! Keeps one subscriber per trigger in the [`HookRegistry`] while the
//! trigger's policy is enabled, and none while it is disabled.

use crate::config::{Environment, FollowMode};
use crate::services::hooks::{HookCallback, HookId, HookKind, HookRegistry};
use crate::services::remote::OpenOptions;

/// Debugger event that can move the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Execution stopped
    Stop,
    /// The prompt is about to be shown
    Prompt,
}

impl Trigger {
    pub fn hook_kind(self) -> HookKind {
        match self {
            Trigger::Stop => HookKind::Stop,
            Trigger::Prompt => HookKind::BeforePrompt,
        }
    }

    /// Stops reopen even an unchanged location, since the user expects a jump
    /// after every stop. The prompt is redrawn far more often than the frame
    /// changes, so it goes through the dedup guard.
    pub fn open_options(self) -> OpenOptions {
        match self {
            Trigger::Stop => OpenOptions::reopen(),
            Trigger::Prompt => OpenOptions::default(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Trigger::Stop => "stop",
            Trigger::Prompt => "prompt",
        }
    }
}

/// Follow policy of a single trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowPolicy {
    mode: FollowMode,
    /// Cached resolution of `Auto`, cleared whenever the mode is set
    resolved: Option<bool>,
    subscription: Option<HookId>,
}

impl FollowPolicy {
    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    /// Whether the policy is on; `None` while `Auto` is unresolved
    pub fn effective(&self) -> Option<bool> {
        match self.mode {
            FollowMode::On => Some(true),
            FollowMode::Off => Some(false),
            FollowMode::Auto => self.resolved,
        }
    }

    pub fn is_hooked(&self) -> bool {
        self.subscription.is_some()
    }

    fn resolve(&mut self, env: &dyn Environment) -> bool {
        match self.mode {
            FollowMode::On => true,
            FollowMode::Off => false,
            FollowMode::Auto => *self.resolved.get_or_insert_with(|| {
                let present = env.server_name().is_some();
                tracing::debug!("auto follow resolved to {}", present);
                present
            }),
        }
    }
}

/// Decides when the current frame is pushed to the editor automatically
#[derive(Debug, Default)]
pub struct AutoFollowController {
    on_stop: FollowPolicy,
    on_prompt: FollowPolicy,
}

impl AutoFollowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self, trigger: Trigger) -> &FollowPolicy {
        match trigger {
            Trigger::Stop => &self.on_stop,
            Trigger::Prompt => &self.on_prompt,
        }
    }

    fn policy_mut(&mut self, trigger: Trigger) -> &mut FollowPolicy {
        match trigger {
            Trigger::Stop => &mut self.on_stop,
            Trigger::Prompt => &mut self.on_prompt,
        }
    }

    pub fn mode(&self, trigger: Trigger) -> FollowMode {
        self.policy(trigger).mode()
    }

    /// Effective state of a trigger; `None` while its `Auto` is unresolved
    pub fn is_enabled(&self, trigger: Trigger) -> Option<bool> {
        self.policy(trigger).effective()
    }

    pub fn is_hooked(&self, trigger: Trigger) -> bool {
        self.policy(trigger).is_hooked()
    }

    /// Set the mode of a trigger and apply it. Returns whether the trigger is
    /// now enabled.
    pub fn set_mode(
        &mut self,
        trigger: Trigger,
        mode: FollowMode,
        hooks: &mut HookRegistry,
        env: &dyn Environment,
    ) -> bool {
        let policy = self.policy_mut(trigger);
        policy.mode = mode;
        policy.resolved = None;
        self.apply(trigger, hooks, env)
    }

    /// Evaluate the policy and make the registry match it.
    ///
    /// Enabling an already registered trigger and disabling an unregistered
    /// one are both no-ops.
    pub fn apply(
        &mut self,
        trigger: Trigger,
        hooks: &mut HookRegistry,
        env: &dyn Environment,
    ) -> bool {
        let policy = self.policy_mut(trigger);
        let enabled = policy.resolve(env);
        let kind = trigger.hook_kind();

        match (enabled, policy.subscription) {
            (true, None) => {
                let id = hooks.add_hook(kind, follow_frame(trigger));
                policy.subscription = Some(id);
                tracing::info!("Following frame on {}", trigger.name());
            }
            (false, Some(id)) => {
                hooks.remove_hook(kind, id);
                policy.subscription = None;
                tracing::info!("No longer following frame on {}", trigger.name());
            }
            _ => {}
        }
        enabled
    }
}

/// Subscriber that shows the selected frame in the editor
fn follow_frame(trigger: Trigger) -> HookCallback {
    let options = trigger.open_options();
    Box::new(move |_args, ctx| {
        if let Err(e) = ctx
            .session
            .request_current_location(&mut *ctx.host, false, options)
        {
            tracing::warn!("Failed to follow frame on {}: {}", trigger.name(), e);
            ctx.host.write_line(&format!("vimview: {}", e));
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SERVER_ENV_VAR;
    use std::collections::HashMap;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn env_with_server() -> HashMap<String, String> {
        HashMap::from([(SERVER_ENV_VAR.to_string(), "gdb".to_string())])
    }

    #[test]
    fn test_default_is_off_and_unhooked() {
        let controller = AutoFollowController::new();
        for trigger in [Trigger::Stop, Trigger::Prompt] {
            assert_eq!(controller.mode(trigger), FollowMode::Off);
            assert!(!controller.is_hooked(trigger));
        }
    }

    #[test]
    fn test_enable_twice_registers_once() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();
        let env = no_env();

        assert!(controller.set_mode(Trigger::Stop, FollowMode::On, &mut hooks, &env));
        assert!(controller.set_mode(Trigger::Stop, FollowMode::On, &mut hooks, &env));
        assert_eq!(hooks.hook_count(HookKind::Stop), 1);
        assert!(controller.is_hooked(Trigger::Stop));
    }

    #[test]
    fn test_disable_twice_is_noop() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();
        let env = no_env();

        controller.set_mode(Trigger::Stop, FollowMode::On, &mut hooks, &env);
        assert!(!controller.set_mode(Trigger::Stop, FollowMode::Off, &mut hooks, &env));
        assert!(!controller.set_mode(Trigger::Stop, FollowMode::Off, &mut hooks, &env));
        assert_eq!(hooks.hook_count(HookKind::Stop), 0);
        assert!(!controller.is_hooked(Trigger::Stop));
    }

    #[test]
    fn test_auto_without_server_env_stays_off() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();

        assert!(!controller.set_mode(Trigger::Stop, FollowMode::Auto, &mut hooks, &no_env()));
        assert_eq!(hooks.hook_count(HookKind::Stop), 0);
        assert_eq!(controller.is_enabled(Trigger::Stop), Some(false));
    }

    #[test]
    fn test_auto_with_server_env_registers_once() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();

        assert!(controller.set_mode(Trigger::Prompt, FollowMode::Auto, &mut hooks, &env_with_server()));
        assert_eq!(hooks.hook_count(HookKind::BeforePrompt), 1);
        assert_eq!(hooks.hook_count(HookKind::Stop), 0);
        assert_eq!(controller.mode(Trigger::Prompt), FollowMode::Auto);
    }

    #[test]
    fn test_auto_resolution_is_cached_until_reset() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();

        controller.set_mode(Trigger::Stop, FollowMode::Auto, &mut hooks, &no_env());

        // The environment changing afterwards does not matter on re-apply
        assert!(!controller.apply(Trigger::Stop, &mut hooks, &env_with_server()));
        assert_eq!(hooks.hook_count(HookKind::Stop), 0);

        // Setting Auto again checks the environment again
        assert!(controller.set_mode(Trigger::Stop, FollowMode::Auto, &mut hooks, &env_with_server()));
        assert_eq!(hooks.hook_count(HookKind::Stop), 1);
    }

    #[test]
    fn test_unresolved_auto_has_no_effective_value() {
        let policy = FollowPolicy {
            mode: FollowMode::Auto,
            ..FollowPolicy::default()
        };
        assert_eq!(policy.effective(), None);
    }

    #[test]
    fn test_disabling_keeps_foreign_prompt_hooks() {
        let mut controller = AutoFollowController::new();
        let mut hooks = HookRegistry::new();
        let env = no_env();

        let foreign = hooks.add_hook(HookKind::BeforePrompt, Box::new(|_args, _ctx| true));
        controller.set_mode(Trigger::Prompt, FollowMode::On, &mut hooks, &env);
        assert_eq!(hooks.hook_count(HookKind::BeforePrompt), 2);

        controller.set_mode(Trigger::Prompt, FollowMode::Off, &mut hooks, &env);
        assert_eq!(hooks.hook_count(HookKind::BeforePrompt), 1);
        assert!(hooks.contains(HookKind::BeforePrompt, foreign));
    }

    #[test]
    fn test_trigger_open_options() {
        assert!(Trigger::Stop.open_options().reopen);
        assert!(!Trigger::Prompt.open_options().reopen);
        assert!(Trigger::Stop.open_options().existing_only);
    }
}
