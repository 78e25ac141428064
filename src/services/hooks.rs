//! Hook System: debugger event subscription
//!
//! Subscribers are kept in registration order per event kind. Each one gets
//! its own [`HookId`], so removing one subscriber never disturbs the others.

use crate::debugger::DebuggerHost;
use crate::services::remote::RemoteEditorSession;
use std::collections::HashMap;

/// Debugger events the bridge can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Execution of the inferior stopped
    Stop,
    /// The interactive prompt is about to be shown
    BeforePrompt,
}

/// Arguments passed to hook callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookArgs {
    Stop,
    BeforePrompt {
        /// Prompt text as the debugger will print it
        prompt: String,
    },
}

impl HookArgs {
    pub fn kind(&self) -> HookKind {
        match self {
            HookArgs::Stop => HookKind::Stop,
            HookArgs::BeforePrompt { .. } => HookKind::BeforePrompt,
        }
    }
}

/// Handle of a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// What a callback may touch while it runs
pub struct HookContext<'a> {
    pub session: &'a mut RemoteEditorSession,
    pub host: &'a mut dyn DebuggerHost,
}

/// Type for hook callbacks
/// Returns `true` to let later callbacks run, `false` to stop the chain
pub type HookCallback = Box<dyn FnMut(&HookArgs, &mut HookContext<'_>) -> bool>;

/// Registry for managing hooks
pub struct HookRegistry {
    hooks: HashMap<HookKind, Vec<(HookId, HookCallback)>>,
    next_id: u64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Append a callback for `kind` and return its handle
    pub fn add_hook(&mut self, kind: HookKind, callback: HookCallback) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.entry(kind).or_default().push((id, callback));
        tracing::trace!("Added {:?} hook {:?}", kind, id);
        id
    }

    /// Remove a single callback. Returns false if it was not registered.
    pub fn remove_hook(&mut self, kind: HookKind, id: HookId) -> bool {
        let Some(hooks) = self.hooks.get_mut(&kind) else {
            return false;
        };
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        before != hooks.len()
    }

    /// Remove all callbacks for `kind`
    pub fn remove_hooks(&mut self, kind: HookKind) {
        self.hooks.remove(&kind);
    }

    /// Run all callbacks for the event in registration order
    ///
    /// Returns `false` if a callback stopped the chain.
    pub fn run_hooks(&mut self, args: &HookArgs, ctx: &mut HookContext<'_>) -> bool {
        let kind = args.kind();
        if let Some(hooks) = self.hooks.get_mut(&kind) {
            for (id, callback) in hooks.iter_mut() {
                if !callback(args, ctx) {
                    tracing::debug!("Hook {:?} stopped the {:?} chain", id, kind);
                    return false;
                }
            }
        }
        true
    }

    pub fn contains(&self, kind: HookKind, id: HookId) -> bool {
        self.hooks
            .get(&kind)
            .is_some_and(|hooks| hooks.iter().any(|(hook_id, _)| *hook_id == id))
    }

    /// Get count of registered callbacks for a hook
    pub fn hook_count(&self, kind: HookKind) -> usize {
        self.hooks.get(&kind).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
