use crate::handler::SharedHandler;

/// A bundle of handlers registered together.
///
/// Handlers are registered in the order returned by [`filters`](Self::filters),
/// so a plugin controls the relative priority of its own formats.
pub trait FilterPlugin {
    /// Plugin name, for log messages.
    fn name(&self) -> &str;

    /// Handlers contributed by this plugin, highest priority first.
    fn filters(&self) -> Vec<SharedHandler>;
}
