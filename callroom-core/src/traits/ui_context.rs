/// Work posted to the UI context.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// The single-threaded context that owns the UI.
///
/// `post` must not run `task` inline; tasks run asynchronously, in the
/// order they were posted.
pub trait UiContext: Send + Sync {
    fn post(&self, task: UiTask);
}
