/// Read-only enrichment of agent context from a project's external memory
/// directory. Never shells out; a provider with nothing to read reports
/// `available() == false`.
pub trait ContextProvider: Send + Sync {
    fn available(&self) -> bool;
    /// A markdown block to prepend to the Planner's objective.
    fn build_prefix(&self) -> String;
    /// Constraints to merge into the task's own constraint list.
    fn constraints(&self) -> Vec<String>;
}
