#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the status to every connected observer.
    PublishStatus(crate::StatusView),
    ReportBreak(crate::BreakReport),
}
