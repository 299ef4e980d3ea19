#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A poll cycle fetched a batch, newest post first.
    BatchFetched(Vec<crate::RawPost>),
    /// A poll cycle produced no batch; the state is left alone.
    FetchSkipped { reason: String },
}
