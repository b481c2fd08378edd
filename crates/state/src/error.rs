/// All errors that can be returned by the form state store.
///
/// Deregistering a field that was never registered is NOT an error; it is
/// an idempotent no-op handled inside the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No field with this name was declared at store construction.
    #[error("unknown field: {field}")]
    UnknownField { field: String },
}
