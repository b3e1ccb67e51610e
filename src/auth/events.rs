/// Signals the host application subscribes to. Navigation is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request hit an authorization failure that could not be recovered.
    Expired { method: String, url: String },
}
