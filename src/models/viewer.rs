/// Identity issued by the external auth provider. Read once at startup and
/// passed explicitly into every component that needs it; nothing looks it
/// up ambiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub uid: String,
}

impl Viewer {
    /// The signed-in viewer, if the auth wrapper exported one.
    pub fn from_env() -> Option<Self> {
        std::env::var("VERNISSAGE_VIEWER")
            .ok()
            .filter(|uid| !uid.is_empty())
            .map(|uid| Viewer { uid })
    }
}
