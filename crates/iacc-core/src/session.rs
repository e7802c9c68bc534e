/// Who is using the app right now
///
/// Passed into the sources that care instead of being looked up globally.
pub trait UserSession: Send + Sync {
    fn is_premium(&self) -> bool;
}

/// Session whose premium flag is fixed at construction
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSession {
    pub premium: bool,
}

impl StaticSession {
    pub fn premium() -> Self {
        Self { premium: true }
    }

    pub fn basic() -> Self {
        Self { premium: false }
    }
}

impl UserSession for StaticSession {
    fn is_premium(&self) -> bool {
        self.premium
    }
}
