//! Authentication state trait and macro.

use crate::session::Sessions;

/// Trait for state types that can authenticate requests.
pub trait HasAuthBackend {
    fn sessions(&self) -> &Sessions;
}

/// Macro to implement `HasAuthBackend` for state structs with a
/// `sessions: Sessions` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub sessions: Sessions,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn sessions(&self) -> &$crate::session::Sessions {
                &self.sessions
            }
        }
    };
}
