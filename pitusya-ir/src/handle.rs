//! Session-scoped handles
//!
//! Values, functions and slots are handed out as small copyable ids. Each
//! id carries the [`SessionId`] of the session that created it, so a handle
//! that outlives its session (or is passed to another one) is rejected
//! with [`CompilerError::StaleHandle`] instead of resolving to garbage.

use pitusya_common::CompilerError;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SESSION: AtomicU32 = AtomicU32::new(1);

/// Generation number of a session
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SessionId(u32);

impl SessionId {
    /// A generation no other session in this process has used
    pub fn fresh() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

macro_rules! session_handle {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        $vis struct $name {
            session: SessionId,
            index: u32,
        }

        impl $name {
            pub(crate) fn new(session: SessionId, index: usize) -> Self {
                Self { session, index: index as u32 }
            }

            pub fn session(self) -> SessionId {
                self.session
            }

            /// Arena index, after checking the handle belongs to `session`
            pub(crate) fn index_in(self, session: SessionId) -> Result<usize, CompilerError> {
                if self.session == session {
                    Ok(self.index as usize)
                } else {
                    Err(CompilerError::stale_handle(format!(
                        "{} from {} used with {}",
                        self, self.session, session
                    )))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.index)
            }
        }
    };
}

session_handle! {
    /// Handle to an IR value (constant, parameter or instruction result)
    pub struct ValueId;
}

session_handle! {
    /// Handle to a function of the session's module
    pub struct FunctionId;
}

session_handle! {
    /// Handle to a stack slot backing a mutable variable
    pub struct SlotId;
}
