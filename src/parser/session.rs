//! Reusable parser state, cached once per thread.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use tracing::{Level, enabled, trace};

use super::check_input_len;
use super::grammar::{GrammarParser, ModelVisitor, TokenStream, tokenize};
use crate::ast::SelectQuery;
use crate::error::SqlResult;

thread_local! {
    static CACHED: RefCell<Option<ParserSession>> = const { RefCell::new(None) };
}

/// Token buffer and cursor of the grammar front-end.
///
/// Not `Send`: a session belongs to the thread that acquired it.
#[derive(Debug, Default)]
pub struct ParserSession {
    stream: TokenStream,
    _not_send: PhantomData<*const ()>,
}

impl ParserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take this thread's cached session (or a new one), reset and ready to use.
    ///
    /// The guard resets the session again and returns it to the cache when dropped,
    /// whether the parse succeeded, failed or panicked.
    pub fn acquire() -> SessionGuard {
        let cached = CACHED
            .try_with(|slot| slot.borrow_mut().take())
            .ok()
            .flatten();
        let reused = cached.is_some();
        let mut session = cached.unwrap_or_default();
        session.reset();
        trace!(reused, "acquired parser session");
        SessionGuard { session }
    }

    pub fn reset(&mut self) {
        self.stream.reset();
    }

    /// Number of tokens currently buffered.
    pub fn token_count(&self) -> usize {
        self.stream.len()
    }

    /// Parse one SELECT statement of at most `max_len` bytes.
    pub fn parse(&mut self, sql: &str, max_len: usize) -> SqlResult<SelectQuery> {
        check_input_len(sql, max_len)?;
        self.reset();
        tokenize(sql, &mut self.stream)?;
        trace!(tokens = self.stream.len(), "tokenized");

        let tree = GrammarParser::new(&mut self.stream, sql).select_statement()?;
        if enabled!(Level::TRACE) {
            trace!(tree = %tree.outline(), "syntax tree");
        }
        ModelVisitor::new(sql).visit_statement(&tree)
    }
}

/// Scoped access to a [`ParserSession`].
pub struct SessionGuard {
    session: ParserSession,
}

impl Deref for SessionGuard {
    type Target = ParserSession;

    fn deref(&self) -> &ParserSession {
        &self.session
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut ParserSession {
        &mut self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let mut session = std::mem::take(&mut self.session);
        session.reset();
        trace!("released parser session");
        // The slot is gone during thread teardown; the session is simply dropped then.
        let _ = CACHED.try_with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                *slot = Some(session);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_resets_on_drop() {
        {
            let mut guard = ParserSession::acquire();
            guard.parse("SELECT a FROM t", 1024).unwrap();
            assert!(guard.token_count() > 0);
        }
        let guard = ParserSession::acquire();
        assert_eq!(guard.token_count(), 0);
    }

    #[test]
    fn test_guard_resets_after_error() {
        {
            let mut guard = ParserSession::acquire();
            assert!(guard.parse("SELECT FROM", 1024).is_err());
        }
        let mut guard = ParserSession::acquire();
        assert_eq!(guard.token_count(), 0);
        assert!(guard.parse("SELECT a FROM t", 1024).is_ok());
    }

    #[test]
    fn test_input_limit() {
        let mut session = ParserSession::new();
        let err = session.parse("SELECT a FROM t", 6).unwrap_err();
        assert!(err.is_parse());
    }
}
