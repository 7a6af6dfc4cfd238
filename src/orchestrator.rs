//! Drives one translation request against the oracle.
//!
//! The session is only borrowed for the two synchronous halves of the cycle,
//! never across the oracle call, so other events (edits, a second translate
//! click) can reach the session while a request is in flight.

use std::cell::RefCell;

use crate::oracle::Oracle;
use crate::prefs::{PreferenceStore, LAST_TEXT_KEY};
use crate::session::{Begin, Session, TranslateOutcome};

/// Translate the session's current source text.
///
/// `changed` is called whenever the session changed and should be redrawn.
/// A call made while another request is in flight returns
/// [`TranslateOutcome::Busy`] without touching anything.
pub async fn translate<O, P>(
    session: &RefCell<Session>,
    oracle: &O,
    prefs: &P,
    mut changed: impl FnMut(),
) -> TranslateOutcome
where
    O: Oracle + ?Sized,
    P: PreferenceStore + ?Sized,
{
    let begin = session.borrow_mut().begin_translation();
    let pending = match begin {
        Begin::Busy => {
            tracing::debug!("translation already in flight, ignoring");
            return TranslateOutcome::Busy;
        }
        Begin::Cleared => {
            changed();
            return TranslateOutcome::Cleared;
        }
        Begin::Dispatch(pending) => pending,
    };

    let raw_source = session.borrow().source_text().to_string();
    prefs.set(LAST_TEXT_KEY, &raw_source);
    changed();

    let request = pending.request();
    tracing::info!(
        src = %request.src_lang,
        tgt = %request.tgt_lang,
        verified = request.verified_mode,
        "translating"
    );
    let result = oracle.translate(request).await;

    let outcome = session.borrow_mut().finish_translation(pending, result);
    changed();
    outcome
}
