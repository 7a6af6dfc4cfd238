//! In-memory oracle that replays scripted replies.
//!
//! Used for tests and offline demos. Every request is recorded so callers can
//! assert what went over the wire, and a reply can be held back with a
//! [`oneshot`] channel to keep a request in flight.

use std::cell::RefCell;
use std::collections::VecDeque;

use futures::{channel::oneshot, future::LocalBoxFuture, FutureExt};

use super::{
    Oracle, OracleError, TranslateRequest, TranslateResponse, VerifyRequest, VerifyResponse,
};

enum Reply<T> {
    Ready(Result<T, OracleError>),
    Deferred(oneshot::Receiver<Result<T, OracleError>>),
}

impl<T: 'static> Reply<T> {
    fn into_future(self) -> LocalBoxFuture<'static, Result<T, OracleError>> {
        match self {
            Reply::Ready(result) => async move { result }.boxed_local(),
            Reply::Deferred(rx) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(OracleError::Transport("reply dropped".into())))
            }
            .boxed_local(),
        }
    }
}

/// Oracle answering from queues of prepared replies.
///
/// An empty queue answers with a transport error.
#[derive(Default)]
pub struct ScriptedOracle {
    translations: RefCell<VecDeque<Reply<TranslateResponse>>>,
    verifications: RefCell<VecDeque<Reply<VerifyResponse>>>,
    translate_requests: RefCell<Vec<TranslateRequest>>,
    verify_requests: RefCell<Vec<VerifyRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_translation(&self, result: Result<TranslateResponse, OracleError>) {
        self.translations.borrow_mut().push_back(Reply::Ready(result));
    }

    /// Queue a translation reply that arrives only when the sender is used.
    pub fn defer_translation(&self) -> oneshot::Sender<Result<TranslateResponse, OracleError>> {
        let (tx, rx) = oneshot::channel();
        self.translations.borrow_mut().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_verification(&self, result: Result<VerifyResponse, OracleError>) {
        self.verifications.borrow_mut().push_back(Reply::Ready(result));
    }

    pub fn defer_verification(&self) -> oneshot::Sender<Result<VerifyResponse, OracleError>> {
        let (tx, rx) = oneshot::channel();
        self.verifications.borrow_mut().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn translate_requests(&self) -> Vec<TranslateRequest> {
        self.translate_requests.borrow().clone()
    }

    pub fn verify_requests(&self) -> Vec<VerifyRequest> {
        self.verify_requests.borrow().clone()
    }
}

impl Oracle for ScriptedOracle {
    fn translate<'a>(
        &'a self,
        request: &'a TranslateRequest,
    ) -> LocalBoxFuture<'a, Result<TranslateResponse, OracleError>> {
        self.translate_requests.borrow_mut().push(request.clone());
        let reply = self.translations.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.into_future(),
            None => async { Err(OracleError::Transport("no scripted translation".into())) }
                .boxed_local(),
        }
    }

    fn verify<'a>(
        &'a self,
        request: &'a VerifyRequest,
    ) -> LocalBoxFuture<'a, Result<VerifyResponse, OracleError>> {
        self.verify_requests.borrow_mut().push(request.clone());
        let reply = self.verifications.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.into_future(),
            None => async { Err(OracleError::Transport("no scripted verification".into())) }
                .boxed_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn request() -> TranslateRequest {
        TranslateRequest {
            text: "Hola mundo".into(),
            src_lang: "spa_Latn".into(),
            tgt_lang: "eng_Latn".into(),
            verified_mode: false,
        }
    }

    #[test]
    fn test_replays_in_order_and_records() {
        let oracle = ScriptedOracle::new();
        oracle.push_translation(Ok(TranslateResponse {
            translated_text: "Hello world".into(),
            time_ms: 10,
            verification: None,
        }));
        oracle.push_translation(Err(OracleError::Status(503)));

        let first = block_on(oracle.translate(&request())).unwrap();
        assert_eq!(first.translated_text, "Hello world");
        assert_eq!(
            block_on(oracle.translate(&request())),
            Err(OracleError::Status(503))
        );
        assert!(matches!(
            block_on(oracle.translate(&request())),
            Err(OracleError::Transport(_))
        ));
        assert_eq!(oracle.translate_requests().len(), 3);
    }

    #[test]
    fn test_deferred_reply() {
        let oracle = ScriptedOracle::new();
        let tx = oracle.defer_verification();
        let req = VerifyRequest {
            src_text: "a".into(),
            tgt_text: "b".into(),
            src_lang: "spa_Latn".into(),
            tgt_lang: "eng_Latn".into(),
            proof_data: serde_json::json!({}),
        };

        let pending = oracle.verify(&req);
        tx.send(Ok(VerifyResponse {
            success: true,
            message: "Verification Successful".into(),
        }))
        .unwrap();

        assert!(block_on(pending).unwrap().success);
    }
}
