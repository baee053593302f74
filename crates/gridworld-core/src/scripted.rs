//! A scripted oracle for tests and offline runs.
//!
//! [`ScriptedOracle`] answers each [`CallSite`] from a canned string or a
//! closure over the request context, and records every request it sees.
//! Sites with no script answer with [`OracleError::Unscripted`], which the
//! pipeline treats like any other oracle failure.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::oracle::{ApiKey, CallSite, Oracle, OracleError, OracleRequest};

type Responder = Box<dyn Fn(&serde_json::Value) -> Result<String, OracleError> + Send + Sync>;

/// An [`Oracle`] driven by per-site scripts.
#[derive(Default)]
pub struct ScriptedOracle {
    responders: BTreeMap<CallSite, Responder>,
    calls: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    /// An oracle with no scripts. Every call fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `site` with `text` every time.
    #[must_use]
    pub fn respond(self, site: CallSite, text: impl Into<String>) -> Self {
        let text = text.into();
        self.respond_with(site, move |_| Ok(text.clone()))
    }

    /// Answer `site` with `error` every time.
    #[must_use]
    pub fn fail(self, site: CallSite, error: OracleError) -> Self {
        self.respond_with(site, move |_| Err(error.clone()))
    }

    /// Answer `site` by calling `f` with the request context.
    #[must_use]
    pub fn respond_with<F>(mut self, site: CallSite, f: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        self.responders.insert(site, Box::new(f));
        self
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<OracleRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many requests `site` has received.
    pub fn call_count(&self, site: CallSite) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.site == site)
            .count()
    }
}

impl fmt::Debug for ScriptedOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedOracle")
            .field("sites", &self.responders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Oracle for ScriptedOracle {
    fn request(
        &self,
        _credential: &ApiKey,
        request: OracleRequest,
    ) -> impl Future<Output = Result<String, OracleError>> + Send {
        let result = match self.responders.get(&request.site) {
            Some(responder) => responder(&request.context),
            None => Err(OracleError::Unscripted(request.site)),
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        std::future::ready(result)
    }
}
