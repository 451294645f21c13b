//! Word-grid session management.
//!
//! `SessionController` owns the lattice, the live candidate set and the
//! outstanding suggestion fetch. Fetches are two-phase so the caller decides
//! how (and on which thread) the provider runs:
//!
//! 1. An action (`submit_first_word`, `choose_candidate`, `retry`) places a
//!    word and returns a [`FetchTicket`] carrying the fresh prompt.
//! 2. The provider result is handed back through [`SessionController::apply_fetch`].
//!    Tickets that no longer match the outstanding fetch are discarded.
//!
//! [`SessionController::resolve`] runs both halves against a blocking provider.

use crate::candidate::{Candidate, CandidateSet};
use crate::error::{ConfigError, ProviderError, SessionError};
use crate::export::{GridPayload, LatticeExporter};
use crate::lattice::{BoundingBox, Offset, PlacementLattice, Position, Word};
use crate::prompt::PromptAccumulator;
use crate::provider::SuggestionProvider;
use crate::view::GridView;
use crate::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);
// Shared by all sessions so a candidate never matches a set it did not come from
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing placed yet
    #[default]
    Empty,
    /// At least one word placed
    Collecting,
}

/// Where the session stands with respect to suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStatus {
    /// No fetch in flight. A candidate set is live once the session is collecting.
    Idle,
    /// Waiting for the provider.
    Outstanding { anchor: Position, generation: u64 },
    /// Last fetch failed; only `retry()` moves forward.
    Failed { anchor: Position },
}

/// A suggestion request issued by the session.
///
/// Hand the prompt to a provider, then pass the ticket and outcome back to
/// [`SessionController::apply_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    session_id: u64,
    anchor: Position,
    generation: u64,
    prompt: String,
}

impl FetchTicket {
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accumulated prompt including the anchor word.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Result of applying a provider response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new candidate set is live with this many entries.
    Applied { candidates: usize },
    /// The ticket was stale and the response was dropped.
    Discarded,
}

/// Session state machine for building a word grid.
#[derive(Debug)]
pub struct SessionController {
    id: u64,
    offsets: [Offset; 3],
    accumulator: PromptAccumulator,
    lattice: PlacementLattice,
    state: SessionState,
    candidates: Option<CandidateSet>,
    fetch: FetchStatus,
}

impl SessionController {
    /// Create an empty session from `config`.
    ///
    /// Fails when the offsets could send two placements to the same cell.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &Config) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            offsets: config.offsets,
            accumulator: PromptAccumulator::from_config(config),
            lattice: PlacementLattice::new(),
            state: SessionState::Empty,
            candidates: None,
            fetch: FetchStatus::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn lattice(&self) -> &PlacementLattice {
        &self.lattice
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.lattice.bounding_box()
    }

    /// Live candidate set, absent while a fetch is pending or after a failure.
    pub fn candidates(&self) -> Option<&CandidateSet> {
        self.candidates.as_ref()
    }

    /// Most recently placed position.
    pub fn anchor(&self) -> Option<Position> {
        self.lattice.last().map(|c| c.position)
    }

    pub fn is_fetch_pending(&self) -> bool {
        matches!(self.fetch, FetchStatus::Outstanding { .. })
    }

    pub fn has_failed_fetch(&self) -> bool {
        matches!(self.fetch, FetchStatus::Failed { .. })
    }

    pub fn current_prompt(&self) -> String {
        self.accumulator.current_prompt(&self.lattice)
    }

    pub fn accumulator(&self) -> &PromptAccumulator {
        &self.accumulator
    }

    /// Place the first word at the origin and request suggestions for it.
    pub fn submit_first_word(&mut self, raw: &str) -> Result<FetchTicket, SessionError> {
        if self.state != SessionState::Empty {
            return Err(SessionError::invalid("first word already placed"));
        }
        let word = Word::new(raw).ok_or_else(|| SessionError::invalid("first word is blank"))?;
        self.place_and_request(Position::ORIGIN, word)
    }

    /// Confirm a candidate from the live set and request suggestions for it.
    ///
    /// Candidates from an earlier set, or any choice made while a fetch is
    /// pending, are rejected without touching the lattice.
    pub fn choose_candidate(&mut self, candidate: &Candidate) -> Result<FetchTicket, SessionError> {
        if self.state == SessionState::Empty {
            return Err(SessionError::invalid("no word placed yet"));
        }
        let set = self.candidates.as_ref().ok_or_else(|| match self.fetch {
            FetchStatus::Outstanding { .. } => SessionError::invalid("suggestions still pending"),
            _ => SessionError::invalid("no live suggestions"),
        })?;
        if !set.contains(candidate) {
            return Err(SessionError::invalid(format!(
                "candidate '{}' at {} is not in the live set",
                candidate.word, candidate.position
            )));
        }
        self.place_and_request(candidate.position, candidate.word.clone())
    }

    /// Confirm the live candidate of the given rank (0 = right, 1 = down, 2 = diagonal).
    pub fn choose_index(&mut self, rank: usize) -> Result<FetchTicket, SessionError> {
        let candidate = self
            .candidates
            .as_ref()
            .and_then(|set| set.get(rank))
            .cloned()
            .ok_or_else(|| SessionError::invalid(format!("no live candidate at index {}", rank)))?;
        self.choose_candidate(&candidate)
    }

    /// Reissue the fetch for the current anchor after a provider failure
    /// or a response that yielded no usable words.
    pub fn retry(&mut self) -> Result<FetchTicket, SessionError> {
        let anchor = match (self.fetch, &self.candidates) {
            (FetchStatus::Failed { anchor }, _) => anchor,
            (FetchStatus::Idle, Some(set)) if set.is_empty() => set.anchor(),
            _ => return Err(SessionError::invalid("nothing to retry")),
        };
        self.candidates = None;
        let prompt = self.accumulator.current_prompt(&self.lattice);
        debug!(%anchor, "retrying suggestion fetch");
        Ok(self.issue_fetch(anchor, prompt))
    }

    /// The last fetch succeeded but left no candidate to choose.
    pub fn has_empty_candidates(&self) -> bool {
        self.candidates.as_ref().is_some_and(CandidateSet::is_empty)
    }

    /// Apply a provider outcome for `ticket`.
    ///
    /// Stale tickets return `Ok(FetchOutcome::Discarded)`. A provider error is
    /// returned as `SessionError::ProviderFailure` and leaves the anchor
    /// waiting for `retry()`.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<String>, ProviderError>,
    ) -> Result<FetchOutcome, SessionError> {
        let current = FetchStatus::Outstanding {
            anchor: ticket.anchor,
            generation: ticket.generation,
        };
        if ticket.session_id != self.id || self.fetch != current {
            warn!(
                anchor = %ticket.anchor,
                generation = ticket.generation,
                "discarding stale suggestion response"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match outcome {
            Ok(words) => {
                let set =
                    CandidateSet::from_ranked(ticket.anchor, ticket.generation, &words, &self.offsets);
                for candidate in &set {
                    self.lattice.touch(candidate.position);
                }
                let count = set.len();
                debug!(anchor = %ticket.anchor, count, "candidates ready");
                self.candidates = Some(set);
                self.fetch = FetchStatus::Idle;
                Ok(FetchOutcome::Applied { candidates: count })
            }
            Err(err) => {
                warn!(anchor = %ticket.anchor, error = %err, "suggestion fetch failed");
                self.fetch = FetchStatus::Failed {
                    anchor: ticket.anchor,
                };
                Err(err.into())
            }
        }
    }

    /// Run `ticket` against a blocking provider and apply the result.
    pub fn resolve<P: SuggestionProvider + ?Sized>(
        &mut self,
        ticket: &FetchTicket,
        provider: &P,
    ) -> Result<FetchOutcome, SessionError> {
        let outcome = provider.fetch_candidates(ticket.prompt());
        self.apply_fetch(ticket, outcome)
    }

    /// Export the lattice as CSV bytes. Does not change the session.
    pub fn finalize(&self) -> Result<Vec<u8>, SessionError> {
        if self.state == SessionState::Empty {
            return Err(SessionError::invalid("nothing to export yet"));
        }
        Ok(LatticeExporter::serialize(&self.lattice)?)
    }

    /// JSON submission document for the placed cells.
    pub fn payload(&self) -> GridPayload {
        GridPayload::from_lattice(&self.lattice)
    }

    /// Snapshot for front ends.
    pub fn view(&self) -> GridView {
        GridView::from_session(self)
    }

    fn place_and_request(&mut self, position: Position, word: Word) -> Result<FetchTicket, SessionError> {
        debug!(%position, word = %word, "placing word");
        self.lattice.place(position, word)?;
        self.state = SessionState::Collecting;
        self.candidates = None;
        // Read back from the committed log so the placed word is included
        let prompt = self.accumulator.current_prompt(&self.lattice);
        Ok(self.issue_fetch(position, prompt))
    }

    fn issue_fetch(&mut self, anchor: Position, prompt: String) -> FetchTicket {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.fetch = FetchStatus::Outstanding { anchor, generation };
        FetchTicket {
            session_id: self.id,
            anchor,
            generation,
            prompt,
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        // The default offsets always validate
        Self::build(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;

    fn session() -> SessionController {
        SessionController::new(&Config {
            preamble: String::new(),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_session() {
        let session = session();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.candidates().is_none());
        assert!(session.anchor().is_none());
        assert!(!session.is_fetch_pending());
        assert!(session.bounding_box().is_empty());
    }

    #[test]
    fn test_submit_first_word_issues_fetch() {
        let mut session = session();
        let ticket = session.submit_first_word("  dawn ").unwrap();

        assert_eq!(session.state(), SessionState::Collecting);
        assert_eq!(ticket.anchor(), Position::ORIGIN);
        assert_eq!(ticket.prompt(), "dawn");
        assert!(session.is_fetch_pending());
        assert_eq!(
            session.lattice().get(Position::ORIGIN).unwrap().word.as_str(),
            "dawn"
        );
    }

    #[test]
    fn test_blank_first_word_rejected() {
        let mut session = session();
        let err = session.submit_first_word("   ").unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.lattice().is_empty());
    }

    #[test]
    fn test_second_first_word_rejected() {
        let mut session = session();
        session.submit_first_word("dawn").unwrap();
        assert!(matches!(
            session.submit_first_word("dusk"),
            Err(SessionError::InvalidInput(_))
        ));
        assert_eq!(session.lattice().len(), 1);
    }

    #[test]
    fn test_choose_while_pending_rejected() {
        let mut session = session();
        session.submit_first_word("dawn").unwrap();
        let err = session.choose_index(0).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
    }

    #[test]
    fn test_apply_and_choose() {
        let provider = ScriptedProvider::new();
        provider.push_words(["light", "break", "glow"]);
        provider.push_words(["fades"]);

        let mut session = session();
        let ticket = session.submit_first_word("dawn").unwrap();
        let outcome = session.resolve(&ticket, &provider).unwrap();
        assert_eq!(outcome, FetchOutcome::Applied { candidates: 3 });

        let ticket = session.choose_index(2).unwrap();
        assert_eq!(ticket.anchor(), Position::new(1, 1));
        assert_eq!(ticket.prompt(), "dawn glow");
        assert!(session.candidates().is_none());

        session.resolve(&ticket, &provider).unwrap();
        let set = session.candidates().unwrap();
        assert_eq!(set.anchor(), Position::new(1, 1));
        assert_eq!(set.get(0).unwrap().position, Position::new(1, 2));
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let provider = ScriptedProvider::new();
        provider.push_error(ProviderError::Network("down".into()));

        let mut session = session();
        let first = session.submit_first_word("dawn").unwrap();
        assert!(session.resolve(&first, &provider).is_err());

        let retried = session.retry().unwrap();
        assert_ne!(first.generation(), retried.generation());

        // The old ticket no longer matches the outstanding fetch
        let outcome = session
            .apply_fetch(&first, Ok(vec!["late".to_string()]))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(session.candidates().is_none());
        assert!(session.is_fetch_pending());
    }

    #[test]
    fn test_ticket_from_other_session_discarded() {
        let mut a = session();
        let mut b = session();
        let ticket_a = a.submit_first_word("dawn").unwrap();
        b.submit_first_word("dusk").unwrap();

        let outcome = b.apply_fetch(&ticket_a, Ok(vec!["x".into()])).unwrap();
        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(b.candidates().is_none());
    }

    #[test]
    fn test_retry_only_after_failure() {
        let mut session = session();
        assert!(session.retry().is_err());
        session.submit_first_word("dawn").unwrap();
        assert!(session.retry().is_err());
    }

    #[test]
    fn test_new_rejects_colliding_offsets() {
        let mut config = Config::default();
        config.offsets[0] = Offset::new(0, 0);
        assert!(matches!(
            SessionController::new(&config),
            Err(ConfigError::Invalid(_))
        ));

        let mut config = Config::default();
        config.offsets[2] = config.offsets[1];
        assert!(SessionController::new(&config).is_err());
    }

    #[test]
    fn test_occupied_slot_is_invariant_violation() {
        // Bypass validation to reach the lattice guard
        let mut config = Config::default();
        config.offsets[0] = Offset::new(0, 0);
        let mut session = SessionController::build(&config);

        let ticket = session.submit_first_word("dawn").unwrap();
        session.apply_fetch(&ticket, Ok(vec!["x".into()])).unwrap();

        let err = session.choose_index(0).unwrap_err();
        assert!(matches!(err, SessionError::InvariantViolation(_)));
        assert!(!err.is_retryable());
        assert_eq!(session.lattice().len(), 1);
        assert_eq!(
            session.lattice().get(Position::ORIGIN).unwrap().word.as_str(),
            "dawn"
        );
        assert!(!session.is_fetch_pending());
        assert_eq!(session.candidates().unwrap().len(), 1);
    }

    #[test]
    fn test_generations_unique_across_sessions() {
        let mut a = session();
        let mut b = session();
        let ta = a.submit_first_word("dawn").unwrap();
        let tb = b.submit_first_word("dawn").unwrap();
        assert_ne!(ta.generation(), tb.generation());
    }

    #[test]
    fn test_finalize_requires_collecting() {
        let mut session = session();
        assert!(matches!(
            session.finalize(),
            Err(SessionError::InvalidInput(_))
        ));
        session.submit_first_word("a").unwrap();
        assert_eq!(session.finalize().unwrap(), b"\"a\"\r\n");
    }
}
