/// Crawl state machine
///
/// The crawl loop moves through these phases for every page:
///
/// ```text
/// Resuming -> Fetching -> Persisting -> Evaluating -> Waiting -> Resuming
///     |                                     ^   |
///     +------ (page already saved) ---------+   +--> Done
/// ```
///
/// A cached page goes straight from `Resuming` to `Evaluating` and, if the
/// crawl continues, back to `Resuming` without waiting.
use crate::state::Cursor;
use crate::TimelineError;
use std::fmt;
use std::path::PathBuf;

/// Why a crawl finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The page carried no Bottom cursor
    TimelineExhausted,

    /// Every tweet on the page was created before the cutoff year
    ReachedCutoff { cutoff_year: i32 },

    /// The Bottom cursor pointed back at the page itself
    CursorRepeated,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimelineExhausted => write!(f, "timeline exhausted (no bottom cursor)"),
            Self::ReachedCutoff { cutoff_year } => {
                write!(f, "all tweets are older than {}", cutoff_year)
            }
            Self::CursorRepeated => write!(f, "bottom cursor repeats the current cursor"),
        }
    }
}

/// Outcome of evaluating one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep crawling from this cursor
    Continue(Cursor),

    /// Stop crawling
    Stop(StopReason),
}

/// Phase of the crawl state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Checking whether the current cursor's page is already saved
    Resuming,

    /// Network call in flight
    Fetching,

    /// Writing the fetched page to the store
    Persisting,

    /// Deciding whether to continue
    Evaluating,

    /// Sleeping for the rate limit or politeness interval
    Waiting,

    /// Crawl finished
    Done(StopReason),
}

impl CrawlPhase {
    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Resuming, Self::Fetching)
                | (Self::Resuming, Self::Evaluating)
                | (Self::Fetching, Self::Persisting)
                | (Self::Persisting, Self::Evaluating)
                | (Self::Evaluating, Self::Waiting)
                | (Self::Evaluating, Self::Resuming)
                | (Self::Evaluating, Self::Done(_))
                | (Self::Waiting, Self::Resuming)
        )
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// State owned by the crawl loop and mutated only between phases
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Cursor of the page being processed
    pub cursor: Cursor,

    /// Year before which content is out of range
    pub cutoff_year: i32,

    /// Directory pages are stored in
    pub storage_root: PathBuf,

    phase: CrawlPhase,
    pages_fetched: u32,
    pages_loaded: u32,
}

impl CrawlState {
    /// Creates a state positioned at `cursor`, ready to resume
    pub fn new(cursor: Cursor, cutoff_year: i32, storage_root: PathBuf) -> Self {
        Self {
            cursor,
            cutoff_year,
            storage_root,
            phase: CrawlPhase::Resuming,
            pages_fetched: 0,
            pages_loaded: 0,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }

    /// Returns the stop reason once the crawl is done
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            CrawlPhase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), TimelineError> {
        if !self.phase.can_transition_to(&next) {
            return Err(TimelineError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Resuming -> Evaluating for a page found in the store
    pub fn load_cached(&mut self) -> Result<(), TimelineError> {
        self.transition(CrawlPhase::Evaluating)?;
        self.pages_loaded += 1;
        Ok(())
    }

    /// Resuming -> Fetching
    pub fn begin_fetch(&mut self) -> Result<(), TimelineError> {
        self.transition(CrawlPhase::Fetching)
    }

    /// Fetching -> Persisting, after a successful response
    pub fn fetched(&mut self) -> Result<(), TimelineError> {
        self.transition(CrawlPhase::Persisting)?;
        self.pages_fetched += 1;
        Ok(())
    }

    /// Persisting -> Evaluating
    pub fn persisted(&mut self) -> Result<(), TimelineError> {
        self.transition(CrawlPhase::Evaluating)
    }

    /// Applies a page verdict from the Evaluating phase
    ///
    /// Continuing from a cached page goes straight back to `Resuming`; a
    /// freshly fetched page has to wait first.
    pub fn advance(&mut self, verdict: Verdict, from_cache: bool) -> Result<(), TimelineError> {
        match verdict {
            Verdict::Stop(reason) => self.transition(CrawlPhase::Done(reason)),
            Verdict::Continue(next) => {
                let phase = if from_cache {
                    CrawlPhase::Resuming
                } else {
                    CrawlPhase::Waiting
                };
                self.transition(phase)?;
                self.cursor = next;
                Ok(())
            }
        }
    }

    /// Waiting -> Resuming
    pub fn waited(&mut self) -> Result<(), TimelineError> {
        self.transition(CrawlPhase::Resuming)
    }
}
