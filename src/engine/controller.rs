//! Engine controller (`spec.md` §6.1's `position`/`go`/`stop`/`isready`
//! lifecycle): owns the current position, the network and the search
//! state that must outlive any one `go`, and spawns the search thread.
//!
//! There is no separate hard-stop timer thread here: `NodeBudget`
//! already checks its deadline every `QUOTA_REFILL` nodes, which is
//! frequent enough in practice that a dedicated poller buys nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::nnue::network::Network;
use crate::position::{parse_fen, Position};
use crate::search::{search_root, SearchLimits, SearchReport, SearchState, TimeControl};
use crate::types::Move;

const SEARCH_STACK_SIZE: usize = 16 * 1024 * 1024;
const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub type InfoCallback = Arc<dyn Fn(&SearchReport) + Send + Sync>;

/// What a finished `go` produced.
pub struct SearchResult {
    pub best_move: Option<Move>,
}

/// An in-flight `go`. Dropping this without calling [`Self::stop_and_wait`]
/// or [`Self::signal_stop`] leaves the search thread running to whatever
/// deadline it was given.
pub struct SearchJob {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SearchJob {
    pub fn stop_and_wait(self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.handle.join();
    }

    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Parameters for one `go` (`spec.md` §6.1's `go` sub-tokens, already
/// resolved into a [`TimeControl`] by the front end).
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchParams {
    pub max_depth: Option<i32>,
    pub nodes_limit: u64,
    pub move_overhead_ms: u64,
    pub time_control: TimeControl,
}

impl SearchParams {
    fn into_limits(self) -> SearchLimits {
        let mut limits = SearchLimits { time_control: self.time_control, ..SearchLimits::default() };
        if let Some(depth) = self.max_depth {
            limits.max_depth = depth;
        }
        limits.nodes_limit = self.nodes_limit;
        if self.move_overhead_ms > 0 {
            limits.move_overhead_ms = self.move_overhead_ms;
        }
        limits
    }
}

/// Holds a finished search's result back from `on_complete` while
/// `spec.md` §5's `shouldDelayBestmove` flag is set, so `ponderhit`/
/// `stop` can release it whichever arrives: after the search has
/// already finished, or before it has.
#[derive(Default)]
struct DelayedBestmove {
    callback: Option<Box<dyn FnOnce(SearchResult) + Send>>,
    result: Option<SearchResult>,
    released: bool,
}

/// Owns the mutable engine state across the lifetime of one UCI session.
pub struct EngineController {
    pos: Position,
    net: Arc<Network>,
    state: Arc<Mutex<SearchState>>,
    current_job: Option<SearchJob>,
    info_callback: Option<InfoCallback>,
    delayed: Arc<Mutex<DelayedBestmove>>,
}

impl EngineController {
    pub fn new(tt_mb: usize, net: Network) -> Self {
        let net = Arc::new(net);
        let pos = parse_fen(STARTPOS_FEN, &net).expect("startpos FEN is well-formed");
        EngineController {
            pos,
            net,
            state: Arc::new(Mutex::new(SearchState::new(tt_mb))),
            current_job: None,
            info_callback: None,
            delayed: Arc::new(Mutex::new(DelayedBestmove::default())),
        }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Replace the current position. Stops any in-flight search first,
    /// since it was searching the old one.
    pub fn set_position(&mut self, pos: Position) {
        self.stop_search();
        self.pos = pos;
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.net
    }

    /// `ucinewgame` (`spec.md` §6.1): forget history/TT, nothing else.
    pub fn new_game(&mut self) {
        self.stop_search();
        self.with_search_state(|state| state.clear_for_new_game());
    }

    /// Stop any active search and wait for its thread to finish.
    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Signal stop to an active search without blocking for it to exit.
    pub fn signal_stop(&mut self) {
        if let Some(job) = &self.current_job {
            job.signal_stop();
        }
    }

    pub fn is_searching(&self) -> bool {
        self.current_job.is_some()
    }

    pub fn set_info_callback(&mut self, cb: Option<InfoCallback>) {
        self.info_callback = cb;
    }

    pub fn resize_hash(&mut self, mb: usize) {
        self.stop_search();
        self.with_search_state(|state| state.resize_hash(mb));
    }

    /// Execute a closure with mutable access to the search state.
    pub fn with_search_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SearchState) -> R,
    {
        f(&mut self.state.lock())
    }

    /// Start a search from the current position. `on_complete` runs once
    /// the search returns or is stopped; if `delay_bestmove` is set
    /// (ponder/infinite), it's held back until [`Self::release_delayed_bestmove`]
    /// is called instead of running as soon as the search thread finishes.
    pub fn start_search<F>(&mut self, params: SearchParams, delay_bestmove: bool, on_complete: F)
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.stop_search();

        self.with_search_state(|state| state.new_search());

        *self.delayed.lock() = DelayedBestmove {
            callback: Some(Box::new(on_complete)),
            result: None,
            released: !delay_bestmove,
        };

        let limits = params.into_limits();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let pos = self.pos.clone();
        let net = Arc::clone(&self.net);
        let state = Arc::clone(&self.state);
        let info_callback = self.info_callback.clone();
        let delayed = Arc::clone(&self.delayed);

        let handle = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let mut guard = state.lock();
                let best_move = search_root(&pos, &net, &mut guard, limits, stop_clone, |report| {
                    if let Some(cb) = &info_callback {
                        cb(report);
                    }
                });
                drop(guard);

                let mut d = delayed.lock();
                if d.released {
                    if let Some(cb) = d.callback.take() {
                        cb(SearchResult { best_move });
                    }
                } else {
                    d.result = Some(SearchResult { best_move });
                }
            })
            .expect("failed to spawn search thread");

        self.current_job = Some(SearchJob { stop, handle });
    }

    /// `stop`/`ponderhit` (`spec.md` §5/§6.1): release a bestmove that
    /// was held back by `delay_bestmove`. A no-op if nothing is delayed.
    pub fn release_delayed_bestmove(&self) {
        let mut d = self.delayed.lock();
        d.released = true;
        if let Some(result) = d.result.take() {
            if let Some(cb) = d.callback.take() {
                cb(result);
            }
        }
    }
}
