//! Test-only `Provider` that records every call it receives.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{LatLngBounds, MapElement, Point, Provider};

/// One call observed by [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    /// `initialize` with the element identifier.
    Initialize(String),
    /// `draw_points` with the number of points offered and drawn.
    Draw {
        /// Points passed in.
        offered: usize,
        /// Points that passed validity filtering.
        drawn: usize,
        /// Bounds of the drawn points.
        bounds: LatLngBounds,
    },
}

/// Shared call log, readable after the provider has been boxed.
pub type CallLog = Rc<RefCell<Vec<ProviderCall>>>;

/// `Provider` that keeps a log of calls instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingProvider {
    log: CallLog,
}

impl RecordingProvider {
    /// Create a provider and return a handle to its call log.
    pub fn new() -> (Self, CallLog) {
        let provider = Self::default();
        let log = Rc::clone(&provider.log);
        (provider, log)
    }
}

impl Provider for RecordingProvider {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn initialize(&mut self, element: &MapElement) {
        self.log
            .borrow_mut()
            .push(ProviderCall::Initialize(element.id().to_owned()));
    }

    fn draw_points(&mut self, points: &[Point]) {
        let bounds: LatLngBounds = points.iter().filter_map(Point::location).collect();
        let drawn = points.iter().filter(|point| point.is_valid()).count();
        self.log.borrow_mut().push(ProviderCall::Draw {
            offered: points.len(),
            drawn,
            bounds,
        });
    }
}
