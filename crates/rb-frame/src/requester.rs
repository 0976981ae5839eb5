//! Diagnostic frame requests
//!
//! One-shot "give me the current frame" round trips, used to measure
//! boundary latency. Only one request may be outstanding; a request older
//! than the timeout is abandoned by the next one.

use parking_lot::Mutex;
use rb_core::{
    Boundary, BridgeError, Request, RequestId, RequestInFlightError, Response, ScopedTimer,
};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::presenter::{FramePresenter, RenderEvent};

#[derive(Debug, Clone, Copy)]
struct InFlight {
    /// Local sequence number, known before the boundary assigns an id
    ticket: u64,
    id: Option<RequestId>,
    issued: Instant,
}

pub struct FrameRequester {
    presenter: Arc<FramePresenter>,
    boundary: Arc<dyn Boundary>,
    timeout: Duration,
    trace_timing: bool,
    in_flight: Mutex<Option<InFlight>>,
    next_ticket: Mutex<u64>,
    last_round_trip: Mutex<Option<Duration>>,
}

impl FrameRequester {
    pub fn new(
        presenter: Arc<FramePresenter>,
        boundary: Arc<dyn Boundary>,
        timeout: Duration,
        trace_timing: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            presenter,
            boundary,
            timeout,
            trace_timing,
            in_flight: Mutex::new(None),
            next_ticket: Mutex::new(0),
            last_round_trip: Mutex::new(None),
        })
    }

    /// Ask the backend for the current frame.
    ///
    /// The reply is copied and presented like a pushed frame. Fails if a
    /// younger request is still outstanding.
    pub fn request_frame(self: &Arc<Self>) -> Result<RequestId, RequestInFlightError> {
        let _timer = if self.trace_timing {
            ScopedTimer::new(Some("frame request"))
        } else {
            ScopedTimer::silent()
        };

        let (ticket, stale) = {
            let mut in_flight = self.in_flight.lock();
            let mut stale = None;
            if let Some(current) = *in_flight {
                let outstanding = current.issued.elapsed();
                match current.id {
                    Some(id) if outstanding < self.timeout => {
                        return Err(RequestInFlightError {
                            id: Some(id),
                            outstanding,
                        });
                    }
                    Some(id) => {
                        tracing::warn!(%id, ?outstanding, "abandoning unanswered frame request");
                        stale = Some(id);
                    }
                    None => {
                        // Another caller is between reserving and invoking
                        return Err(RequestInFlightError {
                            id: None,
                            outstanding,
                        });
                    }
                }
            }

            let mut next = self.next_ticket.lock();
            *next += 1;
            *in_flight = Some(InFlight {
                ticket: *next,
                id: None,
                issued: Instant::now(),
            });
            (*next, stale)
        };

        if let Some(id) = stale {
            self.boundary.cancel(id);
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let id = self.boundary.invoke(
            Request::CurrentFrame,
            Box::new(move |result| {
                if let Some(requester) = weak.upgrade() {
                    requester.on_reply(ticket, result);
                }
            }),
        );

        if let Some(current) = self.in_flight.lock().as_mut() {
            if current.ticket == ticket {
                current.id = Some(id);
            }
        }
        tracing::debug!(%id, "frame requested");
        Ok(id)
    }

    fn on_reply(&self, ticket: u64, result: Result<Response, BridgeError>) {
        let issued = {
            let mut in_flight = self.in_flight.lock();
            match *in_flight {
                Some(current) if current.ticket == ticket => {
                    *in_flight = None;
                    current.issued
                }
                _ => {
                    tracing::warn!(ticket, "reply for abandoned frame request dropped");
                    return;
                }
            }
        };

        let round_trip = issued.elapsed();
        *self.last_round_trip.lock() = Some(round_trip);
        tracing::info!(round_trip_us = round_trip.as_micros() as u64, "frame round trip");

        match result {
            Ok(Response::Frame(payload)) => {
                // Rejections are logged and counted by the presenter
                let _ = self.presenter.receive(&payload, RenderEvent::Pull);
            }
            Err(err) => tracing::warn!(%err, "frame request failed"),
        }
    }

    /// Abandon the outstanding request, if any
    pub fn cancel(&self) -> bool {
        let Some(current) = self.in_flight.lock().take() else {
            return false;
        };
        if let Some(id) = current.id {
            self.boundary.cancel(id);
            tracing::debug!(%id, "frame request cancelled");
        }
        true
    }

    /// Id of the outstanding request
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.lock().and_then(|current| current.id)
    }

    /// Latency of the last completed round trip
    pub fn last_round_trip(&self) -> Option<Duration> {
        *self.last_round_trip.lock()
    }
}
