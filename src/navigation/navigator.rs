use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{
    Failure, Geocoder, Job, Lookup, MapProjection, Outcome, RetryPolicy, RouteFetcher, Session,
    Snapshot, Step,
};
use crate::{
    config::Settings,
    entities::{Coordinate, Waypoint},
    error::{unexpected_error, Error},
    external::DynProvider,
};

type Reply = oneshot::Sender<Result<Snapshot, Error>>;

enum Command {
    Start(Reply),
    Advance(Reply),
    Retry(Reply),
    Reset(Reply),
    UpdateLocation(Coordinate, Reply),
}

/// Handle to a running navigation session.
///
/// Every operation is queued to a single task that owns the [`Session`], so
/// operations never interleave. Clones share the session, which stops once
/// the last handle is dropped.
#[derive(Clone)]
pub struct Navigator {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Snapshot>,
}

impl Navigator {
    /// Starts the session task for `itinerary`. Must be called from within a
    /// tokio runtime.
    ///
    /// A projection is sent on `projections` for every state the session
    /// enters, in order. Sends never wait, so the channel should be
    /// unbounded.
    pub fn spawn(
        itinerary: Vec<Waypoint>,
        provider: DynProvider,
        settings: &Settings,
        projections: async_channel::Sender<MapProjection>,
    ) -> Result<Self, Error> {
        let session = Session::new(itinerary, settings.arrival_radius_meters)?;
        let retry = RetryPolicy::from_settings(settings);

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (outcomes, outcome_rx) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(session.snapshot());

        let span = tracing::info_span!("navigator", waypoints = session.itinerary().len());

        let actor = Actor {
            session,
            geocoder: Geocoder::new(provider.clone(), settings.city.clone(), retry),
            // A fresh fetcher, and with it a fresh segment cache, per session.
            fetcher: RouteFetcher::new(provider, retry),
            in_flight: None,
            outcomes,
            state,
            projections,
        };

        tokio::spawn(actor.run(command_rx, outcome_rx).instrument(span));

        Ok(Self {
            commands,
            state: state_rx,
        })
    }

    pub async fn start(&self) -> Result<Snapshot, Error> {
        self.send(Command::Start).await
    }

    pub async fn advance(&self) -> Result<Snapshot, Error> {
        self.send(Command::Advance).await
    }

    pub async fn retry(&self) -> Result<Snapshot, Error> {
        self.send(Command::Retry).await
    }

    pub async fn reset(&self) -> Result<Snapshot, Error> {
        self.send(Command::Reset).await
    }

    pub async fn update_location(&self, location: Coordinate) -> Result<Snapshot, Error> {
        self.send(|reply| Command::UpdateLocation(location, reply))
            .await
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// A receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Waits until no job is in flight and returns the state at that point.
    pub async fn settled(&self) -> Result<Snapshot, Error> {
        let mut state = self.subscribe();
        let snapshot = state
            .wait_for(|snapshot| !snapshot.status.is_pending())
            .await
            .map_err(|_| unexpected_error())?;

        Ok(snapshot.clone())
    }

    async fn send(&self, command: impl FnOnce(Reply) -> Command) -> Result<Snapshot, Error> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(command(reply))
            .map_err(|_| unexpected_error())?;

        response.await.map_err(|_| unexpected_error())?
    }
}

struct Actor {
    session: Session,
    geocoder: Geocoder,
    fetcher: RouteFetcher,
    in_flight: Option<CancellationToken>,
    outcomes: mpsc::UnboundedSender<(u64, Outcome)>,
    state: watch::Sender<Snapshot>,
    projections: async_channel::Sender<MapProjection>,
}

impl Actor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut outcomes: mpsc::UnboundedReceiver<(u64, Outcome)>,
    ) {
        loop {
            tokio::select! {
                Some((op, outcome)) = outcomes.recv() => {
                    let step = self.session.apply(op, outcome);
                    self.follow(step);
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        self.cancel_in_flight();
        tracing::debug!("navigation session closed");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.session.start();
                self.respond(result, reply);
            }
            Command::Advance(reply) => {
                let result = self.session.advance();
                self.respond(result, reply);
            }
            Command::Retry(reply) => {
                let result = self.session.retry();
                self.respond(result, reply);
            }
            Command::Reset(reply) => {
                self.cancel_in_flight();
                let step = self.session.reset();
                self.respond(Ok(step), reply);
            }
            Command::UpdateLocation(location, reply) => {
                if self.session.update_location(location) {
                    tracing::info!(segment = ?self.session.current_segment(), "arrived at segment destination");
                }

                let snapshot = self.session.snapshot();
                self.state.send_replace(snapshot.clone());
                let _ = reply.send(Ok(snapshot));
            }
        }
    }

    fn respond(&mut self, result: Result<Step, Error>, reply: Reply) {
        let result = result.map(|step| {
            if step == Step::Ignored {
                tracing::debug!(status = %self.session.status().name(), "command coalesced");
            }
            self.follow(step);
            self.session.snapshot()
        });

        let _ = reply.send(result);
    }

    fn follow(&mut self, step: Step) {
        if let Step::Moved(job) = step {
            self.publish();

            if let Some(job) = job {
                self.dispatch(job);
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();

        tracing::info!(
            status = %snapshot.status.name(),
            segment = ?snapshot.current_segment,
            "navigation state changed"
        );

        if self.projections.try_send(snapshot.projection()).is_err() {
            tracing::debug!("map adapter is not listening");
        }

        self.state.send_replace(snapshot);
    }

    fn dispatch(&mut self, job: Job) {
        let token = CancellationToken::new();
        if let Some(previous) = self.in_flight.replace(token.clone()) {
            previous.cancel();
        }

        let geocoder = self.geocoder.clone();
        let fetcher = self.fetcher.clone();
        let outcomes = self.outcomes.clone();

        tokio::spawn(
            async move {
                let op = job.op();

                tokio::select! {
                    _ = token.cancelled() => tracing::debug!(op, "job cancelled"),
                    outcome = perform(&geocoder, &fetcher, job) => {
                        let _ = outcomes.send((op, outcome));
                    }
                }
            }
            .in_current_span(),
        );
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

async fn perform(geocoder: &Geocoder, fetcher: &RouteFetcher, job: Job) -> Outcome {
    match job {
        Job::Resolve {
            origin,
            destination,
            ..
        } => {
            let (origin, destination) =
                futures::join!(resolve(geocoder, origin), resolve(geocoder, destination));

            Outcome::Resolved {
                origin,
                destination,
            }
        }
        Job::Fetch {
            origin,
            destination,
            ..
        } => Outcome::Fetched(fetcher.fetch_leg(origin, destination).await),
    }
}

async fn resolve(geocoder: &Geocoder, lookup: Lookup) -> Result<Coordinate, Failure> {
    match lookup {
        Lookup::Known(coordinate) => Ok(coordinate),
        Lookup::Query(waypoint) => geocoder.resolve(&waypoint).await,
    }
}
