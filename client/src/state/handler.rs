use crate::app::AccessKey;
use crate::config::HandlerConfig;
use crate::error::MeshError;
use crate::model::Message;
use crate::pdu::access::AccessMessage;
use crate::registry::{MeshMessage, Registry};
use crate::state::deadline::Deadline;
use crate::state::{MessageState, Phase, Target};
use crate::transport::{MeshTransport, Submission, Token, TransportError};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use futures::future::{select, Either};
use futures::pin_mut;
use std::collections::VecDeque;

/// Results of outstanding exchanges, delivered at most once per token.
pub trait MessageCallbacks {
    /// A reply matched the exchange and decoded. The status it carries may
    /// still report a failure.
    fn on_status(&mut self, token: Token, status: MeshMessage);

    /// The retry budget ran out without a reply.
    fn on_timeout(&mut self, token: Token);

    fn on_error(&mut self, token: Token, error: MeshError);

    /// A decodable message no exchange was waiting for.
    fn on_unsolicited(&mut self, _message: &AccessMessage, _decoded: MeshMessage) {}

    fn on_unknown_opcode(&mut self, _message: &AccessMessage) {}
}

/// Inputs the async driver serializes onto the handler.
#[derive(Clone, Debug)]
pub enum Event {
    Access(AccessMessage),
    TransportReady,
    TransportFailure(Token, TransportError),
    Cancel(Token),
}

pub type Inbox<const N: usize = 8> = Channel<NoopRawMutex, Event, N>;

/// Registry of outstanding exchanges, oldest first.
pub struct MessageHandler<T, C>
where
    T: MeshTransport,
    C: MessageCallbacks,
{
    transport: T,
    callbacks: C,
    registry: Registry,
    config: HandlerConfig,
    states: Vec<MessageState<T::Message>>,
    pending: VecDeque<Token>,
    next_token: u32,
}

impl<T, C> MessageHandler<T, C>
where
    T: MeshTransport,
    C: MessageCallbacks,
{
    pub fn new(transport: T, callbacks: C, config: HandlerConfig) -> Self {
        Self::with_registry(transport, callbacks, config, Registry::default())
    }

    pub fn with_registry(
        transport: T,
        callbacks: C,
        config: HandlerConfig,
        registry: Registry,
    ) -> Self {
        Self {
            transport,
            callbacks,
            registry,
            config,
            states: Vec::new(),
            pending: VecDeque::new(),
            next_token: 0,
        }
    }

    /// Build and submit a request.
    ///
    /// Construction errors and a full pending queue are reported here;
    /// everything after acceptance goes through the callbacks.
    pub fn send<M>(
        &mut self,
        target: Target,
        message: &M,
        key: &AccessKey,
        now: Instant,
    ) -> Result<Token, MeshError>
    where
        M: Message + Clone + Into<MeshMessage>,
    {
        let token = Token::new(self.next_token);
        let mut target = target;
        if target.ttl.is_none() {
            target.ttl = self.config.default_ttl;
        }
        let mut state = MessageState::new(
            token,
            &target,
            message,
            key,
            self.config.retry_count,
            &self.registry,
            &mut self.transport,
        )?;
        self.next_token = self.next_token.wrapping_add(1);

        if !self.pending.is_empty() {
            // keep submission order behind whatever is already waiting
            return self.enqueue(state);
        }

        match state.submit(&mut self.transport, self.config.ack_timeout(), now)? {
            Submission::Accepted => {
                debug!("{} {} in flight to {}", token, state.opcode(), state.dst());
                if state.is_acknowledged() {
                    self.states.push(state);
                }
                Ok(token)
            }
            Submission::Congested => self.enqueue(state),
        }
    }

    fn enqueue(&mut self, state: MessageState<T::Message>) -> Result<Token, MeshError> {
        if self.pending.len() >= self.config.queue_depth {
            warn!("pending queue full, rejecting {}", state.token());
            return Err(MeshError::Congested);
        }
        let token = state.token();
        trace!("{} queued behind {} pending", token, self.pending.len());
        self.pending.push_back(token);
        self.states.push(state);
        Ok(token)
    }

    /// Feed a decrypted access message from the network.
    ///
    /// Returns the token of the exchange it completed, if any.
    pub fn on_access_message(
        &mut self,
        message: &AccessMessage,
    ) -> Result<Option<Token>, MeshError> {
        let decoded = match self.registry.decode_access(message) {
            Err(MeshError::UnknownOpcode(opcode)) => {
                debug!("unknown opcode {} from {}", opcode, message.src.value());
                self.callbacks.on_unknown_opcode(message);
                return Err(MeshError::UnknownOpcode(opcode));
            }
            decoded => decoded,
        };

        let matched = self.states.iter().position(|state| state.correlates(message));
        match (matched, decoded) {
            (Some(index), Ok(status)) => {
                let mut state = self.states.remove(index);
                state.set_phase(Phase::Acked);
                debug!("{} acked: {:?}", state.token(), status);
                self.callbacks.on_status(state.token(), status);
                Ok(Some(state.token()))
            }
            (Some(index), Err(err)) => {
                let mut state = self.states.remove(index);
                state.set_phase(Phase::Failed);
                warn!("{} failed: {}", state.token(), err);
                self.callbacks.on_error(state.token(), err);
                Ok(Some(state.token()))
            }
            (None, Ok(decoded)) => {
                trace!("unsolicited {:?}", decoded);
                self.callbacks.on_unsolicited(message, decoded);
                Ok(None)
            }
            (None, Err(err)) => {
                warn!(
                    "dropping {} from {:?}: {}",
                    message.opcode(),
                    message.src,
                    err
                );
                Err(err)
            }
        }
    }

    /// Retransmit or time out every exchange whose deadline passed, then
    /// retry the pending queue.
    pub fn poll(&mut self, now: Instant) {
        let timeout = self.config.ack_timeout();
        let mut index = 0;
        while index < self.states.len() {
            if !self.states[index].is_expired(now) {
                index += 1;
                continue;
            }
            let state = &mut self.states[index];
            if state.retries_remaining() == 0 {
                let mut state = self.states.remove(index);
                state.set_phase(Phase::TimedOut);
                debug!("{} timed out", state.token());
                self.callbacks.on_timeout(state.token());
                continue;
            }
            match state.retransmit(&mut self.transport, timeout, now) {
                Ok(submission) => {
                    trace!(
                        "{} retransmitted ({:?}), {} retries left",
                        state.token(),
                        submission,
                        state.retries_remaining()
                    );
                    index += 1;
                }
                Err(cause) => self.fail(index, cause),
            }
        }
        self.drain_pending(now);
    }

    /// The transport can take messages again.
    pub fn on_transport_ready(&mut self, now: Instant) {
        self.drain_pending(now);
    }

    pub fn on_transport_failure(&mut self, token: Token, cause: TransportError) {
        if let Some(index) = self.index_of(token) {
            self.fail(index, cause);
        }
    }

    fn fail(&mut self, index: usize, cause: TransportError) {
        let mut state = self.states.remove(index);
        self.pending.retain(|pending| *pending != state.token());
        state.set_phase(Phase::Failed);
        warn!("{} transport failed: {}", state.token(), cause);
        self.callbacks
            .on_error(state.token(), MeshError::TransportFailed(cause));
    }

    fn drain_pending(&mut self, now: Instant) {
        let timeout = self.config.ack_timeout();
        while let Some(token) = self.pending.front().copied() {
            let index = match self.index_of(token) {
                Some(index) => index,
                None => {
                    self.pending.pop_front();
                    continue;
                }
            };
            match self.states[index].submit(&mut self.transport, timeout, now) {
                Ok(Submission::Accepted) => {
                    self.pending.pop_front();
                    debug!("{} in flight after queueing", token);
                    if !self.states[index].is_acknowledged() {
                        self.states.remove(index);
                    }
                }
                Ok(Submission::Congested) => break,
                Err(cause) => self.fail(index, cause),
            }
        }
    }

    fn index_of(&self, token: Token) -> Option<usize> {
        self.states.iter().position(|state| state.token() == token)
    }

    /// Drop an exchange without any callback. Returns whether it was live.
    pub fn cancel(&mut self, token: Token) -> bool {
        match self.index_of(token) {
            Some(index) => {
                let mut state = self.states.remove(index);
                self.pending.retain(|pending| *pending != token);
                state.set_phase(Phase::Cancelled);
                debug!("{} cancelled", token);
                true
            }
            None => false,
        }
    }

    /// Cancel every exchange addressed to `dst`, e.g. when a node is removed.
    pub fn cancel_destination(&mut self, dst: u16) -> usize {
        let tokens: Vec<Token> = self
            .states
            .iter()
            .filter(|state| state.dst().value() == dst)
            .map(MessageState::token)
            .collect();
        tokens.into_iter().filter(|token| self.cancel(*token)).count()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.states.len();
        self.states.clear();
        self.pending.clear();
        if cancelled > 0 {
            debug!("cancelled {} exchanges", cancelled);
        }
        cancelled
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline().earliest()
    }

    fn deadline(&self) -> Deadline {
        self.states.iter().map(MessageState::deadline).collect()
    }

    /// Phase of a live exchange. Released exchanges are unknown.
    pub fn phase(&self, token: Token) -> Option<Phase> {
        self.index_of(token).map(|index| self.states[index].phase())
    }

    pub fn state(&self, token: Token) -> Option<&MessageState<T::Message>> {
        self.index_of(token).map(|index| &self.states[index])
    }

    /// Live exchanges, queued ones included.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    fn handle(&mut self, event: Event, now: Instant) {
        match event {
            Event::Access(message) => {
                // failures already reached the callbacks or the log
                let _ = self.on_access_message(&message);
            }
            Event::TransportReady => self.on_transport_ready(now),
            Event::TransportFailure(token, cause) => self.on_transport_failure(token, cause),
            Event::Cancel(token) => {
                self.cancel(token);
            }
        }
    }

    /// Drive every outstanding exchange to a terminal phase, taking events
    /// from `inbox` and waking for deadlines in between.
    pub async fn settle<const N: usize>(&mut self, inbox: &Inbox<N>) {
        while !self.is_empty() {
            let event = {
                let deadline = self.deadline();
                let expired = deadline.expired();
                let received = inbox.recv();
                pin_mut!(expired);
                pin_mut!(received);
                match select(received, expired).await {
                    Either::Left((event, _)) => Some(event),
                    Either::Right(_) => None,
                }
            };
            let now = Instant::now();
            match event {
                Some(event) => self.handle(event, now),
                None => self.poll(now),
            }
        }
    }
}
