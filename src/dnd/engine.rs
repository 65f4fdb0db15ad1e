use crate::{
    config::EngineConfig,
    dnd::{
        activation::{ActivationTracker, Sensor},
        collision::{self, CollisionArgs, DropTarget},
        geometry::Point,
        mutator,
        reconcile::{DropOutcome, Reconciler},
        session::{DragGeometry, DragItem, DragPhase, DragSession},
    },
    domain::{Board, BoardId},
    error::{BoardError, Result},
    notify::Notification,
    remote::RemoteBoardService,
};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Drag-and-drop controller for the board currently being viewed.
///
/// Owns the order model for the lifetime of the view. The UI layer feeds it
/// drag start/over/end events; every event replaces the board snapshot rather
/// than editing it in place, so renderers can hold on to the previous one.
///
/// `on_drag_end` holds `&mut self` across the network round trip, and a new
/// drag cannot start until the engine is back to [`DragPhase::Idle`]. The
/// engine returns to Idle even when that call is abandoned midway.
pub struct DragEngine<R> {
    remote: R,
    config: EngineConfig,
    board: Option<Board>,
    session: Option<DragSession>,
    phase: DragPhase,
    notifications: VecDeque<Notification>,
}

impl<R> DragEngine<R>
where
    R: RemoteBoardService,
{
    pub fn new(remote: R, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            remote,
            config,
            board: None,
            session: None,
            phase: DragPhase::Idle,
            notifications: VecDeque::new(),
        })
    }

    pub fn with_defaults(remote: R) -> Self {
        Self {
            remote,
            config: EngineConfig::default(),
            board: None,
            session: None,
            phase: DragPhase::Idle,
            notifications: VecDeque::new(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Drains queued notifications, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.phase != DragPhase::Idle || self.session.is_some() {
            return Err(BoardError::DragInProgress);
        }
        Ok(())
    }

    /// Replaces the order model with the read model of `board_id`
    pub async fn load_board(&mut self, board_id: &BoardId) -> Result<&Board> {
        self.ensure_idle()?;
        let board = self.remote.load_board(board_id).await?.normalized();
        info!(board = %board.id, lists = board.lists.len(), "board loaded");
        Ok(self.board.insert(board))
    }

    /// Installs a board snapshot the host already holds
    pub fn set_board(&mut self, board: Board) -> Result<()> {
        self.ensure_idle()?;
        self.board = Some(board.normalized());
        Ok(())
    }

    /// Discards the order model along with any drag in progress
    pub fn close_board(&mut self) {
        self.session = None;
        self.phase = DragPhase::Idle;
        self.board = None;
    }

    /// Gesture tracker configured from the engine's activation thresholds
    pub fn activation_tracker(&self, sensor: Sensor, origin: Point) -> ActivationTracker {
        ActivationTracker::new(sensor, origin, self.config.activation.clone())
    }

    /// Collision detection for the active drag, against the live board
    pub fn detect_collision(&self, args: &CollisionArgs<'_>) -> Option<DropTarget> {
        let board = self.board.as_ref()?;
        let session = self.session.as_ref()?;
        collision::resolve(board, session.kind(), args)
    }

    pub fn on_drag_start(&mut self, item: DragItem) -> Result<()> {
        self.ensure_idle()?;
        let board = self.board.as_ref().ok_or(BoardError::BoardNotLoaded)?;
        let session = DragSession::start(board, item, &self.config)?;

        debug!(active = session.active_id(), kind = ?session.kind(), "drag started");
        self.session = Some(session);
        self.phase = DragPhase::Dragging;
        Ok(())
    }

    /// Applies the speculative update for one move event. Events that do not
    /// belong to the current drag (e.g. arriving after it ended) are ignored.
    pub fn on_drag_over(&mut self, active_id: &str, over: Option<&DropTarget>, geometry: &DragGeometry) {
        let (Some(session), Some(board)) = (self.session.as_ref(), self.board.as_ref()) else {
            return;
        };
        if self.phase != DragPhase::Dragging || !session.is_active(active_id) {
            return;
        }

        if let Some(next) = mutator::apply_drag_over(board, session, over, geometry) {
            self.board = Some(next);
        }
    }

    /// Ends the current drag and reconciles with the order-of-record.
    ///
    /// The optimistic board stays installed while the remote call is in
    /// flight. If the returned future is dropped before it completes, the
    /// engine is left Idle showing that optimistic board.
    pub async fn on_drag_end(&mut self, active_id: &str, over: Option<&DropTarget>) -> DropOutcome {
        match &self.session {
            Some(session) if session.is_active(active_id) => {}
            _ => return DropOutcome::Ignored,
        }
        let Some(session) = self.session.take() else {
            return DropOutcome::Ignored;
        };
        let Some(board) = self.board.clone() else {
            self.phase = DragPhase::Idle;
            return DropOutcome::Ignored;
        };

        self.phase = if over.is_some() {
            DragPhase::Committing
        } else {
            DragPhase::RollingBack
        };
        let guard = IdleOnDrop(&mut self.phase);

        let settlement = Reconciler::new(&self.remote, &self.config)
            .settle(session, board, over)
            .await;
        drop(guard);

        self.board = Some(settlement.board);
        if let Some(notification) = settlement.notification {
            self.notifications.push_back(notification);
        }
        settlement.outcome
    }

    /// Aborts the current drag, restoring the drag-start state
    pub fn on_drag_cancel(&mut self) {
        if let Some(session) = self.session.take() {
            self.phase = DragPhase::RollingBack;
            debug!(active = session.active_id(), "drag cancelled");
            self.board = Some(session.into_snapshot());
        }
        self.phase = DragPhase::Idle;
    }
}

/// Returns the engine to Idle when reconciliation finishes or is abandoned
struct IdleOnDrop<'a>(&'a mut DragPhase);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = DragPhase::Idle;
    }
}
