//! Task phase executor.
//!
//! Drives one assigned task through the fixed pipeline
//! Analysis → Planning → Implementation → Completion, calling the reasoning
//! gateway at each phase, reporting fractional progress to the coordination
//! server, and narrating interim results on the broadcast channel.
//!
//! One task at a time: an assignment arriving while another task is
//! in-flight is rejected, and task ids that already reached a terminal
//! state are never re-entered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::broadcast::BroadcastChannel;
use crate::application::gateway::RateLimitedGateway;
use crate::application::session::EventSender;
use crate::domain::models::{
    truncate_with_ellipsis, AgentIdentity, OutboundEvent, ProgressUpdate, Task, TaskAssignment,
    TaskOutcome, TaskPhase,
};

/// Tracks which task is running and which ids are already settled.
#[derive(Default)]
struct ExecutorState {
    in_flight: Option<String>,
    finished: HashSet<String>,
}

/// State machine driving one task at a time through the phase pipeline.
pub struct TaskPhaseExecutor {
    identity: Arc<AgentIdentity>,
    gateway: Arc<RateLimitedGateway>,
    broadcast: Arc<BroadcastChannel>,
    events: EventSender,
    /// Pacing between phases; zero in tests
    phase_delay: Duration,
    stop: CancellationToken,
    state: Mutex<ExecutorState>,
    tasks_completed: AtomicU64,
}

impl TaskPhaseExecutor {
    pub fn new(
        identity: Arc<AgentIdentity>,
        gateway: Arc<RateLimitedGateway>,
        broadcast: Arc<BroadcastChannel>,
        events: EventSender,
        phase_delay: Duration,
        stop: CancellationToken,
    ) -> Self {
        Self {
            identity,
            gateway,
            broadcast,
            events,
            phase_delay,
            stop,
            state: Mutex::new(ExecutorState::default()),
            tasks_completed: AtomicU64::new(0),
        }
    }

    /// Tasks completed over the lifetime of this process.
    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    /// React to a `task_assigned` event.
    ///
    /// Assignments addressed to other agents produce no observable side
    /// effects at all. Duplicate and overlapping assignments are dropped
    /// before any state is created for them.
    pub async fn handle_assignment(&self, assignment: TaskAssignment) -> Option<TaskOutcome> {
        if assignment.agent_id != self.identity.agent_id {
            return None;
        }

        let task = Task::from(assignment);
        {
            let mut state = self.state.lock().await;
            if state.finished.contains(&task.id) {
                debug!(task_id = %task.id, "task already settled, dropping re-assignment");
                return None;
            }
            if let Some(current) = &state.in_flight {
                warn!(
                    task_id = %task.id,
                    in_flight = %current,
                    "rejecting assignment while another task is in flight"
                );
                return None;
            }
            state.in_flight = Some(task.id.clone());
        }

        let outcome = match self.execute_phases(&task).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report_failure(&task, &err);
                TaskOutcome::Failed
            }
        };

        let mut state = self.state.lock().await;
        state.in_flight = None;
        state.finished.insert(task.id);
        Some(outcome)
    }

    /// Run the four phases in order.
    ///
    /// The stop flag is checked between phases: an in-flight phase always
    /// finishes, but no new phase starts once stop is observed.
    async fn execute_phases(&self, task: &Task) -> Result<TaskOutcome> {
        if task.description.trim().is_empty() {
            bail!("task {} has an empty description", task.id);
        }

        info!(
            task_id = %task.id,
            "{} {} assigned task: {}",
            self.identity.emblem,
            self.identity.display_name,
            task.description
        );
        self.broadcast
            .publish(&format!("Starting work on: {}", task.description));

        let analysis = self.run_phase(task, TaskPhase::Analysis).await;
        self.broadcast
            .publish(&format!("Analysis complete: {analysis}"));
        self.emit_progress(task, TaskPhase::Analysis);

        if !self.pace().await {
            return Ok(TaskOutcome::Abandoned);
        }
        let plan = self.run_phase(task, TaskPhase::Planning).await;
        self.broadcast.publish(&format!("Work plan ready: {plan}"));
        self.emit_progress(task, TaskPhase::Planning);

        if !self.pace().await {
            return Ok(TaskOutcome::Abandoned);
        }
        let implementation = self.run_phase(task, TaskPhase::Implementation).await;
        self.broadcast
            .publish(&format!("Implementation update: {implementation}"));
        self.emit_progress(task, TaskPhase::Implementation);

        if !self.pace().await {
            return Ok(TaskOutcome::Abandoned);
        }
        let summary = self.run_phase(task, TaskPhase::Completion).await;
        self.emit_progress(task, TaskPhase::Completion);

        let total = self.tasks_completed.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            task_id = %task.id,
            tasks_completed = total,
            "{} completed task: {summary}",
            self.identity.display_name
        );
        self.broadcast.publish(&format!("Task completed! {summary}"));

        Ok(TaskOutcome::Completed)
    }

    /// One gateway call for one phase. Total: the gateway absorbs all
    /// reasoning-service failures into fallback text.
    async fn run_phase(&self, task: &Task, phase: TaskPhase) -> String {
        debug!(task_id = %task.id, phase = phase.label(), "entering phase");
        let prompt = phase.prompt(&task.description, self.identity.primary_capability());
        self.gateway.complete(&prompt, phase.max_tokens()).await
    }

    /// Fire-and-forget progress notification for a finished phase.
    fn emit_progress(&self, task: &Task, phase: TaskPhase) {
        self.events
            .emit(OutboundEvent::UpdateTaskProgress(ProgressUpdate {
                task_id: task.id.clone(),
                progress: phase.progress_percent(),
                agent_id: self.identity.agent_id.clone(),
                status: phase.status_line().to_string(),
            }));
    }

    /// Inter-phase pacing. Returns false when stop was observed, in which
    /// case the pipeline must not enter another phase.
    async fn pace(&self) -> bool {
        if self.stop.is_cancelled() {
            info!("stop observed between phases, abandoning pipeline");
            return false;
        }
        if !self.phase_delay.is_zero() {
            sleep(self.phase_delay).await;
        }
        true
    }

    /// Report a failed pipeline: one progress-0 update plus one best-effort
    /// broadcast. Neither path re-raises.
    fn report_failure(&self, task: &Task, err: &anyhow::Error) {
        let detail = err.to_string();
        warn!(task_id = %task.id, "task failed: {}", truncate_with_ellipsis(&detail, 50));

        self.broadcast
            .publish(&format!("Task failed: {}", truncate_with_ellipsis(&detail, 120)));
        self.events
            .emit(OutboundEvent::UpdateTaskProgress(ProgressUpdate {
                task_id: task.id.clone(),
                progress: 0,
                agent_id: self.identity.agent_id.clone(),
                status: format!("Task failed: {}", truncate_with_ellipsis(&detail, 30)),
            }));
    }
}
