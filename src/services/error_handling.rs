use anyhow::{Context, Result};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::ids::TaskId;
use crate::services::mutation::{Mutation, MutationKind};

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Task not found: {id}")]
    TaskNotFound { id: TaskId },

    #[error("Malformed task document{}: {reason}", describe_id(.id))]
    MalformedTask { id: Option<TaskId>, reason: String },

    #[error("Backend request failed: {operation}")]
    Backend { operation: String, source: anyhow::Error },

    #[error("Backend returned {status} for {operation}")]
    UnexpectedStatus { operation: String, status: u16 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn describe_id(id: &Option<TaskId>) -> String {
    id.as_ref().map(|i| format!(" {}", i)).unwrap_or_default()
}

/// Reasons the resolver refuses to produce a persistable move.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReorderError {
    #[error("Moved task {id} vanished from the working list")]
    StaleIndex { id: TaskId },
}

/// Error context wrapper for better debugging
pub struct ErrorContext {
    operation: String,
    details: Vec<(String, String)>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.details.push((key.into(), value.to_string()));
        self
    }

    pub fn wrap<T>(self, result: Result<T>) -> Result<T> {
        result.with_context(|| {
            let mut msg = format!("Operation '{}' failed", self.operation);
            if !self.details.is_empty() {
                msg.push_str(" with context:");
                for (key, value) in self.details {
                    msg.push_str(&format!("\n  {}: {}", key, value));
                }
            }
            msg
        })
    }
}

/// Structured logging for the mutation lifecycle
pub struct LogHelper;

impl LogHelper {
    pub fn log_confirmed(mutation: &Mutation) {
        info!(
            mutation_id = %mutation.id,
            kind = ?mutation.kind,
            subject = %mutation.subject,
            "Board mutation confirmed"
        );
    }

    pub fn log_rolled_back(mutation: &Mutation, error: &anyhow::Error) {
        warn!(
            mutation_id = %mutation.id,
            kind = ?mutation.kind,
            subject = %mutation.subject,
            error = %error,
            "Board mutation failed, local state rolled back"
        );
    }

    pub fn log_unreconciled(mutation: &Mutation, error: &anyhow::Error) {
        error!(
            mutation_id = %mutation.id,
            kind = ?mutation.kind,
            subject = %mutation.subject,
            error = %error,
            error_chain = ?error.chain().map(|e| e.to_string()).collect::<Vec<_>>(),
            "Board mutation failed, keeping local order until next reload"
        );
    }

    pub fn log_resync_failure(reason: &str, error: &anyhow::Error) {
        warn!(reason = %reason, error = %error, "Task resync failed");
    }

    pub fn log_performance_warning(operation: &str, duration_ms: u64, threshold_ms: u64) {
        if duration_ms > threshold_ms {
            warn!(
                operation = %operation,
                duration_ms = duration_ms,
                threshold_ms = threshold_ms,
                "Operation exceeded performance threshold"
            );
        }
    }
}

/// User-friendly error messages
pub struct UserErrorFormatter;

impl UserErrorFormatter {
    pub fn format_for_ui(error: &anyhow::Error) -> String {
        if let Some(board_error) = error.downcast_ref::<BoardError>() {
            return Self::format_board_error(board_error);
        }
        if let Some(reorder_error) = error.downcast_ref::<ReorderError>() {
            return Self::format_reorder_error(reorder_error);
        }

        let error_str = error.to_string().to_lowercase();

        if error_str.contains("network") || error_str.contains("connection") {
            return "Network connection error. Please check your internet connection and try again.".to_string();
        }

        if error_str.contains("timeout") || error_str.contains("timed out") {
            return "The operation timed out. Please try again.".to_string();
        }

        "An unexpected error occurred. Please try again.".to_string()
    }

    pub fn format_mutation_failure(kind: MutationKind) -> String {
        match kind {
            MutationKind::TaskMove => {
                "Could not move the task. It has been put back where it was.".to_string()
            }
            MutationKind::ColumnReorder => {
                "Could not save the new column order. It may change after the next refresh.".to_string()
            }
            MutationKind::SwimlaneReorder => {
                "Could not save the new swimlane order. It may change after the next refresh.".to_string()
            }
        }
    }

    fn format_board_error(error: &BoardError) -> String {
        match error {
            BoardError::TaskNotFound { .. } => "The requested task could not be found.".to_string(),
            BoardError::UnexpectedStatus { status: 401 | 403, .. } => {
                "You don't have permission to perform this action.".to_string()
            }
            BoardError::Configuration { message } => format!("Configuration error: {}", message),
            _ => error.to_string(),
        }
    }

    fn format_reorder_error(error: &ReorderError) -> String {
        match error {
            ReorderError::StaleIndex { .. } => {
                "The board changed while you were dragging. Please try again.".to_string()
            }
        }
    }
}

/// Warns when the guarded operation runs past its threshold.
pub struct PerformanceMonitor {
    operation: String,
    start: Instant,
    threshold_ms: u64,
}

impl PerformanceMonitor {
    pub fn new(operation: impl Into<String>, threshold_ms: u64) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
            threshold_ms,
        }
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis() as u64;
        LogHelper::log_performance_warning(&self.operation, duration_ms, self.threshold_ms);

        debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );
    }
}
