use crate::error::IntegrityControlError;
use engine_core::connectors::sink::TargetSession;
use model::execution::mode::{IntegrityMode, MigrationMode};
use tracing::{error, info};

/// Suspends foreign-key and trigger enforcement for data-only loads.
pub struct IntegrityController {
    mode: MigrationMode,
}

impl IntegrityController {
    pub fn new(mode: MigrationMode) -> Self {
        Self { mode }
    }

    /// Captures the session's mode and switches it to `Replica`.
    ///
    /// Returns `None` outside data-only mode. Failures are logged and the
    /// token falls back to restoring the default mode, so loading proceeds.
    pub async fn suspend(&self, session: &mut dyn TargetSession) -> Option<SuspendedIntegrity> {
        if !self.mode.is_data_only() {
            return None;
        }

        let restore_to = match capture_and_bypass(session).await {
            Ok(original) => {
                info!(original = %original, "Integrity enforcement suspended");
                original
            }
            Err((err, fallback)) => {
                error!(error = %err, fallback = %fallback, "Integrity control failed, continuing");
                fallback
            }
        };

        Some(SuspendedIntegrity {
            restore_to,
            restored: false,
        })
    }
}

async fn capture_and_bypass(
    session: &mut dyn TargetSession,
) -> Result<IntegrityMode, (IntegrityControlError, IntegrityMode)> {
    let original = session
        .integrity_mode()
        .await
        .map_err(|e| (IntegrityControlError::Capture(e), IntegrityMode::default()))?;

    session
        .set_integrity_mode(IntegrityMode::Replica)
        .await
        .map_err(|e| (IntegrityControlError::Suspend(e), original))?;

    Ok(original)
}

/// The obligation to put a session's integrity mode back.
///
/// Only `restore` discharges it. Dropping it unrestored is logged as an error.
#[must_use = "suspended integrity must be restored"]
#[derive(Debug)]
pub struct SuspendedIntegrity {
    restore_to: IntegrityMode,
    restored: bool,
}

impl SuspendedIntegrity {
    pub fn restore_to(&self) -> IntegrityMode {
        self.restore_to
    }

    pub async fn restore(
        mut self,
        session: &mut dyn TargetSession,
    ) -> Result<(), IntegrityControlError> {
        self.restored = true;
        session
            .set_integrity_mode(self.restore_to)
            .await
            .map_err(|source| IntegrityControlError::Restore {
                mode: self.restore_to.to_string(),
                source,
            })?;
        info!(mode = %self.restore_to, "Integrity mode restored");
        Ok(())
    }
}

impl Drop for SuspendedIntegrity {
    fn drop(&mut self) {
        if !self.restored {
            error!(mode = %self.restore_to, "Suspended integrity dropped without restore");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeTarget;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn full_mode_leaves_session_alone() {
        let target = FakeTarget::new();
        let mut session = target.session();
        let controller = IntegrityController::new(MigrationMode::Full);

        assert!(controller.suspend(&mut session).await.is_none());
        assert_eq!(target.mode(), IntegrityMode::Origin);
        assert_eq!(target.mode_switches(), 0);
    }

    #[tokio::test]
    async fn data_only_suspends_then_restores_captured_mode() {
        let target = FakeTarget::new().with_mode(IntegrityMode::Local);
        let mut session = target.session();
        let controller = IntegrityController::new(MigrationMode::DataOnly);

        let token = controller.suspend(&mut session).await.unwrap();
        assert_eq!(target.mode(), IntegrityMode::Replica);
        assert_eq!(token.restore_to(), IntegrityMode::Local);

        token.restore(&mut session).await.unwrap();
        assert_eq!(target.mode(), IntegrityMode::Local);
    }

    #[tokio::test]
    #[traced_test]
    async fn capture_failure_is_logged_and_falls_back_to_default() {
        let target = FakeTarget::new().fail_mode_read();
        let mut session = target.session();
        let controller = IntegrityController::new(MigrationMode::DataOnly);

        let token = controller.suspend(&mut session).await.unwrap();
        assert_eq!(token.restore_to(), IntegrityMode::Origin);
        assert!(logs_contain("Integrity control failed, continuing"));
        assert!(logs_contain("Failed to read session integrity mode"));

        token.restore(&mut session).await.unwrap();
        assert_eq!(target.mode(), IntegrityMode::Origin);
    }

    #[tokio::test]
    #[traced_test]
    async fn dropping_unrestored_token_is_reported() {
        let target = FakeTarget::new();
        let mut session = target.session();
        let controller = IntegrityController::new(MigrationMode::DataOnly);

        let token = controller.suspend(&mut session).await;
        drop(token);
        assert!(logs_contain("Suspended integrity dropped without restore"));
    }
}
