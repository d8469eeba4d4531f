//! Acting principal lookup for created-by/modified-by attribution.
//!
//! Persistence code asks an [`AuditorProvider`] who is acting. When nobody
//! is, the fixed system principal is recorded instead.

use std::future::Future;

/// Principal recorded when no acting user is present.
pub const SYSTEM_PRINCIPAL: &str = "system";

tokio::task_local! {
    static CURRENT_PRINCIPAL: String;
}

/// Supplies the identifier of the acting principal.
pub trait AuditorProvider: Send + Sync {
    /// Returns the acting principal, or the system principal if none.
    fn current_auditor(&self) -> String;
}

/// Always reports the same principal.
#[derive(Debug, Clone)]
pub struct StaticAuditor {
    principal: String,
}

impl StaticAuditor {
    /// Reports `principal` for every call.
    #[must_use]
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
        }
    }

    /// Reports the system principal for every call.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SYSTEM_PRINCIPAL)
    }
}

impl Default for StaticAuditor {
    fn default() -> Self {
        Self::system()
    }
}

impl AuditorProvider for StaticAuditor {
    fn current_auditor(&self) -> String {
        self.principal.clone()
    }
}

/// Reads the principal set by [`with_principal`] for the current task.
#[derive(Debug, Clone)]
pub struct TaskLocalAuditor {
    fallback: String,
}

impl TaskLocalAuditor {
    /// Falls back to `fallback` outside a principal scope.
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }
}

impl Default for TaskLocalAuditor {
    fn default() -> Self {
        Self::new(SYSTEM_PRINCIPAL)
    }
}

impl AuditorProvider for TaskLocalAuditor {
    fn current_auditor(&self) -> String {
        CURRENT_PRINCIPAL
            .try_with(|principal| {
                if principal.trim().is_empty() {
                    self.fallback.clone()
                } else {
                    principal.clone()
                }
            })
            .unwrap_or_else(|_| self.fallback.clone())
    }
}

/// Runs `fut` with `principal` as the acting principal.
pub async fn with_principal<F: Future>(principal: impl Into<String>, fut: F) -> F::Output {
    CURRENT_PRINCIPAL.scope(principal.into(), fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_auditor() {
        assert_eq!(StaticAuditor::default().current_auditor(), "system");
        assert_eq!(StaticAuditor::new("hr-admin").current_auditor(), "hr-admin");
    }

    #[test]
    fn test_task_local_outside_scope_falls_back() {
        assert_eq!(TaskLocalAuditor::default().current_auditor(), SYSTEM_PRINCIPAL);
        assert_eq!(TaskLocalAuditor::new("batch").current_auditor(), "batch");
    }

    #[tokio::test]
    async fn test_task_local_inside_scope() {
        let auditor = TaskLocalAuditor::default();

        let inside = with_principal("alice", async { auditor.current_auditor() }).await;
        assert_eq!(inside, "alice");

        let blank = with_principal("  ", async { auditor.current_auditor() }).await;
        assert_eq!(blank, SYSTEM_PRINCIPAL);

        assert_eq!(auditor.current_auditor(), SYSTEM_PRINCIPAL);
    }
}
