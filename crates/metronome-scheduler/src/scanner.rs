//! Bootstrap discovery of declared scheduled work.
//!
//! Instead of reflecting over component metadata, components implement
//! [`ScheduleProvider`] and hand the scanner a plain declaration list.
//! The scanner stamps each declaration with its owning component's name
//! and lifetime; the registry never inspects components directly.

use std::sync::Arc;

use crate::{JobDeclaration, OwnerLifetime, ScannedDeclaration};

/// A component that declares scheduled work.
///
/// # Example
///
/// ```ignore
/// struct ReportsComponent;
///
/// impl ScheduleProvider for ReportsComponent {
///     fn component_name(&self) -> &str {
///         "ReportsComponent"
///     }
///
///     fn schedules(&self) -> Vec<JobDeclaration> {
///         vec![JobDeclaration::cron(
///             "nightly-report",
///             "send_report",
///             "0 0 2 * * *",
///             job_fn(|| async { send_report().await }),
///         )]
///     }
/// }
/// ```
pub trait ScheduleProvider: Send + Sync {
    /// Name of the component, used in diagnostics.
    fn component_name(&self) -> &str;

    /// The component's instantiation lifetime. Scheduled work is only
    /// admitted from singleton-lifetime components.
    fn lifetime(&self) -> OwnerLifetime {
        OwnerLifetime::Singleton
    }

    /// The scheduled work this component declares.
    fn schedules(&self) -> Vec<JobDeclaration>;
}

/// Collects providers and produces the full declaration set at bootstrap.
#[derive(Default)]
pub struct ScheduleScanner {
    providers: Vec<Arc<dyn ScheduleProvider>>,
}

impl ScheduleScanner {
    /// Create an empty scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component for scanning.
    pub fn register(&mut self, provider: Arc<dyn ScheduleProvider>) {
        self.providers.push(provider);
    }

    /// Number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Walk every registered provider and emit its declarations, each
    /// stamped with the owning component's name and lifetime.
    pub fn scan(&self) -> Vec<ScannedDeclaration> {
        self.providers
            .iter()
            .flat_map(|provider| {
                provider
                    .schedules()
                    .into_iter()
                    .map(|declaration| ScannedDeclaration {
                        component: provider.component_name().to_string(),
                        lifetime: provider.lifetime(),
                        declaration,
                    })
            })
            .collect()
    }
}
