//! Lifetime-scope enforcement for schedule declarations.
//!
//! A per-request component may be instantiated and discarded many times;
//! binding a recurring timer to one fleeting instance's method is almost
//! always a bug. Declarations from such components are dropped with a
//! warning instead of registered. Rejection is a configuration smell the
//! system tolerates by disabling the feature, not a crash condition.

use tracing::warn;

use crate::{OwnerLifetime, ScannedDeclaration};

/// Decide whether a scanned declaration may be registered.
///
/// Singleton-owned declarations pass through unchanged with no
/// diagnostic. PerRequest-owned declarations are rejected and emit
/// exactly one warning naming the component and method.
pub fn admit(scanned: &ScannedDeclaration) -> bool {
    match scanned.lifetime {
        OwnerLifetime::Singleton => true,
        OwnerLifetime::PerRequest => {
            warn!(
                "Cannot register {} \"{}@{}\" because it is defined in a non static provider.",
                scanned.declaration.spec.kind(),
                scanned.component,
                scanned.declaration.method,
            );
            false
        }
    }
}
