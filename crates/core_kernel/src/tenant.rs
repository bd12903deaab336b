//! Tenant scoping primitives
//!
//! Every entity in the system is partitioned by tenant. The scope guard
//! confirms that an entity handed back from a store actually belongs to the
//! tenant a request is operating for. A mismatch is reported as a plain
//! not-found so cross-tenant existence never leaks to callers.

use thiserror::Error;

use crate::identifiers::TenantId;

/// Implemented by every tenant-partitioned entity
pub trait TenantScoped {
    /// Returns the owning tenant
    fn tenant_id(&self) -> TenantId;
}

/// Raised when an entity does not belong to the active tenant
///
/// The message deliberately carries only the entity kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{entity} not found")]
pub struct ScopeError {
    /// Entity kind, e.g. "invoice"
    pub entity: &'static str,
}

/// Guard confirming entity ownership before any read or write proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    tenant: TenantId,
}

impl TenantScope {
    /// Creates a scope for the given tenant
    pub fn new(tenant: TenantId) -> Self {
        Self { tenant }
    }

    /// Returns the active tenant
    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Verifies that the entity belongs to the active tenant
    ///
    /// # Errors
    ///
    /// Returns `ScopeError` naming only the entity kind on a mismatch.
    pub fn check<'a, T: TenantScoped>(
        &self,
        entity: &'a T,
        kind: &'static str,
    ) -> Result<&'a T, ScopeError> {
        if entity.tenant_id() == self.tenant {
            Ok(entity)
        } else {
            Err(ScopeError { entity: kind })
        }
    }

    /// Verifies ownership of an owned entity, passing it through on success
    pub fn check_owned<T: TenantScoped>(
        &self,
        entity: T,
        kind: &'static str,
    ) -> Result<T, ScopeError> {
        self.check(&entity, kind)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        tenant: TenantId,
    }

    impl TenantScoped for Widget {
        fn tenant_id(&self) -> TenantId {
            self.tenant
        }
    }

    #[test]
    fn test_same_tenant_passes() {
        let tenant = TenantId::new();
        let scope = TenantScope::new(tenant);
        let widget = Widget { tenant };

        assert!(scope.check(&widget, "widget").is_ok());
    }

    #[test]
    fn test_other_tenant_is_not_found() {
        let scope = TenantScope::new(TenantId::new());
        let widget = Widget {
            tenant: TenantId::new(),
        };

        let err = scope.check(&widget, "widget").unwrap_err();
        assert_eq!(err.to_string(), "widget not found");
    }
}
