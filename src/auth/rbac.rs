//! Authorization decision engine
//!
//! Stateless and idempotent: each call works from the request's token (or its
//! absence), the action and feature being attempted, and read-only role data.
//! The only externally observable effects are the allow/deny decision and the
//! role-store reads it takes to get there.

use crate::auth::jwt::JwtHandler;
use crate::config::RbacConfig;
use crate::core::models::Role;
use crate::core::models::role::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, FEATURE_ALL, FEATURE_USERS,
};
use crate::storage::StorageLayer;
use crate::utils::error::{GateError, Result};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Everything the engine needs to know about one attempted operation
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// Bearer token from the authorization header, if any
    pub token: Option<&'a str>,
    /// Action being attempted (`create`, `read`, `update`, `delete`, ...)
    pub action: &'a str,
    /// Feature the action targets (`tasks`, `users`, ...)
    pub feature: &'a str,
    /// Role name proposed in the request body, when the body carries one
    pub proposed_role: Option<&'a str>,
    /// Identity targeted by the operation, when the path names one
    pub target_user_id: Option<Uuid>,
}

/// An allow decision, attached to the request for downstream handlers
#[derive(Debug, Clone)]
pub struct AccessDecision {
    /// Authenticated identity, `None` for public read access
    pub identity_id: Option<Uuid>,
    /// Resolved role the decision was made under
    pub role: Role,
}

/// Renders allow/deny decisions for protected operations
#[derive(Clone)]
pub struct AccessEngine {
    jwt: Arc<JwtHandler>,
    storage: Arc<StorageLayer>,
    policy: RbacConfig,
}

impl AccessEngine {
    /// Create an engine over the given token handler, stores, and policy
    pub fn new(jwt: Arc<JwtHandler>, storage: Arc<StorageLayer>, policy: RbacConfig) -> Self {
        Self {
            jwt,
            storage,
            policy,
        }
    }

    /// Decide whether the request may proceed.
    ///
    /// Returns the decision on allow; on deny, the error says why in the
    /// taxonomy's terms (`Unauthorized`, `TokenInvalid`, `AccessDenied`) and
    /// no downstream work may run.
    pub async fn decide(&self, request: AccessRequest<'_>) -> Result<AccessDecision> {
        let (identity_id, role) = match request.token {
            Some(token) => {
                let claims = self.jwt.verify(token)?;
                let role = self
                    .storage
                    .roles()
                    .find_by_id(claims.role_id)
                    .await?
                    .ok_or_else(|| {
                        warn!("token carries unknown role {}", claims.role_id);
                        GateError::AccessDenied("user role not found".into())
                    })?;
                (Some(claims.sub), role)
            }
            // Unauthenticated reads fall back to the public role.
            None if request.action == ACTION_READ => {
                let role = self
                    .storage
                    .roles()
                    .find_by_name(&self.policy.public_role)
                    .await?
                    .ok_or_else(|| {
                        warn!("public role {:?} is not configured", self.policy.public_role);
                        GateError::AccessDenied("user role not found".into())
                    })?;
                (None, role)
            }
            // Unauthenticated writes are never permitted.
            None => return Err(GateError::Unauthorized("authentication required".into())),
        };

        self.check_escalation_guard(&role, &request).await?;

        // An absent action key is an explicit denial, not a silent fall-through.
        let Some(features) = role.permissions.get(request.action) else {
            debug!(
                "role {:?} has no entry for action {:?}",
                role.name, request.action
            );
            return Err(GateError::AccessDenied("access denied".into()));
        };

        if features.contains(FEATURE_ALL) || features.contains(request.feature) {
            Ok(AccessDecision { identity_id, role })
        } else {
            Err(GateError::AccessDenied("access denied".into()))
        }
    }

    /// Hard-coded protection of the top role: the mid-tier admin role may not
    /// create, update, or delete an account into or out of the top role. Runs
    /// before the matrix check and cannot be bypassed by it.
    async fn check_escalation_guard(
        &self,
        role: &Role,
        request: &AccessRequest<'_>,
    ) -> Result<()> {
        if role.name != self.policy.admin_role {
            return Ok(());
        }
        if request.feature != FEATURE_USERS
            || !matches!(
                request.action,
                ACTION_CREATE | ACTION_UPDATE | ACTION_DELETE
            )
        {
            return Ok(());
        }

        let top_role = self.policy.super_admin_role.as_str();

        if request.proposed_role == Some(top_role) {
            warn!("admin attempted to {} an account as {}", request.action, top_role);
            return Err(GateError::Unauthorized(format!(
                "you are not authorized to {} {}",
                request.action, top_role
            )));
        }

        if let Some(target_id) = request.target_user_id {
            if let Some(target) = self.storage.identities().find_by_id(target_id).await? {
                if let Some(target_role) = self.storage.roles().find_by_id(target.role_id).await? {
                    if target_role.name == top_role {
                        warn!(
                            "admin attempted to {} the {} account {}",
                            request.action, top_role, target_id
                        );
                        return Err(GateError::Unauthorized(format!(
                            "you are not authorized to {} {}",
                            request.action, top_role
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
