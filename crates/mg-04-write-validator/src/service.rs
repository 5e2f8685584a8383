//! # Write Validator Service
//!
//! Installed as the graph store's write hook. Rules run in this order:
//!
//! 1. Control souls (peers, rate-limit counters) are schema-checked only.
//! 2. Null writes and marker-only writes are accepted.
//! 3. A put that repeats what is stored is accepted without counting.
//! 4. The acting author is rate limited (not for pull sync).
//! 5. `isDeleted = true` needs a valid, authorized deletion record.
//! 6. On deleted content, `isDeleted = false` with no other change is
//!    refused. Edits that carry the flag are accepted; the merge keeps it set.
//! 7. Content must be signed by its author within the skew window, at the
//!    soul its own fields say it belongs at.
//!
//! Accepted content writes produce a history copy as a side write.

use crate::domain::{
    rules, AdminRegistry, AuthorRateLimiter, RateLimitResult, SecurityEvent, SecurityLog,
    ValidationConfig, ValidationRejection,
};
use mg_02_graph_store::{GraphReader, WriteContext, WriteHook, WriteVerdict};
use mg_03_shard_router::ShardingApi;
use shared_types::{
    fields, is_did_key, is_marker_key, Annotation, Comment, DeletionRecord, FieldMap, FieldValue,
    GraphPut, Node, Profile, Soul, SoulKind, Timestamp, WriteOrigin,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// A refused put and the identity it acted as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub rejection: ValidationRejection,
    pub actor: Option<String>,
}

impl Refusal {
    fn new(rejection: ValidationRejection, actor: Option<&str>) -> Self {
        Self {
            rejection,
            actor: actor.map(str::to_string),
        }
    }
}

impl From<ValidationRejection> for Refusal {
    fn from(rejection: ValidationRejection) -> Self {
        Self::new(rejection, None)
    }
}

pub struct WriteValidator {
    config: ValidationConfig,
    router: Arc<dyn ShardingApi>,
    limiter: AuthorRateLimiter,
    admins: Arc<AdminRegistry>,
    security_log: Arc<SecurityLog>,
}

impl WriteValidator {
    pub fn new(config: ValidationConfig, router: Arc<dyn ShardingApi>) -> Self {
        let limiter = AuthorRateLimiter::new(config.rate_limit_max, config.rate_limit_window_ms);
        let admins = Arc::new(AdminRegistry::new(config.admins.iter().cloned()));
        let security_log = Arc::new(SecurityLog::new(config.security_log_capacity));
        Self {
            config,
            router,
            limiter,
            admins,
            security_log,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn admins(&self) -> &Arc<AdminRegistry> {
        &self.admins
    }

    pub fn security_log(&self) -> &Arc<SecurityLog> {
        &self.security_log
    }

    pub fn rate_limiter(&self) -> &AuthorRateLimiter {
        &self.limiter
    }

    /// Run every rule against `put`. On success returns the side writes.
    pub fn validate(
        &self,
        put: &GraphPut,
        ctx: &WriteContext,
        reader: &dyn GraphReader,
    ) -> Result<Vec<GraphPut>, Refusal> {
        let kind = put.soul.kind();
        let current = reader
            .node(&put.soul)
            .map_err(|e| ValidationRejection::StorageUnavailable(e.to_string()))?;

        if kind.is_control() {
            self.check_control(&kind, put, current.as_ref())?;
            return Ok(Vec::new());
        }
        if put.is_tombstone() || put.is_marker_only() {
            return Ok(Vec::new());
        }
        if rules::is_redundant(current.as_ref(), put) {
            trace!(soul = %put.soul, "[mg-04] Redundant put accepted");
            return Ok(Vec::new());
        }

        match &kind {
            SoulKind::DeletionRecord { target } => {
                self.check_deletion_record(target, put, current.as_ref(), ctx)?;
                Ok(Vec::new())
            }
            SoulKind::Annotation { .. } | SoulKind::Comment { .. } | SoulKind::Profile { .. } => {
                self.check_content(&kind, put, current.as_ref(), ctx, reader)
            }
            _ => Err(ValidationRejection::UnsupportedSoul(put.soul.to_string()).into()),
        }
    }

    fn check_control(
        &self,
        kind: &SoulKind,
        put: &GraphPut,
        current: Option<&Node>,
    ) -> Result<(), Refusal> {
        if put.is_tombstone() {
            return Ok(());
        }
        let merged = rules::merged_fields(current, put);
        match kind {
            SoulKind::Peer { key } => {
                rules::check_peer_record(key, &merged, &self.config.peer_url_suffix)?
            }
            SoulKind::RateLimit { did } => rules::check_rate_limit_record(&merged)
                .map_err(|r| Refusal::new(r, Some(did)))?,
            _ => {}
        }
        Ok(())
    }

    /// Pull sync replays history, so its reference clock is the HAM state of
    /// the field; live writes are compared with the local clock.
    fn reference_time(
        ctx: &WriteContext,
        put: &GraphPut,
        current: Option<&Node>,
        field: &str,
    ) -> Timestamp {
        if ctx.origin != WriteOrigin::Sync {
            return ctx.now;
        }
        put.states
            .get(field)
            .copied()
            .or_else(|| current.and_then(|node| node.state_of(field)))
            .unwrap_or(ctx.now)
    }

    fn check_rate(&self, did: &str, ctx: &WriteContext) -> Result<(), ValidationRejection> {
        if ctx.origin == WriteOrigin::Sync {
            return Ok(());
        }
        match self.limiter.check(did, ctx.now) {
            RateLimitResult::Allowed => Ok(()),
            RateLimitResult::Limited { retry_after_ms } => Err(ValidationRejection::RateLimited {
                did: did.to_string(),
                retry_after_ms,
            }),
        }
    }

    fn count_action(&self, did: &str, ctx: &WriteContext) {
        if ctx.origin != WriteOrigin::Sync {
            self.limiter.record(did, ctx.now);
        }
    }

    fn check_deletion_record(
        &self,
        target: &Soul,
        put: &GraphPut,
        current: Option<&Node>,
        ctx: &WriteContext,
    ) -> Result<(), Refusal> {
        let merged = rules::merged_fields(current, put);
        let record = DeletionRecord::from_fields(&merged).map_err(rules::entity_rejection)?;
        let actor = Some(record.author.as_str());
        let refuse = |r| Refusal::new(r, actor);

        self.check_rate(&record.author, ctx).map_err(refuse)?;
        let message = DeletionRecord::signing_bytes(target, record.timestamp, &record.nonce);
        rules::verify_signature(&record.author, &message, &record.signature).map_err(refuse)?;
        let reference = Self::reference_time(ctx, put, current, fields::TIMESTAMP);
        rules::within_window(record.timestamp, reference, self.config.skew_window_ms)
            .map_err(refuse)?;

        self.count_action(&record.author, ctx);
        Ok(())
    }

    fn check_content(
        &self,
        kind: &SoulKind,
        put: &GraphPut,
        current: Option<&Node>,
        ctx: &WriteContext,
        reader: &dyn GraphReader,
    ) -> Result<Vec<GraphPut>, Refusal> {
        let merged = rules::merged_fields(current, put);
        let deleting = put.value(fields::IS_DELETED) == Some(&FieldValue::Bool(true));
        let actor_field = if deleting {
            fields::DELETED_BY
        } else {
            fields::AUTHOR
        };
        let actor = merged
            .get(actor_field)
            .and_then(FieldValue::as_str)
            .ok_or(ValidationRejection::MissingAuthor)?;
        let refuse = |r| Refusal::new(r, Some(actor));

        if !is_did_key(actor) {
            return Err(refuse(ValidationRejection::InvalidAuthor(actor.to_string())));
        }
        self.check_rate(actor, ctx).map_err(refuse)?;

        let stored_deleted = current.and_then(|n| n.flag(fields::IS_DELETED)) == Some(true);
        if stored_deleted
            && put.value(fields::IS_DELETED).is_some()
            && !deleting
            && !rules::changes_beyond_flag(current, put)
        {
            return Err(refuse(ValidationRejection::Resurrection));
        }

        if deleting {
            self.check_deletion(put, current, &merged, ctx, reader)
                .map_err(refuse)?;
        }

        let touches_content = rules::touches_content(put);
        let mut side_writes = Vec::new();
        if touches_content || !deleting {
            let timestamp = self
                .check_entity(kind, &merged, put, current, ctx)
                .map_err(refuse)?;
            let versioned = matches!(
                kind,
                SoulKind::Annotation { .. } | SoulKind::Comment { .. }
            );
            if self.config.record_history && touches_content && versioned {
                side_writes.push(history_copy(&put.soul, timestamp, &merged));
            }
        }

        self.count_action(actor, ctx);
        Ok(side_writes)
    }

    /// Authorization for setting `isDeleted = true` on `put.soul`.
    fn check_deletion(
        &self,
        put: &GraphPut,
        current: Option<&Node>,
        merged: &FieldMap,
        ctx: &WriteContext,
        reader: &dyn GraphReader,
    ) -> Result<(), ValidationRejection> {
        let record_soul = Soul::deletion_record(&put.soul);
        let record_node = reader
            .node(&record_soul)
            .map_err(|e| ValidationRejection::StorageUnavailable(e.to_string()))?
            .filter(Node::has_content)
            .ok_or_else(|| ValidationRejection::MissingDeletionRecord(put.soul.to_string()))?;
        let record = DeletionRecord::from_fields(&record_node.fields)
            .map_err(|e| ValidationRejection::InvalidDeletionRecord(e.to_string()))?;

        let message = DeletionRecord::signing_bytes(&put.soul, record.timestamp, &record.nonce);
        rules::verify_signature(&record.author, &message, &record.signature)
            .map_err(|e| ValidationRejection::InvalidDeletionRecord(e.to_string()))?;
        let reference = Self::reference_time(ctx, put, current, fields::IS_DELETED);
        rules::within_window(record.timestamp, reference, self.config.skew_window_ms)?;

        let owner = current
            .and_then(|node| node.text(fields::AUTHOR))
            .or_else(|| put.text(fields::AUTHOR))
            .ok_or(ValidationRejection::UnknownDeletionTarget)?;
        if record.author != owner && !self.admins.is_admin(&record.author) {
            return Err(ValidationRejection::UnauthorizedDeletion {
                deleter: record.author,
                owner: owner.to_string(),
            });
        }

        let deleted_by = merged.get(fields::DELETED_BY).and_then(FieldValue::as_str);
        if deleted_by != Some(record.author.as_str()) {
            return Err(ValidationRejection::DeletedByMismatch {
                deleted_by: deleted_by.map(str::to_string),
                record_author: record.author,
            });
        }
        Ok(())
    }

    /// Parse, place and verify the merged entity. Returns its signed timestamp.
    fn check_entity(
        &self,
        kind: &SoulKind,
        merged: &FieldMap,
        put: &GraphPut,
        current: Option<&Node>,
        ctx: &WriteContext,
    ) -> Result<Timestamp, ValidationRejection> {
        let (author, message, signature, timestamp) = match kind {
            SoulKind::Annotation { location, id } => {
                let annotation = Annotation::from_fields(merged).map_err(rules::entity_rejection)?;
                rules::check_annotation_placement(&annotation, location, id, self.router.as_ref())?;
                let message = annotation.signing_bytes();
                (annotation.author, message, annotation.signature, annotation.timestamp)
            }
            SoulKind::Comment { annotation, id } => {
                let comment = Comment::from_fields(merged).map_err(rules::entity_rejection)?;
                rules::check_comment_placement(&comment, annotation, id)?;
                let message = comment.signing_bytes();
                (comment.author, message, comment.signature, comment.timestamp)
            }
            SoulKind::Profile { did } => {
                let profile = Profile::from_fields(merged).map_err(rules::entity_rejection)?;
                rules::check_profile_placement(&profile, did)?;
                let message = profile.signing_bytes();
                (profile.author, message, profile.signature, profile.timestamp)
            }
            _ => return Err(ValidationRejection::UnsupportedSoul(format!("{kind:?}"))),
        };

        rules::verify_signature(&author, &message, &signature)?;
        let reference = Self::reference_time(ctx, put, current, fields::TIMESTAMP);
        rules::within_window(timestamp, reference, self.config.skew_window_ms)?;
        Ok(timestamp)
    }
}

fn history_copy(soul: &Soul, timestamp: Timestamp, merged: &FieldMap) -> GraphPut {
    let data = merged
        .iter()
        .filter(|(key, _)| !is_marker_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    GraphPut::fields(Soul::history(soul, timestamp), data)
}

impl WriteHook for WriteValidator {
    fn check(&self, put: &GraphPut, ctx: &WriteContext, reader: &dyn GraphReader) -> WriteVerdict {
        match self.validate(put, ctx, reader) {
            Ok(side_writes) => WriteVerdict::Accepted { side_writes },
            Err(refusal) => {
                debug!(
                    soul = %put.soul,
                    origin = ?ctx.origin,
                    reason = %refusal.rejection,
                    "[mg-04] Write rejected"
                );
                if refusal.rejection.is_security_relevant() {
                    self.security_log.record(SecurityEvent {
                        at: ctx.now,
                        soul: put.soul.clone(),
                        actor: refusal.actor.clone(),
                        origin: ctx.origin,
                        rejection: refusal.rejection.clone(),
                    });
                }
                WriteVerdict::Rejected {
                    reason: refusal.rejection.to_string(),
                    code: refusal.rejection.label(),
                    actor: refusal.actor,
                }
            }
        }
    }
}
