//! The scan pipeline event loop.
//!
//! [`ScanPipeline`] owns every stage and the devices they talk to. Each
//! decoded token runs through debounce, lookup, policy, dispatch and audit
//! to completion before the next key event is read.

use crate::audit::AuditLogger;
use crate::debounce::{DebounceDecision, DebounceFilter};
use crate::decoder::KeyEventDecoder;
use crate::dispatcher::CommandDispatcher;
use crate::error::PipelineResult;
use crate::policy::{DenialReason, PolicyDecision, SecurityPolicy};
use crate::resolver::CredentialResolver;
use lockgate_core::constants::DEFAULT_COOLDOWN;
use lockgate_core::{Credential, LockerCommand, ScanToken};
use lockgate_hardware::{ActuatorLink, ConfirmationChannel, DeviceInfo, ScannerDevice};
use lockgate_storage::{AuditStore, CredentialStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Order of the actuator write and the audit append for a granted scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOrder {
    /// Write the command, then log it. A failed log leaves an unlogged open.
    #[default]
    DispatchThenLog,

    /// Log first, then write. A failed write leaves a logged non-open.
    LogThenDispatch,
}

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Window during which an identical token is ignored.
    pub cooldown: Duration,

    /// How long to wait for the operator. `None` waits forever.
    pub confirmation_timeout: Option<Duration>,

    pub audit_order: AuditOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            confirmation_timeout: None,
            audit_order: AuditOrder::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }

    pub fn with_audit_order(mut self, order: AuditOrder) -> Self {
        self.audit_order = order;
        self
    }
}

/// What happened to one decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Same token inside the cooldown window.
    Duplicate,

    /// No credential for this token.
    Unknown,

    /// HIGH credential refused by the operator check.
    Denied {
        credential: Credential,
        reason: DenialReason,
    },

    /// Authorized, but the locker number has no command.
    Unmapped { credential: Credential },

    /// Command written and logged.
    Granted {
        credential: Credential,
        command: LockerCommand,
    },
}

impl ScanOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, ScanOutcome::Granted { .. })
    }
}

/// Running counters of scan outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub tokens: u64,
    pub duplicates: u64,
    pub unknown: u64,
    pub denied: u64,
    pub unmapped: u64,
    pub granted: u64,
}

impl PipelineStats {
    fn record(&mut self, outcome: &ScanOutcome) {
        self.tokens += 1;
        match outcome {
            ScanOutcome::Duplicate => self.duplicates += 1,
            ScanOutcome::Unknown => self.unknown += 1,
            ScanOutcome::Denied { .. } => self.denied += 1,
            ScanOutcome::Unmapped { .. } => self.unmapped += 1,
            ScanOutcome::Granted { .. } => self.granted += 1,
        }
    }
}

/// Single-actor scan pipeline.
///
/// Generic over every device and store so tests can run it entirely on
/// mocks. Use the `Any*` wrappers from `lockgate_hardware` to pick devices
/// at runtime.
///
/// # Examples
///
/// ```
/// use lockgate_core::{Credential, SecurityLevel};
/// use lockgate_hardware::mock::{MockActuator, MockConfirmation, MockScanner};
/// use lockgate_pipeline::{PipelineConfig, ScanPipeline};
/// use lockgate_storage::{MemoryAuditStore, MemoryCredentialStore};
///
/// #[tokio::main]
/// async fn main() -> lockgate_pipeline::PipelineResult<()> {
///     let (scanner, scans) = MockScanner::new();
///     let (actuator, mut lines) = MockActuator::new();
///     let (console, _operator) = MockConfirmation::new();
///     let credentials = MemoryCredentialStore::with_credentials([
///         Credential::new("ABC123", "Alice", 1, SecurityLevel::Low),
///     ]);
///
///     let mut pipeline = ScanPipeline::new(
///         PipelineConfig::default(),
///         scanner,
///         credentials,
///         MemoryAuditStore::new(),
///         actuator,
///         console,
///     );
///
///     scans.scan("ABC123").await?;
///     let outcome = pipeline.step().await?;
///
///     assert!(outcome.is_granted());
///     assert_eq!(lines.sent_lines(), vec!["L1\n".to_string()]);
///     Ok(())
/// }
/// ```
pub struct ScanPipeline<Sc, Cr, Au, Ac, Cf> {
    decoder: KeyEventDecoder<Sc>,
    debounce: DebounceFilter,
    resolver: CredentialResolver<Cr>,
    policy: SecurityPolicy,
    dispatcher: CommandDispatcher<Ac>,
    audit: AuditLogger<Au>,
    confirmation: Cf,
    audit_order: AuditOrder,
    stats: PipelineStats,
}

impl<Sc, Cr, Au, Ac, Cf> ScanPipeline<Sc, Cr, Au, Ac, Cf>
where
    Sc: ScannerDevice,
    Cr: CredentialStore,
    Au: AuditStore,
    Ac: ActuatorLink,
    Cf: ConfirmationChannel,
{
    pub fn new(
        config: PipelineConfig,
        scanner: Sc,
        credentials: Cr,
        audit: Au,
        actuator: Ac,
        confirmation: Cf,
    ) -> Self {
        Self {
            decoder: KeyEventDecoder::new(scanner),
            debounce: DebounceFilter::new(config.cooldown),
            resolver: CredentialResolver::new(credentials),
            policy: SecurityPolicy::new(config.confirmation_timeout),
            dispatcher: CommandDispatcher::new(actuator),
            audit: AuditLogger::new(audit),
            confirmation,
            audit_order: config.audit_order,
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Describe the attached scanner.
    pub async fn scanner_info(&self) -> PipelineResult<DeviceInfo> {
        Ok(self.decoder.scanner().get_info().await?)
    }

    /// Run until a fatal error.
    ///
    /// There is no clean exit: the loop ends when the scanner disconnects or
    /// a store or transport fails. Race this against a shutdown signal to
    /// stop it.
    pub async fn run(&mut self) -> PipelineResult<()> {
        loop {
            self.step().await?;
        }
    }

    /// Read and fully process the next token.
    pub async fn step(&mut self) -> PipelineResult<ScanOutcome> {
        let token = self.decoder.next_token().await?;
        self.process_token(token).await
    }

    /// Process one token observed now.
    pub async fn process_token(&mut self, token: ScanToken) -> PipelineResult<ScanOutcome> {
        self.process_token_at(token, Instant::now()).await
    }

    /// Process one token observed at `now`.
    ///
    /// # Errors
    ///
    /// Store, transport and confirmation-channel failures are fatal and
    /// returned as-is. Every other result is a [`ScanOutcome`].
    pub async fn process_token_at(
        &mut self,
        token: ScanToken,
        now: Instant,
    ) -> PipelineResult<ScanOutcome> {
        let outcome = self.evaluate(token, now).await?;
        self.stats.record(&outcome);
        Ok(outcome)
    }

    async fn evaluate(&mut self, token: ScanToken, now: Instant) -> PipelineResult<ScanOutcome> {
        if self.debounce.check(&token, now) == DebounceDecision::Reject {
            debug!(qr_code = %token, "Ignored duplicate scan");
            return Ok(ScanOutcome::Duplicate);
        }

        let Some(credential) = self.resolver.resolve(&token).await? else {
            info!(qr_code = %token, "Unknown QR code");
            return Ok(ScanOutcome::Unknown);
        };

        info!(
            owner = %credential.owner_name,
            locker_num = credential.locker_num,
            security_level = %credential.security_level,
            "QR match"
        );

        // The policy runs before the locker number is checked, so an unmapped
        // HIGH credential is still prompted for.
        if let PolicyDecision::Denied(reason) = self
            .policy
            .authorize(&credential, &mut self.confirmation)
            .await?
        {
            return Ok(ScanOutcome::Denied { credential, reason });
        }

        let Some(command) = self.dispatcher.command_for(credential.locker_num) else {
            return Ok(ScanOutcome::Unmapped { credential });
        };

        match self.audit_order {
            AuditOrder::DispatchThenLog => {
                self.dispatcher.send(command).await?;
                self.audit.record(&credential).await?;
            }
            AuditOrder::LogThenDispatch => {
                self.audit.record(&credential).await?;
                self.dispatcher.send(command).await?;
            }
        }

        Ok(ScanOutcome::Granted {
            credential,
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockgate_core::SecurityLevel;
    use lockgate_hardware::mock::{
        MockActuator, MockActuatorHandle, MockConfirmation, MockConfirmationHandle, MockScanner,
        MockScannerHandle,
    };
    use lockgate_storage::{MemoryAuditStore, MemoryCredentialStore};

    type TestPipeline = ScanPipeline<
        MockScanner,
        MemoryCredentialStore,
        MemoryAuditStore,
        MockActuator,
        MockConfirmation,
    >;

    struct Harness {
        pipeline: TestPipeline,
        scans: MockScannerHandle,
        lines: MockActuatorHandle,
        operator: MockConfirmationHandle,
        audit: MemoryAuditStore,
    }

    fn harness(config: PipelineConfig) -> Harness {
        let (scanner, scans) = MockScanner::new();
        let (actuator, lines) = MockActuator::new();
        let (console, operator) = MockConfirmation::new();
        let audit = MemoryAuditStore::new();
        let credentials = MemoryCredentialStore::with_credentials([
            Credential::new("ABC123", "Alice", 1, SecurityLevel::Low),
            Credential::new("XYZ999", "Bob", 2, SecurityLevel::High),
            Credential::new("MASTER0", "Dana", 0, SecurityLevel::Low),
            Credential::new("GHOST4", "Eve", 4, SecurityLevel::High),
        ]);

        Harness {
            pipeline: ScanPipeline::new(config, scanner, credentials, audit.clone(), actuator, console),
            scans,
            lines,
            operator,
            audit,
        }
    }

    fn token(s: &str) -> ScanToken {
        ScanToken::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_low_credential_granted() {
        let mut h = harness(PipelineConfig::default());

        let outcome = h.pipeline.process_token(token("ABC123")).await.unwrap();

        assert!(matches!(
            outcome,
            ScanOutcome::Granted {
                command: LockerCommand::Open1,
                ..
            }
        ));
        assert_eq!(h.lines.sent_lines(), vec!["L1\n".to_string()]);
        assert_eq!(h.audit.events().len(), 1);
        assert_eq!(h.operator.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_locker_zero_opens_all() {
        let mut h = harness(PipelineConfig::default());

        h.pipeline.process_token(token("MASTER0")).await.unwrap();
        assert_eq!(h.lines.sent_lines(), vec!["ALL\n".to_string()]);
    }

    #[tokio::test]
    async fn test_unmapped_high_still_prompts() {
        let mut h = harness(PipelineConfig::default());
        h.operator.respond("CONFIRM").await.unwrap();

        let outcome = h.pipeline.process_token(token("GHOST4")).await.unwrap();

        assert!(matches!(outcome, ScanOutcome::Unmapped { .. }));
        assert_eq!(h.operator.prompt_count(), 1);
        assert!(h.lines.sent_lines().is_empty());
        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_log_then_dispatch_logs_before_failed_write() {
        let (scanner, _scans) = MockScanner::new();
        let (actuator, _lines) = MockActuator::failing();
        let (console, _operator) = MockConfirmation::new();
        let audit = MemoryAuditStore::new();
        let credentials = MemoryCredentialStore::with_credentials([Credential::new(
            "ABC123",
            "Alice",
            1,
            SecurityLevel::Low,
        )]);
        let mut pipeline = ScanPipeline::new(
            PipelineConfig::default().with_audit_order(AuditOrder::LogThenDispatch),
            scanner,
            credentials,
            audit.clone(),
            actuator,
            console,
        );

        let result = pipeline.process_token(token("ABC123")).await;

        assert!(matches!(result, Err(crate::PipelineError::Hardware(_))));
        assert_eq!(audit.events().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_track_outcomes() {
        let mut h = harness(PipelineConfig::default());
        let t0 = Instant::now();
        h.operator.respond("yes").await.unwrap();

        h.pipeline.process_token_at(token("ABC123"), t0).await.unwrap();
        h.pipeline.process_token_at(token("ABC123"), t0).await.unwrap();
        h.pipeline.process_token_at(token("NOPE000"), t0).await.unwrap();
        h.pipeline.process_token_at(token("XYZ999"), t0).await.unwrap();

        assert_eq!(
            h.pipeline.stats(),
            PipelineStats {
                tokens: 4,
                duplicates: 1,
                unknown: 1,
                denied: 1,
                unmapped: 0,
                granted: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_step_reads_from_scanner() {
        let mut h = harness(PipelineConfig::default());
        h.scans.scan("NOPE000").await.unwrap();

        assert_eq!(h.pipeline.step().await.unwrap(), ScanOutcome::Unknown);
    }

    #[tokio::test]
    async fn test_scanner_info() {
        let h = harness(PipelineConfig::default());
        let info = h.pipeline.scanner_info().await.unwrap();
        assert_eq!(info.model, "Mock Scanner v1.0");
    }

    #[test]
    fn test_audit_order_deserializes_snake_case() {
        let order: AuditOrder = serde_json::from_str("\"log_then_dispatch\"").unwrap();
        assert_eq!(order, AuditOrder::LogThenDispatch);
        assert_eq!(AuditOrder::default(), AuditOrder::DispatchThenLog);
    }
}
