use lockgate_core::LockerCommand;
use lockgate_hardware::{ActuatorLink, Result};
use tracing::{info, warn};

/// Writes locker commands to the actuator link.
///
/// Each command is written exactly once. There is no acknowledgment and no
/// retry: a failed write is returned to the caller.
#[derive(Debug)]
pub struct CommandDispatcher<A> {
    link: A,
}

impl<A: ActuatorLink> CommandDispatcher<A> {
    pub fn new(link: A) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &A {
        &self.link
    }

    /// Command mapped to `locker_num`, warning when there is none.
    pub fn command_for(&self, locker_num: i64) -> Option<LockerCommand> {
        let command = LockerCommand::from_locker_num(locker_num);
        if command.is_none() {
            warn!(locker_num, "Undefined locker number, nothing sent");
        }
        command
    }

    /// Send the command mapped to `locker_num`.
    ///
    /// Returns `Ok(None)` without writing anything if the locker number has
    /// no command.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the write fails.
    pub async fn dispatch(&mut self, locker_num: i64) -> Result<Option<LockerCommand>> {
        let Some(command) = self.command_for(locker_num) else {
            return Ok(None);
        };
        self.send(command).await?;
        Ok(Some(command))
    }

    /// Write one already-mapped command.
    pub async fn send(&mut self, command: LockerCommand) -> Result<()> {
        self.link.send_line(&command.wire_line()).await?;
        info!(%command, "Sent locker command");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockgate_hardware::HardwareError;
    use lockgate_hardware::mock::MockActuator;
    use rstest::rstest;

    #[rstest]
    #[case(0, "ALL\n")]
    #[case(1, "L1\n")]
    #[case(2, "L2\n")]
    #[case(3, "L3\n")]
    #[tokio::test]
    async fn test_dispatch_mapped_locker(#[case] locker_num: i64, #[case] expected: &str) {
        let (link, mut handle) = MockActuator::new();
        let mut dispatcher = CommandDispatcher::new(link);

        let command = dispatcher.dispatch(locker_num).await.unwrap();

        assert!(command.is_some());
        assert_eq!(handle.sent_lines(), vec![expected.to_string()]);
    }

    #[rstest]
    #[case(4)]
    #[case(-1)]
    #[case(99)]
    #[tokio::test]
    async fn test_dispatch_unmapped_is_noop(#[case] locker_num: i64) {
        let (link, mut handle) = MockActuator::new();
        let mut dispatcher = CommandDispatcher::new(link);

        assert_eq!(dispatcher.dispatch(locker_num).await.unwrap(), None);
        assert!(handle.sent_lines().is_empty());
    }

    #[tokio::test]
    async fn test_command_for_maps_without_writing() {
        let (link, mut handle) = MockActuator::new();
        let dispatcher = CommandDispatcher::new(link);

        assert_eq!(dispatcher.command_for(0), Some(LockerCommand::OpenAll));
        assert_eq!(dispatcher.command_for(3), Some(LockerCommand::Open3));
        assert_eq!(dispatcher.command_for(4), None);
        assert!(handle.sent_lines().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_write_failure_propagates() {
        let (link, _handle) = MockActuator::failing();
        let mut dispatcher = CommandDispatcher::new(link);

        let err = dispatcher.dispatch(1).await.unwrap_err();
        assert!(matches!(err, HardwareError::CommunicationError { .. }));
    }
}
