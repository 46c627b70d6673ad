//! Typed command dispatch.
//!
//! Commands form a closed sum type; dispatch is a compile-time
//! checked match, so an unroutable command cannot exist. Callers
//! that know their command statically can use the typed methods
//! instead and keep the richer return types.

use crate::domain::Release;
use crate::error::Result;

use super::handlers::{
    AddSongsHandler, ApproveDateHandler, CreateReleaseHandler, PaymentReportHandler,
    ProposeDateHandler, PublishHandler, StreamHandler, WithdrawHandler,
};
use super::{
    AddSongsToRelease, ApproveReleaseDate, CreateRelease, ProposeReleaseDate, PublishRelease,
    RecordStream, RequestPaymentReport, WithdrawRelease,
};

/// The closed set of commands this core accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateRelease(CreateRelease),
    AddSongsToRelease(AddSongsToRelease),
    ProposeReleaseDate(ProposeReleaseDate),
    ApproveReleaseDate(ApproveReleaseDate),
    PublishRelease(PublishRelease),
    WithdrawRelease(WithdrawRelease),
    RecordStream(RecordStream),
    RequestPaymentReport(RequestPaymentReport),
}

/// Result value of a dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// The command completed without a result value.
    None,
    /// The command produced a release (creation).
    Release(Release),
}

/// Routes each command to its handler.
pub struct CommandDispatcher {
    create_release: CreateReleaseHandler,
    add_songs: AddSongsHandler,
    propose_date: ProposeDateHandler,
    approve_date: ApproveDateHandler,
    publish: PublishHandler,
    withdraw: WithdrawHandler,
    record_stream: StreamHandler,
    request_payment_report: PaymentReportHandler,
}

impl CommandDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_release: CreateReleaseHandler,
        add_songs: AddSongsHandler,
        propose_date: ProposeDateHandler,
        approve_date: ApproveDateHandler,
        publish: PublishHandler,
        withdraw: WithdrawHandler,
        record_stream: StreamHandler,
        request_payment_report: PaymentReportHandler,
    ) -> Self {
        Self {
            create_release,
            add_songs,
            propose_date,
            approve_date,
            publish,
            withdraw,
            record_stream,
            request_payment_report,
        }
    }

    /// Route a command value to its handler.
    pub async fn dispatch(&self, command: Command) -> Result<Dispatched> {
        match command {
            Command::CreateRelease(c) => {
                self.create_release(c).await.map(Dispatched::Release)
            }
            Command::AddSongsToRelease(c) => {
                self.add_songs(c).await.map(|()| Dispatched::None)
            }
            Command::ProposeReleaseDate(c) => {
                self.propose_release_date(c).await.map(|()| Dispatched::None)
            }
            Command::ApproveReleaseDate(c) => {
                self.approve_release_date(c).await.map(|()| Dispatched::None)
            }
            Command::PublishRelease(c) => {
                self.publish_release(c).await.map(|()| Dispatched::None)
            }
            Command::WithdrawRelease(c) => {
                self.withdraw_release(c).await.map(|()| Dispatched::None)
            }
            Command::RecordStream(c) => {
                self.record_stream(c).await.map(|()| Dispatched::None)
            }
            Command::RequestPaymentReport(c) => self
                .request_payment_report(c)
                .await
                .map(|()| Dispatched::None),
        }
    }

    pub async fn create_release(&self, command: CreateRelease) -> Result<Release> {
        self.create_release.handle(command).await
    }

    pub async fn add_songs(&self, command: AddSongsToRelease) -> Result<()> {
        self.add_songs.handle(command).await
    }

    pub async fn propose_release_date(&self, command: ProposeReleaseDate) -> Result<()> {
        self.propose_date.handle(command).await
    }

    pub async fn approve_release_date(&self, command: ApproveReleaseDate) -> Result<()> {
        self.approve_date.handle(command).await
    }

    pub async fn publish_release(&self, command: PublishRelease) -> Result<()> {
        self.publish.handle(command).await
    }

    pub async fn withdraw_release(&self, command: WithdrawRelease) -> Result<()> {
        self.withdraw.handle(command).await
    }

    pub async fn record_stream(&self, command: RecordStream) -> Result<()> {
        self.record_stream.handle(command).await
    }

    pub async fn request_payment_report(&self, command: RequestPaymentReport) -> Result<()> {
        self.request_payment_report.handle(command).await
    }
}
