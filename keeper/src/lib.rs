// canvote-keeper: finalizes proposals whose voting window has closed.

use canvote_sdk::{
    lifecycle::{display_status, DisplayStatus, LifecycleError},
    rpc::LedgerRpc,
    signer::WalletSigner,
    ActionOutcome, GovernanceSession, SdkResult,
};
use log::{debug, info, warn};

/// Tally of one pass over the proposal list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub upcoming: usize,
    pub active: usize,
    pub settled: usize,
    pub finalized: usize,
    pub failed: usize,
}

/// One keeper pass: list proposals and finalize every one that has ended but
/// is still stored as Active. A failed finalization is logged and counted;
/// it does not stop the pass.
pub async fn sweep<R, S>(session: &GovernanceSession<R, S>) -> SdkResult<SweepReport>
where
    R: LedgerRpc,
    S: WalletSigner,
{
    let now = session.now();
    let variant = session.program().variant;
    let proposals = session.fetch_proposals().await?;
    let mut report = SweepReport::default();

    for entry in proposals {
        let id = entry.proposal.id;
        match display_status(&entry.proposal, now) {
            DisplayStatus::Upcoming => report.upcoming += 1,
            DisplayStatus::Active => report.active += 1,
            DisplayStatus::Passed | DisplayStatus::Rejected => report.settled += 1,
            DisplayStatus::Ended => match session.finalize(id).await {
                Ok(ActionOutcome::Confirmed(signature)) => {
                    info!("[FINALIZE] proposal {} ({}) -> {}", id, entry.address, signature);
                    report.finalized += 1;
                }
                Ok(ActionOutcome::SignerRejected) => {
                    warn!("[FINALIZE] proposal {}: signer declined", id);
                    report.failed += 1;
                }
                // Somebody else got there between the listing and our send.
                Err(e) if e.rejected_rule(variant) == Some(LifecycleError::AlreadyFinalized) => {
                    debug!("[FINALIZE] proposal {} already settled", id);
                    report.settled += 1;
                }
                Err(e) => {
                    warn!("[FINALIZE] proposal {}: {}", id, e);
                    report.failed += 1;
                }
            },
        }
    }

    Ok(report)
}
