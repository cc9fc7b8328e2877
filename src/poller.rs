//! Account-keyed balance poller.

use crate::event::DappEvent;
use crate::token::TokenClient;
use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic `balanceOf(account)` reader.
///
/// One poller exists per connected account. Replacing or dropping it
/// cancels the task, including a read that is still in flight, so a slow
/// read for the previous account can't land after a switch.
pub struct BalancePoller {
    account: Address,
    token: CancellationToken,
}

impl BalancePoller {
    pub fn start(
        runtime: &Handle,
        client: Arc<dyn TokenClient>,
        account: Address,
        session: u64,
        period: Duration,
        events: mpsc::UnboundedSender<DappEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::debug!(?account, session, "Balance poller started");

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let read = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    read = client.balance_of(account) => read,
                };

                match read {
                    Ok(balance) => {
                        let event = DappEvent::Balance {
                            session,
                            account,
                            balance,
                        };
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    // Keep the last known balance and try again next period
                    Err(e) => tracing::warn!(?account, "Balance poll failed: {}", e),
                }
            }

            tracing::debug!(?account, session, "Balance poller stopped");
        });

        Self { account, token }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for BalancePoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockToken;
    use ethers::types::U256;

    const PERIOD: Duration = Duration::from_millis(10);

    async fn next_balance(rx: &mut mpsc::UnboundedReceiver<DappEvent>) -> (u64, Address, U256) {
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("poller produced no event")
            .expect("channel closed");
        match event {
            DappEvent::Balance {
                session,
                account,
                balance,
            } => (session, account, balance),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poller_reports_balance_repeatedly() {
        let account = Address::repeat_byte(1);
        let token = Arc::new(MockToken::new("My Hardhat Token", "MHT"));
        token.set_balance(account, 100);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let poller = BalancePoller::start(&Handle::current(), token.clone(), account, 4, PERIOD, tx);
        assert_eq!(poller.account(), account);
        assert!(poller.is_running());

        assert_eq!(next_balance(&mut rx).await, (4, account, U256::from(100u64)));
        token.set_balance(account, 42);
        // Drain until the new value shows up
        loop {
            let (_, _, balance) = next_balance(&mut rx).await;
            if balance == U256::from(42u64) {
                break;
            }
        }
        assert!(token.balance_reads() >= 2);
    }

    #[tokio::test]
    async fn test_dropping_poller_stops_reads() {
        let account = Address::repeat_byte(1);
        let token = Arc::new(MockToken::new("My Hardhat Token", "MHT"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let poller = BalancePoller::start(&Handle::current(), token.clone(), account, 1, PERIOD, tx);
        next_balance(&mut rx).await;
        drop(poller);

        // The task exits and drops the only sender
        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());

        let reads = token.balance_reads();
        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(token.balance_reads(), reads);
    }
}
