//! Sign-and-submit helper

use crate::{
    error::Result,
    provider::{KioskProvider, TransactionResponse, TransactionResponseOptions},
    transaction::TransactionBlock,
    wallet::WalletSigner,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Surface for transient user-facing messages
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Signs transactions with the wallet and executes them through the provider
#[derive(Clone)]
pub struct TransactionExecutor {
    provider: Arc<dyn KioskProvider>,
    signer: Arc<dyn WalletSigner>,
    notifier: Arc<dyn Notifier>,
}

impl TransactionExecutor {
    pub fn new(provider: Arc<dyn KioskProvider>, signer: Arc<dyn WalletSigner>) -> Self {
        Self {
            provider,
            signer,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn signer(&self) -> &Arc<dyn WalletSigner> {
        &self.signer
    }

    /// Sign and execute `tx`. `options` defaults to effects only.
    ///
    /// Never fails: any signing or submission error is reported through the
    /// notifier and `None` is returned. Nothing is retried.
    pub async fn sign_and_execute(
        &self,
        tx: &TransactionBlock,
        options: Option<TransactionResponseOptions>,
    ) -> Option<TransactionResponse> {
        let options = options.unwrap_or_else(TransactionResponseOptions::effects);

        match self.try_sign_and_execute(tx, &options).await {
            Ok(response) => {
                debug!("Executed transaction {}", response.digest);
                Some(response)
            },
            Err(e) => {
                self.notifier.error(&e.to_string());
                None
            },
        }
    }

    async fn try_sign_and_execute(
        &self,
        tx: &TransactionBlock,
        options: &TransactionResponseOptions,
    ) -> Result<TransactionResponse> {
        let signed = self.signer.sign_transaction_block(tx).await?;
        self.provider
            .execute_transaction_block(&signed.transaction_block_bytes, &signed.signature, options)
            .await
    }
}
