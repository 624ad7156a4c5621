//! Session-scoped Kiosk application state

use crate::{
    config::KioskConfig,
    error::{KioskError, Result},
    execution::{Notifier, TransactionExecutor},
    provider::{KioskProvider, ObjectDataOptions, ObjectResponseQuery, PaginationArguments, TransactionResponse},
    query::{fetch_kiosk, FetchKioskOptions, PagedKioskData},
    transaction::{kiosk, TransactionBlock},
    types::{ObjectId, SuiAddress},
    wallet::WalletSigner,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A Kiosk the connected account can manage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedKiosk {
    pub kiosk_id: ObjectId,
    pub owner_cap_id: ObjectId,
}

/// What the session is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No account connected
    Disconnected,
    /// Connected, no Kiosk selected
    Browsing,
    /// Looking at one Kiosk
    Viewing(ObjectId),
}

#[derive(Debug, Default)]
struct SessionState {
    account: Option<SuiAddress>,
    kiosks: Vec<OwnedKiosk>,
    selected: Option<ObjectId>,
    loading: bool,
}

/// One wallet session: the ownership view of the connected address and the
/// selected Kiosk.
pub struct KioskApp {
    provider: Arc<dyn KioskProvider>,
    executor: TransactionExecutor,
    config: KioskConfig,
    state: Arc<RwLock<SessionState>>,
}

impl KioskApp {
    pub fn new(provider: Arc<dyn KioskProvider>, signer: Arc<dyn WalletSigner>) -> Self {
        Self {
            executor: TransactionExecutor::new(provider.clone(), signer),
            provider,
            config: KioskConfig::default(),
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// Create a builder for the app
    pub fn builder() -> KioskAppBuilder {
        KioskAppBuilder::new()
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    pub async fn account(&self) -> Option<SuiAddress> {
        self.state.read().await.account.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn owned_kiosks(&self) -> Vec<OwnedKiosk> {
        self.state.read().await.kiosks.clone()
    }

    pub async fn kiosk_ids(&self) -> Vec<ObjectId> {
        let state = self.state.read().await;
        state.kiosks.iter().map(|kiosk| kiosk.kiosk_id.clone()).collect()
    }

    pub async fn kiosk_owner_caps(&self) -> Vec<ObjectId> {
        let state = self.state.read().await;
        state.kiosks.iter().map(|kiosk| kiosk.owner_cap_id.clone()).collect()
    }

    /// The owner cap paired with `kiosk_id`, if the account holds it
    pub async fn owner_cap_for(&self, kiosk_id: &ObjectId) -> Option<ObjectId> {
        let state = self.state.read().await;
        state
            .kiosks
            .iter()
            .find(|kiosk| &kiosk.kiosk_id == kiosk_id)
            .map(|kiosk| kiosk.owner_cap_id.clone())
    }

    pub async fn view_state(&self) -> ViewState {
        let state = self.state.read().await;
        match (&state.account, &state.selected) {
            (None, _) => ViewState::Disconnected,
            (Some(_), None) => ViewState::Browsing,
            (Some(_), Some(kiosk_id)) => ViewState::Viewing(kiosk_id.clone()),
        }
    }

    /// Switch to `address` and discover its Kiosks
    pub async fn connect(&self, address: SuiAddress) -> Result<()> {
        {
            let mut state = self.state.write().await;
            info!("Connected account {}", address);
            state.account = Some(address);
            state.kiosks.clear();
            state.selected = None;
        }
        self.find_user_kiosks().await
    }

    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        *state = SessionState::default();
        info!("Disconnected");
    }

    /// Replace the ownership list with the owner caps the account holds.
    /// Only the first page of owned caps is read.
    pub async fn find_user_kiosks(&self) -> Result<()> {
        let Some(owner) = self.account().await else {
            return Ok(());
        };

        self.state.write().await.loading = true;
        let discovered = self.query_owner_caps(&owner).await;

        let mut state = self.state.write().await;
        state.loading = false;
        let kiosks = discovered?;
        debug!("Account {} holds {} kiosk owner caps", owner, kiosks.len());

        // the account may have changed while the query was in flight
        if state.account.as_ref() == Some(&owner) {
            state.kiosks = kiosks;
        }
        Ok(())
    }

    async fn query_owner_caps(&self, owner: &SuiAddress) -> Result<Vec<OwnedKiosk>> {
        let query = ObjectResponseQuery::struct_type(
            self.config.owner_cap_type.clone(),
            ObjectDataOptions::default().with_content(),
        );
        let page = self
            .provider
            .get_owned_objects(owner, &query, &PaginationArguments::default())
            .await?;

        Ok(page
            .data
            .iter()
            .filter_map(|cap| {
                let owner_cap_id = cap.object_id()?.clone();
                let kiosk_id = cap.object_fields()?.get("for")?.as_str()?;
                Some(OwnedKiosk {
                    kiosk_id: ObjectId::new(kiosk_id),
                    owner_cap_id,
                })
            })
            .collect())
    }

    /// Create and share a new Kiosk, sending its owner cap to the account.
    ///
    /// The ownership list is refreshed afterwards whether or not execution
    /// succeeded. Returns the execution result, `None` if it was not executed.
    pub async fn create_new_kiosk(&self) -> Result<Option<TransactionResponse>> {
        let Some(owner) = self.account().await else {
            return Ok(None);
        };

        let mut tx = self.new_transaction(&owner);
        let owner_cap = kiosk::create_kiosk_and_share(&mut tx)?;
        let recipient = tx.pure(&owner)?;
        tx.transfer_objects(vec![owner_cap], recipient)?;

        let response = self.executor.sign_and_execute(&tx, None).await;
        if response.is_none() {
            warn!("Kiosk creation for {} was not executed", owner);
        }

        self.find_user_kiosks().await?;
        Ok(response)
    }

    /// Place an owned object into the selected Kiosk
    pub async fn place_item(&self, item_id: &ObjectId, item_type: &str) -> Result<Option<TransactionResponse>> {
        let (owner, selected) = self.selected_kiosk().await?;

        let mut tx = self.new_transaction(&owner);
        kiosk::place(&mut tx, item_type, &selected.kiosk_id, &selected.owner_cap_id, item_id)?;

        self.execute_and_refresh(tx).await
    }

    /// List an item of the selected Kiosk for `price`
    pub async fn list_item(
        &self,
        item_id: &ObjectId,
        item_type: &str,
        price: u64,
    ) -> Result<Option<TransactionResponse>> {
        let (owner, selected) = self.selected_kiosk().await?;

        let mut tx = self.new_transaction(&owner);
        kiosk::list(&mut tx, item_type, &selected.kiosk_id, &selected.owner_cap_id, item_id, price)?;

        self.execute_and_refresh(tx).await
    }

    /// Remove the listing of an item in the selected Kiosk
    pub async fn delist_item(&self, item_id: &ObjectId, item_type: &str) -> Result<Option<TransactionResponse>> {
        let (owner, selected) = self.selected_kiosk().await?;

        let mut tx = self.new_transaction(&owner);
        kiosk::delist(&mut tx, item_type, &selected.kiosk_id, &selected.owner_cap_id, item_id)?;

        self.execute_and_refresh(tx).await
    }

    async fn execute_and_refresh(&self, tx: TransactionBlock) -> Result<Option<TransactionResponse>> {
        let response = self.executor.sign_and_execute(&tx, None).await;
        self.find_user_kiosks().await?;
        Ok(response)
    }

    fn new_transaction(&self, sender: &SuiAddress) -> TransactionBlock {
        let mut tx = TransactionBlock::new();
        tx.set_sender(sender.clone());
        tx.set_gas_budget(self.config.gas_budget);
        tx
    }

    async fn selected_kiosk(&self) -> Result<(SuiAddress, OwnedKiosk)> {
        let state = self.state.read().await;
        let owner = state
            .account
            .clone()
            .ok_or_else(|| KioskError::validation("no account connected"))?;
        let selected = state
            .selected
            .as_ref()
            .ok_or_else(|| KioskError::validation("no kiosk selected"))?;
        let kiosk = state
            .kiosks
            .iter()
            .find(|kiosk| &kiosk.kiosk_id == selected)
            .cloned()
            .ok_or_else(|| KioskError::validation(format!("kiosk {} is no longer owned", selected)))?;
        Ok((owner, kiosk))
    }

    /// Start viewing `kiosk_id`, which must be one of the account's Kiosks
    pub async fn select_kiosk(&self, kiosk_id: &ObjectId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.kiosks.iter().any(|kiosk| &kiosk.kiosk_id == kiosk_id) {
            return Err(KioskError::validation(format!(
                "kiosk {} is not owned by the connected account",
                kiosk_id
            )));
        }
        state.selected = Some(kiosk_id.clone());
        info!("Viewing kiosk {}", kiosk_id);
        Ok(())
    }

    /// View the first discovered Kiosk
    pub async fn select_first_kiosk(&self) -> Result<ObjectId> {
        let first = self
            .kiosk_ids()
            .await
            .into_iter()
            .next()
            .ok_or_else(|| KioskError::validation("the connected account owns no kiosk"))?;
        self.select_kiosk(&first).await?;
        Ok(first)
    }

    pub async fn deselect(&self) {
        self.state.write().await.selected = None;
    }

    /// Fetch one page of the selected Kiosk's contents
    pub async fn view_selected(
        &self,
        pagination: &PaginationArguments,
        options: &FetchKioskOptions,
    ) -> Result<PagedKioskData> {
        let kiosk_id = match self.view_state().await {
            ViewState::Viewing(kiosk_id) => kiosk_id,
            _ => return Err(KioskError::validation("no kiosk selected")),
        };
        fetch_kiosk(self.provider.as_ref(), &kiosk_id, pagination, options).await
    }
}

/// Builder for [`KioskApp`]
pub struct KioskAppBuilder {
    provider: Option<Arc<dyn KioskProvider>>,
    signer: Option<Arc<dyn WalletSigner>>,
    notifier: Option<Arc<dyn Notifier>>,
    config: KioskConfig,
}

impl KioskAppBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            signer: None,
            notifier: None,
            config: KioskConfig::default(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn KioskProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_config(mut self, config: KioskConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the app; provider and signer are required
    pub fn build(self) -> Result<KioskApp> {
        self.config.validate()?;
        let provider = self
            .provider
            .ok_or_else(|| KioskError::config("a provider is required"))?;
        let signer = self
            .signer
            .ok_or_else(|| KioskError::config("a wallet signer is required"))?;

        let mut executor = TransactionExecutor::new(provider.clone(), signer);
        if let Some(notifier) = self.notifier {
            executor = executor.with_notifier(notifier);
        }

        Ok(KioskApp {
            provider,
            executor,
            config: self.config,
            state: Arc::new(RwLock::new(SessionState::default())),
        })
    }
}

impl Default for KioskAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
