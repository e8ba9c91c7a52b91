//! # Product Provenance Contract
//!
//! Tracks a product's chain of custody from the registering farmer to the
//! final consumer.
//!
//! ```text
//! ACTIVE ──(complete)──▶ COMPLETED
//! ```
//!
//! Every operation appends exactly one [`CustodyEvent`]; the list is never
//! reordered or trimmed. The last event names the current custodian.
//! `COMPLETED` is terminal.

use serde::{Deserialize, Serialize};

use prov_core::{
    ContractError, LedgerRecord, ProductId, RecordKind, RecordedTime, Timestamp, TransactionId,
};
use prov_ledger::TransactionContext;

use crate::store;

/// Role recorded on the registration event.
pub const FARMER_ROLE: &str = "Farmer";

/// Role recorded on the completion event.
pub const CONSUMER_ROLE: &str = "Consumer";

/// Custodian name recorded on the completion event.
pub const CONSUMER_NAME: &str = "Final Consumer";

/// Custodian location recorded on the completion event.
pub const CONSUMER_LOCATION: &str = "End User";

/// Name of the event emitted on completion.
pub const PRODUCT_COMPLETED: &str = "ProductCompleted";

/// Handling text used when completion carries no consumer info.
pub const DEFAULT_PURCHASE_INFO: &str = "Product purchased by consumer";

/// Lifecycle state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    /// In the supply chain.
    Active,
    /// Sold to the final consumer. Terminal.
    Completed,
}

impl ProductStatus {
    /// The wire literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether no further custody changes are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One custody handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyEvent {
    /// Free-form role, e.g. `Farmer`, `Distributor`, `Retailer`.
    pub role: String,
    /// Custodian display name.
    pub name: String,
    pub location: String,
    pub timestamp: RecordedTime,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handling_info: String,
    pub transaction_id: TransactionId,
    /// Stored fields this type does not model, written back as read.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CustodyEvent {
    /// A handoff stamped at `at`.
    pub fn new(
        role: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        at: Timestamp,
        handling_info: impl Into<String>,
        transaction_id: TransactionId,
    ) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            location: location.into(),
            timestamp: at.into(),
            handling_info: handling_info.into(),
            transaction_id,
            extra: serde_json::Map::new(),
        }
    }
}

/// Registering farmer, parsed from the JSON `farmerDetails` argument.
/// Fields other than these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDetails {
    pub name: String,
    pub location: String,
}

/// Descriptive product attributes, parsed from the JSON `productDetails`
/// argument. Fields other than these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub product_type: String,
    pub batch_size: String,
    pub harvest_date: String,
}

fn parse_details<T: serde::de::DeserializeOwned>(
    arg: &'static str,
    json: &str,
) -> Result<T, ContractError> {
    serde_json::from_str(json).map_err(|e| ContractError::invalid_argument(arg, e.to_string()))
}

fn require_non_empty(arg: &str, field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::invalid_argument(
            arg,
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

impl FarmerDetails {
    /// Parse and check the registration argument.
    pub fn parse(json: &str) -> Result<Self, ContractError> {
        let details: Self = parse_details("farmerDetails", json)?;
        require_non_empty("farmerDetails", "name", &details.name)?;
        require_non_empty("farmerDetails", "location", &details.location)?;
        Ok(details)
    }
}

impl ProductDetails {
    /// Parse and check the registration argument.
    pub fn parse(json: &str) -> Result<Self, ContractError> {
        let details: Self = parse_details("productDetails", json)?;
        require_non_empty("productDetails", "productType", &details.product_type)?;
        require_non_empty("productDetails", "batchSize", &details.batch_size)?;
        require_non_empty("productDetails", "harvestDate", &details.harvest_date)?;
        Ok(details)
    }
}

/// A product as stored on the ledger.
///
/// Fields written by other clients (`variety`, `basePrice`, ...) are kept
/// in `extra` and survive every rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    product_id: ProductId,
    product_type: String,
    batch_size: String,
    harvest_date: String,
    status: ProductStatus,
    transactions: Vec<CustodyEvent>,
    created_at: RecordedTime,
    updated_at: RecordedTime,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl LedgerRecord for ProductRecord {
    const KIND: RecordKind = RecordKind::Product;

    fn key(&self) -> &str {
        self.product_id.as_str()
    }
}

impl ProductRecord {
    /// A newly registered product whose only custodian is the farmer.
    pub fn register(
        product_id: ProductId,
        farmer: FarmerDetails,
        details: ProductDetails,
        at: Timestamp,
        transaction_id: TransactionId,
    ) -> Self {
        let handling_info = format!("Product registered - {}", details.product_type);
        Self {
            product_id,
            product_type: details.product_type,
            batch_size: details.batch_size,
            harvest_date: details.harvest_date,
            status: ProductStatus::Active,
            transactions: vec![CustodyEvent::new(
                FARMER_ROLE,
                farmer.name,
                farmer.location,
                at,
                handling_info,
                transaction_id,
            )],
            created_at: at.into(),
            updated_at: at.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// World-state key of the product.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Kind of produce, e.g. `Tomatoes`.
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// Batch size as registered.
    pub fn batch_size(&self) -> &str {
        &self.batch_size
    }

    /// Harvest date as registered.
    pub fn harvest_date(&self) -> &str {
        &self.harvest_date
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ProductStatus {
        self.status
    }

    /// Custody chain, oldest first.
    pub fn transactions(&self) -> &[CustodyEvent] {
        &self.transactions
    }

    /// The current custodian.
    pub fn current_custodian(&self) -> Option<&CustodyEvent> {
        self.transactions.last()
    }

    /// Registration time. Never changes after register.
    pub fn created_at(&self) -> &RecordedTime {
        &self.created_at
    }

    /// Time of the latest custody entry.
    pub fn updated_at(&self) -> &RecordedTime {
        &self.updated_at
    }

    /// Stored top-level fields outside the modelled set.
    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Hand the product to a new custodian (ACTIVE only).
    pub fn transfer(&mut self, event: CustodyEvent) -> Result<(), ContractError> {
        self.require_active("transfer ownership")?;
        self.push(event);
        Ok(())
    }

    /// ACTIVE → COMPLETED, with the final consumer as custodian.
    pub fn complete(
        &mut self,
        consumer_info: &str,
        at: Timestamp,
        transaction_id: TransactionId,
    ) -> Result<(), ContractError> {
        self.require_active("complete")?;
        let handling_info = if consumer_info.is_empty() {
            DEFAULT_PURCHASE_INFO.to_string()
        } else {
            consumer_info.to_string()
        };
        self.push(CustodyEvent::new(
            CONSUMER_ROLE,
            CONSUMER_NAME,
            CONSUMER_LOCATION,
            at,
            handling_info,
            transaction_id,
        ));
        self.status = ProductStatus::Completed;
        Ok(())
    }

    fn push(&mut self, event: CustodyEvent) {
        self.updated_at = event.timestamp.clone();
        self.transactions.push(event);
    }

    fn require_active(&self, operation: &'static str) -> Result<(), ContractError> {
        if self.status.is_terminal() {
            return Err(ContractError::InvalidState {
                kind: RecordKind::Product,
                id: self.product_id.to_string(),
                status: self.status.to_string(),
                operation,
            });
        }
        Ok(())
    }
}

/// Payload of the `ProductCompleted` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCompleted {
    pub product_id: ProductId,
    pub status: ProductStatus,
}

/// The product provenance contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductContract;

impl ProductContract {
    pub fn new() -> Self {
        Self
    }

    /// Whether a record exists under `product_id`.
    pub fn product_exists<C>(&self, ctx: &C, product_id: &str) -> Result<bool, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = ProductId::new(product_id)?;
        store::exists(ctx.stub(), id.as_str())
    }

    /// Register an ACTIVE product with the farmer as first custodian.
    pub fn register_product<C>(
        &self,
        ctx: &mut C,
        product_id: &str,
        farmer_details: &str,
        product_details: &str,
    ) -> Result<ProductRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = ProductId::new(product_id)?;
        store::ensure_absent::<ProductRecord>(ctx.stub(), id.as_str())?;
        let farmer = FarmerDetails::parse(farmer_details)?;
        let details = ProductDetails::parse(product_details)?;

        let at = ctx.stub().tx_timestamp();
        let record = ProductRecord::register(id, farmer, details, at, TransactionId::generate());
        store::store(ctx.stub_mut(), &record)?;

        tracing::info!(
            product_id = %record.product_id,
            product_type = %record.product_type,
            caller = %ctx.client_identity().msp_id(),
            tx_id = ctx.stub().tx_id(),
            "product registered"
        );
        Ok(record)
    }

    /// Append a custody handoff to an ACTIVE product.
    ///
    /// An empty `handling_info` becomes `Ownership transferred to {role}`.
    pub fn transfer_ownership<C>(
        &self,
        ctx: &mut C,
        product_id: &str,
        role: &str,
        name: &str,
        location: &str,
        handling_info: &str,
    ) -> Result<ProductRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = ProductId::new(product_id)?;
        let mut record: ProductRecord = store::load(ctx.stub(), id.as_str())?;

        let handling_info = if handling_info.is_empty() {
            format!("Ownership transferred to {role}")
        } else {
            handling_info.to_string()
        };
        record.transfer(CustodyEvent::new(
            role,
            name,
            location,
            ctx.stub().tx_timestamp(),
            handling_info,
            TransactionId::generate(),
        ))?;
        store::store(ctx.stub_mut(), &record)?;

        tracing::info!(
            product_id = %record.product_id,
            role,
            custody_events = record.transactions.len(),
            caller = %ctx.client_identity().msp_id(),
            "custody transferred"
        );
        Ok(record)
    }

    /// Hand an ACTIVE product to the final consumer and emit
    /// `ProductCompleted`.
    pub fn complete_product<C>(
        &self,
        ctx: &mut C,
        product_id: &str,
        consumer_info: &str,
    ) -> Result<ProductRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = ProductId::new(product_id)?;
        let mut record: ProductRecord = store::load(ctx.stub(), id.as_str())?;
        let at = ctx.stub().tx_timestamp();
        record.complete(consumer_info, at, TransactionId::generate())?;

        store::store(ctx.stub_mut(), &record)?;
        store::emit(
            ctx.stub_mut(),
            PRODUCT_COMPLETED,
            &ProductCompleted {
                product_id: record.product_id.clone(),
                status: record.status,
            },
        )?;

        tracing::info!(
            product_id = %record.product_id,
            custody_events = record.transactions.len(),
            caller = %ctx.client_identity().msp_id(),
            tx_id = ctx.stub().tx_id(),
            "product completed"
        );
        Ok(record)
    }

    /// The stored product with its full custody chain.
    pub fn get_product_history<C>(
        &self,
        ctx: &C,
        product_id: &str,
    ) -> Result<ProductRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = ProductId::new(product_id)?;
        store::load(ctx.stub(), id.as_str())
    }

    /// Every decodable product in the keyspace, in substrate key order.
    /// Values that are not products are skipped.
    pub fn get_all_products<C>(&self, ctx: &C) -> Result<Vec<ProductRecord>, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        store::scan_all(ctx.stub())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
