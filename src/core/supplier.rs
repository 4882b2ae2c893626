//! Suppliers, their price book and price comparison.
//!
//! A supplier keeps one current price entry per material. Adding a new price
//! for the same material retires the previous entry, so the price history is
//! kept but only the latest entry takes part in comparisons.

use crate::{
    core::{lookup, money},
    entities::{
        BudgetItem, Material, RealExpense, Supplier, SupplierPrice, SupplierType, budget_item,
        real_expense, supplier, supplier_price,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Iterable, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::info;

const fn default_rating() -> i32 {
    3
}

const fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Fields a client supplies for a supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    /// Legal name
    pub name: String,
    /// Trading name, shown instead of the legal name when set
    #[serde(default)]
    pub commercial_name: String,
    /// What the supplier sells
    pub supplier_type: SupplierType,
    /// Who to ask for
    #[serde(default)]
    pub contact_person: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// City
    #[serde(default)]
    pub city: String,
    /// Area within the city
    #[serde(default)]
    pub zone: String,
    /// Rating from 1 to 5, defaults to 3
    #[serde(default = "default_rating")]
    pub rating: i32,
    /// Agreed payment terms
    #[serde(default)]
    pub payment_terms: String,
    /// Usual delivery lead time
    #[serde(default)]
    pub delivery_time: String,
    /// Smallest order accepted
    pub minimum_order: Option<Decimal>,
    /// Whether the supplier delivers
    #[serde(default)]
    pub offers_delivery: bool,
    /// Flat delivery charge per order
    pub delivery_cost: Option<Decimal>,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Inactive suppliers are left out of comparisons
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Listed first when quotes tie
    #[serde(default)]
    pub is_preferred: bool,
}

impl SupplierInput {
    /// Minimal active supplier with the default rating.
    #[must_use]
    pub fn new(name: &str, supplier_type: SupplierType) -> Self {
        Self {
            name: name.to_string(),
            commercial_name: String::new(),
            supplier_type,
            contact_person: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            city: String::new(),
            zone: String::new(),
            rating: default_rating(),
            payment_terms: String::new(),
            delivery_time: String::new(),
            minimum_order: None,
            offers_delivery: false,
            delivery_cost: None,
            notes: String::new(),
            is_active: true,
            is_preferred: false,
        }
    }
}

/// One price-book entry to add for a supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceInput {
    /// Material priced
    pub material_id: i64,
    /// Price per unit
    pub price: Decimal,
    /// ISO currency code, defaults to USD
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Flat discount in percent, 0 to 100
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Quantity from which the bulk discount applies
    pub bulk_discount_threshold: Option<Decimal>,
    /// Bulk discount in percent, replaces the flat one
    pub bulk_discount_percentage: Option<Decimal>,
    /// Defaults to today
    pub valid_from: Option<NaiveDate>,
    /// Last day the price holds
    pub valid_until: Option<NaiveDate>,
}

impl PriceInput {
    /// A plain price in the default currency, valid from today, no discounts.
    #[must_use]
    pub fn new(material_id: i64, price: Decimal) -> Self {
        Self {
            material_id,
            price,
            currency: default_currency(),
            discount_percentage: Decimal::ZERO,
            bulk_discount_threshold: None,
            bulk_discount_percentage: None,
            valid_from: None,
            valid_until: None,
        }
    }
}

/// Supplier list filters; they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    /// Only this type
    pub supplier_type: Option<SupplierType>,
    /// Only this city
    pub city: Option<String>,
    /// Substring match on the zone
    pub zone: Option<String>,
    /// Only suppliers rated at least this
    pub min_rating: Option<i32>,
    /// Only preferred or non-preferred suppliers
    pub is_preferred: Option<bool>,
    /// Only suppliers that do or do not deliver
    pub offers_delivery: Option<bool>,
    /// Include inactive suppliers
    #[serde(default)]
    pub include_inactive: bool,
    /// Substring match on name, commercial name or contact person
    pub search: Option<String>,
}

fn validate(input: &SupplierInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    if !(1..=5).contains(&input.rating) {
        return Err(Error::validation(format!(
            "rating must be between 1 and 5 (got {})",
            input.rating
        )));
    }
    if let Some(cost) = input.delivery_cost {
        money::non_negative_money("delivery_cost", cost)?;
    }
    if let Some(minimum) = input.minimum_order {
        money::non_negative_money("minimum_order", minimum)?;
    }
    Ok(())
}

fn percentage(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(Error::validation(format!(
            "{field} must be between 0 and 100 (got {value})"
        )));
    }
    Ok(money::round_money(value))
}

/// Creates a supplier.
pub async fn create_supplier<C>(db: &C, input: SupplierInput) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    validate(&input)?;

    let now = chrono::Utc::now();
    let model = supplier::ActiveModel {
        name: Set(input.name.trim().to_string()),
        commercial_name: Set(input.commercial_name),
        supplier_type: Set(input.supplier_type),
        contact_person: Set(input.contact_person),
        phone: Set(input.phone),
        email: Set(input.email),
        address: Set(input.address),
        city: Set(input.city),
        zone: Set(input.zone),
        rating: Set(input.rating),
        payment_terms: Set(input.payment_terms),
        delivery_time: Set(input.delivery_time),
        minimum_order: Set(input.minimum_order.map(money::round_money)),
        offers_delivery: Set(input.offers_delivery),
        delivery_cost: Set(input.delivery_cost.map(money::round_money)),
        notes: Set(input.notes),
        is_active: Set(input.is_active),
        is_preferred: Set(input.is_preferred),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Retrieves a supplier by id.
pub async fn get_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<supplier::Model> {
    lookup::require::<Supplier, _>(db, "Supplier", supplier_id).await
}

/// Replaces a supplier's fields.
pub async fn update_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
    input: SupplierInput,
) -> Result<supplier::Model> {
    validate(&input)?;
    let existing = get_supplier(db, supplier_id).await?;

    let mut model: supplier::ActiveModel = existing.into();
    model.name = Set(input.name.trim().to_string());
    model.commercial_name = Set(input.commercial_name);
    model.supplier_type = Set(input.supplier_type);
    model.contact_person = Set(input.contact_person);
    model.phone = Set(input.phone);
    model.email = Set(input.email);
    model.address = Set(input.address);
    model.city = Set(input.city);
    model.zone = Set(input.zone);
    model.rating = Set(input.rating);
    model.payment_terms = Set(input.payment_terms);
    model.delivery_time = Set(input.delivery_time);
    model.minimum_order = Set(input.minimum_order.map(money::round_money));
    model.offers_delivery = Set(input.offers_delivery);
    model.delivery_cost = Set(input.delivery_cost.map(money::round_money));
    model.notes = Set(input.notes);
    model.is_active = Set(input.is_active);
    model.is_preferred = Set(input.is_preferred);
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes a supplier and its price book, clearing ledger references to it.
pub async fn delete_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let supplier = lookup::require::<Supplier, _>(&txn, "Supplier", supplier_id).await?;

    BudgetItem::update_many()
        .col_expr(budget_item::Column::SupplierId, Expr::value(Option::<i64>::None))
        .filter(budget_item::Column::SupplierId.eq(supplier_id))
        .exec(&txn)
        .await?;
    RealExpense::update_many()
        .col_expr(real_expense::Column::SupplierId, Expr::value(Option::<i64>::None))
        .filter(real_expense::Column::SupplierId.eq(supplier_id))
        .exec(&txn)
        .await?;
    SupplierPrice::delete_many()
        .filter(supplier_price::Column::SupplierId.eq(supplier_id))
        .exec(&txn)
        .await?;

    supplier.delete(&txn).await?;
    txn.commit().await?;

    info!(supplier_id, "Supplier deleted");
    Ok(())
}

/// Lists suppliers by name; inactive ones are hidden by default.
pub async fn list_suppliers(
    db: &DatabaseConnection,
    filter: &SupplierFilter,
) -> Result<Vec<supplier::Model>> {
    let mut query = Supplier::find();

    if !filter.include_inactive {
        query = query.filter(supplier::Column::IsActive.eq(true));
    }
    if let Some(supplier_type) = filter.supplier_type {
        query = query.filter(supplier::Column::SupplierType.eq(supplier_type));
    }
    if let Some(city) = &filter.city {
        query = query.filter(supplier::Column::City.eq(city.as_str()));
    }
    if let Some(zone) = &filter.zone {
        query = query.filter(supplier::Column::Zone.contains(zone.as_str()));
    }
    if let Some(min_rating) = filter.min_rating {
        query = query.filter(supplier::Column::Rating.gte(min_rating));
    }
    if let Some(preferred) = filter.is_preferred {
        query = query.filter(supplier::Column::IsPreferred.eq(preferred));
    }
    if let Some(delivery) = filter.offers_delivery {
        query = query.filter(supplier::Column::OffersDelivery.eq(delivery));
    }
    if let Some(search) = &filter.search {
        let s = search.as_str();
        query = query.filter(
            supplier::Column::Name
                .contains(s)
                .or(supplier::Column::CommercialName.contains(s))
                .or(supplier::Column::ContactPerson.contains(s)),
        );
    }

    query
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active suppliers for budget pickers: preferred first, then by name.
pub async fn suppliers_for_budget(db: &DatabaseConnection) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::IsActive.eq(true))
        .order_by_desc(supplier::Column::IsPreferred)
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a current price entry, retiring the supplier's previous entry for the material.
pub async fn add_price<C>(db: &C, supplier_id: i64, input: PriceInput) -> Result<supplier_price::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let price = money::positive_money("price", input.price)?;
    let discount_percentage = percentage("discount_percentage", input.discount_percentage)?;
    let bulk_discount_percentage = input
        .bulk_discount_percentage
        .map(|p| percentage("bulk_discount_percentage", p))
        .transpose()?;
    if let Some(threshold) = input.bulk_discount_threshold {
        money::positive_quantity("bulk_discount_threshold", threshold)?;
    }
    let valid_from = input
        .valid_from
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    if input.valid_until.is_some_and(|until| until < valid_from) {
        return Err(Error::validation("valid_until cannot be before valid_from"));
    }

    let txn = db.begin().await?;
    lookup::require::<Supplier, _>(&txn, "Supplier", supplier_id).await?;
    lookup::require::<Material, _>(&txn, "Material", input.material_id).await?;

    SupplierPrice::update_many()
        .col_expr(supplier_price::Column::IsCurrent, Expr::value(false))
        .filter(supplier_price::Column::SupplierId.eq(supplier_id))
        .filter(supplier_price::Column::MaterialId.eq(input.material_id))
        .exec(&txn)
        .await?;

    let now = chrono::Utc::now();
    let entry = supplier_price::ActiveModel {
        supplier_id: Set(supplier_id),
        material_id: Set(input.material_id),
        price: Set(price),
        currency: Set(input.currency),
        discount_percentage: Set(discount_percentage),
        bulk_discount_threshold: Set(input.bulk_discount_threshold),
        bulk_discount_percentage: Set(bulk_discount_percentage),
        valid_from: Set(valid_from),
        valid_until: Set(input.valid_until),
        is_current: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(entry)
}

/// Current price entries of a supplier.
pub async fn prices_for(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<Vec<supplier_price::Model>> {
    get_supplier(db, supplier_id).await?;

    SupplierPrice::find()
        .filter(supplier_price::Column::SupplierId.eq(supplier_id))
        .filter(supplier_price::Column::IsCurrent.eq(true))
        .order_by_asc(supplier_price::Column::MaterialId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One supplier's offer in a price comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    /// Supplier quoting
    pub supplier_id: i64,
    /// Supplier display name
    pub supplier_name: String,
    /// Preferred supplier
    pub is_preferred: bool,
    /// Currency of the quote
    pub currency: String,
    /// Listed price per unit
    pub unit_price: Decimal,
    /// Unit price after the discount in effect
    pub final_unit_price: Decimal,
    /// Discount percentage in effect
    pub discount_applied: Decimal,
    /// Whether the bulk discount replaced the flat one
    pub bulk_discount_applied: bool,
    /// Discounted unit price times quantity
    pub total_cost: Decimal,
    /// Delivery charge, zero without delivery
    pub delivery_cost: Decimal,
    /// Total cost plus delivery
    pub total_with_delivery: Decimal,
}

impl PriceQuote {
    /// Quotes `quantity` units from one price entry.
    ///
    /// The bulk percentage replaces the flat one once `quantity` reaches the
    /// threshold; the two never stack.
    #[must_use]
    pub fn new(price: &supplier_price::Model, supplier: &supplier::Model, quantity: Decimal) -> Self {
        let final_unit_price = price.unit_price_for(quantity);
        let total_cost = money::round_money(final_unit_price * quantity);
        let delivery_cost = supplier.delivery_surcharge();

        Self {
            supplier_id: supplier.id,
            supplier_name: supplier.display_name().to_string(),
            is_preferred: supplier.is_preferred,
            currency: price.currency.clone(),
            unit_price: price.price,
            final_unit_price: money::round_money(final_unit_price),
            discount_applied: price.effective_discount_percentage(quantity),
            bulk_discount_applied: price.bulk_applies(quantity),
            total_cost,
            delivery_cost,
            total_with_delivery: total_cost + delivery_cost,
        }
    }
}

/// Quotes from every active supplier with a current price.
#[derive(Debug, Clone, Serialize)]
pub struct PriceComparison {
    /// Material compared
    pub material_id: i64,
    /// Quantity quoted
    pub quantity_requested: Decimal,
    /// Number of quotes
    pub suppliers_count: usize,
    /// Cheapest delivered total, if any
    pub best_price: Option<PriceQuote>,
    /// Every quote, cheapest delivered total first
    pub all_prices: Vec<PriceQuote>,
}

/// Compares current prices of active suppliers for `quantity` units of a material.
pub async fn compare_prices(
    db: &DatabaseConnection,
    material_id: i64,
    quantity: Decimal,
) -> Result<PriceComparison> {
    let quantity = money::positive_quantity("quantity", quantity)?;
    lookup::require::<Material, _>(db, "Material", material_id).await?;

    let rows = SupplierPrice::find()
        .find_also_related(Supplier)
        .filter(supplier_price::Column::MaterialId.eq(material_id))
        .filter(supplier_price::Column::IsCurrent.eq(true))
        .filter(supplier::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut quotes: Vec<PriceQuote> = rows
        .iter()
        .filter_map(|(price, supplier)| {
            supplier
                .as_ref()
                .map(|s| PriceQuote::new(price, s, quantity))
        })
        .collect();
    quotes.sort_by(|a, b| {
        a.total_with_delivery
            .cmp(&b.total_with_delivery)
            .then_with(|| b.is_preferred.cmp(&a.is_preferred))
    });

    Ok(PriceComparison {
        material_id,
        quantity_requested: quantity,
        suppliers_count: quotes.len(),
        best_price: quotes.first().cloned(),
        all_prices: quotes,
    })
}

/// Number of suppliers of one type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    /// Type counted
    pub supplier_type: SupplierType,
    /// Suppliers of that type
    pub count: u64,
}

/// Number of suppliers in one city.
#[derive(Debug, Clone, Serialize)]
pub struct CityCount {
    /// City counted
    pub city: String,
    /// Suppliers in it
    pub count: u64,
}

/// Aggregate figures over active suppliers.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierStats {
    /// Active suppliers
    pub total_suppliers: u64,
    /// Count per type
    pub by_type: Vec<TypeCount>,
    /// Ten cities with the most suppliers
    pub by_city: Vec<CityCount>,
    /// Mean rating, to cents
    pub average_rating: Decimal,
    /// Preferred suppliers
    pub preferred_count: u64,
    /// Suppliers that deliver
    pub with_delivery: u64,
}

/// Counts and averages over active suppliers.
pub async fn supplier_stats(db: &DatabaseConnection) -> Result<SupplierStats> {
    let suppliers = list_suppliers(db, &SupplierFilter::default()).await?;
    let total = suppliers.len() as u64;

    let by_type = SupplierType::iter()
        .map(|supplier_type| TypeCount {
            supplier_type,
            count: suppliers
                .iter()
                .filter(|s| s.supplier_type == supplier_type)
                .count() as u64,
        })
        .collect();

    let mut by_city: Vec<CityCount> = Vec::new();
    for s in suppliers.iter().filter(|s| !s.city.is_empty()) {
        match by_city.iter_mut().find(|c| c.city == s.city) {
            Some(entry) => entry.count += 1,
            None => by_city.push(CityCount {
                city: s.city.clone(),
                count: 1,
            }),
        }
    }
    by_city.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.city.cmp(&b.city)));
    by_city.truncate(10);

    let average_rating = if total > 0 {
        let sum: i64 = suppliers.iter().map(|s| i64::from(s.rating)).sum();
        money::round_money(Decimal::from(sum) / Decimal::from(total))
    } else {
        Decimal::ZERO
    };

    Ok(SupplierStats {
        total_suppliers: total,
        by_type,
        by_city,
        average_rating,
        preferred_count: suppliers.iter().filter(|s| s.is_preferred).count() as u64,
        with_delivery: suppliers.iter().filter(|s| s.offers_delivery).count() as u64,
    })
}
