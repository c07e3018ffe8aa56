use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merx_catalog::{NewProduct, Product, ProductRepository};
use merx_core::{money, DomainError, DomainResult};
use merx_directory::{Customer, CustomerRepository, NewCustomer};
use merx_order::{NewOrderItem, Order, OrderItem, OrderRepository};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    customer_seq: i64,
    product_seq: i64,
    order_seq: i64,
    item_seq: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

/// In-memory store backing all three repositories. Every operation runs
/// under one mutex, so mutations are single-writer and `create` is atomic:
/// all stock checks happen before any table changes.
pub struct MemStore {
    tables: Mutex<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerRepository for MemStore {
    async fn insert(&self, new: NewCustomer) -> DomainResult<Customer> {
        let mut tables = self.tables.lock().await;

        if tables.customers.values().any(|c| c.email == new.email) {
            return Err(DomainError::DuplicateEmail(new.email));
        }

        let id = next(&mut tables.customer_seq);
        let customer = Customer {
            id,
            name: new.name,
            email: new.email,
            created_at: Utc::now(),
        };
        tables.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn find(&self, id: i64) -> DomainResult<Option<Customer>> {
        let tables = self.tables.lock().await;
        Ok(tables.customers.get(&id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Customer>> {
        let tables = self.tables.lock().await;
        Ok(tables.customers.values().cloned().collect())
    }
}

#[async_trait]
impl ProductRepository for MemStore {
    async fn insert(&self, new: NewProduct) -> DomainResult<Product> {
        let mut tables = self.tables.lock().await;

        let id = next(&mut tables.product_seq);
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            created_at: Utc::now(),
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn find(&self, id: i64) -> DomainResult<Option<Product>> {
        let tables = self.tables.lock().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> DomainResult<Product> {
        let mut tables = self.tables.lock().await;

        let product = tables
            .products
            .get_mut(&id)
            .ok_or(DomainError::NotFound {
                entity: "product",
                id,
            })?;

        let adjusted = product.stock + delta;
        if adjusted < 0 {
            warn!("Rejected stock adjustment on product {}: {} + {}", id, product.stock, delta);
            return Err(DomainError::InsufficientStock {
                product_id: id,
                requested: -delta,
                available: product.stock,
            });
        }

        product.stock = adjusted;
        Ok(product.clone())
    }

    async fn below_stock(&self, threshold: i64) -> DomainResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.stock < threshold)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for MemStore {
    async fn create(
        &self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
        items: Vec<NewOrderItem>,
    ) -> DomainResult<(Order, Vec<OrderItem>)> {
        let mut tables = self.tables.lock().await;

        if !tables.customers.contains_key(&customer_id) {
            return Err(DomainError::UnknownCustomer(customer_id));
        }

        // Verify every decrement before touching anything; lines for the
        // same product draw from the same stock.
        let mut required: HashMap<i64, i64> = HashMap::new();
        for item in &items {
            *required.entry(item.product_id).or_insert(0) += item.quantity;
        }
        for (&product_id, &quantity) in &required {
            let product = tables
                .products
                .get(&product_id)
                .ok_or(DomainError::UnknownProduct(product_id))?;
            if product.stock < quantity {
                warn!(
                    "Rejected order for customer {}: product {} has {} in stock, {} requested",
                    customer_id, product_id, product.stock, quantity
                );
                return Err(DomainError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: product.stock,
                });
            }
        }

        for (&product_id, &quantity) in &required {
            if let Some(product) = tables.products.get_mut(&product_id) {
                product.stock -= quantity;
            }
        }

        let total_amount: Decimal = items
            .iter()
            .map(|i| money::line_total(i.quantity, i.unit_price))
            .sum();

        let order_id = next(&mut tables.order_seq);
        let order = Order {
            id: order_id,
            customer_id,
            placed_at,
            total_amount,
        };
        tables.orders.insert(order_id, order.clone());

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let id = next(&mut tables.item_seq);
            let row = OrderItem {
                id,
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            };
            tables.order_items.insert(id, row.clone());
            rows.push(row);
        }

        Ok((order, rows))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<(Order, Vec<OrderItem>)>> {
        let tables = self.tables.lock().await;

        let Some(order) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };
        let items = tables
            .order_items
            .values()
            .filter(|i| i.order_id == id)
            .cloned()
            .collect();
        Ok(Some((order, items)))
    }

    async fn list_for_customer(&self, customer_id: i64) -> DomainResult<Vec<Order>> {
        let tables = self.tables.lock().await;

        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| (a.placed_at, a.id).cmp(&(b.placed_at, b.id)));
        Ok(orders)
    }

    async fn list(&self) -> DomainResult<Vec<Order>> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.values().cloned().collect())
    }

    async fn list_items(&self) -> DomainResult<Vec<OrderItem>> {
        let tables = self.tables.lock().await;
        Ok(tables.order_items.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    async fn seed_product(store: &MemStore, name: &str, price_cents: i64, stock: i64) -> Product {
        ProductRepository::insert(
            store,
            NewProduct {
                name: name.to_string(),
                description: None,
                price: dec(price_cents),
                stock,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemStore::new();

        CustomerRepository::insert(
            &store,
            NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();

        let err = CustomerRepository::insert(
            &store,
            NewCustomer {
                name: "Imposter".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEmail(_)));
        assert_eq!(CustomerRepository::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let store = MemStore::new();
        let product = seed_product(&store, "Widget", 999, 5).await;

        let err = store.adjust_stock(product.id, -6).await.unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { available: 5, .. }));

        // Unchanged after the rejected adjustment
        let current = ProductRepository::find(&store, product.id).await.unwrap().unwrap();
        assert_eq!(current.stock, 5);

        let restocked = store.adjust_stock(product.id, 10).await.unwrap();
        assert_eq!(restocked.stock, 15);
    }

    #[tokio::test]
    async fn test_create_order_computes_total_and_decrements_stock() {
        let store = MemStore::new();
        let customer = CustomerRepository::insert(
            &store,
            NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        let product = seed_product(&store, "Widget", 1999, 10).await;

        let (order, items) = store
            .create(
                customer.id,
                Utc::now(),
                vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 3,
                    unit_price: product.price,
                }],
            )
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec(5997));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, order.id);

        let current = ProductRepository::find(&store, product.id).await.unwrap().unwrap();
        assert_eq!(current.stock, 7);
    }

    #[tokio::test]
    async fn test_create_order_is_all_or_nothing() {
        let store = MemStore::new();
        let customer = CustomerRepository::insert(
            &store,
            NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        let plenty = seed_product(&store, "Plenty", 500, 100).await;
        let scarce = seed_product(&store, "Scarce", 500, 1).await;

        let err = store
            .create(
                customer.id,
                Utc::now(),
                vec![
                    NewOrderItem {
                        product_id: plenty.id,
                        quantity: 2,
                        unit_price: plenty.price,
                    },
                    NewOrderItem {
                        product_id: scarce.id,
                        quantity: 2,
                        unit_price: scarce.price,
                    },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));

        // Nothing moved: no orders, no items, stock untouched
        assert!(OrderRepository::list(&store).await.unwrap().is_empty());
        assert!(store.list_items().await.unwrap().is_empty());
        let plenty_now = ProductRepository::find(&store, plenty.id).await.unwrap().unwrap();
        assert_eq!(plenty_now.stock, 100);
    }

    #[tokio::test]
    async fn test_repeated_product_lines_share_stock() {
        let store = MemStore::new();
        let customer = CustomerRepository::insert(
            &store,
            NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        let product = seed_product(&store, "Widget", 100, 3).await;

        let err = store
            .create(
                customer.id,
                Utc::now(),
                vec![
                    NewOrderItem {
                        product_id: product.id,
                        quantity: 2,
                        unit_price: product.price,
                    },
                    NewOrderItem {
                        product_id: product.id,
                        quantity: 2,
                        unit_price: product.price,
                    },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
    }
}
