//! Price resolution and budget math for a shopping list.
//!
//! The price used for an item follows a fixed precedence: the confirmed
//! price if one was entered, otherwise the linked product's last known
//! price, otherwise zero. Totals are plain sums; rounding is left to the
//! presentation layer.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::{list_items, products};

pub const ITEM_STATUS_PENDIENTE: &str = "pendiente";
pub const ITEM_STATUS_COMPRADO: &str = "comprado";
pub const ITEM_STATUS_NO_NECESITA: &str = "ya no se necesita";

pub const LIST_STATUS_PENDIENTE: &str = "pendiente";
pub const LIST_STATUS_REVISADA: &str = "revisada";
pub const LIST_STATUS_NO_REVISADA: &str = "no revisada";

const ITEM_STATUSES: [&str; 3] = [
    ITEM_STATUS_PENDIENTE,
    ITEM_STATUS_COMPRADO,
    ITEM_STATUS_NO_NECESITA,
];

const LIST_STATUSES: [&str; 3] = [
    LIST_STATUS_PENDIENTE,
    LIST_STATUS_REVISADA,
    LIST_STATUS_NO_REVISADA,
];

/// Whether `value` is one of the known item statuses. The column is plain
/// text, so the vocabulary is enforced here rather than by the database.
pub fn is_item_status(value: &str) -> bool {
    ITEM_STATUSES.contains(&value)
}

pub fn is_list_status(value: &str) -> bool {
    LIST_STATUSES.contains(&value)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BudgetDetails {
    pub estimated_total: f64,
    pub purchased_total: f64,
}

/// Pick the price to use for one item: confirmed price, else the linked
/// product's last known price, else 0. Applied independently per item.
pub fn resolve_price(item: &list_items::Model, product: Option<&products::Model>) -> f64 {
    if let Some(confirmed) = item.precio_confirmado {
        return confirmed;
    }
    if let Some(last) = product.and_then(|p| p.last_price) {
        return last;
    }
    0.0
}

/// Sum `resolve_price * cantidad` over every item. Purchased items count
/// toward both totals; everything else only toward the estimate.
pub fn compute_budget(items: &[(list_items::Model, Option<products::Model>)]) -> BudgetDetails {
    let mut estimated_total = 0.0;
    let mut purchased_total = 0.0;
    for (item, product) in items {
        let amount = resolve_price(item, product.as_ref()) * item.cantidad;
        estimated_total += amount;
        if item.status == ITEM_STATUS_COMPRADO {
            purchased_total += amount;
        }
    }
    BudgetDetails {
        estimated_total,
        purchased_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(
        confirmed: Option<f64>,
        cantidad: f64,
        status: &str,
        product_id: Option<Uuid>,
    ) -> list_items::Model {
        list_items::Model {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            product_id,
            nombre: "Leche".into(),
            comentario: None,
            cantidad,
            unit: None,
            status: status.into(),
            precio_estimado: None,
            precio_confirmado: confirmed,
            creado_por_id: Uuid::new_v4(),
            created_at: Utc::now().into(),
        }
    }

    fn product(last_price: Option<f64>) -> products::Model {
        products::Model {
            id: Uuid::new_v4(),
            name: "Leche".into(),
            description: None,
            category: None,
            brand: None,
            family_id: Uuid::new_v4(),
            image_url: None,
            last_price,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn status_vocabulary_is_closed() {
        assert!(is_item_status("pendiente"));
        assert!(is_item_status("comprado"));
        assert!(is_item_status("ya no se necesita"));
        assert!(!is_item_status("comprando"));
        assert!(!is_item_status(""));

        assert!(is_list_status("revisada"));
        assert!(is_list_status("no revisada"));
        assert!(!is_list_status("comprado"));
    }

    #[test]
    fn confirmed_price_wins() {
        let p = product(Some(3.0));
        let i = item(Some(2.5), 1.0, ITEM_STATUS_PENDIENTE, Some(p.id));
        assert_eq!(resolve_price(&i, Some(&p)), 2.5);
    }

    #[test]
    fn falls_back_to_last_known_price() {
        let p = product(Some(3.0));
        let i = item(None, 1.0, ITEM_STATUS_PENDIENTE, Some(p.id));
        assert_eq!(resolve_price(&i, Some(&p)), 3.0);
    }

    #[test]
    fn product_without_price_resolves_to_zero() {
        let p = product(None);
        let i = item(None, 1.0, ITEM_STATUS_PENDIENTE, Some(p.id));
        assert_eq!(resolve_price(&i, Some(&p)), 0.0);
    }

    #[test]
    fn no_product_resolves_to_zero() {
        let i = item(None, 1.0, ITEM_STATUS_PENDIENTE, None);
        assert_eq!(resolve_price(&i, None), 0.0);
    }

    #[test]
    fn budget_splits_estimated_and_purchased() {
        let items = vec![
            (item(Some(10.0), 2.0, ITEM_STATUS_PENDIENTE, None), None),
            (item(Some(5.0), 1.0, ITEM_STATUS_COMPRADO, None), None),
        ];
        let budget = compute_budget(&items);
        assert_eq!(budget.estimated_total, 25.0);
        assert_eq!(budget.purchased_total, 5.0);
    }

    #[test]
    fn priceless_item_still_contributes_zero() {
        let items = vec![
            (item(None, 4.0, ITEM_STATUS_PENDIENTE, None), None),
            (item(Some(2.0), 1.0, ITEM_STATUS_NO_NECESITA, None), None),
        ];
        let budget = compute_budget(&items);
        assert_eq!(budget.estimated_total, 2.0);
        assert_eq!(budget.purchased_total, 0.0);
    }
}
