//! Text projection of the screen state.

use std::fmt;

use stockpos_inventory::InventoryRecord;

use crate::state::ScreenState;

pub const SCREEN_TITLE: &str = "Inventory POS";

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub title: &'static str,
    pub name: String,
    pub sku: String,
    pub quantity: String,
    pub price: String,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    /// Empties the form and leaves edit mode; always present.
    pub clear_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub name: String,
    pub sku: String,
    pub detail: String,
}

impl RowView {
    fn from_record(record: &InventoryRecord) -> Self {
        Self {
            name: record.name.clone(),
            sku: format!("SKU: {}", record.sku),
            detail: format!("Qty: {} • {}", record.quantity, money(record.price)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListBody {
    Loading,
    Empty,
    Rows(Vec<RowView>),
}

/// Everything the screen displays, as strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub title: &'static str,
    pub error: Option<&'static str>,
    pub form: FormView,
    pub header: String,
    pub total: String,
    pub body: ListBody,
}

impl ScreenView {
    pub fn render(state: &ScreenState) -> Self {
        let editing = state.editing_id().is_some();
        let form = state.form();

        let body = if state.loading() {
            ListBody::Loading
        } else if state.items().is_empty() {
            ListBody::Empty
        } else {
            ListBody::Rows(state.items().iter().map(RowView::from_record).collect())
        };

        Self {
            title: SCREEN_TITLE,
            error: state.error(),
            form: FormView {
                title: if editing { "Edit item" } else { "Add item" },
                name: form.name.clone(),
                sku: form.sku.clone(),
                quantity: form.quantity.to_string(),
                price: form.price.to_string(),
                submit_label: if editing { "Update" } else { "Add" },
                submit_enabled: !state.submitting(),
                clear_label: "Clear",
            },
            header: format!("Inventory ({})", state.items().len()),
            total: format!("Total stock value: {}", money(state.total_value())),
            body,
        }
    }
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

impl fmt::Display for ScreenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        if let Some(error) = self.error {
            writeln!(f, "! {error}")?;
        }

        writeln!(f)?;
        writeln!(f, "{}", self.form.title)?;
        writeln!(f, "  name:  {}", self.form.name)?;
        writeln!(f, "  sku:   {}", self.form.sku)?;
        writeln!(f, "  qty:   {}", self.form.quantity)?;
        writeln!(f, "  price: {}", self.form.price)?;
        let submit = if self.form.submit_enabled {
            format!("[{}]", self.form.submit_label)
        } else {
            format!("({}...)", self.form.submit_label)
        };
        writeln!(f, "  {submit} [{}]", self.form.clear_label)?;

        writeln!(f)?;
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{}", self.total)?;
        match &self.body {
            ListBody::Loading => writeln!(f, "Loading inventory...")?,
            ListBody::Empty => writeln!(f, "No items yet.")?,
            ListBody::Rows(rows) => {
                for (n, row) in rows.iter().enumerate() {
                    writeln!(f, "{:>3}. {}  {}  {}", n + 1, row.name, row.sku, row.detail)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stockpos_core::RecordId;
    use stockpos_inventory::{InventoryDocument, InventoryDraft};

    use super::*;
    use crate::form::FormField;
    use crate::state::ScreenFailure;

    fn record(id: &str, name: &str, sku: &str, quantity: i64, price: f64) -> InventoryRecord {
        InventoryDocument::stamp(InventoryDraft::new(name, sku, quantity, price), 1)
            .into_record(RecordId::new(id).unwrap())
    }

    fn loaded(items: Vec<InventoryRecord>) -> ScreenState {
        let mut state = ScreenState::new();
        state.finish_load::<()>(Ok(items));
        state
    }

    #[test]
    fn initial_state_shows_loading_and_add_form() {
        let view = ScreenView::render(&ScreenState::new());
        assert_eq!(view.title, "Inventory POS");
        assert_eq!(view.body, ListBody::Loading);
        assert_eq!(view.form.title, "Add item");
        assert_eq!(view.form.submit_label, "Add");
        assert!(view.form.submit_enabled);
        assert_eq!(view.form.clear_label, "Clear");
        assert!(view.to_string().contains("[Add] [Clear]"));
        assert_eq!(view.form.quantity, "0");
        assert_eq!(view.form.price, "0");
        assert_eq!(view.header, "Inventory (0)");
        assert_eq!(view.total, "Total stock value: $0.00");
    }

    #[test]
    fn empty_list_after_load() {
        let view = ScreenView::render(&loaded(vec![]));
        assert_eq!(view.body, ListBody::Empty);
        assert_eq!(view.total, "Total stock value: $0.00");
        assert!(view.to_string().contains("No items yet."));
    }

    #[test]
    fn rows_show_sku_quantity_and_price() {
        let view = ScreenView::render(&loaded(vec![
            record("a", "Widget", "W1", 5, 2.5),
            record("b", "Bolt", "B1", 3, 10.0),
        ]));

        assert_eq!(view.header, "Inventory (2)");
        assert_eq!(view.total, "Total stock value: $42.50");
        let ListBody::Rows(rows) = &view.body else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].name, "Widget");
        assert_eq!(rows[0].sku, "SKU: W1");
        assert_eq!(rows[0].detail, "Qty: 5 • $2.50");
        assert_eq!(rows[1].detail, "Qty: 3 • $10.00");
    }

    #[test]
    fn editing_switches_labels() {
        let rec = record("a", "Bolt", "B1", 3, 10.0);
        let mut state = loaded(vec![rec.clone()]);
        state.begin_edit(&rec);

        let view = ScreenView::render(&state);
        assert_eq!(view.form.title, "Edit item");
        assert_eq!(view.form.submit_label, "Update");
        assert_eq!(view.form.clear_label, "Clear");
        assert!(view.to_string().contains("[Update] [Clear]"));
        assert_eq!(view.form.name, "Bolt");
        assert_eq!(view.form.quantity, "3");
        assert_eq!(view.form.price, "10");
    }

    #[test]
    fn submit_disabled_while_submitting() {
        let mut state = loaded(vec![]);
        state.set_field(FormField::Name, "Widget");
        state.set_field(FormField::Sku, "W1");
        state
            .prepare_submit(stockpos_infra::ConcurrencyMode::LastWriterWins)
            .unwrap();

        let view = ScreenView::render(&state);
        assert!(!view.form.submit_enabled);
        assert!(view.to_string().contains("(Add...)"));
    }

    #[test]
    fn error_banner_is_rendered() {
        let mut state = loaded(vec![]);
        state.finish_delete(Err(ScreenFailure::Delete));
        let view = ScreenView::render(&state);
        assert_eq!(view.error, Some("Could not delete the item."));
        assert!(view.to_string().contains("! Could not delete the item."));
    }
}
