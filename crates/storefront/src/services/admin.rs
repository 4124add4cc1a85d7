//! Staff admin rules: product form validation and account toggling.

use printshop_core::{Price, PriceError, PrintArea, UserId};

use super::form::{FieldErrors, required_text};
use crate::models::Product;

/// Maximum product name length.
pub const MAX_PRODUCT_NAME: usize = 120;

/// Whether `actor` may toggle the active flag of `target`.
///
/// Staff can never deactivate (or reactivate) their own account.
#[must_use]
pub fn may_toggle(actor: UserId, target: UserId) -> bool {
    actor != target
}

/// Text fields of the admin product form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub print_x: String,
    pub print_y: String,
    pub print_w: String,
    pub print_h: String,
}

/// Validated product text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub print_area: PrintArea,
}

impl ProductForm {
    /// Set a field by its form name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "price" => &mut self.price,
            "description" => &mut self.description,
            "print_x" => &mut self.print_x,
            "print_y" => &mut self.print_y,
            "print_w" => &mut self.print_w,
            "print_h" => &mut self.print_h,
            _ => return,
        };
        *slot = value;
    }

    /// Prefill the form from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount().to_string(),
            description: product.description.clone(),
            print_x: product.print_area.x.to_string(),
            print_y: product.print_area.y.to_string(),
            print_w: product.print_area.width.to_string(),
            print_h: product.print_area.height.to_string(),
        }
    }

    /// Prefill the create form with the offered print area.
    #[must_use]
    pub fn for_create() -> Self {
        let area = PrintArea::FORM_DEFAULT;
        Self {
            print_x: area.x.to_string(),
            print_y: area.y.to_string(),
            print_w: area.width.to_string(),
            print_h: area.height.to_string(),
            ..Self::default()
        }
    }

    /// Validate the form.
    ///
    /// Blank print fields fall back to `existing`'s values when editing and to
    /// [`PrintArea::FORM_DEFAULT`] when creating. A blank price is zero. When
    /// `template_size` is known the print area must fit inside it.
    ///
    /// # Errors
    ///
    /// Returns every failed field.
    pub fn validate(
        &self,
        existing: Option<&Product>,
        template_size: Option<(u32, u32)>,
    ) -> Result<ProductFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = required_text(&mut errors, "name", &self.name, MAX_PRODUCT_NAME);

        let price = if self.price.trim().is_empty() {
            Some(Price::ZERO)
        } else {
            match Price::parse(&self.price) {
                Ok(price) => Some(price),
                Err(e) => {
                    errors.add("price", price_message(&e));
                    None
                }
            }
        };

        let fallback = existing.map_or(PrintArea::FORM_DEFAULT, |p| p.print_area);
        let x = int_field(&mut errors, "print_x", &self.print_x, fallback.x);
        let y = int_field(&mut errors, "print_y", &self.print_y, fallback.y);
        let width = int_field(&mut errors, "print_w", &self.print_w, fallback.width);
        let height = int_field(&mut errors, "print_h", &self.print_h, fallback.height);

        let print_area = match (x, y, width, height) {
            (Some(x), Some(y), Some(width), Some(height)) => {
                let area = PrintArea::new(x, y, width, height);
                match area.validate(template_size) {
                    Ok(()) => Some(area),
                    Err(e) => {
                        errors.add("print_area", e.to_string());
                        None
                    }
                }
            }
            _ => None,
        };

        match (name, price, print_area) {
            (Some(name), Some(price), Some(print_area)) if errors.is_empty() => Ok(ProductFields {
                name,
                price,
                description: self.description.trim().to_string(),
                print_area,
            }),
            _ => Err(errors),
        }
    }
}

fn price_message(error: &PriceError) -> String {
    match error {
        PriceError::NotANumber | PriceError::Empty => "Enter a number.".to_string(),
        PriceError::Negative => "Ensure this value is greater than or equal to 0.".to_string(),
        PriceError::TooPrecise => "Ensure that there are no more than 2 decimal places.".to_string(),
        PriceError::TooLarge { max } => format!("Ensure this value is less than or equal to {max}."),
    }
}

fn int_field(errors: &mut FieldErrors, field: &'static str, value: &str, fallback: i32) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return Some(fallback);
    }
    if let Ok(parsed) = value.parse() {
        Some(parsed)
    } else {
        errors.add(field, "Enter a whole number.");
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use printshop_core::ProductId;

    use super::*;

    fn form(name: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            price: price.to_string(),
            ..ProductForm::default()
        }
    }

    fn stored(print_area: PrintArea) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Tee".to_string(),
            price: Price::from_minor(1500),
            description: String::new(),
            image: None,
            template_image: None,
            template_size: None,
            print_area,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_self_toggle_is_refused() {
        assert!(!may_toggle(UserId::new(3), UserId::new(3)));
        assert!(may_toggle(UserId::new(3), UserId::new(4)));
    }

    #[test]
    fn test_create_defaults_blank_print_fields() {
        let fields = form(" Classic Tee ", "12.50").validate(None, None).unwrap();
        assert_eq!(fields.name, "Classic Tee");
        assert_eq!(fields.price, Price::from_minor(1250));
        assert_eq!(fields.print_area, PrintArea::new(270, 210, 300, 360));
    }

    #[test]
    fn test_edit_keeps_existing_print_fields() {
        let product = stored(PrintArea::new(10, 20, 30, 40));
        let mut edit = form("Tee", "15.00");
        edit.print_w = "50".to_string();

        let fields = edit.validate(Some(&product), None).unwrap();
        assert_eq!(fields.print_area, PrintArea::new(10, 20, 50, 40));
    }

    #[test]
    fn test_blank_price_is_zero() {
        let fields = form("Tee", "  ").validate(None, None).unwrap();
        assert_eq!(fields.price, Price::ZERO);
    }

    #[test]
    fn test_reports_each_bad_field() {
        let mut bad = form("", "-1");
        bad.print_x = "left".to_string();
        let errors = bad.validate(None, None).unwrap_err();

        assert_eq!(errors.get("name"), Some("This field is required."));
        assert!(errors.get("price").unwrap().contains("greater than or equal to 0"));
        assert_eq!(errors.get("print_x"), Some("Enter a whole number."));
    }

    #[test]
    fn test_print_area_must_fit_template() {
        let errors = form("Tee", "10").validate(None, Some((500, 500))).unwrap_err();
        assert!(errors.get("print_area").is_some());

        assert!(form("Tee", "10").validate(None, Some((600, 600))).is_ok());
    }

    #[test]
    fn test_form_round_trips_stored_product() {
        let product = stored(PrintArea::COLUMN_DEFAULT);
        let fields = ProductForm::from_product(&product)
            .validate(Some(&product), None)
            .unwrap();
        assert_eq!(fields.price, product.price);
        assert_eq!(fields.print_area, product.print_area);
    }
}
