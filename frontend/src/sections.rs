//! Fixed vocabulary of commentable sections, plus key builders for the
//! image sections whose keys derive from file names.
//!
//! The data layer treats section keys as opaque strings; this module is the
//! only place the client-side vocabulary lives.

pub const PRODUCT_NAME: &str = "product_name";
pub const PRODUCT_BRAND: &str = "product_brand";
pub const SHORT_DESCRIPTION: &str = "short_description";
pub const PRODUCT_DESCRIPTION: &str = "product_description";
pub const SUPPLIER_INFO: &str = "supplier_info";
pub const INCI: &str = "inci";
pub const INGREDIENTS: &str = "ingredients";
pub const DISCLAIMER: &str = "disclaimer";
pub const SKU: &str = "sku";
pub const SUPPLIER_DETAIL: &str = "supplier_detail";
pub const COUNTRY: &str = "country";
pub const REGION: &str = "region";
pub const ALCOHOL_CONTENT: &str = "alcohol_content";
pub const PRICE_PER_UNIT: &str = "price_per_unit";

const MAX_KEY_COMPONENT: usize = 100;

pub fn main_image_section_key(file_name: Option<&str>) -> String {
    match file_name {
        Some(name) if !name.is_empty() => format!("main_image_{}", sanitize_component(name)),
        _ => "main_image_unknown".to_string(),
    }
}

pub fn nutrition_label_section_key(file_name: Option<&str>, index: usize) -> String {
    match file_name {
        Some(name) if !name.is_empty() => format!("nutrition_label_{}", sanitize_component(name)),
        _ => format!("nutrition_label_unknown_{index}"),
    }
}

/// Keeps alphanumerics plus `._-`, collapses underscore runs, and caps the
/// length so sheet cells stay readable.
fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_underscore = false;
    for ch in raw.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
        if out.len() >= MAX_KEY_COMPONENT {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_characters_collapse_to_single_underscores() {
        assert_eq!(sanitize_component("SKU 1 (front)!.png"), "SKU_1_front_.png");
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_component(&long).len(), MAX_KEY_COMPONENT);
    }

    #[test]
    fn image_keys_fall_back_when_the_name_is_missing() {
        assert_eq!(main_image_section_key(None), "main_image_unknown");
        assert_eq!(main_image_section_key(Some("")), "main_image_unknown");
        assert_eq!(
            main_image_section_key(Some("x_image.png")),
            "main_image_x_image.png"
        );
        assert_eq!(
            nutrition_label_section_key(None, 2),
            "nutrition_label_unknown_2"
        );
    }
}
