use review_flow_shared::catalog::{Product, ProductImage, ProductListItem};
use thiserror::Error;

use crate::{
    drive_client::{DriveClient, DriveFile},
    sheet_rows::{SheetClient, UpstreamError},
};

const CATALOG_MAX_ROWS: usize = 1000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("product sheet is empty")]
    EmptySheet,
    #[error("SKU column not found in sheet")]
    MissingSkuColumn,
    #[error("product with SKU {0} not found")]
    NotFound(String),
}

/// Product catalog over the product tab of the tabular store, joined with
/// the file store's image search. Columns are header-name mapped here,
/// unlike the positional comment tab: the sheet is human-maintained and
/// columns move around.
#[derive(Clone)]
pub struct ProductCatalog {
    sheets: SheetClient,
    drive: DriveClient,
    public_base_url: String,
}

impl ProductCatalog {
    pub fn new(sheets: SheetClient, drive: DriveClient, public_base_url: String) -> Self {
        Self {
            sheets,
            drive,
            public_base_url,
        }
    }

    pub async fn list(&self) -> Result<Vec<ProductListItem>, CatalogError> {
        let rows = self.sheets.fetch_product_rows(CATALOG_MAX_ROWS).await?;
        let Some((headers, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };
        let sku_idx = column_containing(headers, "sku").ok_or(CatalogError::MissingSkuColumn)?;
        let name_idx = column_containing(headers, "nome")
            .or_else(|| column_containing(headers, "prodotto"));

        Ok(data
            .iter()
            .filter_map(|row| {
                let sku = non_empty_cell(row, sku_idx)?;
                let name = name_idx
                    .and_then(|idx| non_empty_cell(row, idx))
                    .unwrap_or_else(|| "Unnamed product".to_string());
                Some(ProductListItem {
                    sku,
                    name,
                })
            })
            .collect())
    }

    pub async fn detail(&self, sku: &str) -> Result<Product, CatalogError> {
        let rows = self.sheets.fetch_product_rows(CATALOG_MAX_ROWS).await?;
        let Some((headers, data)) = rows.split_first() else {
            return Err(CatalogError::EmptySheet);
        };
        let sku_idx = column_containing(headers, "sku").ok_or(CatalogError::MissingSkuColumn)?;
        let row = data
            .iter()
            .find(|row| row.get(sku_idx).map(String::as_str) == Some(sku))
            .ok_or_else(|| CatalogError::NotFound(sku.to_string()))?;

        let mut product = Product {
            sku: sku.to_string(),
            name: value_by_headers(headers, row, &["nome prodotto", "nome"]),
            // Brand must match the `Brand` header exactly; the fuzzy lookup
            // can land on `Fornito Da_EXT` when columns are reordered.
            brand: column_exact(headers, "brand").and_then(|idx| non_empty_cell(row, idx)),
            description: value_by_headers(headers, row, &["descrizione"]),
            short_description: value_by_headers(headers, row, &["short description"]),
            supplier: column_exact(headers, "fornito da_ext")
                .and_then(|idx| non_empty_cell(row, idx)),
            disclaimer: value_by_headers(headers, row, &["disclaimer"]),
            inci: value_by_headers(headers, row, &["inci"]),
            ingredients: value_by_headers(headers, row, &["ingredienti"]),
            country: value_by_headers(headers, row, &["paese produttore", "paese"]),
            region: value_by_headers(headers, row, &["regione produttore", "regione"]),
            alcohol_content: value_by_headers(headers, row, &[
                "gradazione alcolica",
                "gradazione",
            ]),
            price: value_by_headers(headers, row, &["prezzo"]),
            price_per_unit: value_by_headers(headers, row, &["prezzo per"]),
            volume: value_by_headers(headers, row, &["volume"])
                .unwrap_or_else(|| "0,75l".to_string()),
            main_image: None,
            main_image_file_name: None,
            nutritional_images: Vec::new(),
        };

        // Image resolution is best-effort: a file store outage degrades the
        // page to text, it never fails the product read.
        match self.drive.search_images(sku).await {
            Ok(files) => {
                tracing::debug!(sku, found = files.len(), "image search for product");
                let (main, nutritional) = classify_images(&files);
                product.main_image =
                    main.map(|file| image_proxy_url(&self.public_base_url, &file.id));
                product.main_image_file_name = main.map(|file| file.name.clone());
                product.nutritional_images = dedup_images(
                    nutritional
                        .into_iter()
                        .map(|file| ProductImage {
                            url: image_proxy_url(&self.public_base_url, &file.id),
                            file_name: file.name.clone(),
                        })
                        .collect(),
                );
            },
            Err(err) => {
                tracing::warn!(sku, "image search failed: {err:#}");
            },
        }

        Ok(product)
    }
}

fn column_containing(headers: &[String], needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    headers
        .iter()
        .position(|header| header.to_lowercase().contains(&needle))
}

fn column_exact(headers: &[String], needle: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(needle))
}

fn non_empty_cell(row: &[String], idx: usize) -> Option<String> {
    row.get(idx)
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
}

/// First non-empty cell among the candidate headers, in candidate order.
fn value_by_headers(headers: &[String], row: &[String], candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|needle| column_containing(headers, needle))
        .find_map(|idx| non_empty_cell(row, idx))
}

/// Splits a SKU's image files into the main product shot and the
/// nutritional labels. The main image is the first file named `*image*`
/// (but not `*nutritional*`); with no such file, the first non-nutritional
/// file stands in.
fn classify_images(files: &[DriveFile]) -> (Option<&DriveFile>, Vec<&DriveFile>) {
    let mut main: Option<&DriveFile> = None;
    let mut nutritional = Vec::new();

    for file in files {
        let name = file.name.to_lowercase();
        if name.contains("nutritional") {
            nutritional.push(file);
        } else if name.contains("image") && main.is_none() {
            main = Some(file);
        }
    }

    if main.is_none() {
        main = files
            .iter()
            .find(|file| !file.name.to_lowercase().contains("nutritional"));
    }

    (main, nutritional)
}

fn dedup_images(images: Vec<ProductImage>) -> Vec<ProductImage> {
    let mut seen = std::collections::HashSet::new();
    images
        .into_iter()
        .filter(|image| seen.insert(format!("{}|{}", image.url, image.file_name)))
        .collect()
}

fn image_proxy_url(public_base_url: &str, file_id: &str) -> String {
    format!("{public_base_url}/api/drive-image/{file_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    fn file(id: &str, name: &str) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn fuzzy_header_match_is_case_insensitive() {
        let headers = headers(&["SKU Interno", "Nome Prodotto", "Brand"]);
        assert_eq!(column_containing(&headers, "sku"), Some(0));
        assert_eq!(column_containing(&headers, "nome"), Some(1));
        assert_eq!(column_containing(&headers, "missing"), None);
    }

    #[test]
    fn exact_header_match_ignores_case_and_padding() {
        let headers = headers(&[" Fornito Da_EXT ", "Brand"]);
        assert_eq!(column_exact(&headers, "fornito da_ext"), Some(0));
        assert_eq!(column_exact(&headers, "brand"), Some(1));
        // Exact means exact: a fuzzy lookup would have matched here.
        assert_eq!(column_exact(&headers, "fornito"), None);
    }

    #[test]
    fn header_candidates_fall_through_empty_cells() {
        let headers = headers(&["Nome Prodotto", "Nome"]);
        let row = vec!["".to_string(), "Barolo".to_string()];
        assert_eq!(
            value_by_headers(&headers, &row, &["nome prodotto", "nome"]),
            Some("Barolo".to_string())
        );
    }

    #[test]
    fn main_image_prefers_image_named_files() {
        let files = vec![
            file("a", "SKU1_nutritional_1.png"),
            file("b", "SKU1_image.png"),
            file("c", "SKU1_extra.png"),
        ];
        let (main, nutritional) = classify_images(&files);
        assert_eq!(main.map(|f| f.id.as_str()), Some("b"));
        assert_eq!(nutritional.len(), 1);
        assert_eq!(nutritional[0].id, "a");
    }

    #[test]
    fn main_image_falls_back_to_first_non_nutritional_file() {
        let files = vec![
            file("a", "SKU1_nutritional_1.png"),
            file("b", "SKU1_front.png"),
        ];
        let (main, _) = classify_images(&files);
        assert_eq!(main.map(|f| f.id.as_str()), Some("b"));
    }

    #[test]
    fn only_nutritional_files_leave_no_main_image() {
        let files = vec![file("a", "SKU1_nutritional_1.png")];
        let (main, nutritional) = classify_images(&files);
        assert!(main.is_none());
        assert_eq!(nutritional.len(), 1);
    }

    #[test]
    fn duplicate_images_are_dropped() {
        let images = vec![
            ProductImage {
                url: "/api/drive-image/a".to_string(),
                file_name: "x.png".to_string(),
            },
            ProductImage {
                url: "/api/drive-image/a".to_string(),
                file_name: "x.png".to_string(),
            },
            ProductImage {
                url: "/api/drive-image/b".to_string(),
                file_name: "x.png".to_string(),
            },
        ];
        assert_eq!(dedup_images(images).len(), 2);
    }
}
