//! # Catalog Module
//!
//! Static product reference data: products, size variants, SKUs, prices.
//!
//! ## Dual-Key Identity Pattern
//! Every sellable unit has two identifiers:
//! - `CartKey { product_id, size_id }`: how the storefront cart addresses it
//! - `Sku`: how the external stock ledger addresses it
//!
//! The catalog is the only place those two worlds are joined. It is embedded
//! in the deployed artifact, loaded once at startup and never mutated at
//! runtime; stock quantities live in the external ledger, never here.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Stock Keeping Unit: the key the external stock ledger is indexed by.
///
/// Unique across the whole catalog. A product with a single implicit size
/// still carries exactly one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sku(pub String);

impl Sku {
    pub fn new(sku: impl Into<String>) -> Self {
        Sku(sku.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sku {
    fn from(s: &str) -> Self {
        Sku(s.to_string())
    }
}

/// Composite cart key: which product, in which size.
///
/// An explicit struct rather than a `"productId_sizeId"` string so there is
/// nothing to parse and nothing to mis-split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartKey {
    pub product_id: String,
    pub size_id: String,
}

impl CartKey {
    pub fn new(product_id: impl Into<String>, size_id: impl Into<String>) -> Self {
        CartKey {
            product_id: product_id.into(),
            size_id: size_id.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.size_id)
    }
}

// =============================================================================
// Product & Size
// =============================================================================

/// A size variant of a product.
///
/// The price lives here (not on the product) because the same candy sells at
/// different price points per bag size, and deal eligibility keys off the
/// size name and the unit price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Size {
    /// Short variant id, unique within the product ("reg", "lrg", "std").
    pub id: String,

    /// Display name shown to the customer ("Regular", "Large", "Bag").
    pub name: String,

    /// Weight label for display ("50g"). Single-size products omit it.
    pub weight: Option<String>,

    /// Unit price. Positive by construction of the builtin catalog.
    pub price: Money,

    /// Stock key in the external ledger.
    pub sku: Sku,
}

/// A product available in the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Stable slug identifier ("shark-bite-crunch").
    pub id: String,

    /// Display name.
    pub name: String,

    /// One or more size variants. Never empty.
    pub sizes: Vec<Size>,
}

impl Product {
    /// Finds a size variant by its id.
    pub fn size(&self, size_id: &str) -> Option<&Size> {
        self.sizes.iter().find(|s| s.id == size_id)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The full product catalog. Immutable reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog from a product list.
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// All products, in display order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a product by slug.
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Resolves a cart key to its (product, size) pair.
    pub fn resolve(&self, key: &CartKey) -> Option<(&Product, &Size)> {
        let product = self.product(&key.product_id)?;
        let size = product.size(&key.size_id)?;
        Some((product, size))
    }

    /// Finds the (product, size) pair carrying a SKU.
    pub fn resolve_sku(&self, sku: &Sku) -> Option<(&Product, &Size)> {
        for product in &self.products {
            if let Some(size) = product.sizes.iter().find(|s| &s.sku == sku) {
                return Some((product, size));
            }
        }
        None
    }

    /// The catalog shipped with the deployed artifact.
    ///
    /// Regular bags are $8 / 50g, Large bags are $10 / 120g; the two pop
    /// products come in a single $10 bag.
    pub fn builtin() -> Self {
        fn two_sizes(product_id: &str, name: &str, sku_stem: &str) -> Product {
            Product {
                id: product_id.to_string(),
                name: name.to_string(),
                sizes: vec![
                    Size {
                        id: "reg".to_string(),
                        name: "Regular".to_string(),
                        weight: Some("50g".to_string()),
                        price: Money::from_dollars(8),
                        sku: Sku::new(format!("{sku_stem}-REG")),
                    },
                    Size {
                        id: "lrg".to_string(),
                        name: "Large".to_string(),
                        weight: Some("120g".to_string()),
                        price: Money::from_dollars(10),
                        sku: Sku::new(format!("{sku_stem}-LRG")),
                    },
                ],
            }
        }

        fn single_bag(product_id: &str, name: &str, sku: &str) -> Product {
            Product {
                id: product_id.to_string(),
                name: name.to_string(),
                sizes: vec![Size {
                    id: "std".to_string(),
                    name: "Bag".to_string(),
                    weight: None,
                    price: Money::from_dollars(10),
                    sku: Sku::new(sku),
                }],
            }
        }

        Catalog::new(vec![
            two_sizes("caramelts", "Caramelts", "CARAMELTS"),
            single_bag("sour-prism-pops", "Sour Prism Pops", "SOUR-PRISM-POPS"),
            two_sizes("shark-bite-crunch", "Shark Bite Crunch", "SHARK-BITE-CRUNCH"),
            two_sizes("neon-worm-crisps", "Neon Worm Crisps", "NEON-WORM-CRISPS"),
            single_bag("prism-pops", "Prism Pops", "PRISM-POPS"),
            two_sizes("crystal-bear-bites", "Crystal Bear Bites", "CRYSTAL-BEAR-BITES"),
            two_sizes("cola-fizz-crunch", "Cola Fizz Crunch", "COLA-FIZZ-CRUNCH"),
            two_sizes(
                "strawberry-sparkle-crunch",
                "Strawberry Sparkle Crunch",
                "STRAWBERRY-SPARKLE-CRUNCH",
            ),
        ])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 8);

        // Every product has at least one size, every size a positive price.
        for product in catalog.products() {
            assert!(!product.sizes.is_empty(), "{} has no sizes", product.id);
            for size in &product.sizes {
                assert!(size.price.is_positive());
            }
        }
    }

    #[test]
    fn test_skus_are_unique() {
        let catalog = Catalog::builtin();
        let mut seen = HashSet::new();
        for product in catalog.products() {
            for size in &product.sizes {
                assert!(seen.insert(size.sku.clone()), "duplicate SKU {}", size.sku);
            }
        }
    }

    #[test]
    fn test_resolve_cart_key() {
        let catalog = Catalog::builtin();
        let key = CartKey::new("caramelts", "lrg");
        let (product, size) = catalog.resolve(&key).unwrap();
        assert_eq!(product.name, "Caramelts");
        assert_eq!(size.name, "Large");
        assert_eq!(size.price, Money::from_dollars(10));
        assert_eq!(size.sku.as_str(), "CARAMELTS-LRG");
    }

    #[test]
    fn test_resolve_unknown_key() {
        let catalog = Catalog::builtin();
        assert!(catalog.resolve(&CartKey::new("caramelts", "xl")).is_none());
        assert!(catalog.resolve(&CartKey::new("nope", "reg")).is_none());
    }

    #[test]
    fn test_resolve_sku() {
        let catalog = Catalog::builtin();
        let (product, size) = catalog.resolve_sku(&Sku::from("PRISM-POPS")).unwrap();
        assert_eq!(product.id, "prism-pops");
        assert_eq!(size.name, "Bag");
        assert!(size.weight.is_none());
    }

    #[test]
    fn test_single_size_products_still_have_one_size() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.product("prism-pops").unwrap().sizes.len(), 1);
        assert_eq!(catalog.product("sour-prism-pops").unwrap().sizes.len(), 1);
    }
}
